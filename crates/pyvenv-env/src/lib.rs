//! Python virtual environments for pyvenv: creation, pip/setuptools bootstrap
//! and command proxying.
//!
//! Nothing here mutates the current process environment. Every child process
//! receives its variables from an explicit context value ([`EnvContext`] or
//! [`ProxyContext`]).

pub mod bootstrap;
pub mod builder;
pub mod creator;
pub mod layout;
pub mod process;
pub mod progress;
pub mod proxy;

pub use builder::{BuildOptions, EnvBuilder, EnvContext, PostSetup};
pub use layout::EnvLayout;
pub use progress::{CallbackSink, Milestone, ProgressEvent, ProgressSink, StreamLabel, WriterSink};
pub use proxy::{remove_environment, ProxyContext};

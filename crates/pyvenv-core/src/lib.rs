pub mod cache;
pub mod config;
pub mod error;
pub mod location;
pub mod naming;
pub mod platform;

pub use error::PyvenvError;
pub use location::EnvLocation;
pub use platform::Platform;

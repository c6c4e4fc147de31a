//! pyvenv configuration layer
//!
//! All environment variable reads for configuration go through this module;
//! business code reads structured config instead of calling `std::env::var`.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool` helpers with alias chains
//! - `schema`: `ObservabilityConfig`, `CacheConfig`, `BootstrapConfig`
//! - `env_keys`: key constants, including the variables pyvenv sets on children

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or};
pub use schema::{BootstrapConfig, CacheConfig, ObservabilityConfig};

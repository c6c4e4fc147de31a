//! Configuration structs grouped by concern, loaded from environment variables.

use super::env_keys::{bootstrap as boot_keys, cache as cache_keys, observability as obv_keys};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Default pip bootstrap script.
pub const DEFAULT_PIP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";
/// Default setuptools bootstrap script.
pub const DEFAULT_SETUPTOOLS_URL: &str = "https://bootstrap.pypa.io/ez_setup.py";

/// Logging configuration: quiet, log_level, log_json
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| Self {
            quiet: env_bool(obv_keys::PYVENV_QUIET, &[], false),
            log_level: env_or(obv_keys::PYVENV_LOG_LEVEL, &[], || "pyvenv=warn".to_string()),
            log_json: env_bool(obv_keys::PYVENV_LOG_JSON, &[], false),
        })
    }
}

/// Cache root configuration
#[derive(Debug, Clone)]
pub struct CacheConfig;

impl CacheConfig {
    /// Explicit cache root override, used verbatim when set.
    pub fn cache_dir() -> Option<PathBuf> {
        env_optional(cache_keys::PYVENV_CACHE_DIR, &[]).map(PathBuf::from)
    }
}

/// Environment creation settings: base interpreter and bootstrap script URLs.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub python: Option<PathBuf>,
    pub pip_url: String,
    pub setuptools_url: String,
}

impl BootstrapConfig {
    pub fn from_env() -> Self {
        Self {
            python: env_optional(boot_keys::PYVENV_PYTHON, &[]).map(PathBuf::from),
            pip_url: env_or(boot_keys::PYVENV_PIP_URL, &[], || DEFAULT_PIP_URL.to_string()),
            setuptools_url: env_or(boot_keys::PYVENV_SETUPTOOLS_URL, &[], || {
                DEFAULT_SETUPTOOLS_URL.to_string()
            }),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            python: None,
            pip_url: DEFAULT_PIP_URL.to_string(),
            setuptools_url: DEFAULT_SETUPTOOLS_URL.to_string(),
        }
    }
}

//! Environment variable key constants.

/// Cache root override
pub mod cache {
    pub const PYVENV_CACHE_DIR: &str = "PYVENV_CACHE_DIR";
    pub const XDG_CACHE_HOME: &str = "XDG_CACHE_HOME";
}

/// Environment creation and bootstrap scripts
pub mod bootstrap {
    /// Base interpreter used to run `-m venv`
    pub const PYVENV_PYTHON: &str = "PYVENV_PYTHON";
    pub const PYVENV_PIP_URL: &str = "PYVENV_PIP_URL";
    pub const PYVENV_SETUPTOOLS_URL: &str = "PYVENV_SETUPTOOLS_URL";
}

/// Logging
pub mod observability {
    pub const PYVENV_QUIET: &str = "PYVENV_QUIET";
    pub const PYVENV_LOG_LEVEL: &str = "PYVENV_LOG_LEVEL";
    pub const PYVENV_LOG_JSON: &str = "PYVENV_LOG_JSON";
}

/// Variables read from or written to proxied child processes.
pub mod child {
    pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
    pub const PATH: &str = "PATH";
    /// Nesting sentinel: set inside `pyvenv shell`.
    pub const PYVENV: &str = "PYVENV";
    pub const PS1: &str = "PS1";
    pub const PROMPT: &str = "PROMPT";
    pub const SHELL: &str = "SHELL";
    pub const COMSPEC: &str = "COMSPEC";
}

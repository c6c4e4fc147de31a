//! Environment-creation primitive: `python -m venv`.

use anyhow::{Context, Result};
use pyvenv_core::config::BootstrapConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Structural options handed to the creation primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub system_site_packages: bool,
    pub clear: bool,
    pub symlinks: bool,
    pub upgrade: bool,
    pub prompt: Option<String>,
}

/// Populates `target` with a runnable interpreter tree.
pub trait EnvCreator {
    fn create(&self, target: &Path, options: &CreateOptions) -> Result<()>;
}

/// Runs the standard library `venv` module of a base interpreter.
#[derive(Debug, Clone)]
pub struct VenvCreator {
    python: PathBuf,
}

impl VenvCreator {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// `PYVENV_PYTHON` when configured, else `python3` or `python` from PATH.
    pub fn discover(config: &BootstrapConfig) -> Result<Self> {
        if let Some(ref python) = config.python {
            return Ok(Self::new(python));
        }
        for name in ["python3", "python"] {
            if let Ok(path) = which::which(name) {
                tracing::debug!(python = %path.display(), "found base interpreter");
                return Ok(Self::new(path));
            }
        }
        anyhow::bail!("python3 or python not found in PATH; set PYVENV_PYTHON")
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    /// pip is bootstrapped separately, so venv always runs `--without-pip`.
    pub fn venv_args(target: &Path, options: &CreateOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-m".into(), "venv".into(), "--without-pip".into()];
        if options.system_site_packages {
            args.push("--system-site-packages".into());
        }
        if options.clear {
            args.push("--clear".into());
        }
        if options.upgrade {
            args.push("--upgrade".into());
        }
        args.push(if options.symlinks { "--symlinks" } else { "--copies" }.into());
        if let Some(ref prompt) = options.prompt {
            args.push("--prompt".into());
            args.push(prompt.into());
        }
        args.push(target.as_os_str().to_os_string());
        args
    }
}

impl EnvCreator for VenvCreator {
    fn create(&self, target: &Path, options: &CreateOptions) -> Result<()> {
        let args = Self::venv_args(target, options);
        tracing::debug!(python = %self.python.display(), ?args, "creating virtual environment");
        let out = Command::new(&self.python)
            .args(&args)
            .output()
            .with_context(|| format!("Failed to execute {} -m venv", self.python.display()))?;
        if !out.status.success() {
            anyhow::bail!(
                "Failed to create virtual environment: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_default_args_use_copies() {
        let args = VenvCreator::venv_args(Path::new("/c/env"), &CreateOptions::default());
        assert_eq!(strs(&args), ["-m", "venv", "--without-pip", "--copies", "/c/env"]);
    }

    #[test]
    fn test_all_structural_options() {
        let options = CreateOptions {
            system_site_packages: true,
            clear: true,
            symlinks: true,
            upgrade: false,
            prompt: Some("demo-YoWklPo4".to_string()),
        };
        let args = VenvCreator::venv_args(Path::new("/c/env"), &options);
        assert_eq!(
            strs(&args),
            [
                "-m",
                "venv",
                "--without-pip",
                "--system-site-packages",
                "--clear",
                "--symlinks",
                "--prompt",
                "demo-YoWklPo4",
                "/c/env"
            ]
        );
    }

    #[test]
    fn test_configured_python_wins() {
        let config = BootstrapConfig {
            python: Some(PathBuf::from("/opt/py/bin/python3.12")),
            ..BootstrapConfig::default()
        };
        let creator = VenvCreator::discover(&config).unwrap();
        assert_eq!(creator.python(), Path::new("/opt/py/bin/python3.12"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_primitive_surfaces_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let creator = VenvCreator::new("/bin/false");
        let err = creator
            .create(&tmp.path().join("env"), &CreateOptions::default())
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to create virtual environment"));
    }
}

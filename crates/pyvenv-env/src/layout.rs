//! Paths inside a virtual environment.

use anyhow::Result;
use pyvenv_core::{Platform, PyvenvError};
use std::path::{Path, PathBuf};

pub const INTERPRETER: &str = "python";
pub const PACKAGE_MANAGER: &str = "pip";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLayout {
    root: PathBuf,
    platform: Platform,
}

impl EnvLayout {
    pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            root: root.into(),
            platform,
        }
    }

    pub fn for_host(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Platform::current())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// `Scripts` on Windows, `bin` elsewhere.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(self.platform.bin_dir_name())
    }

    pub fn python(&self) -> PathBuf {
        self.bin_dir().join(self.platform.exe_name(INTERPRETER))
    }

    pub fn pip(&self) -> PathBuf {
        self.bin_dir().join(self.platform.exe_name(PACKAGE_MANAGER))
    }

    /// Fail with `EnvironmentMissing` unless the interpreter is on disk.
    pub fn ensure_present(&self) -> Result<()> {
        if self.python().exists() {
            Ok(())
        } else {
            Err(PyvenvError::EnvironmentMissing(self.root.clone()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_paths() {
        let layout = EnvLayout::new("/c/env", Platform::Unix);
        assert_eq!(layout.bin_dir(), PathBuf::from("/c/env/bin"));
        assert_eq!(layout.python(), PathBuf::from("/c/env/bin/python"));
        assert_eq!(layout.pip(), PathBuf::from("/c/env/bin/pip"));
    }

    #[test]
    fn test_windows_paths() {
        let layout = EnvLayout::new("env", Platform::Windows);
        assert_eq!(layout.python(), Path::new("env").join("Scripts").join("python.exe"));
        assert_eq!(layout.pip(), Path::new("env").join("Scripts").join("pip.exe"));
    }

    #[test]
    fn test_ensure_present_reports_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = EnvLayout::new(tmp.path().join("nope"), Platform::Unix);
        let err = layout.ensure_present().unwrap_err();
        match err.downcast_ref::<PyvenvError>() {
            Some(PyvenvError::EnvironmentMissing(p)) => assert_eq!(p, &tmp.path().join("nope")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

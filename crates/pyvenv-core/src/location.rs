//! Where the environment for a working directory lives.

use crate::cache::{locate_cache_root, APP_NAMESPACE};
use crate::naming::derive_name;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// `cache_root / derive_name(cwd)`. Existence of `root` is the only signal
/// that the environment has been created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLocation {
    /// Fingerprint of the working directory, also used as the prompt.
    pub name: String,
    pub cache_root: PathBuf,
    pub root: PathBuf,
}

impl EnvLocation {
    pub fn new(working_dir: &Path, cache_root: &Path) -> Self {
        let name = derive_name(working_dir);
        Self {
            root: cache_root.join(&name),
            cache_root: cache_root.to_path_buf(),
            name,
        }
    }

    /// Location for the process's current directory under the platform cache root.
    pub fn for_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let cache_root = locate_cache_root(APP_NAMESPACE)?;
        Ok(Self::new(&cwd, &cache_root))
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_joins_cache_root_and_name() {
        let loc = EnvLocation::new(Path::new("/home/user/projects/demo"), Path::new("/cache"));
        assert_eq!(loc.name, "demo-YoWklPo4");
        assert_eq!(loc.root, PathBuf::from("/cache/demo-YoWklPo4"));
    }

    #[test]
    fn test_exists_probes_filesystem() {
        let tmp = tempfile::tempdir().unwrap();
        let loc = EnvLocation::new(Path::new("/srv/app"), tmp.path());
        assert!(!loc.exists());
        std::fs::create_dir_all(&loc.root).unwrap();
        assert!(loc.exists());
    }
}

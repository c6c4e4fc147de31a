//! Error kinds surfaced by pyvenv operations.
//!
//! Library code propagates with `anyhow`; these variants are raised with
//! `anyhow::bail!` so the command router can downcast when it needs to tell
//! them apart.

use std::path::PathBuf;
use thiserror::Error;

/// Package-manager sub-operation that can fail with a non-zero exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOp {
    Install,
    Upgrade,
    Freeze,
}

impl std::fmt::Display for PackageOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PackageOp::Install => "install",
            PackageOp::Upgrade => "upgrade",
            PackageOp::Freeze => "freeze",
        })
    }
}

#[derive(Debug, Error)]
pub enum PyvenvError {
    #[error("Cannot --upgrade and --clear at the same time.")]
    ConflictingOptions,

    #[error("No command given to run.")]
    EmptyCommand,

    #[error("{op} {packages} failed with exit code {code}.")]
    PackageOperation {
        op: PackageOp,
        packages: String,
        code: i32,
    },

    #[error("Installing {name} failed with exit code {code}.")]
    BootstrapFailed { name: String, code: i32 },

    #[error("Virtual environment not found at {}", .0.display())]
    EnvironmentMissing(PathBuf),

    #[error("Shell not found. Set {0} to the shell to spawn.")]
    ShellNotFound(&'static str),

    #[error("Could not determine cache directory: {0}")]
    CacheDirUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_operation_message_names_packages() {
        let err = PyvenvError::PackageOperation {
            op: PackageOp::Install,
            packages: "requests,Flask".to_string(),
            code: 1,
        };
        assert_eq!(
            err.to_string(),
            "install requests,Flask failed with exit code 1."
        );
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = PyvenvError::ConflictingOptions.into();
        assert!(matches!(
            err.downcast_ref::<PyvenvError>(),
            Some(PyvenvError::ConflictingOptions)
        ));
    }
}

//! Platform cache root for virtual environments.
//!
//! - Windows: `{LocalAppData}/{namespace}/Cache`
//! - macOS: `~/Library/Caches/{namespace}`
//! - elsewhere: `${XDG_CACHE_HOME:-~/.cache}/{namespace}`
//!
//! Resolution never creates directories. [`CacheInputs`] captures everything
//! the answer depends on so the resolution itself is a pure function.

use crate::config::env_keys::cache as cache_keys;
use crate::config::CacheConfig;
use crate::error::PyvenvError;
use crate::platform::Platform;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Namespace under the user cache directory.
pub const APP_NAMESPACE: &str = "pyvenv/.virtualenv";

/// Inputs the cache root depends on, captured from the running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInputs {
    pub platform: Platform,
    pub home: Option<PathBuf>,
    pub xdg_cache_home: Option<PathBuf>,
    /// Windows local application data folder.
    pub local_app_data: Option<PathBuf>,
}

impl CacheInputs {
    pub fn from_process() -> Self {
        let platform = Platform::current();
        let local_app_data = match platform {
            Platform::Windows => windows_local_app_data(),
            _ => None,
        };
        Self {
            platform,
            home: dirs::home_dir(),
            xdg_cache_home: std::env::var_os(cache_keys::XDG_CACHE_HOME)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            local_app_data,
        }
    }
}

/// Resolve the cache root for `namespace` from explicit inputs.
pub fn resolve_cache_root(namespace: &str, inputs: &CacheInputs) -> Result<PathBuf> {
    let root = match inputs.platform {
        Platform::Windows => {
            let base = inputs.local_app_data.as_deref().ok_or_else(|| {
                PyvenvError::CacheDirUnavailable("local application data folder is unknown".into())
            })?;
            base.join(namespace_path(namespace)).join("Cache")
        }
        Platform::MacOs => home(inputs)?
            .join("Library")
            .join("Caches")
            .join(namespace_path(namespace)),
        Platform::Unix => {
            let base = match inputs.xdg_cache_home {
                Some(ref xdg) => xdg.clone(),
                None => home(inputs)?.join(".cache"),
            };
            base.join(namespace_path(namespace))
        }
    };
    Ok(root)
}

/// Cache root for this process. `PYVENV_CACHE_DIR` wins when set.
pub fn locate_cache_root(namespace: &str) -> Result<PathBuf> {
    if let Some(dir) = CacheConfig::cache_dir() {
        tracing::debug!(dir = %dir.display(), "cache root overridden");
        return Ok(dir);
    }
    let inputs = CacheInputs::from_process();
    let root = resolve_cache_root(namespace, &inputs)?;
    tracing::debug!(root = %root.display(), platform = ?inputs.platform, "resolved cache root");
    Ok(root)
}

fn home(inputs: &CacheInputs) -> Result<&Path> {
    inputs.home.as_deref().ok_or_else(|| {
        PyvenvError::CacheDirUnavailable(format!(
            "home directory is unknown; set {} or {}",
            cache_keys::PYVENV_CACHE_DIR,
            cache_keys::XDG_CACHE_HOME
        ))
        .into()
    })
}

/// `a/b` namespaces are joined segment-wise so the separator matches the host.
fn namespace_path(namespace: &str) -> PathBuf {
    namespace.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(target_os = "windows")]
fn windows_local_app_data() -> Option<PathBuf> {
    dirs::data_local_dir().or_else(local_app_data_from_registry)
}

#[cfg(not(target_os = "windows"))]
fn windows_local_app_data() -> Option<PathBuf> {
    None
}

/// Fallback when the known-folder API yields nothing: read the shell folder from the registry.
#[cfg(target_os = "windows")]
fn local_app_data_from_registry() -> Option<PathBuf> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use windows_sys::Win32::Foundation::ERROR_SUCCESS;
    use windows_sys::Win32::System::Registry::{RegGetValueW, HKEY_CURRENT_USER, RRF_RT_REG_SZ};

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    let subkey = wide(r"Software\Microsoft\Windows\CurrentVersion\Explorer\Shell Folders");
    let value = wide("Local AppData");
    let mut buf = vec![0u16; 1024];
    let mut size = (buf.len() * std::mem::size_of::<u16>()) as u32;
    #[allow(unsafe_code)]
    let rc = unsafe {
        RegGetValueW(
            HKEY_CURRENT_USER,
            subkey.as_ptr(),
            value.as_ptr(),
            RRF_RT_REG_SZ,
            std::ptr::null_mut(),
            buf.as_mut_ptr().cast(),
            &mut size,
        )
    };
    if rc != ERROR_SUCCESS {
        tracing::warn!(code = rc, "registry lookup for Local AppData failed");
        return None;
    }
    // size is in bytes and includes the trailing NUL
    let len = (size as usize / std::mem::size_of::<u16>()).saturating_sub(1);
    Some(PathBuf::from(OsString::from_wide(&buf[..len])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(platform: Platform) -> CacheInputs {
        CacheInputs {
            platform,
            home: Some(PathBuf::from("/home/alice")),
            xdg_cache_home: None,
            local_app_data: None,
        }
    }

    #[test]
    fn test_unix_defaults_to_dot_cache() {
        let root = resolve_cache_root(APP_NAMESPACE, &inputs(Platform::Unix)).unwrap();
        assert_eq!(root, PathBuf::from("/home/alice/.cache/pyvenv/.virtualenv"));
    }

    #[test]
    fn test_unix_honours_xdg_cache_home() {
        let mut i = inputs(Platform::Unix);
        i.xdg_cache_home = Some(PathBuf::from("/var/cache/alice"));
        let root = resolve_cache_root(APP_NAMESPACE, &i).unwrap();
        assert_eq!(root, PathBuf::from("/var/cache/alice/pyvenv/.virtualenv"));
    }

    #[test]
    fn test_macos_library_caches() {
        let root = resolve_cache_root("demo", &inputs(Platform::MacOs)).unwrap();
        assert_eq!(root, PathBuf::from("/home/alice/Library/Caches/demo"));
    }

    #[test]
    fn test_windows_appends_cache_segment() {
        let mut i = inputs(Platform::Windows);
        i.local_app_data = Some(PathBuf::from("LocalAppData"));
        let root = resolve_cache_root("demo", &i).unwrap();
        assert_eq!(root, PathBuf::from("LocalAppData").join("demo").join("Cache"));
    }

    #[test]
    fn test_missing_facilities_are_errors() {
        let mut i = inputs(Platform::Unix);
        i.home = None;
        let err = resolve_cache_root(APP_NAMESPACE, &i).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PyvenvError>(),
            Some(PyvenvError::CacheDirUnavailable(_))
        ));
        assert!(resolve_cache_root(APP_NAMESPACE, &inputs(Platform::Windows)).is_err());
    }

    #[test]
    fn test_resolution_is_pure() {
        let i = inputs(Platform::Unix);
        assert_eq!(
            resolve_cache_root(APP_NAMESPACE, &i).unwrap(),
            resolve_cache_root(APP_NAMESPACE, &i).unwrap()
        );
    }

    #[test]
    fn test_resolution_does_not_create_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let mut i = inputs(Platform::Unix);
        i.xdg_cache_home = Some(tmp.path().to_path_buf());
        let root = resolve_cache_root(APP_NAMESPACE, &i).unwrap();
        assert!(!root.exists());
    }
}

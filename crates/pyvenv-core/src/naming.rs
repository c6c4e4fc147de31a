//! Deterministic environment names derived from the working directory.
//!
//! The name is `{base}-{token}`: `base` is the last path segment and `token`
//! is 8 URL-safe base64 characters of a SHA-256 over a sanitized, truncated
//! copy of the full path.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::OnceLock;

/// Characters replaced by `_` before hashing.
const UNSAFE_CHARS: &str = r#"[ $`!*@"\\\r\n\t]"#;
/// Only this many characters of the sanitized path feed the hash.
const SANITIZED_MAX_CHARS: usize = 42;
const DIGEST_BYTES: usize = 6;
const TOKEN_CHARS: usize = 8;
/// Cap on the readable prefix so the full name stays well under NAME_MAX.
const BASE_NAME_MAX_CHARS: usize = 64;
/// Prefix used when the path has no final segment (`/`, `C:\`, empty).
const ROOT_BASE_NAME: &str = "root";

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(UNSAFE_CHARS).expect("static pattern is valid"))
}

/// Replace shell-hostile characters with `_` and keep the first 42 characters.
pub fn sanitize_path(location: &str) -> String {
    unsafe_chars()
        .replace_all(location, "_")
        .chars()
        .take(SANITIZED_MAX_CHARS)
        .collect()
}

/// Hash token for an already sanitized path.
pub fn path_token(sanitized: &str) -> String {
    let digest = Sha256::digest(sanitized.as_bytes());
    let encoded = URL_SAFE.encode(&digest[..DIGEST_BYTES]);
    encoded.chars().take(TOKEN_CHARS).collect()
}

/// Readable prefix: last path segment, taken before sanitization.
pub fn base_name(working_dir: &Path) -> String {
    let name = working_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| ROOT_BASE_NAME.to_string());
    name.chars().take(BASE_NAME_MAX_CHARS).collect()
}

/// Environment name for `working_dir`. Pure function of the path string.
pub fn derive_name(working_dir: &Path) -> String {
    let location = working_dir.to_string_lossy();
    let token = path_token(&sanitize_path(&location));
    format!("{}-{}", base_name(working_dir), token)
}

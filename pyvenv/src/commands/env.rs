//! Environment management commands: create, remove, info and clean.
//!
//! Environments live in the per-user cache root (`~/.cache/pyvenv/.virtualenv`
//! or `$PYVENV_CACHE_DIR`). Each subdirectory is one fingerprinted environment.

use anyhow::{Context, Result};
use pyvenv_core::config::BootstrapConfig;
use pyvenv_core::EnvLocation;
use pyvenv_env::{remove_environment, BuildOptions, EnvBuilder, EnvLayout};
use serde::Serialize;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Create the environment for `location`.
pub fn cmd_create(location: &EnvLocation, options: &BuildOptions) -> Result<()> {
    fs::create_dir_all(&location.cache_root).with_context(|| {
        format!(
            "Failed to create cache directory {}",
            location.cache_root.display()
        )
    })?;
    eprintln!("Create virtual environment: {}", location.root.display());
    let builder = EnvBuilder::standard(options, &BootstrapConfig::from_env())?;
    builder.build(&location.root, options)?;
    Ok(())
}

/// `pyvenv --rm`
pub fn cmd_remove(location: &EnvLocation) -> Result<i32> {
    remove_environment(&location.root)
}

#[derive(Debug, Serialize)]
struct EnvInfo {
    name: String,
    location: PathBuf,
    exists: bool,
    python: PathBuf,
    cache_root: PathBuf,
}

impl EnvInfo {
    fn new(location: &EnvLocation) -> Self {
        Self {
            name: location.name.clone(),
            location: location.root.clone(),
            exists: location.exists(),
            python: EnvLayout::for_host(&location.root).python(),
            cache_root: location.cache_root.clone(),
        }
    }
}

/// `pyvenv info`
pub fn cmd_info(location: &EnvLocation, json: bool) -> Result<i32> {
    let info = EnvInfo::new(location);
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(0);
    }
    println!("Name:       {}", info.name);
    println!("Location:   {}", info.location.display());
    println!("Exists:     {}", if info.exists { "yes" } else { "no" });
    println!("Python:     {}", info.python.display());
    println!("Cache root: {}", info.cache_root.display());
    Ok(0)
}

/// `pyvenv clean`
pub fn cmd_clean(cache_dir: &Path, dry_run: bool, force: bool) -> Result<i32> {
    let stdin = std::io::stdin();
    clean_cache(cache_dir, dry_run, force, &mut stdin.lock())?;
    Ok(0)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct CleanReport {
    found: usize,
    removed: usize,
    errors: usize,
}

fn clean_cache(
    cache_dir: &Path,
    dry_run: bool,
    force: bool,
    input: &mut dyn BufRead,
) -> Result<CleanReport> {
    let mut report = CleanReport::default();
    if !cache_dir.exists() {
        eprintln!("No virtual environments found at {}", cache_dir.display());
        return Ok(report);
    }

    let mut entries: Vec<(PathBuf, u64)> = Vec::new();
    let mut total_size: u64 = 0;
    for entry in fs::read_dir(cache_dir)
        .with_context(|| format!("Failed to read {}", cache_dir.display()))?
        .flatten()
    {
        let path = entry.path();
        if path.is_dir() {
            let size = dir_size(&path);
            total_size += size;
            entries.push((path, size));
        }
    }
    entries.sort_by_key(|e| e.0.file_name().unwrap_or_default().to_os_string());
    report.found = entries.len();

    if entries.is_empty() {
        eprintln!("No virtual environments found at {}", cache_dir.display());
        return Ok(report);
    }

    eprintln!(
        "Virtual environments ({}) in {}:",
        entries.len(),
        cache_dir.display()
    );
    eprintln!();
    for (path, size) in &entries {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        eprintln!("  • {} ({})", name, format_size(*size));
    }
    eprintln!();
    eprintln!("Total: {} ({} environments)", format_size(total_size), entries.len());

    if dry_run {
        eprintln!();
        eprintln!("(Dry run, nothing removed.)");
        return Ok(report);
    }

    if !force {
        eprint!("\nRemove all virtual environments? [y/N] ");
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            eprintln!("Cancelled.");
            return Ok(report);
        }
    }

    for (path, _) in &entries {
        match fs::remove_dir_all(path) {
            Ok(()) => report.removed += 1,
            Err(e) => {
                let name = path.file_name().unwrap_or_default().to_string_lossy();
                eprintln!("  ✗ Failed to remove {}: {}", name, e);
                tracing::warn!(path = %path.display(), error = %e, "failed to remove environment");
                report.errors += 1;
            }
        }
    }

    eprintln!();
    if report.errors == 0 {
        eprintln!(
            "✓ Removed {} virtual environment(s), freed {}",
            report.removed,
            format_size(total_size)
        );
    } else {
        eprintln!(
            "⚠ Removed {}/{} environments ({} errors)",
            report.removed, report.found, report.errors
        );
    }
    Ok(report)
}

/// Total size of a directory tree. Symlinks are not followed.
fn dir_size(path: &Path) -> u64 {
    let mut total: u64 = 0;
    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                total += dir_size(&entry.path());
            } else if let Ok(meta) = entry.metadata() {
                total += meta.len();
            }
        }
    }
    total
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn populate(cache: &Path) {
        for name in ["demo-YoWklPo4", "root-il7asoJj"] {
            let bin = cache.join(name).join("bin");
            fs::create_dir_all(&bin).unwrap();
            fs::write(bin.join("python"), vec![0u8; 2048]).unwrap();
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_dir_size_is_recursive() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("a/one"), [0u8; 10]).unwrap();
        fs::write(tmp.path().join("a/b/two"), [0u8; 20]).unwrap();
        assert_eq!(dir_size(tmp.path()), 30);
    }

    #[test]
    fn test_clean_missing_cache_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let report =
            clean_cache(&tmp.path().join("absent"), false, true, &mut Cursor::new("")).unwrap();
        assert_eq!(report, CleanReport::default());
    }

    #[test]
    fn test_clean_dry_run_keeps_everything() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path());
        let report = clean_cache(tmp.path(), true, false, &mut Cursor::new("")).unwrap();
        assert_eq!(report.found, 2);
        assert_eq!(report.removed, 0);
        assert!(tmp.path().join("demo-YoWklPo4").exists());
    }

    #[test]
    fn test_clean_declined_confirmation() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path());
        let report = clean_cache(tmp.path(), false, false, &mut Cursor::new("n\n")).unwrap();
        assert_eq!(report.removed, 0);
        assert!(tmp.path().join("root-il7asoJj").exists());
    }

    #[test]
    fn test_clean_confirmed_removes_all() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path());
        fs::write(tmp.path().join("stray-file"), b"x").unwrap();
        let report = clean_cache(tmp.path(), false, false, &mut Cursor::new("yes\n")).unwrap();
        assert_eq!(report, CleanReport { found: 2, removed: 2, errors: 0 });
        assert!(!tmp.path().join("demo-YoWklPo4").exists());
        assert!(tmp.path().join("stray-file").exists());
    }

    #[test]
    fn test_clean_force_skips_prompt() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path());
        let report = clean_cache(tmp.path(), false, true, &mut Cursor::new("")).unwrap();
        assert_eq!(report.removed, 2);
    }

    #[test]
    fn test_info_reflects_location() {
        let tmp = tempfile::tempdir().unwrap();
        let location = EnvLocation::new(Path::new("/home/user/projects/demo"), tmp.path());
        let info = EnvInfo::new(&location);
        assert_eq!(info.name, "demo-YoWklPo4");
        assert!(!info.exists);
        assert!(info.python.starts_with(&location.root));

        let json: serde_json::Value = serde_json::to_value(&info).unwrap();
        assert_eq!(json["name"], "demo-YoWklPo4");
        assert_eq!(json["exists"], false);
    }

    #[test]
    fn test_remove_missing_environment_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let location = EnvLocation::new(Path::new("/srv/app"), tmp.path());
        assert_eq!(cmd_remove(&location).unwrap(), 0);
        fs::create_dir_all(&location.root).unwrap();
        assert_eq!(cmd_remove(&location).unwrap(), 0);
        assert!(!location.exists());
    }
}

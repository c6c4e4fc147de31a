//! Download-and-run installers for pip and setuptools.

use crate::builder::{EnvContext, PostSetup};
use crate::process::{exit_code, run_streaming};
use crate::progress::{Milestone, ProgressSink};
use anyhow::{Context, Result};
use pyvenv_core::config::BootstrapConfig;
use pyvenv_core::PyvenvError;
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Puts the bytes behind `url` at `dest`.
pub trait ScriptFetcher: Send + Sync {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Blocking HTTP download.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(10))
                .timeout_read(Duration::from_secs(60))
                .build(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::debug!(url, dest = %dest.display(), "downloading bootstrap script");
        let response = self.agent.get(url).call().map_err(|e| match &e {
            ureq::Error::Status(code, _) => anyhow::anyhow!("Download of {} returned HTTP {}", url, code),
            ureq::Error::Transport(_) => anyhow::anyhow!("Cannot reach {} : {}", url, e),
        })?;
        let mut file = fs::File::create(dest)
            .with_context(|| format!("Failed to create {}", dest.display()))?;
        io::copy(&mut response.into_reader(), &mut file)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        Ok(())
    }
}

/// File name of the script: last segment of the URL path.
pub fn script_file_name(url: &str) -> Result<String> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let path = without_fragment.split('?').next().unwrap_or(without_fragment);
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    match path.split_once('/') {
        Some((_, p)) => p
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(String::from)
            .with_context(|| format!("URL has no file name: {}", url)),
        None => anyhow::bail!("URL has no file name: {}", url),
    }
}

/// Removes the downloaded script however `install_script` exits.
struct RemoveOnDrop<'a>(&'a Path);

impl Drop for RemoveOnDrop<'_> {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(self.0) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.0.display(), error = %e, "failed to remove bootstrap script");
            }
        }
    }
}

/// Download `url` into the environment's bin dir, run it with the
/// environment's interpreter and stream its output to `sink`.
///
/// The script is deleted afterwards whether or not it succeeded. A non-zero
/// exit is reported as `BootstrapFailed`.
pub fn install_script(
    ctx: &EnvContext,
    name: &str,
    url: &str,
    fetcher: &dyn ScriptFetcher,
    sink: &dyn ProgressSink,
) -> Result<()> {
    let bin_dir = ctx.layout().bin_dir();
    let file_name = script_file_name(url)?;
    let script = bin_dir.join(&file_name);
    let _cleanup = RemoveOnDrop(&script);

    fetcher.fetch(url, &script)?;
    sink.milestone(&Milestone::Installing(name.to_string()));

    let mut cmd = Command::new(ctx.layout().python());
    cmd.arg(&file_name).current_dir(&bin_dir).envs(ctx.child_env());
    let status = run_streaming(&mut cmd, sink)?;
    sink.milestone(&Milestone::Done);

    let code = exit_code(status);
    tracing::info!(name, code, "bootstrap script finished");
    if code != 0 {
        anyhow::bail!(PyvenvError::BootstrapFailed {
            name: name.to_string(),
            code,
        });
    }
    Ok(())
}

/// Delete `{name}-*.tar.gz` leftovers from `dir`. Returns how many were removed.
pub fn remove_archives(dir: &Path, name: &str) -> Result<usize> {
    let prefix = format!("{}-", name);
    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        if file_name.starts_with(&prefix) && file_name.ends_with(".tar.gz") {
            fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove {}", entry.path().display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Default post-setup: setuptools first, then pip, each only when requested.
pub struct BootstrapPostSetup {
    pub with_setuptools: bool,
    pub with_pip: bool,
    pub urls: BootstrapConfig,
    pub fetcher: Box<dyn ScriptFetcher>,
}

impl BootstrapPostSetup {
    pub fn new(with_setuptools: bool, with_pip: bool, urls: BootstrapConfig) -> Self {
        Self {
            with_setuptools,
            with_pip,
            urls,
            fetcher: Box::new(HttpFetcher::new()),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Box<dyn ScriptFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }
}

impl PostSetup for BootstrapPostSetup {
    fn post_setup(&self, ctx: &EnvContext, sink: &dyn ProgressSink) -> Result<()> {
        if self.with_setuptools {
            let result = install_script(
                ctx,
                "setuptools",
                &self.urls.setuptools_url,
                self.fetcher.as_ref(),
                sink,
            );
            remove_archives(&ctx.layout().bin_dir(), "setuptools")?;
            result?;
        }
        if self.with_pip {
            install_script(ctx, "pip", &self.urls.pip_url, self.fetcher.as_ref(), sink)?;
        }
        Ok(())
    }
}

//! `install`, `upgrade`, `list` and `uninstall`: pip proxies.

use anyhow::{Context, Result};
use pyvenv_env::ProxyContext;

/// `pyvenv install <args...>`
pub fn cmd_install(proxy: &ProxyContext, args: &[String]) -> Result<i32> {
    proxy.install(args)?;
    Ok(0)
}

/// `pyvenv upgrade [args...]`. Without packages, upgrades everything installed.
pub fn cmd_upgrade(proxy: &ProxyContext, args: &[String]) -> Result<i32> {
    proxy.upgrade(args)?;
    Ok(0)
}

/// `pyvenv list [-r]`. With `-r` the listing also lands in ./requirements.txt.
pub fn cmd_list(proxy: &ProxyContext, requirement: bool) -> Result<i32> {
    if requirement {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        proxy.list(Some(cwd.as_path()))?;
    } else {
        proxy.list(None)?;
    }
    Ok(0)
}

/// `pyvenv uninstall [args...]`. pip's exit code is passed through.
pub fn cmd_uninstall(proxy: &ProxyContext, args: &[String]) -> Result<i32> {
    proxy.uninstall(args)
}

//! `run` and `shell`.

use anyhow::Result;
use pyvenv_env::ProxyContext;

/// `pyvenv run <command...>`
pub fn cmd_run(proxy: &ProxyContext, args: &[String]) -> Result<i32> {
    tracing::debug!(program = %args.first().map(String::as_str).unwrap_or_default(), "running in environment");
    proxy.run(args)
}

/// `pyvenv shell`. Refuses to nest inside another pyvenv shell.
pub fn cmd_shell(proxy: &ProxyContext) -> Result<i32> {
    proxy.shell()
}

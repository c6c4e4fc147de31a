//! Command routing.
//!
//! Every invocation resolves the environment for the current directory first.
//! Proxy commands create it on demand; `--rm`, `info` and `clean` never do.

pub mod env;
pub mod exec;
pub mod package;

use crate::cli::{Cli, Commands};
use anyhow::Result;
use pyvenv_core::EnvLocation;
use pyvenv_env::ProxyContext;

/// Run the parsed command line and return the process exit code.
pub fn dispatch(cli: Cli) -> Result<i32> {
    // --clear with --upgrade is rejected before any filesystem access
    cli.create.build_options(None).validate()?;

    let location = EnvLocation::for_current_dir()?;
    tracing::debug!(name = %location.name, root = %location.root.display(), "resolved environment");

    if cli.remove {
        return env::cmd_remove(&location);
    }

    match cli.command {
        Some(Commands::Info { json }) => env::cmd_info(&location, json),
        Some(Commands::Clean { dry_run, force }) => {
            env::cmd_clean(&location.cache_root, dry_run, force)
        }
        command => {
            if !location.exists() {
                let options = cli.create.build_options(Some(location.name.clone()));
                env::cmd_create(&location, &options)?;
            }
            let proxy = ProxyContext::from_location(&location);
            match command {
                None => {
                    eprintln!("Virtual environment: {}", location.root.display());
                    Ok(0)
                }
                Some(Commands::Install { args }) => package::cmd_install(&proxy, &args),
                Some(Commands::Upgrade { args }) => package::cmd_upgrade(&proxy, &args),
                Some(Commands::List { requirement }) => package::cmd_list(&proxy, requirement),
                Some(Commands::Uninstall { args }) => package::cmd_uninstall(&proxy, &args),
                Some(Commands::Run { args }) => exec::cmd_run(&proxy, &args),
                Some(Commands::Shell) => exec::cmd_shell(&proxy),
                Some(Commands::Info { .. }) | Some(Commands::Clean { .. }) => Ok(0),
            }
        }
    }
}

//! Run pip, arbitrary commands and an interactive shell inside an environment.
//!
//! [`ProxyContext`] is an immutable snapshot: the environment layout, its
//! fingerprint, and the base process environment. Every launch builds its
//! variable map from that snapshot and hands it to the child explicitly.

use crate::layout::{EnvLayout, INTERPRETER, PACKAGE_MANAGER};
use crate::process::exit_code;
use anyhow::{Context, Result};
use pyvenv_core::config::env_keys::child;
use pyvenv_core::error::PackageOp;
use pyvenv_core::{EnvLocation, Platform, PyvenvError};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Program, arguments and the complete environment for one child process.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub env: BTreeMap<OsString, OsString>,
}

impl Invocation {
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).env_clear().envs(&self.env);
        cmd
    }

    /// Run with inherited stdio and return the child's exit code.
    pub fn status(&self) -> Result<i32> {
        tracing::debug!(program = ?self.program, args = ?self.args, "launching");
        let status = self
            .command()
            .status()
            .with_context(|| format!("Failed to launch {}", self.program.to_string_lossy()))?;
        Ok(exit_code(status))
    }

    pub fn output(&self) -> Result<Output> {
        tracing::debug!(program = ?self.program, args = ?self.args, "launching with captured output");
        self.command()
            .output()
            .with_context(|| format!("Failed to launch {}", self.program.to_string_lossy()))
    }
}

/// What `shell` would do.
#[derive(Debug, Clone)]
pub enum ShellPlan {
    /// Already inside a pyvenv shell; refuse.
    Nested,
    Spawn(Invocation),
}

/// Split arguments into flags (leading `-`) and package specifiers, keeping order within each.
pub fn partition_args(args: &[String]) -> (Vec<&str>, Vec<&str>) {
    args.iter().map(String::as_str).partition(|a| a.starts_with('-'))
}

/// `pip install` arguments: `[-U] flags... packages...`.
pub fn install_args(args: &[String], upgrade: bool) -> Vec<String> {
    let (flags, packages) = partition_args(args);
    let mut out = vec!["install".to_string()];
    if upgrade {
        out.push("-U".to_string());
    }
    out.extend(flags.into_iter().chain(packages).map(String::from));
    out
}

pub fn uninstall_args(args: &[String]) -> Vec<String> {
    let (flags, packages) = partition_args(args);
    let mut out = vec!["uninstall".to_string()];
    out.extend(flags.into_iter().chain(packages).map(String::from));
    out
}

pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Write `requirements.txt` into `dir` with LF line endings.
pub fn write_requirements(dir: &Path, freeze_output: &str) -> Result<PathBuf> {
    let path = dir.join(REQUIREMENTS_FILE);
    fs::write(&path, normalize_line_endings(freeze_output))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Delete the environment at `root`. Missing environments are not an error.
pub fn remove_environment(root: &Path) -> Result<i32> {
    if root.exists() {
        fs::remove_dir_all(root)
            .with_context(|| format!("Failed to remove {}", root.display()))?;
        tracing::info!(root = %root.display(), "removed virtual environment");
        eprintln!("Remove virtual environment {}.", root.display());
    } else {
        eprintln!("Virtual environment not exists.");
    }
    Ok(0)
}

#[derive(Debug, Clone)]
pub struct ProxyContext {
    layout: EnvLayout,
    name: String,
    base_env: BTreeMap<OsString, OsString>,
}

impl ProxyContext {
    pub fn new(
        layout: EnvLayout,
        name: impl Into<String>,
        base_env: impl IntoIterator<Item = (OsString, OsString)>,
    ) -> Self {
        Self {
            layout,
            name: name.into(),
            base_env: base_env.into_iter().collect(),
        }
    }

    /// Context for `location` on this host, snapshotting the current process environment.
    pub fn from_location(location: &EnvLocation) -> Self {
        Self::new(
            EnvLayout::for_host(&location.root),
            &location.name,
            std::env::vars_os(),
        )
    }

    pub fn layout(&self) -> &EnvLayout {
        &self.layout
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Windows variable names are case-insensitive; reuse the spelling already present.
    fn key(&self, name: &str) -> OsString {
        if self.layout.platform() == Platform::Windows {
            if let Some(existing) = self
                .base_env
                .keys()
                .find(|k| k.to_string_lossy().eq_ignore_ascii_case(name))
            {
                return existing.clone();
            }
        }
        OsString::from(name)
    }

    fn base_var(&self, name: &str) -> Option<&OsString> {
        self.base_env.get(&self.key(name)).filter(|v| !v.is_empty())
    }

    /// Base environment with the bin dir prepended to `PATH` and `VIRTUAL_ENV` set.
    pub fn activated_env(&self) -> Result<BTreeMap<OsString, OsString>> {
        let mut env = self.base_env.clone();
        let path_key = self.key(child::PATH);
        let existing = env.get(&path_key).cloned().unwrap_or_default();
        let entries = std::iter::once(self.layout.bin_dir()).chain(
            std::env::split_paths(&existing).filter(|p| !p.as_os_str().is_empty()),
        );
        let path = std::env::join_paths(entries)
            .context("Environment bin directory cannot be placed on PATH")?;
        env.insert(path_key, path);
        env.insert(
            self.key(child::VIRTUAL_ENV),
            self.layout.root().as_os_str().to_os_string(),
        );
        Ok(env)
    }

    /// `{python} -m pip {pip_args}`.
    pub fn pip_invocation(&self, pip_args: Vec<String>) -> Result<Invocation> {
        let mut args: Vec<OsString> = vec!["-m".into(), PACKAGE_MANAGER.into()];
        args.extend(pip_args.into_iter().map(OsString::from));
        Ok(Invocation {
            program: self.layout.python().into_os_string(),
            args,
            env: self.activated_env()?,
        })
    }

    pub fn install(&self, args: &[String]) -> Result<()> {
        self.install_packages(args, PackageOp::Install)
    }

    pub fn upgrade(&self, args: &[String]) -> Result<()> {
        self.install_packages(args, PackageOp::Upgrade)
    }

    fn install_packages(&self, args: &[String], op: PackageOp) -> Result<()> {
        self.layout.ensure_present()?;
        let invocation = self.pip_invocation(install_args(args, op == PackageOp::Upgrade))?;
        let code = invocation.status()?;
        if code != 0 {
            let (_, packages) = partition_args(args);
            anyhow::bail!(PyvenvError::PackageOperation {
                op,
                packages: packages.join(","),
                code,
            });
        }
        Ok(())
    }

    /// `pip freeze` output, stdout followed by stderr.
    pub fn freeze(&self) -> Result<String> {
        self.layout.ensure_present()?;
        let out = self.pip_invocation(vec!["freeze".to_string()])?.output()?;
        if !out.status.success() {
            anyhow::bail!(PyvenvError::PackageOperation {
                op: PackageOp::Freeze,
                packages: "installed packages".to_string(),
                code: exit_code(out.status),
            });
        }
        let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&out.stderr));
        Ok(text)
    }

    /// Print installed packages to stderr, or write them to `requirements.txt` in `requirements_dir`.
    pub fn list(&self, requirements_dir: Option<&Path>) -> Result<()> {
        let output = self.freeze()?;
        match requirements_dir {
            Some(dir) => {
                let path = write_requirements(dir, &output)?;
                tracing::info!(path = %path.display(), "wrote requirements");
            }
            None => eprint!("{}", output),
        }
        Ok(())
    }

    /// Returns pip's exit code unchanged.
    pub fn uninstall(&self, args: &[String]) -> Result<i32> {
        self.layout.ensure_present()?;
        self.pip_invocation(uninstall_args(args))?.status()
    }

    /// Leading `python`/`pip` (with or without `.exe`) resolve to the environment's executables.
    fn resolve_program(&self, token: &str) -> OsString {
        let matches = |stem: &str| token == stem || token == format!("{}.exe", stem);
        if matches(INTERPRETER) {
            self.layout.python().into_os_string()
        } else if matches(PACKAGE_MANAGER) {
            self.layout.pip().into_os_string()
        } else {
            OsString::from(token)
        }
    }

    pub fn run_invocation(&self, args: &[String]) -> Result<Invocation> {
        let mut tokens = args.iter().filter(|a| !a.is_empty());
        let first = tokens.next().ok_or(PyvenvError::EmptyCommand)?;
        Ok(Invocation {
            program: self.resolve_program(first),
            args: tokens.map(OsString::from).collect(),
            env: self.activated_env()?,
        })
    }

    pub fn run(&self, args: &[String]) -> Result<i32> {
        self.layout.ensure_present()?;
        self.run_invocation(args)?.status()
    }

    pub fn shell_plan(&self) -> Result<ShellPlan> {
        if self.base_env.contains_key(&self.key(child::PYVENV)) {
            return Ok(ShellPlan::Nested);
        }
        let platform = self.layout.platform();
        let shell = self
            .base_var(platform.shell_var())
            .cloned()
            .ok_or(PyvenvError::ShellNotFound(platform.shell_var()))?;

        let mut env = self.activated_env()?;
        let prompt_key = self.key(platform.prompt_var());
        let inherited = self
            .base_var(platform.prompt_var())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| default_prompt(platform).to_string());
        env.insert(prompt_key, format!("({}) {}", self.name, inherited).into());
        env.insert(self.key(child::PYVENV), "1".into());

        Ok(ShellPlan::Spawn(Invocation {
            program: shell,
            args: Vec::new(),
            env,
        }))
    }

    /// Interactive shell with the environment activated. Nested shells are refused with exit code 1.
    pub fn shell(&self) -> Result<i32> {
        match self.shell_plan()? {
            ShellPlan::Nested => {
                tracing::warn!(name = %self.name, "refusing nested shell");
                eprintln!("Cannot use nested virtual environment shell.");
                Ok(1)
            }
            ShellPlan::Spawn(invocation) => {
                self.layout.ensure_present()?;
                invocation.status()
            }
        }
    }
}

fn default_prompt(platform: Platform) -> &'static str {
    match platform {
        Platform::Windows => "$P$G",
        _ => "\\u@\\h:\\w\\$ ",
    }
}

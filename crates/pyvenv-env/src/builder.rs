//! Environment builder: creation primitive + post-setup strategy + progress sink.

use crate::bootstrap::BootstrapPostSetup;
use crate::creator::{CreateOptions, EnvCreator, VenvCreator};
use crate::layout::EnvLayout;
use crate::progress::{ProgressSink, WriterSink};
use anyhow::Result;
use pyvenv_core::config::env_keys::child;
use pyvenv_core::config::BootstrapConfig;
use pyvenv_core::{Platform, PyvenvError};
use std::ffi::OsString;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub with_pip: bool,
    pub with_setuptools: bool,
    pub system_site_packages: bool,
    pub symlinks: bool,
    pub clear: bool,
    pub upgrade: bool,
    pub verbose: bool,
    pub prompt: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            with_pip: true,
            with_setuptools: true,
            system_site_packages: false,
            symlinks: Platform::current().default_symlinks(),
            clear: false,
            upgrade: false,
            verbose: false,
            prompt: None,
        }
    }
}

impl BuildOptions {
    /// `clear` and `upgrade` are mutually exclusive.
    pub fn validate(&self) -> Result<()> {
        if self.clear && self.upgrade {
            anyhow::bail!(PyvenvError::ConflictingOptions);
        }
        Ok(())
    }

    pub fn create_options(&self) -> CreateOptions {
        CreateOptions {
            system_site_packages: self.system_site_packages,
            clear: self.clear,
            symlinks: self.symlinks,
            upgrade: self.upgrade,
            prompt: self.prompt.clone(),
        }
    }
}

/// A freshly created environment plus the variables its children must see.
#[derive(Debug, Clone)]
pub struct EnvContext {
    layout: EnvLayout,
    child_env: Vec<(&'static str, OsString)>,
}

impl EnvContext {
    pub fn new(layout: EnvLayout) -> Self {
        let child_env = vec![(child::VIRTUAL_ENV, layout.root().as_os_str().to_os_string())];
        Self { layout, child_env }
    }

    pub fn layout(&self) -> &EnvLayout {
        &self.layout
    }

    /// Overlay applied on top of the inherited environment for post-setup children.
    pub fn child_env(&self) -> impl Iterator<Item = (&str, &OsString)> + '_ {
        self.child_env.iter().map(|(k, v)| (*k, v))
    }
}

/// Runs after the interpreter tree exists.
pub trait PostSetup {
    fn post_setup(&self, ctx: &EnvContext, sink: &dyn ProgressSink) -> Result<()>;
}

/// Post-setup that does nothing.
pub struct NoPostSetup;

impl PostSetup for NoPostSetup {
    fn post_setup(&self, _ctx: &EnvContext, _sink: &dyn ProgressSink) -> Result<()> {
        Ok(())
    }
}

/// Creates environments. Not safe to run twice concurrently for one path.
pub struct EnvBuilder {
    creator: Box<dyn EnvCreator>,
    post_setup: Box<dyn PostSetup>,
    sink: Box<dyn ProgressSink>,
    platform: Platform,
}

impl EnvBuilder {
    pub fn new(
        creator: Box<dyn EnvCreator>,
        post_setup: Box<dyn PostSetup>,
        sink: Box<dyn ProgressSink>,
    ) -> Self {
        Self {
            creator,
            post_setup,
            sink,
            platform: Platform::current(),
        }
    }

    /// `python -m venv` creation, pip/setuptools bootstrap over HTTP, and
    /// progress on stderr (dots unless `options.verbose`).
    pub fn standard(options: &BuildOptions, config: &BootstrapConfig) -> Result<Self> {
        Ok(Self::new(
            Box::new(VenvCreator::discover(config)?),
            Box::new(BootstrapPostSetup::new(
                options.with_setuptools,
                options.with_pip,
                config.clone(),
            )),
            Box::new(WriterSink::stderr(options.verbose)),
        ))
    }

    /// Replace the progress sink, e.g. with a [`crate::CallbackSink`].
    pub fn with_sink(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn build(&self, target: &Path, options: &BuildOptions) -> Result<EnvContext> {
        options.validate()?;
        tracing::info!(target = %target.display(), "creating virtual environment");
        self.creator.create(target, &options.create_options())?;
        let ctx = EnvContext::new(EnvLayout::new(target, self.platform));
        self.post_setup.post_setup(&ctx, self.sink.as_ref())?;
        tracing::info!(target = %target.display(), "virtual environment ready");
        Ok(ctx)
    }
}

use clap::{Args, Parser, Subcommand};
use pyvenv_core::Platform;
use pyvenv_env::BuildOptions;

/// pyvenv - a lightweight virtual environment manager
///
/// Each working directory gets its own virtual environment under the user
/// cache directory. It is created on first use; the creation flags below are
/// ignored once it exists.
#[derive(Parser, Debug)]
#[command(name = "pyvenv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub create: CreateArgs,

    /// Remove the virtual environment of the current directory
    #[arg(long = "rm")]
    pub remove: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags applied when the environment is first created.
#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// Install setuptools in the virtual environment (default)
    #[arg(long, overrides_with = "no_setuptools")]
    pub setuptools: bool,

    /// Do not install setuptools
    #[arg(long = "no-setuptools", overrides_with = "setuptools")]
    pub no_setuptools: bool,

    /// Install pip in the virtual environment (default)
    #[arg(long, overrides_with = "no_pip")]
    pub pip: bool,

    /// Do not install pip
    #[arg(long = "no-pip", overrides_with = "pip")]
    pub no_pip: bool,

    /// Give the environment access to the system site-packages
    #[arg(long = "system_site_packages", visible_alias = "system-site-packages")]
    pub system_site_packages: bool,

    /// Symlink the interpreter instead of copying it (default except on Windows)
    #[arg(long, overrides_with = "copies")]
    pub symlinks: bool,

    /// Copy the interpreter instead of symlinking it
    #[arg(long, overrides_with = "symlinks")]
    pub copies: bool,

    /// Delete the environment contents if the directory already exists
    #[arg(long)]
    pub clear: bool,

    /// Upgrade the environment to the running Python
    #[arg(long)]
    pub upgrade: bool,

    /// Display output from bootstrap installers
    #[arg(long)]
    pub verbose: bool,
}

impl CreateArgs {
    pub fn build_options(&self, prompt: Option<String>) -> BuildOptions {
        let symlinks = if self.symlinks {
            true
        } else if self.copies {
            false
        } else {
            Platform::current().default_symlinks()
        };
        BuildOptions {
            with_pip: !self.no_pip,
            with_setuptools: !self.no_setuptools,
            system_site_packages: self.system_site_packages,
            symlinks,
            clear: self.clear,
            upgrade: self.upgrade,
            verbose: self.verbose,
            prompt,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install packages in the virtual environment
    Install {
        /// Packages and pip flags (flags are passed before packages)
        #[arg(
            value_name = "ARGS",
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        args: Vec<String>,
    },

    /// Upgrade packages in the virtual environment
    Upgrade {
        #[arg(value_name = "ARGS", num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List installed packages
    List {
        /// Write the listing to requirements.txt in the current directory
        #[arg(short = 'r', long = "requirement")]
        requirement: bool,
    },

    /// Uninstall packages from the virtual environment
    Uninstall {
        #[arg(value_name = "ARGS", num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a command inside the virtual environment
    ///
    /// A leading `python` or `pip` resolves to the environment's own executable.
    Run {
        #[arg(
            value_name = "COMMAND",
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        args: Vec<String>,
    },

    /// Spawn a shell with the virtual environment activated
    Shell,

    /// Show where the virtual environment of the current directory lives
    Info {
        /// Output as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Remove every cached virtual environment
    Clean {
        /// List environments without removing anything
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(long, short = 'f', default_value = "false")]
        force: bool,
    },
}

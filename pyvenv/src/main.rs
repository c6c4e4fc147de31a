mod cli;
mod commands;
mod observability;

use clap::Parser;
use cli::Cli;

fn main() {
    observability::init_tracing();
    let cli = Cli::parse();

    let code = match commands::dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            println!("Error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

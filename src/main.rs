//! Autoconfigurator - keeps a module host in sync with its plugins directory

use clap::Parser;

mod cli;
mod commands;

use autoconfigurator::logging;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.debug),
        Commands::Status(args) => {
            logging::init(cli.debug);
            commands::status::run(args).map(|()| true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

// opsmarine_fuel - main.rs
// CLI runner: load layered config, install logging, dispatch the subcommand

use std::process::exit;

use clap::Parser;
use opsmarine_fuel::cli::{dispatch, Cli};
use opsmarine_fuel::config_loader::load_config;
use opsmarine_fuel::log_sink::init_logging;

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            exit(2);
        }
    };

    let level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level);

    if let Err(e) = dispatch(cli, config) {
        eprintln!("{e}");
        exit(1);
    }
}

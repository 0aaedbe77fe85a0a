mod app;
mod cli;
mod config;
mod effects;
mod logging;
mod render;

use clap::Parser;
use deck_logging::deck_info;

use crate::cli::Cli;
use crate::logging::LogDestination;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let destination = if cli.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    logging::initialize(destination, deck_logging::parse_level(&cli.log_level));

    let mut config = config::load_config(&cli.config)?;
    config.apply_overrides(&cli);
    deck_info!("tubedeck starting: {:?}", cli.command);

    app::run(cli.command, &config)
}

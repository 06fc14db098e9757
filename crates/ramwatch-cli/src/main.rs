mod cli;
mod commands;
mod input;
mod shutdown;

use anyhow::Result;
use clap::Parser;
use ramwatch_core::WatchConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ramwatch=info".parse()?)
                .add_directive("ramwatch_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = WatchConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Compare {
            base,
            tests,
            output,
            top,
        } => commands::compare::run(&config, &base, tests.as_slice(), output.as_deref(), top),
        Command::Hexdump {
            image,
            address,
            size,
            ascii,
        } => {
            let address = commands::hex_utils::parse_hex_address(&address)?;
            commands::hexdump::run(&image, address, size, ascii)
        }
        Command::Monitor {
            dump,
            interval,
            state_dir,
            timeline,
            verbose,
        } => commands::monitor::run(
            &config,
            commands::monitor::MonitorOptions {
                dump,
                interval_ms: interval,
                state_dir,
                timeline,
                verbose,
            },
        ),
        Command::Config { output } => commands::config::run(&config, output.as_deref()),
    }
}

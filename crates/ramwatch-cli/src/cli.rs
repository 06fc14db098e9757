use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ramwatch_core::memory::layout::timing;

#[derive(Parser)]
#[command(name = "ramwatch")]
#[command(about = "Game Boy memory watcher and discovery detector")]
#[command(version)]
pub struct Cli {
    /// Configuration file (built-in Link's Awakening DX layout if absent)
    #[arg(short, long, global = true, env = "RAMWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare RAM images against a base image
    Compare {
        /// RAM image taken before the actions
        base: PathBuf,

        /// RAM images taken after each action
        #[arg(required = true)]
        tests: Vec<PathBuf>,

        /// Also write the reports to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Addresses listed in the frequency analysis
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Hexdump a region of a RAM image
    Hexdump {
        image: PathBuf,

        /// Start address (hex, e.g. 0xDB00)
        address: String,

        /// Number of bytes
        #[arg(default_value = "256")]
        size: usize,

        /// Show the ASCII column
        #[arg(long)]
        ascii: bool,
    },

    /// Watch a RAM dump file rewritten by an emulator and report discoveries
    Monitor {
        /// RAM dump file to poll
        dump: PathBuf,

        /// Poll interval in milliseconds
        #[arg(short, long, default_value_t = timing::DUMP_POLL_INTERVAL_MS)]
        interval: u64,

        /// Directory for discovery save states (overrides the config)
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Write the discovery timeline on exit (.json, .tsv or text)
        #[arg(long)]
        timeline: Option<PathBuf>,

        /// Print non-discovery changes too
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

//! Print the effective configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ramwatch_core::WatchConfig;

pub fn run(config: &WatchConfig, output: Option<&Path>) -> Result<()> {
    let text = config.to_toml()?;

    match output {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Configuration written to: {}", path.display());
        }
        None => print!("{}", text),
    }

    Ok(())
}

//! Offline comparison of RAM images.
//!
//! Each test image is diffed against the base image over the configured
//! ranges. With several test images, a frequency analysis shows which
//! addresses change in every action (usually timers and counters).

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ramwatch_core::report::CANDIDATE_LIMIT;
use ramwatch_core::{ChangeReport, FrequencyAnalysis, MemoryImage, Snapshot, WatchConfig, diff};
use tracing::info;

/// Run the compare command
pub fn run(
    config: &WatchConfig,
    base: &Path,
    tests: &[impl AsRef<Path>],
    output: Option<&Path>,
    top: usize,
) -> Result<()> {
    let text = compare(config, base, tests, top)?;
    print!("{}", text);

    if let Some(path) = output {
        fs::write(path, &text)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Build the full report text for `tests` against `base`
pub fn compare(
    config: &WatchConfig,
    base: &Path,
    tests: &[impl AsRef<Path>],
    top: usize,
) -> Result<String> {
    let ranges = config.ranges()?;
    let policy = config.policy()?;

    let base_image = MemoryImage::load(base)
        .with_context(|| format!("Failed to load base image {}", base.display()))?;
    let before = Snapshot::capture(&base_image, &ranges, 0);

    let mut out = String::new();
    let mut frequency = FrequencyAnalysis::new();

    for test in tests {
        let test = test.as_ref();
        let image = MemoryImage::load(test)
            .with_context(|| format!("Failed to load test image {}", test.display()))?;
        let after = Snapshot::capture(&image, &ranges, 0);
        let deltas = diff(&before, &after);

        let name = test
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| test.display().to_string());

        let report = ChangeReport::new(&deltas, &ranges, &policy)
            .with_title(&name)
            .with_limits(config.output.per_range_limit, CANDIDATE_LIMIT);
        out.push_str(&report.render());
        out.push('\n');

        let kept: Vec<_> = deltas
            .iter()
            .filter(|d| !policy.ignore_set().contains(d.address()))
            .copied()
            .collect();
        frequency.add(&name, &kept);
    }

    if frequency.actions() > 1 {
        let _ = writeln!(out, "=== Frequency analysis ({} actions) ===", frequency.actions());
        out.push_str(&frequency.render(top));
    }

    Ok(out)
}

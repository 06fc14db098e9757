//! Live discovery monitor over a RAM dump file.
//!
//! Polls the dump, diffs each poll against the previous one and reports
//! discoveries on the console. Every discovery also saves the dump as a
//! state file.

mod driver;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ramwatch_core::report::{ExportFormat, TextFormat, TsvFormat, write_timeline};
use ramwatch_core::{
    ConsoleReporter, ObservationSession, StateSnapshotPersister, WatchConfig, format_address,
};
use tracing::{info, warn};

use crate::input::{self, KeyCommand, PendingCommands};
use crate::shutdown::ShutdownSignal;

use driver::DumpFileDriver;

pub struct MonitorOptions {
    pub dump: PathBuf,
    pub interval_ms: u64,
    pub state_dir: Option<PathBuf>,
    pub timeline: Option<PathBuf>,
    pub verbose: bool,
}

struct Monitor {
    session: ObservationSession<DumpFileDriver>,
    console: ConsoleReporter,
    persister: StateSnapshotPersister,
}

impl Monitor {
    fn new(
        driver: DumpFileDriver,
        config: &WatchConfig,
        state_dir: &Path,
        verbose: bool,
    ) -> Result<Self> {
        let ranges = config.ranges()?;
        let mut session =
            ObservationSession::with_config(driver, config.policy()?, config.session.clone());
        session.establish_baseline(&ranges);

        Ok(Self {
            session,
            console: ConsoleReporter::new().verbose(verbose),
            persister: StateSnapshotPersister::new(state_dir),
        })
    }

    /// One poll against the rolling baseline; returns the new discoveries
    fn poll(&mut self) -> Result<usize> {
        match self
            .session
            .observe(1, &mut [&mut self.console, &mut self.persister])
        {
            Ok(events) => Ok(events.iter().filter(|e| e.is_discovery()).count()),
            Err(e) if e.is_driver_failure() => {
                warn!("Poll skipped: {}", e);
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn apply(&mut self, pending: &PendingCommands) -> Result<()> {
        if pending.take(KeyCommand::ResetBaseline) {
            self.session.rebaseline()?;
            println!("Baseline reset (frame {})", self.session.frame());
        }

        if pending.take(KeyCommand::ShowValues) {
            let values = self.session.non_zero();
            println!("{} non-zero values:", values.len());
            for (address, value) in values {
                println!("  {}: {}", format_address(address), value);
            }
        }

        if pending.take(KeyCommand::SaveNow) {
            let name = format!("manual_{:06}", self.session.frame());
            if let Err(e) = self.persister.save_named(self.session.emulator_mut(), &name) {
                warn!("Failed to save state: {}", e);
            }
        }

        Ok(())
    }

    fn timeline(&self) -> String {
        TextFormat.format_records(self.session.ledger().all())
    }

    fn write_timeline(&self, path: &Path) -> Result<()> {
        let records = self.session.ledger().all();
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsv") => write_timeline(path, &TsvFormat, records)?,
            _ => write_timeline(path, &TextFormat, records)?,
        }
        info!("Timeline written to {}", path.display());
        Ok(())
    }
}

/// Run the monitor until Ctrl+C, Esc or q
pub fn run(config: &WatchConfig, options: MonitorOptions) -> Result<()> {
    // Setup graceful shutdown handler
    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.trigger();
    })?;

    let pending = Arc::new(PendingCommands::default());
    let _keyboard_handle =
        input::spawn_keyboard_monitor(Arc::clone(&shutdown), Arc::clone(&pending));

    let driver = DumpFileDriver::open(
        &options.dump,
        Duration::from_millis(options.interval_ms),
        Arc::clone(&shutdown),
    )
    .with_context(|| format!("Failed to open RAM dump {}", options.dump.display()))?;

    let state_dir = options
        .state_dir
        .unwrap_or_else(|| config.output.state_dir.clone());
    let mut monitor = Monitor::new(driver, config, &state_dir, options.verbose)?;

    println!(
        "Watching {} every {} ms (r: reset baseline, f: show values, s: save state, q/Esc: quit)",
        options.dump.display(),
        options.interval_ms
    );

    while !shutdown.is_shutdown() {
        monitor.apply(&pending)?;
        monitor.poll()?;
    }

    let discovered = monitor.session.ledger().len();
    println!();
    println!("=== Discovery timeline ({} discoveries) ===", discovered);
    print!("{}", monitor.timeline());
    if monitor.persister.failures() > 0 {
        warn!("{} state saves failed", monitor.persister.failures());
    }

    if let Some(path) = &options.timeline {
        monitor.write_timeline(path)?;
    }

    Ok(())
}

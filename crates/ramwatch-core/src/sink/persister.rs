use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use super::{DiscoveryEvent, EventSink};
use crate::emulator::Emulator;
use crate::error::Result;

/// Saves a full machine state for every discovery.
///
/// Files are named `disc_<seq>_<addr>_<category>_<HHMMSS>.state`. A failed
/// capture or write is logged and counted, never propagated.
pub struct StateSnapshotPersister {
    base_dir: PathBuf,
    sequence: u64,
    saved: Vec<PathBuf>,
    failures: usize,
}

impl StateSnapshotPersister {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            sequence: 0,
            saved: Vec::new(),
            failures: 0,
        }
    }

    fn file_name(&self, event: &DiscoveryEvent, now: DateTime<Local>) -> String {
        let category: &'static str = event.category().map(Into::into).unwrap_or("ignored");
        format!(
            "disc_{:04}_{:04X}_{}_{}.state",
            self.sequence,
            event.delta.address(),
            category,
            now.format("%H%M%S")
        )
    }

    /// Capture the machine and write it as `<name>.state`
    pub fn save_named(&mut self, machine: &mut dyn Emulator, name: &str) -> Result<PathBuf> {
        let path = self.base_dir.join(format!("{}.state", name));
        self.write_state(machine, &path)?;
        Ok(path)
    }

    fn write_state(&mut self, machine: &mut dyn Emulator, path: &Path) -> Result<()> {
        let state = machine.capture_full_state()?;
        fs::create_dir_all(&self.base_dir)?;
        fs::write(path, state)?;
        info!("Saved state: {}", path.display());
        self.saved.push(path.to_path_buf());
        Ok(())
    }

    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl EventSink for StateSnapshotPersister {
    fn handle(&mut self, event: &DiscoveryEvent, machine: &mut dyn Emulator) {
        if !event.is_discovery() {
            return;
        }

        self.sequence += 1;
        let path = self.base_dir.join(self.file_name(event, Local::now()));
        if let Err(e) = self.write_state(machine, &path) {
            self.failures += 1;
            warn!("Failed to save state for {}: {}", event.delta, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use crate::emulator::mock::ScriptedEmulator;
    use crate::memory::ReadMemory;
    use crate::sink::test_support::event;
    use crate::snapshot::Delta;
    use chrono::TimeZone;

    #[test]
    fn test_file_name() {
        let persister = StateSnapshotPersister::new("states");
        let e = event(Delta::new(0xDB02, 0, 1), Category::ItemFlag, true);
        let now = Local.with_ymd_and_hms(2026, 1, 2, 13, 4, 5).unwrap();

        assert_eq!(
            persister.file_name(&e, now),
            "disc_0000_DB02_item_flag_130405.state"
        );
    }

    #[test]
    fn test_saves_state_on_discovery_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut persister = StateSnapshotPersister::new(dir.path().join("states"));
        let mut emulator = ScriptedEmulator::new();
        emulator.set(0xDB02, 1);

        persister.handle(
            &event(Delta::new(0xDB03, 1, 0), Category::ItemFlag, false),
            &mut emulator,
        );
        assert!(persister.saved().is_empty());

        persister.handle(
            &event(Delta::new(0xDB02, 0, 1), Category::ItemFlag, true),
            &mut emulator,
        );
        assert_eq!(persister.saved().len(), 1);

        let blob = fs::read(&persister.saved()[0]).unwrap();
        let mut restored = ScriptedEmulator::new();
        restored.restore_full_state(&blob).unwrap();
        assert_eq!(restored.read_byte(0xDB02), 1);
    }

    #[test]
    fn test_write_failure_is_counted_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();

        let mut persister = StateSnapshotPersister::new(&blocker);
        let mut emulator = ScriptedEmulator::new();
        persister.handle(
            &event(Delta::new(0xDB02, 0, 1), Category::ItemFlag, true),
            &mut emulator,
        );

        assert_eq!(persister.failures(), 1);
        assert!(persister.saved().is_empty());
    }

    #[test]
    fn test_save_named() {
        let dir = tempfile::tempdir().unwrap();
        let mut persister = StateSnapshotPersister::new(dir.path());
        let mut emulator = ScriptedEmulator::new();

        let path = persister.save_named(&mut emulator, "monitor_120000").unwrap();
        assert_eq!(path, dir.path().join("monitor_120000.state"));
        assert!(path.exists());
    }
}

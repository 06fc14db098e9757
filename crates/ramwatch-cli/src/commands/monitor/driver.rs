//! Emulator adapter over a RAM dump file.
//!
//! An external emulator script rewrites the dump periodically. One "frame"
//! of this driver is one poll: wait for the interval, then reload the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ramwatch_core::{Address, Button, Emulator, Error, MemoryImage, ReadMemory, Result};
use tracing::trace;

use crate::shutdown::ShutdownSignal;

pub struct DumpFileDriver {
    path: PathBuf,
    image: MemoryImage,
    /// Size of the dump at open; shorter reads are partial writes
    dump_len: usize,
    interval: Duration,
    shutdown: Arc<ShutdownSignal>,
    polls: u64,
}

impl DumpFileDriver {
    pub fn open(path: &Path, interval: Duration, shutdown: Arc<ShutdownSignal>) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            image: MemoryImage::from_bytes(&data)?,
            dump_len: data.len(),
            interval,
            shutdown,
            polls: 0,
        })
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    fn reload(&mut self) -> Result<()> {
        let failure =
            |reason: String| Error::DriverFailure(format!("{}: {}", self.path.display(), reason));

        let data = fs::read(&self.path).map_err(|e| failure(e.to_string()))?;
        // The writer may be halfway through a dump; keep the last image
        if data.len() < self.dump_len {
            return Err(failure(format!(
                "partial dump ({} of {} bytes)",
                data.len(),
                self.dump_len
            )));
        }
        self.image = MemoryImage::from_bytes(&data).map_err(|e| failure(e.to_string()))?;
        Ok(())
    }
}

impl ReadMemory for DumpFileDriver {
    fn read_byte(&self, address: Address) -> u8 {
        self.image.read_byte(address)
    }
}

impl Emulator for DumpFileDriver {
    fn advance_frame(&mut self) -> Result<()> {
        if self.shutdown.wait(self.interval) {
            return Ok(());
        }
        self.polls += 1;
        trace!("Poll {} of {}", self.polls, self.path.display());
        self.reload()
    }

    /// The dump only carries RAM, so the saved state is the RAM image
    fn capture_full_state(&mut self) -> Result<Vec<u8>> {
        Ok(self.image.as_bytes().to_vec())
    }

    fn restore_full_state(&mut self, state: &[u8]) -> Result<()> {
        self.image = MemoryImage::from_bytes(state)?;
        Ok(())
    }

    fn press(&mut self, button: Button) -> Result<()> {
        Err(Error::DriverFailure(format!(
            "cannot press {}: RAM dump files take no input",
            button
        )))
    }

    fn release(&mut self, button: Button) -> Result<()> {
        Err(Error::DriverFailure(format!(
            "cannot release {}: RAM dump files take no input",
            button
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn dump(path: &Path, writes: &[(usize, u8)]) {
        let mut bytes = vec![0u8; 0x10000];
        for (address, value) in writes {
            bytes[*address] = *value;
        }
        fs::write(path, bytes).unwrap();
    }

    fn open(path: &Path) -> DumpFileDriver {
        DumpFileDriver::open(
            path,
            Duration::from_millis(1),
            Arc::new(ShutdownSignal::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_poll_reloads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ram.bin");
        dump(&path, &[]);
        let mut driver = open(&path);
        assert_eq!(driver.read_byte(0xDB02), 0);

        dump(&path, &[(0xDB02, 1)]);
        assert_eq!(driver.read_byte(0xDB02), 0);
        driver.advance_frame().unwrap();
        assert_eq!(driver.read_byte(0xDB02), 1);
        assert_eq!(driver.polls(), 1);
    }

    #[test]
    fn test_missing_dump_is_driver_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ram.bin");
        dump(&path, &[]);
        let mut driver = open(&path);

        fs::remove_file(&path).unwrap();
        let err = driver.advance_frame().unwrap_err();
        assert!(err.is_driver_failure());
    }

    #[test]
    fn test_partial_dump_keeps_last_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ram.bin");
        dump(&path, &[(0xDB02, 1)]);
        let mut driver = open(&path);

        fs::write(&path, vec![0u8; 0xC000]).unwrap();
        let err = driver.advance_frame().unwrap_err();
        assert!(err.is_driver_failure());
        assert_eq!(driver.read_byte(0xDB02), 1);

        dump(&path, &[(0xDB02, 1)]);
        driver.advance_frame().unwrap();
        assert_eq!(driver.read_byte(0xDB02), 1);
    }

    #[test]
    fn test_no_reload_after_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ram.bin");
        dump(&path, &[]);
        let shutdown = Arc::new(ShutdownSignal::new());
        let mut driver =
            DumpFileDriver::open(&path, Duration::from_secs(10), Arc::clone(&shutdown)).unwrap();

        shutdown.trigger();
        fs::remove_file(&path).unwrap();
        assert!(driver.advance_frame().is_ok());
        assert_eq!(driver.polls(), 0);
    }

    #[test]
    fn test_state_round_trip_and_no_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ram.bin");
        dump(&path, &[(0xC008, 0x50)]);
        let mut driver = open(&path);

        let state = driver.capture_full_state().unwrap();
        assert_eq!(state.len(), 0x10000);
        driver.restore_full_state(&state).unwrap();
        assert_eq!(driver.read_byte(0xC008), 0x50);

        assert!(driver.press(Button::A).unwrap_err().is_driver_failure());
        assert!(driver.release(Button::A).unwrap_err().is_driver_failure());
    }
}

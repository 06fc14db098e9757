use super::{Button, Emulator};
use crate::error::Result;
use crate::memory::{Address, ReadMemory};

/// Frame-counting handle actions drive the emulator through.
///
/// Every frame advanced here moves the session's logical clock, so
/// discoveries are stamped with the frame they were observed at.
pub struct FrameDriver<'a, E: Emulator + ?Sized> {
    emulator: &'a mut E,
    frames: u64,
}

impl<'a, E: Emulator + ?Sized> FrameDriver<'a, E> {
    pub(crate) fn new(emulator: &'a mut E) -> Self {
        Self {
            emulator,
            frames: 0,
        }
    }

    pub fn advance_frame(&mut self) -> Result<()> {
        self.emulator.advance_frame()?;
        self.frames += 1;
        Ok(())
    }

    /// Advance `frames` frames
    pub fn settle(&mut self, frames: u32) -> Result<()> {
        for _ in 0..frames {
            self.advance_frame()?;
        }
        Ok(())
    }

    pub fn press(&mut self, button: Button) -> Result<()> {
        self.emulator.press(button)
    }

    pub fn release(&mut self, button: Button) -> Result<()> {
        self.emulator.release(button)
    }

    /// Press, hold for `hold_frames`, release
    pub fn tap(&mut self, button: Button, hold_frames: u32) -> Result<()> {
        self.press(button)?;
        self.settle(hold_frames)?;
        self.release(button)
    }

    pub fn frames_advanced(&self) -> u64 {
        self.frames
    }
}

impl<E: Emulator + ?Sized> ReadMemory for FrameDriver<'_, E> {
    fn read_byte(&self, address: Address) -> u8 {
        self.emulator.read_byte(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::mock::ScriptedEmulator;

    #[test]
    fn test_tap_counts_hold_frames() {
        let mut emulator = ScriptedEmulator::new();
        let mut driver = FrameDriver::new(&mut emulator);

        driver.tap(Button::Right, 10).unwrap();
        driver.settle(5).unwrap();

        assert_eq!(driver.frames_advanced(), 15);
        assert_eq!(
            emulator.inputs(),
            &[(Button::Right, true), (Button::Right, false)]
        );
        assert_eq!(emulator.frame(), 15);
    }

    #[test]
    fn test_reads_through_driver() {
        let mut emulator = ScriptedEmulator::new();
        emulator.set(0xC008, 0x48);
        let driver = FrameDriver::new(&mut emulator);
        assert_eq!(driver.read_byte(0xC008), 0x48);
    }

    #[test]
    fn test_fault_stops_settle() {
        let mut emulator = ScriptedEmulator::new().fail_at_frame(3);
        let mut driver = FrameDriver::new(&mut emulator);

        let err = driver.settle(10).unwrap_err();
        assert!(err.is_driver_failure());
        assert_eq!(driver.frames_advanced(), 2);
    }
}

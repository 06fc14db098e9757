//! Scripted in-memory emulator for tests.

use std::collections::{BTreeMap, HashMap};

use super::{Button, Emulator};
use crate::error::{Error, Result};
use crate::memory::{Address, MemoryImage, ReadMemory};

/// Emulator double: memory writes scheduled by frame or by button press,
/// optional fault injection, and a byte-exact state blob.
#[derive(Debug, Default)]
pub struct ScriptedEmulator {
    memory: MemoryImage,
    frame: u64,
    scheduled: BTreeMap<u64, Vec<(Address, u8)>>,
    on_press: HashMap<Button, Vec<(Address, u8)>>,
    fail_at: Option<u64>,
    inputs: Vec<(Button, bool)>,
}

impl ScriptedEmulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, address: Address, value: u8) {
        self.memory.write(address, value);
    }

    /// Write `value` when the emulator reaches `frame`
    pub fn schedule(mut self, frame: u64, address: Address, value: u8) -> Self {
        self.scheduled
            .entry(frame)
            .or_default()
            .push((address, value));
        self
    }

    /// Write `value` whenever `button` is pressed
    pub fn on_press(mut self, button: Button, address: Address, value: u8) -> Self {
        self.on_press
            .entry(button)
            .or_default()
            .push((address, value));
        self
    }

    /// Fail when asked to advance into `frame`
    pub fn fail_at_frame(mut self, frame: u64) -> Self {
        self.fail_at = Some(frame);
        self
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn inputs(&self) -> &[(Button, bool)] {
        &self.inputs
    }
}

impl ReadMemory for ScriptedEmulator {
    fn read_byte(&self, address: Address) -> u8 {
        self.memory.read_byte(address)
    }
}

impl Emulator for ScriptedEmulator {
    fn advance_frame(&mut self) -> Result<()> {
        let next = self.frame + 1;
        if self.fail_at.is_some_and(|f| next >= f) {
            return Err(Error::DriverFailure(format!("bus fault at frame {}", next)));
        }

        self.frame = next;
        if let Some(writes) = self.scheduled.get(&next) {
            for (address, value) in writes {
                self.memory.write(*address, *value);
            }
        }
        Ok(())
    }

    fn capture_full_state(&mut self) -> Result<Vec<u8>> {
        let mut state = self.frame.to_le_bytes().to_vec();
        state.extend_from_slice(self.memory.as_bytes());
        Ok(state)
    }

    fn restore_full_state(&mut self, state: &[u8]) -> Result<()> {
        if state.len() < 8 {
            return Err(Error::DriverFailure("truncated state blob".into()));
        }
        let (frame, memory) = state.split_at(8);
        let mut frame_bytes = [0u8; 8];
        frame_bytes.copy_from_slice(frame);

        self.memory = MemoryImage::from_bytes(memory).map_err(Error::driver)?;
        self.frame = u64::from_le_bytes(frame_bytes);
        Ok(())
    }

    fn press(&mut self, button: Button) -> Result<()> {
        self.inputs.push((button, true));
        if let Some(writes) = self.on_press.get(&button) {
            for (address, value) in writes {
                self.memory.write(*address, *value);
            }
        }
        Ok(())
    }

    fn release(&mut self, button: Button) -> Result<()> {
        self.inputs.push((button, false));
        Ok(())
    }
}

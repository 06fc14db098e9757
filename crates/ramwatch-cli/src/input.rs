use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::shutdown::ShutdownSignal;

/// Monitor command requested from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    ResetBaseline,
    ShowValues,
    SaveNow,
    Quit,
}

/// Pending keyboard requests.
///
/// The keyboard thread only raises flags; the monitor loop takes them
/// between polls.
#[derive(Debug, Default)]
pub struct PendingCommands {
    reset: AtomicBool,
    show: AtomicBool,
    save: AtomicBool,
}

impl PendingCommands {
    pub fn request(&self, command: KeyCommand) {
        let flag = match command {
            KeyCommand::ResetBaseline => &self.reset,
            KeyCommand::ShowValues => &self.show,
            KeyCommand::SaveNow => &self.save,
            KeyCommand::Quit => return,
        };
        flag.store(true, Ordering::SeqCst);
    }

    /// Clear and return the request flag for `command`
    pub fn take(&self, command: KeyCommand) -> bool {
        match command {
            KeyCommand::ResetBaseline => self.reset.swap(false, Ordering::SeqCst),
            KeyCommand::ShowValues => self.show.swap(false, Ordering::SeqCst),
            KeyCommand::SaveNow => self.save.swap(false, Ordering::SeqCst),
            KeyCommand::Quit => false,
        }
    }
}

/// Spawn a thread that turns key presses into monitor commands.
///
/// - `r`: reset the baseline
/// - `f`: show non-zero values
/// - `s`: save state now
/// - `q`, `Q`, Esc, Ctrl+C: quit
pub fn spawn_keyboard_monitor(
    shutdown: Arc<ShutdownSignal>,
    pending: Arc<PendingCommands>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Keyboard monitor started");

        while !shutdown.is_shutdown() {
            // Poll with a timeout to keep checking the shutdown state
            if event::poll(Duration::from_millis(100)).unwrap_or(false)
                && let Ok(Event::Key(key_event)) = event::read()
                && let Some(command) = key_command(&key_event)
            {
                debug!("Key command: {:?}", command);
                if command == KeyCommand::Quit {
                    shutdown.trigger();
                    break;
                }
                pending.request(command);
            }
        }

        debug!("Keyboard monitor stopped");
    })
}

fn key_command(event: &KeyEvent) -> Option<KeyCommand> {
    match event.code {
        KeyCode::Esc => Some(KeyCommand::Quit),
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyCommand::Quit)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(KeyCommand::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(KeyCommand::ResetBaseline),
        KeyCode::Char('f') | KeyCode::Char('F') => Some(KeyCommand::ShowValues),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(KeyCommand::SaveNow),
        _ => None,
    }
}

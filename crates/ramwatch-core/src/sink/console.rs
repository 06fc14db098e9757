use owo_colors::OwoColorize;

use super::{DiscoveryEvent, EventSink};
use crate::classify::Classification;
use crate::emulator::Emulator;
use crate::report::format_line;

/// Prints discoveries to stdout.
///
/// With `verbose` set, informational deltas are printed too (dimmed, and
/// tagged when they hit the ignore set).
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    verbose: bool,
    discoveries: usize,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn discoveries(&self) -> usize {
        self.discoveries
    }

    /// Line printed for an event, without colors
    pub fn render(event: &DiscoveryEvent) -> String {
        let line = format_line(&event.delta, event.label());
        match (&event.discovery, event.classification) {
            (Some(record), _) => format!("NEW {} {{{}}}", line, record.category),
            (None, Classification::Ignored) => format!("    {} (ignored)", line),
            (None, Classification::Candidate { category, .. }) => {
                format!("    {} {{{}}}", line, category)
            }
        }
    }
}

impl EventSink for ConsoleReporter {
    fn handle(&mut self, event: &DiscoveryEvent, _machine: &mut dyn Emulator) {
        let line = Self::render(event);
        if event.is_discovery() {
            self.discoveries += 1;
            println!("{}", line.green().bold());
            println!("    Total discovered: {}", self.discoveries);
        } else if self.verbose {
            println!("{}", line.dimmed());
        }
    }
}

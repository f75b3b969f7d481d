//! Listener that echoes events to the terminal

use anyhow::Result;
use chrono::{DateTime, Local};

use super::notifier::{Event, Listener};

/// Prints one line per event to stderr, keeping stdout clean for data
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleListener;

impl ConsoleListener {
    pub fn format_line(event: &Event, at: DateTime<Local>) -> String {
        format!(
            "[{}] {}: {} (ID: {})",
            at.format("%H:%M:%S"),
            event.kind,
            event.message,
            event.id
        )
    }
}

impl Listener for ConsoleListener {
    fn on_event(&self, event: &Event) -> Result<()> {
        eprintln!("{}", Self::format_line(event, Local::now()));
        Ok(())
    }
}

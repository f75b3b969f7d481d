//! Export of tasks in the record shape expected by older tools

use serde::Serialize;
use std::fmt;

use crate::domain::{Component, Priority, Status, Task};

/// A task as the legacy system understood it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyTask {
    pub identifier: String,
    pub name: String,
    pub notes: Option<String>,
    pub state: &'static str,
    pub importance: u8,
}

fn legacy_state(status: Status) -> &'static str {
    match status {
        Status::Todo => "PENDING",
        Status::InProgress => "ACTIVE",
        Status::Done => "COMPLETED",
        Status::Cancelled => "CANCELED",
    }
}

fn legacy_importance(priority: Priority) -> u8 {
    priority.level()
}

impl From<&Task> for LegacyTask {
    fn from(task: &Task) -> Self {
        Self {
            identifier: task.id().to_string(),
            name: task.title().into_owned(),
            notes: task.description().map(str::to_string),
            state: legacy_state(task.status()),
            importance: legacy_importance(task.priority()),
        }
    }
}

impl fmt::Display for LegacyTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LegacyTask{{id='{}', name='{}', state='{}', importance={}}}",
            self.identifier, self.name, self.state, self.importance
        )
    }
}

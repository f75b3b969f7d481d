//! Fluent construction of tasks

use super::component::{Component, ModelError};
use super::status::{Priority, Status};
use super::task::Task;

/// Builds a [`Task`] step by step.
///
/// Status defaults to TODO and priority to MEDIUM. The title is validated
/// when [`TaskBuilder::build`] runs.
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    title: String,
    description: Option<String>,
    status: Status,
    priority: Priority,
}

impl TaskBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: Status::default(),
            priority: Priority::default(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn build(self) -> Result<Task, ModelError> {
        let mut task = Task::new(&self.title, self.description.as_deref())?;
        task.set_status(self.status);
        task.set_priority(self.priority);
        Ok(task)
    }
}

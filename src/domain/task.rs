//! Task domain model
//!
//! Tasks are the leaves of the work tree: a title, an optional description,
//! a status and a priority.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;

use super::component::{indent_str, validate_title, Component, ModelError};
use super::id::ItemId;
use super::status::{Priority, Status};

/// A single unit of work
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    id: ItemId,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    status: Status,
    priority: Priority,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .filter(|d| !d.trim().is_empty())
        .map(str::to_string)
}

impl Task {
    /// Creates a new task with status TODO and priority MEDIUM
    pub fn new(title: &str, description: Option<&str>) -> Result<Self, ModelError> {
        let title = validate_title(title)?;
        let now = Utc::now();
        Ok(Self {
            id: ItemId::new_task(&title, now),
            title,
            description: normalize_description(description),
            status: Status::default(),
            priority: Priority::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a task read back from storage, keeping its original ID
    pub fn restore(
        id: ItemId,
        title: &str,
        description: Option<&str>,
        status: Status,
        priority: Priority,
    ) -> Result<Self, ModelError> {
        let title = validate_title(title)?;
        let now = Utc::now();
        Ok(Self {
            id,
            title,
            description: normalize_description(description),
            status,
            priority,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Sets or clears the description; blank text clears it
    pub fn set_description(&mut self, description: Option<&str>) {
        self.description = normalize_description(description);
        self.touch();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Component for Task {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn title(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.title)
    }

    fn set_title(&mut self, title: &str) -> Result<(), ModelError> {
        self.title = validate_title(title)?;
        self.touch();
        Ok(())
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
        self.touch();
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
        self.touch();
    }

    fn is_leaf(&self) -> bool {
        true
    }

    fn display(&self, indent: usize) -> String {
        let pad = indent_str(indent);
        let mut out = format!(
            "{}- Task: {} [{}] [{}]\n",
            pad,
            self.title,
            self.status.label(),
            self.priority.label()
        );
        if let Some(description) = &self.description {
            out.push_str(&format!("{}  Description: {}\n", pad, description));
        }
        out
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn make_task(title: &str) -> Task {
        Task::new(title, None).unwrap()
    }

    #[test]
    fn new_task_has_defaults() {
        let task = make_task("Study Rust");
        assert_eq!(task.title(), "Study Rust");
        assert_eq!(task.status(), Status::Todo);
        assert_eq!(task.priority(), Priority::Medium);
        assert!(task.description().is_none());
        assert!(task.is_leaf());
        assert_eq!(task.created_at(), task.updated_at());
    }

    #[test]
    fn new_tasks_get_unique_ids() {
        let a = make_task("Same");
        let b = make_task("Same");
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(matches!(
            Task::new("", None),
            Err(ModelError::InvalidArgument(_))
        ));
        assert!(Task::new("   \t", None).is_err());
    }

    #[test]
    fn set_title_validates() {
        let mut task = make_task("Original");
        assert!(task.set_title("  ").is_err());
        assert_eq!(task.title(), "Original");

        task.set_title("Renamed").unwrap();
        assert_eq!(task.title(), "Renamed");
    }

    #[test]
    fn updated_at_changes_on_modifications() {
        let mut task = make_task("Task");
        let initial = task.updated_at();

        sleep(Duration::from_millis(5));
        task.set_status(Status::InProgress);
        let after_status = task.updated_at();
        assert!(after_status > initial);

        sleep(Duration::from_millis(5));
        task.set_priority(Priority::High);
        assert!(task.updated_at() > after_status);

        let before_desc = task.updated_at();
        sleep(Duration::from_millis(5));
        task.set_description(Some("details"));
        assert!(task.updated_at() > before_desc);
        assert_eq!(task.created_at(), initial);
    }

    #[test]
    fn blank_description_is_cleared() {
        let mut task = Task::new("Task", Some("notes")).unwrap();
        assert_eq!(task.description(), Some("notes"));
        task.set_description(Some("  "));
        assert!(task.description().is_none());
    }

    #[test]
    fn restore_keeps_identity() {
        let id: ItemId = "a1b2c3d4".parse().unwrap();
        let task = Task::restore(id.clone(), "Loaded", Some("d"), Status::Done, Priority::Low)
            .unwrap();
        assert_eq!(task.id(), &id);
        assert_eq!(task.status(), Status::Done);
        assert_eq!(task.priority(), Priority::Low);
    }

    #[test]
    fn display_includes_status_priority_and_description() {
        let task = Task::new("Ship it", Some("before friday")).unwrap();
        let text = task.display(1);
        assert!(text.starts_with("  - Task: Ship it [To do] [Medium]"));
        assert!(text.contains("    Description: before friday"));
    }
}

//! Project domain model
//!
//! A project is the composite in the work tree. It holds an ordered,
//! duplicate-free list of child items (tasks or nested projects). Its status
//! and priority are derived from the children on every read, never cached.
//!
//! Children are [`ItemRef`] handles. A child saved to the store through
//! [`Repository::save`](crate::storage::Repository::save) is the same item
//! the project sees, so edits made on either side show up on the other.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use tracing::debug;

use super::component::{indent_str, validate_title, Component, Item, ModelError};
use super::handle::ItemRef;
use super::id::ItemId;
use super::status::{Priority, Status};

/// A container of tasks and sub-projects
#[derive(Debug, Clone)]
pub struct Project {
    id: ItemId,
    title: String,
    description: Option<String>,
    components: Vec<ItemRef>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(title: &str, description: Option<&str>) -> Result<Self, ModelError> {
        let title = validate_title(title)?;
        let now = Utc::now();
        Ok(Self {
            id: ItemId::new_project(&title, now),
            title,
            description: description
                .filter(|d| !d.trim().is_empty())
                .map(str::to_string),
            components: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Appends a child unless one with the same ID is already present, or
    /// the child already contains this project.
    ///
    /// Returns true if the project changed.
    pub fn add_component(&mut self, component: impl Into<ItemRef>) -> bool {
        let component = component.into();
        if self.contains(component.id()) {
            return false;
        }
        if component.reaches(&self.id) {
            debug!(project = %self.id, child = %component.id(), "rejected cyclic child");
            return false;
        }
        self.components.push(component);
        self.touch();
        true
    }

    /// Removes the child with the given ID, keeping the order of the rest
    pub fn remove_component(&mut self, id: &ItemId) -> bool {
        let len_before = self.components.len();
        self.components.retain(|c| c.id() != id);
        let removed = self.components.len() != len_before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Direct children in insertion order
    pub fn components(&self) -> &[ItemRef] {
        &self.components
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.components.iter().any(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
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

impl Component for Project {
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

    /// TODO while empty, IN_PROGRESS once anything has been added
    fn status(&self) -> Status {
        if self.components.is_empty() {
            Status::Todo
        } else {
            Status::InProgress
        }
    }

    /// Pushes the status to direct task children; nested projects are skipped
    fn set_status(&mut self, status: Status) {
        for child in &self.components {
            child.update(|item| {
                if let Item::Task(task) = item {
                    task.set_status(status);
                }
            });
        }
        self.touch();
    }

    /// Highest priority among direct children, LOW when empty
    fn priority(&self) -> Priority {
        self.components
            .iter()
            .map(|c| c.read().priority())
            .max_by_key(Priority::level)
            .unwrap_or(Priority::Low)
    }

    /// Pushes the priority to every direct child
    fn set_priority(&mut self, priority: Priority) {
        for child in &self.components {
            child.update(|item| item.set_priority(priority));
        }
        self.touch();
    }

    fn is_leaf(&self) -> bool {
        false
    }

    fn display(&self, indent: usize) -> String {
        let pad = indent_str(indent);
        let mut out = format!(
            "{}+ Project: {} ({} components)\n",
            pad,
            self.title,
            self.components.len()
        );
        if let Some(description) = &self.description {
            out.push_str(&format!("{}  Description: {}\n", pad, description));
        }
        for child in &self.components {
            out.push_str(&child.read().display(indent + 1));
        }
        out
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Project {}

impl Serialize for Project {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Project", 8)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("title", &self.title)?;
        if let Some(description) = &self.description {
            state.serialize_field("description", description)?;
        }
        state.serialize_field("status", &self.status())?;
        state.serialize_field("priority", &self.priority())?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("updated_at", &self.updated_at)?;
        state.serialize_field("components", &self.components)?;
        state.end()
    }
}

//! The capability shared by tasks and projects
//!
//! [`Component`] is the trait every work item implements. [`Item`] is the
//! closed set of concrete components that the store and project trees hold.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::id::ItemId;
use super::project::Project;
use super::status::{Priority, Status};
use super::task::Task;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Rejects empty or whitespace-only titles, returning the trimmed title
pub(crate) fn validate_title(title: &str) -> Result<String, ModelError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ModelError::InvalidArgument(
            "title cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

/// Operations common to leaves ([`Task`]) and composites ([`Project`])
pub trait Component {
    fn id(&self) -> &ItemId;

    /// Title as presented; decorators may rewrite it
    fn title(&self) -> Cow<'_, str>;

    fn set_title(&mut self, title: &str) -> Result<(), ModelError>;

    fn status(&self) -> Status;

    fn set_status(&mut self, status: Status);

    fn priority(&self) -> Priority;

    fn set_priority(&mut self, priority: Priority);

    /// True for components that can never hold children
    fn is_leaf(&self) -> bool;

    /// Renders the component (and any children) as indented text lines
    fn display(&self, indent: usize) -> String;
}

/// Kind selector for [`Item::create`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Task,
    Project,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComponentKind::Task => "task",
            ComponentKind::Project => "project",
        })
    }
}

impl FromStr for ComponentKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(ComponentKind::Task),
            "project" => Ok(ComponentKind::Project),
            other => Err(ModelError::InvalidArgument(format!(
                "unsupported component kind '{}'",
                other
            ))),
        }
    }
}

/// A stored work item: either a task or a project
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Task(Task),
    Project(Project),
}

impl Item {
    /// Creates a new component of the requested kind
    pub fn create(
        kind: ComponentKind,
        title: &str,
        description: Option<&str>,
    ) -> Result<Self, ModelError> {
        match kind {
            ComponentKind::Task => Task::new(title, description).map(Item::Task),
            ComponentKind::Project => Project::new(title, description).map(Item::Project),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Item::Task(_) => ComponentKind::Task,
            Item::Project(_) => ComponentKind::Project,
        }
    }

    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Item::Task(task) => Some(task),
            Item::Project(_) => None,
        }
    }

    pub fn as_project(&self) -> Option<&Project> {
        match self {
            Item::Project(project) => Some(project),
            Item::Task(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Item::Task(task) => task.description(),
            Item::Project(project) => project.description(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Item::Task(task) => task.created_at(),
            Item::Project(project) => project.created_at(),
        }
    }

    fn inner(&self) -> &dyn Component {
        match self {
            Item::Task(task) => task,
            Item::Project(project) => project,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Component {
        match self {
            Item::Task(task) => task,
            Item::Project(project) => project,
        }
    }
}

impl Component for Item {
    fn id(&self) -> &ItemId {
        self.inner().id()
    }

    fn title(&self) -> Cow<'_, str> {
        self.inner().title()
    }

    fn set_title(&mut self, title: &str) -> Result<(), ModelError> {
        self.inner_mut().set_title(title)
    }

    fn status(&self) -> Status {
        self.inner().status()
    }

    fn set_status(&mut self, status: Status) {
        self.inner_mut().set_status(status)
    }

    fn priority(&self) -> Priority {
        self.inner().priority()
    }

    fn set_priority(&mut self, priority: Priority) {
        self.inner_mut().set_priority(priority)
    }

    fn is_leaf(&self) -> bool {
        self.inner().is_leaf()
    }

    fn display(&self, indent: usize) -> String {
        self.inner().display(indent)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Item {}

impl From<Task> for Item {
    fn from(task: Task) -> Self {
        Item::Task(task)
    }
}

impl From<Project> for Item {
    fn from(project: Project) -> Self {
        Item::Project(project)
    }
}

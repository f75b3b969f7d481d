//! Interchangeable orderings over components
//!
//! Every strategy is a stateless comparator. [`sorted`] applies one to a
//! snapshot with a stable sort, so ties keep their original relative order
//! and the input is never touched.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::component::{Component, ModelError};

/// A total order over components
pub trait SortStrategy: Send + Sync {
    /// Human-readable description of the order and its direction
    fn name(&self) -> &'static str;

    fn compare(&self, a: &dyn Component, b: &dyn Component) -> Ordering;
}

/// Case-insensitive title, A to Z
#[derive(Debug, Clone, Copy, Default)]
pub struct ByTitle;

impl SortStrategy for ByTitle {
    fn name(&self) -> &'static str {
        "Sort by title (A-Z)"
    }

    fn compare(&self, a: &dyn Component, b: &dyn Component) -> Ordering {
        a.title().to_lowercase().cmp(&b.title().to_lowercase())
    }
}

/// Priority, highest first
#[derive(Debug, Clone, Copy, Default)]
pub struct ByPriority;

impl SortStrategy for ByPriority {
    fn name(&self) -> &'static str {
        "Sort by priority (high to low)"
    }

    fn compare(&self, a: &dyn Component, b: &dyn Component) -> Ordering {
        b.priority().level().cmp(&a.priority().level())
    }
}

/// Workflow status, TODO first and CANCELLED last
#[derive(Debug, Clone, Copy, Default)]
pub struct ByStatus;

impl SortStrategy for ByStatus {
    fn name(&self) -> &'static str {
        "Sort by status (TODO -> IN_PROGRESS -> DONE -> CANCELLED)"
    }

    fn compare(&self, a: &dyn Component, b: &dyn Component) -> Ordering {
        a.status().rank().cmp(&b.status().rank())
    }
}

/// Returns a new, ordered copy of `items`
pub fn sorted<C>(strategy: &dyn SortStrategy, items: &[C]) -> Vec<C>
where
    C: Component + Clone,
{
    let mut out = items.to_vec();
    out.sort_by(|a, b| strategy.compare(a, b));
    out
}

/// Named selector for the built-in strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Title,
    Priority,
    Status,
}

impl SortKey {
    pub fn strategy(&self) -> &'static dyn SortStrategy {
        match self {
            SortKey::Title => &ByTitle,
            SortKey::Priority => &ByPriority,
            SortKey::Status => &ByStatus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Priority => "priority",
            SortKey::Status => "status",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" | "1" => Ok(SortKey::Title),
            "priority" | "2" => Ok(SortKey::Priority),
            "status" | "3" => Ok(SortKey::Status),
            other => Err(ModelError::InvalidArgument(format!(
                "unknown sort strategy '{}'",
                other
            ))),
        }
    }
}

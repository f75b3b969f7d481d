//! Domain models for tasktree
//!
//! Contains the work-item tree and the ordering strategies, without any I/O
//! concerns.

mod builder;
mod component;
mod decorator;
mod handle;
mod id;
mod ordering;
mod project;
mod status;
mod task;

pub use builder::TaskBuilder;
pub use component::{Component, ComponentKind, Item, ModelError};
pub use decorator::Urgent;
pub use handle::ItemRef;
pub use id::{IdError, ItemId};
pub use ordering::{sorted, ByPriority, ByStatus, ByTitle, SortKey, SortStrategy};
pub use project::Project;
pub use status::{Priority, Status};
pub use task::Task;

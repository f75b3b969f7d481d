//! tasktree - a hierarchical task and project tracker
//!
//! Work items are tasks (leaves) and projects (ordered collections of tasks
//! and nested projects). A thread-safe [`storage::Store`] owns top-level items,
//! announces changes through an [`events::Notifier`], and flushes tasks to a
//! pipe-delimited text file. [`storage::Guarded`] puts an identity check in
//! front of it, and [`domain::SortStrategy`] implementations order snapshots
//! on demand.

pub mod cli;
pub mod domain;
pub mod events;
pub mod storage;

pub use domain::{Component, Item, ItemId, ItemRef, Priority, Project, Status, Task};

//! Shared handles to items
//!
//! A project refers to its children through [`ItemRef`]s. The store keeps
//! one handle per ID and hands that same handle out, so a change made
//! through the store is visible inside every project that holds the child,
//! and a change pushed down by a project reaches the stored item.
//!
//! Lock order is always parent before child. Projects refuse children that
//! would close a cycle, so a handle is never locked while one of its
//! descendants is held.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Serialize, Serializer};

use super::component::{Component, Item};
use super::id::ItemId;
use super::project::Project;
use super::task::Task;

/// Cloneable, thread-safe reference to one item
#[derive(Clone)]
pub struct ItemRef {
    // Copied out of the item so it can be read without taking the lock
    id: ItemId,
    cell: Arc<RwLock<Item>>,
}

impl ItemRef {
    pub fn new(item: impl Into<Item>) -> Self {
        let item = item.into();
        Self {
            id: item.id().clone(),
            cell: Arc::new(RwLock::new(item)),
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Item> {
        self.cell.read()
    }

    /// Copy of the current value; children of a project stay shared
    pub fn snapshot(&self) -> Item {
        self.cell.read().clone()
    }

    /// Mutates the item in place
    pub fn update<R>(&self, f: impl FnOnce(&mut Item) -> R) -> R {
        f(&mut self.cell.write())
    }

    /// True when both handles point at the same item
    pub fn ptr_eq(&self, other: &ItemRef) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// True if `target` is this item or anywhere below it
    pub fn reaches(&self, target: &ItemId) -> bool {
        if &self.id == target {
            return true;
        }
        match &*self.read() {
            Item::Project(project) => project.components().iter().any(|c| c.reaches(target)),
            Item::Task(_) => false,
        }
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Item> {
        self.cell.write()
    }
}

impl fmt::Debug for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemRef").field(&self.id).finish()
    }
}

impl Serialize for ItemRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.read().serialize(serializer)
    }
}

impl From<Item> for ItemRef {
    fn from(item: Item) -> Self {
        Self::new(item)
    }
}

impl From<Task> for ItemRef {
    fn from(task: Task) -> Self {
        Self::new(task)
    }
}

impl From<Project> for ItemRef {
    fn from(project: Project) -> Self {
        Self::new(project)
    }
}

//! Identity check in front of a [`Repository`]
//!
//! Writes by an unauthenticated caller fail with
//! [`StoreError::AccessDenied`]. Reads and deletes fail quietly instead:
//! empty lists, `None`, or `false`. In both cases the wrapped repository is
//! never called.

use tracing::{debug, warn};

use super::store::{Repository, StoreError, StoreStats};
use crate::domain::{Item, ItemRef, ModelError, Project, Task};

/// Wraps a repository and gates every call on a non-blank identity
#[derive(Debug)]
pub struct Guarded<R> {
    inner: R,
    identity: String,
}

impl<R: Repository> Guarded<R> {
    pub fn new(inner: R, identity: impl Into<String>) -> Self {
        Self {
            inner,
            identity: identity.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn is_authorized(&self) -> bool {
        !self.identity.trim().is_empty()
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn deny_write(&self, operation: &str) -> StoreError {
        warn!(user = %self.identity, operation, "access denied");
        StoreError::AccessDenied(self.identity.clone())
    }

    fn allow_read(&self, operation: &str) -> bool {
        if self.is_authorized() {
            debug!(user = %self.identity, operation, "access granted");
            true
        } else {
            warn!(user = %self.identity, operation, "access denied");
            false
        }
    }
}

impl<R: Repository> Repository for Guarded<R> {
    fn save(&self, item: Item) -> Result<ItemRef, StoreError> {
        if !self.is_authorized() {
            return Err(self.deny_write("save"));
        }
        self.inner.save(item)
    }

    fn update<F>(&self, id: &str, f: F) -> Result<Option<Item>, StoreError>
    where
        F: FnOnce(&mut Item) -> Result<(), ModelError>,
    {
        if !self.is_authorized() {
            return Err(self.deny_write("update"));
        }
        self.inner.update(id, f)
    }

    fn find_by_id(&self, id: &str) -> Option<Item> {
        if !self.allow_read("find_by_id") {
            return None;
        }
        self.inner.find_by_id(id)
    }

    fn find_all_tasks(&self) -> Vec<Task> {
        if !self.allow_read("find_all_tasks") {
            return Vec::new();
        }
        self.inner.find_all_tasks()
    }

    fn find_all_projects(&self) -> Vec<Project> {
        if !self.allow_read("find_all_projects") {
            return Vec::new();
        }
        self.inner.find_all_projects()
    }

    fn delete(&self, id: &str) -> bool {
        if !self.allow_read("delete") {
            return false;
        }
        self.inner.delete(id)
    }

    fn clear(&self) -> Result<(), StoreError> {
        if !self.is_authorized() {
            return Err(self.deny_write("clear"));
        }
        self.inner.clear()
    }

    fn stats(&self) -> StoreStats {
        if !self.allow_read("stats") {
            return StoreStats::default();
        }
        self.inner.stats()
    }
}

//! In-memory item store
//!
//! The [`Store`] owns every top-level item keyed by ID. Each call is atomic
//! on its own; there are no multi-item transactions. Query methods return
//! copies, so callers never hold references into the map.
//!
//! Every stored item lives behind one [`ItemRef`]. `save` hands that handle
//! back, and a project built from it shares the child with the store.
//! Locks are taken map first, then item. Nothing takes the map lock while
//! holding an item.
//!
//! After every successful mutation the full contents are flushed to the
//! configured [`Persistence`]. Flush failures are logged and never surfaced
//! to the caller, so memory can be ahead of disk.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::persistence::{NullPersistence, Persistence};
use crate::domain::{Component, ComponentKind, Item, ItemId, ItemRef, ModelError, Project, Task};
use crate::events::{EventKind, Notifier};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Access denied for user '{0}'")]
    AccessDenied(String),

    #[error("ID {0} already belongs to another item")]
    IdConflict(String),
}

impl From<ModelError> for StoreError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidArgument(msg) => StoreError::InvalidArgument(msg),
        }
    }
}

/// CRUD surface shared by the store and the access guard
pub trait Repository {
    /// Inserts or replaces an item by ID, returning the stored handle.
    ///
    /// Replacing keeps the existing handle, so projects holding it see the
    /// new value. An item created separately that happens to share the ID
    /// is refused with [`StoreError::IdConflict`].
    fn save(&self, item: Item) -> Result<ItemRef, StoreError>;

    /// Applies `f` to the stored item under its write lock.
    ///
    /// Returns the updated copy, or `None` when the ID is unknown.
    fn update<F>(&self, id: &str, f: F) -> Result<Option<Item>, StoreError>
    where
        F: FnOnce(&mut Item) -> Result<(), ModelError>;

    /// Looks up an item. Blank or unknown IDs are `None`, never an error.
    fn find_by_id(&self, id: &str) -> Option<Item>;

    fn find_all_tasks(&self) -> Vec<Task>;

    fn find_all_projects(&self) -> Vec<Project>;

    /// Removes an item, returning whether anything was removed
    fn delete(&self, id: &str) -> bool;

    /// Removes everything without notifying or flushing
    fn clear(&self) -> Result<(), StoreError>;

    fn stats(&self) -> StoreStats;
}

/// Item counts by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub tasks: usize,
    pub projects: usize,
}

fn kind_label(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Task => "Task",
        ComponentKind::Project => "Project",
    }
}

/// Same ID, but not the same item: a different kind or creation time
fn is_conflict(existing: &Item, incoming: &Item) -> bool {
    existing.kind() != incoming.kind() || existing.created_at() != incoming.created_at()
}

/// Thread-safe keyed collection of items
pub struct Store {
    items: RwLock<BTreeMap<ItemId, ItemRef>>,
    persistence: Box<dyn Persistence>,
    notifier: Arc<Notifier>,
    // Serialises snapshot + write so an older snapshot never lands last
    flush_lock: Mutex<()>,
}

impl Store {
    /// Opens a store, reloading everything `persistence` holds
    pub fn open(
        persistence: impl Persistence + 'static,
        notifier: Arc<Notifier>,
    ) -> Result<Self> {
        let loaded = persistence.load()?;
        let mut items = BTreeMap::new();
        for item in loaded {
            items.insert(item.id().clone(), ItemRef::new(item));
        }
        debug!(count = items.len(), "store opened");

        Ok(Self {
            items: RwLock::new(items),
            persistence: Box::new(persistence),
            notifier,
            flush_lock: Mutex::new(()),
        })
    }

    /// A store with no backing file
    pub fn in_memory(notifier: Arc<Notifier>) -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            persistence: Box::new(NullPersistence),
            notifier,
            flush_lock: Mutex::new(()),
        }
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// Every item, in ID order
    pub fn find_all(&self) -> Vec<Item> {
        self.items.read().values().map(ItemRef::snapshot).collect()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Writes the current contents to the backing storage
    pub fn flush(&self) -> Result<()> {
        let _guard = self.flush_lock.lock();
        let snapshot = self.find_all();
        self.persistence.flush(&snapshot)
    }

    fn flush_best_effort(&self) {
        if let Err(e) = self.flush() {
            warn!(error = %format!("{:#}", e), "failed to persist store");
        }
    }

    fn parse_id(id: &str) -> Option<ItemId> {
        id.parse().ok()
    }

    fn handle(&self, id: &str) -> Option<ItemRef> {
        let key = Self::parse_id(id)?;
        self.items.read().get(&key).cloned()
    }
}

impl Repository for Store {
    fn save(&self, item: Item) -> Result<ItemRef, StoreError> {
        let id = item.id().clone();
        let label = kind_label(item.kind());
        let title = item.title().into_owned();

        let (handle, replaced) = {
            let mut items = self.items.write();
            match items.get(&id) {
                Some(existing) => {
                    let mut current = existing.write();
                    if is_conflict(&current, &item) {
                        warn!(id = %id, "refused save over a different item with the same ID");
                        return Err(StoreError::IdConflict(id.to_string()));
                    }
                    *current = item;
                    drop(current);
                    (existing.clone(), true)
                }
                None => {
                    let handle = ItemRef::new(item);
                    items.insert(id.clone(), handle.clone());
                    (handle, false)
                }
            }
        };
        debug!(id = %id, replaced, "saved item");

        self.flush_best_effort();

        let (kind, verb) = if replaced {
            (EventKind::Updated, "updated")
        } else {
            (EventKind::Created, "created")
        };
        self.notifier
            .notify(kind, format!("{} {}: {}", label, verb, title), id.to_string());
        Ok(handle)
    }

    fn update<F>(&self, id: &str, f: F) -> Result<Option<Item>, StoreError>
    where
        F: FnOnce(&mut Item) -> Result<(), ModelError>,
    {
        let Some(handle) = self.handle(id) else {
            return Ok(None);
        };

        let updated = {
            let mut current = handle.write();
            // Work on a copy so a failed edit leaves the stored item untouched
            let mut edited = current.clone();
            f(&mut edited)?;
            *current = edited.clone();
            edited
        };

        self.flush_best_effort();
        self.notifier.notify(
            EventKind::Updated,
            format!("{} updated: {}", kind_label(updated.kind()), updated.title()),
            handle.id().to_string(),
        );
        Ok(Some(updated))
    }

    fn find_by_id(&self, id: &str) -> Option<Item> {
        self.handle(id).map(|handle| handle.snapshot())
    }

    fn find_all_tasks(&self) -> Vec<Task> {
        self.items
            .read()
            .values()
            .filter_map(|handle| handle.read().as_task().cloned())
            .collect()
    }

    fn find_all_projects(&self) -> Vec<Project> {
        self.items
            .read()
            .values()
            .filter_map(|handle| handle.read().as_project().cloned())
            .collect()
    }

    fn delete(&self, id: &str) -> bool {
        let Some(key) = Self::parse_id(id) else {
            return false;
        };

        let Some(removed) = self.items.write().remove(&key) else {
            return false;
        };
        debug!(id = %key, "deleted item");

        self.flush_best_effort();
        let removed = removed.read();
        self.notifier.notify(
            EventKind::Deleted,
            format!("{} deleted: {}", kind_label(removed.kind()), removed.title()),
            key.to_string(),
        );
        true
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.items.write().clear();
        debug!("store cleared");
        Ok(())
    }

    fn stats(&self) -> StoreStats {
        let items = self.items.read();
        let tasks = items.values().filter(|h| h.read().is_leaf()).count();
        StoreStats {
            total: items.len(),
            tasks,
            projects: items.len() - tasks,
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("items", &self.len())
            .field("notifier", &self.notifier)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemId, Priority, Status, TaskBuilder};
    use std::time::Duration;
    use crate::events::{Event, Listener};
    use crate::storage::TextFileStore;
    use tempfile::TempDir;

    /// Persistence that always fails, to prove failures stay internal
    struct BrokenPersistence;

    impl Persistence for BrokenPersistence {
        fn load(&self) -> Result<Vec<Item>> {
            Ok(Vec::new())
        }

        fn flush(&self, _items: &[Item]) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    fn recording_store() -> (Store, Arc<Mutex<Vec<Event>>>) {
        let notifier = Arc::new(Notifier::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: Arc<dyn Listener> = Arc::new(move |event: &Event| -> Result<()> {
            sink.lock().push(event.clone());
            Ok(())
        });
        notifier.add_listener(listener);
        (Store::in_memory(notifier), seen)
    }

    fn make_task(title: &str) -> Task {
        Task::new(title, None).unwrap()
    }

    #[test]
    fn save_then_find() {
        let (store, _) = recording_store();
        let task = make_task("Find me");
        let id = task.id().to_string();

        store.save(task.into()).unwrap();

        let found = store.find_by_id(&id).unwrap();
        assert_eq!(found.title(), "Find me");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn save_replaces_by_id() {
        let (store, seen) = recording_store();
        let mut task = make_task("Original");
        store.save(task.clone().into()).unwrap();

        task.set_title("Renamed").unwrap();
        store.save(task.clone().into()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.find_by_id(task.id().as_str()).unwrap().title(),
            "Renamed"
        );

        let kinds: Vec<_> = seen.lock().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Created, EventKind::Updated]);
    }

    #[test]
    fn find_by_blank_or_unknown_id_is_none() {
        let (store, _) = recording_store();
        store.save(make_task("Something").into()).unwrap();

        assert!(store.find_by_id("").is_none());
        assert!(store.find_by_id("   ").is_none());
        assert!(store.find_by_id("t-0000000").is_none());
    }

    #[test]
    fn queries_filter_by_kind() {
        let (store, _) = recording_store();
        store.save(make_task("A").into()).unwrap();
        store.save(make_task("B").into()).unwrap();
        store
            .save(Project::new("P", None).unwrap().into())
            .unwrap();

        assert_eq!(store.find_all_tasks().len(), 2);
        assert_eq!(store.find_all_projects().len(), 1);
        assert_eq!(
            store.stats(),
            StoreStats {
                total: 3,
                tasks: 2,
                projects: 1
            }
        );
    }

    #[test]
    fn snapshots_are_copies() {
        let (store, _) = recording_store();
        let task = make_task("Stable");
        let id = task.id().to_string();
        store.save(task.into()).unwrap();

        let mut snapshot = store.find_all_tasks();
        snapshot[0].set_status(Status::Done);

        assert_eq!(store.find_by_id(&id).unwrap().status(), Status::Todo);
    }

    #[test]
    fn iteration_order_is_stable() {
        let (store, _) = recording_store();
        for n in 0..10 {
            store.save(make_task(&format!("Task {n}")).into()).unwrap();
        }
        let first: Vec<_> = store.find_all_tasks().iter().map(|t| t.id().clone()).collect();
        let second: Vec<_> = store.find_all_tasks().iter().map(|t| t.id().clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn delete_unknown_or_blank_returns_false() {
        let (store, seen) = recording_store();
        store.save(make_task("Keep").into()).unwrap();
        seen.lock().clear();

        assert!(!store.delete("t-0000000"));
        assert!(!store.delete(""));
        assert!(!store.delete("  "));
        assert_eq!(store.len(), 1);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn delete_removes_and_notifies() {
        let (store, seen) = recording_store();
        let task = make_task("Doomed");
        let id = task.id().to_string();
        store.save(task.into()).unwrap();

        assert!(store.delete(&id));
        assert!(store.find_by_id(&id).is_none());
        assert!(!store.delete(&id));

        let events = seen.lock();
        let last = events.last().unwrap();
        assert_eq!(last.kind, EventKind::Deleted);
        assert_eq!(last.id, id);
        assert_eq!(last.message, "Task deleted: Doomed");
    }

    #[test]
    fn clear_removes_everything_silently() {
        let (store, seen) = recording_store();
        store.save(make_task("A").into()).unwrap();
        store.save(make_task("B").into()).unwrap();
        seen.lock().clear();

        store.clear().unwrap();

        assert!(store.is_empty());
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn update_edits_in_place() {
        let (store, seen) = recording_store();
        let task = make_task("Edit me");
        let id = task.id().to_string();
        store.save(task.into()).unwrap();

        let updated = store
            .update(&id, |item| {
                item.set_priority(Priority::Critical);
                Ok(())
            })
            .unwrap()
            .unwrap();

        assert_eq!(updated.priority(), Priority::Critical);
        assert_eq!(
            store.find_by_id(&id).unwrap().priority(),
            Priority::Critical
        );
        assert_eq!(seen.lock().last().unwrap().kind, EventKind::Updated);
    }

    #[test]
    fn failed_update_leaves_item_untouched() {
        let (store, _) = recording_store();
        let task = make_task("Keep title");
        let id = task.id().to_string();
        store.save(task.into()).unwrap();

        let result = store.update(&id, |item| {
            item.set_status(Status::Done);
            item.set_title("")
        });

        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
        let stored = store.find_by_id(&id).unwrap();
        assert_eq!(stored.title(), "Keep title");
        assert_eq!(stored.status(), Status::Todo);
    }

    #[test]
    fn update_unknown_id_is_none() {
        let (store, _) = recording_store();
        assert!(store.update("t-0000000", |_| Ok(())).unwrap().is_none());
        assert!(store.update("", |_| Ok(())).unwrap().is_none());
    }

    #[test]
    fn persistence_failures_are_not_propagated() {
        let store = Store::open(BrokenPersistence, Arc::new(Notifier::new())).unwrap();
        let task = make_task("Memory only");
        let id = task.id().to_string();

        assert!(store.save(task.into()).is_ok());
        assert!(store.find_by_id(&id).is_some());
        assert!(store.delete(&id));
        assert!(store.flush().is_err());
    }

    #[test]
    fn reopen_reloads_saved_tasks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.txt");

        let task = TaskBuilder::new("Survives")
            .priority(Priority::High)
            .status(Status::InProgress)
            .build()
            .unwrap();
        let id = task.id().to_string();
        {
            let store = Store::open(TextFileStore::new(&path), Arc::new(Notifier::new())).unwrap();
            store.save(task.into()).unwrap();
            store
                .save(Project::new("Not persisted", None).unwrap().into())
                .unwrap();
        }

        let store = Store::open(TextFileStore::new(&path), Arc::new(Notifier::new())).unwrap();
        assert_eq!(store.len(), 1);
        let loaded = store.find_by_id(&id).unwrap();
        assert_eq!(loaded.title(), "Survives");
        assert_eq!(loaded.priority(), Priority::High);
        assert_eq!(loaded.status(), Status::InProgress);
        assert!(store.find_all_projects().is_empty());
    }

    #[test]
    fn delete_is_flushed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.txt");
        let task = make_task("Short lived");
        let id = task.id().to_string();
        {
            let store = Store::open(TextFileStore::new(&path), Arc::new(Notifier::new())).unwrap();
            store.save(task.into()).unwrap();
            assert!(store.delete(&id));
        }

        let store = Store::open(TextFileStore::new(&path), Arc::new(Notifier::new())).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_saves_and_deletes() {
        let store = Arc::new(Store::in_memory(Arc::new(Notifier::new())));

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let mut ids = Vec::new();
                    for m in 0..25 {
                        let task = Task::new(&format!("T{n}-{m}"), None).unwrap();
                        ids.push(task.id().to_string());
                        store.save(task.into()).unwrap();
                    }
                    for id in ids.iter().step_by(5) {
                        assert!(store.delete(id));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 8 * 20);
    }

    #[test]
    fn project_children_follow_store_updates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.txt");
        let store = Store::open(TextFileStore::new(&path), Arc::new(Notifier::new())).unwrap();

        let task = make_task("Child");
        let task_id = task.id().to_string();
        let child = store.save(task.into()).unwrap();

        let mut project = Project::new("Parent", None).unwrap();
        project.add_component(child);
        let project_id = project.id().to_string();
        store.save(project.into()).unwrap();

        store
            .update(&task_id, |item| {
                item.set_status(Status::Done);
                Ok(())
            })
            .unwrap();
        let parent = store.find_by_id(&project_id).unwrap();
        let parent = parent.as_project().unwrap();
        assert_eq!(parent.components()[0].read().status(), Status::Done);

        store
            .update(&project_id, |item| {
                item.set_priority(Priority::Critical);
                Ok(())
            })
            .unwrap();
        let stored = store.find_by_id(&task_id).unwrap();
        assert_eq!(stored.status(), Status::Done);
        assert_eq!(stored.priority(), Priority::Critical);

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("|DONE|CRITICAL"));
    }

    #[test]
    fn replacing_keeps_the_shared_handle() {
        let (store, _) = recording_store();
        let mut task = make_task("Before");
        let first = store.save(task.clone().into()).unwrap();

        task.set_title("After").unwrap();
        let second = store.save(task.into()).unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(first.read().title(), "After");
    }

    #[test]
    fn deleted_child_stays_in_its_project() {
        let (store, _) = recording_store();
        let child = store.save(make_task("Orphan").into()).unwrap();
        let id = child.id().to_string();
        let mut project = Project::new("Parent", None).unwrap();
        project.add_component(child);

        assert!(store.delete(&id));
        assert_eq!(project.len(), 1);
        assert_eq!(project.components()[0].read().title(), "Orphan");
    }

    #[test]
    fn colliding_id_is_refused() {
        let (store, seen) = recording_store();
        let id: ItemId = "t-abc1234".parse().unwrap();
        let ours = Task::restore(id.clone(), "Ours", None, Status::Todo, Priority::Low).unwrap();
        store.save(ours.into()).unwrap();

        std::thread::sleep(Duration::from_millis(2));
        let theirs = Task::restore(id, "Theirs", None, Status::Done, Priority::High).unwrap();
        let result = store.save(theirs.into());

        assert_eq!(result.unwrap_err(), StoreError::IdConflict("t-abc1234".into()));
        assert_eq!(store.find_by_id("t-abc1234").unwrap().title(), "Ours");
        let kinds: Vec<_> = seen.lock().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Created]);
    }

    #[test]
    fn stats_count_by_kind() {
        let (store, _) = recording_store();
        assert_eq!(store.stats(), StoreStats::default());

        store.save(make_task("A").into()).unwrap();
        store
            .save(Project::new("P", None).unwrap().into())
            .unwrap();
        assert_eq!(
            store.stats(),
            StoreStats {
                total: 2,
                tasks: 1,
                projects: 1
            }
        );
    }
}

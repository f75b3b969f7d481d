//! # Storage Layer
//!
//! In-memory ownership of work items, the flat-file adapter behind it, and
//! the access guard in front of it.
//!
//! ## Storage Format
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | Pipe-delimited text, one record per line | `data/tasks.txt` |
//! | Config | TOML | `tasktree.toml` or `~/.config/tasktree/config.toml` |
//!
//! Projects live only in memory: the text format has no record kind for
//! them. Children a project got from [`Repository::save`] share the stored
//! item, so their edits are flushed with the tasks.
//!
//! ## Concurrency Safety
//!
//! - [`Store`] guards its map with a read/write lock; every call is atomic
//!   on its own
//! - Each item sits behind its own lock, taken after the map lock
//! - [`TextFileStore`] takes `fs2` file locks and writes atomically
//!   (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Repository`] - CRUD surface shared by the store and the guard
//! - [`Store`] - Thread-safe keyed collection with flush and notification
//! - [`Guarded`] - Identity check in front of any repository
//! - [`TextFileStore`] - Read/write tasks as pipe-delimited text
//! - [`Config`] - Application configuration

mod config;
mod guard;
mod legacy;
mod persistence;
mod store;
mod text;

pub use config::{Config, ConfigError, DisplayConfig, StorageConfig, UserConfig};
pub use guard::Guarded;
pub use legacy::LegacyTask;
pub use persistence::{NullPersistence, Persistence};
pub use store::{Repository, Store, StoreError, StoreStats};
pub use text::TextFileStore;

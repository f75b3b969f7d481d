//! Backing storage contract for the in-memory [`Store`](super::Store)

use anyhow::Result;

use crate::domain::Item;

/// Loads and flushes the full contents of a store.
///
/// The store calls [`Persistence::load`] once when it opens and
/// [`Persistence::flush`] with a complete snapshot after every successful
/// mutation. Implementations may drop item kinds they cannot represent.
pub trait Persistence: Send + Sync {
    fn load(&self) -> Result<Vec<Item>>;

    fn flush(&self, items: &[Item]) -> Result<()>;
}

/// Keeps nothing: loads empty and discards flushes
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPersistence;

impl Persistence for NullPersistence {
    fn load(&self) -> Result<Vec<Item>> {
        Ok(Vec::new())
    }

    fn flush(&self, _items: &[Item]) -> Result<()> {
        Ok(())
    }
}

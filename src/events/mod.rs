//! # Change Notification
//!
//! The [`Notifier`] keeps a list of [`Listener`]s and delivers every
//! lifecycle [`Event`] to all of them, synchronously and in registration
//! order. One failing listener never prevents delivery to the others.
//!
//! | Kind | Emitted by |
//! |------|------------|
//! | `CREATED` | `Store::save` for a new ID |
//! | `UPDATED` | `Store::save` replacing an existing ID, `Store::update` |
//! | `DELETED` | `Store::delete` when something was removed |
//! | `CLEARED` | the command layer after a bulk clear |

mod console;
mod notifier;

pub use console::ConsoleListener;
pub use notifier::{Event, EventKind, Listener, Notifier};

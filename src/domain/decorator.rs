//! Component decorators
//!
//! A decorator wraps any [`Component`] and forwards every member it does not
//! override, so decorated items can be passed wherever a component is
//! expected, including to the ordering strategies.

use std::borrow::Cow;

use super::component::{indent_str, Component, ModelError};
use super::id::ItemId;
use super::status::{Priority, Status};

const URGENT_PREFIX: &str = "URGENT: ";

/// Marks a component as urgent: prefixed title and a bannered display
#[derive(Debug, Clone)]
pub struct Urgent<C> {
    inner: C,
}

impl<C: Component> Urgent<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn urgency_message(&self) -> &'static str {
        "This item needs immediate attention!"
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Component> Component for Urgent<C> {
    fn id(&self) -> &ItemId {
        self.inner.id()
    }

    fn title(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{}{}", URGENT_PREFIX, self.inner.title()))
    }

    fn set_title(&mut self, title: &str) -> Result<(), ModelError> {
        self.inner.set_title(title)
    }

    fn status(&self) -> Status {
        self.inner.status()
    }

    fn set_status(&mut self, status: Status) {
        self.inner.set_status(status)
    }

    fn priority(&self) -> Priority {
        self.inner.priority()
    }

    fn set_priority(&mut self, priority: Priority) {
        self.inner.set_priority(priority)
    }

    fn is_leaf(&self) -> bool {
        self.inner.is_leaf()
    }

    fn display(&self, indent: usize) -> String {
        let pad = indent_str(indent);
        format!(
            "{pad}!! URGENT !!\n{}{pad}!! ATTENTION REQUIRED !!\n",
            self.inner.display(indent)
        )
    }
}

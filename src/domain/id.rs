//! Identifiers for tasks and projects
//!
//! ID Format:
//! - Task IDs: `t-{7-char-hash}` (e.g., `t-9d3e5f2`)
//! - Project IDs: `p-{7-char-hash}` (e.g., `p-7f2b4c1`)
//!
//! Hash is derived from title + creation timestamp + a process-wide sequence
//! number, so two items created with the same title in the same instant still
//! get different IDs.
//!
//! Parsing is lenient: any non-blank token without whitespace or `|` is a
//! valid ID, so data files written by older tools keep their identifiers.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("ID cannot be blank")]
    Blank,

    #[error("Invalid ID '{0}': must not contain whitespace or '|'")]
    InvalidCharacters(String),
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a 7-character hash from title, timestamp and a sequence number
fn generate_hash(title: &str, timestamp: DateTime<Utc>) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let input = format!(
        "{}{}{}",
        title,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        seq
    );
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Identifier shared by tasks and projects
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a fresh task ID (`t-` prefix)
    pub fn new_task(title: &str, timestamp: DateTime<Utc>) -> Self {
        Self(format!("t-{}", generate_hash(title, timestamp)))
    }

    /// Creates a fresh project ID (`p-` prefix)
    pub fn new_project(title: &str, timestamp: DateTime<Utc>) -> Self {
        Self(format!("p-{}", generate_hash(title, timestamp)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Blank);
        }
        if s.chars().any(|c| c.is_whitespace() || c == '|') {
            return Err(IdError::InvalidCharacters(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ItemId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

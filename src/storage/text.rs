//! Pipe-delimited text storage for tasks
//!
//! One record per line:
//!
//! ```text
//! TASK|<id>|<title>|<description>|<status>|<priority>
//! ```
//!
//! `\`, `|` and line breaks inside text fields are backslash-escaped. Lines
//! starting with `#` are comments and blank lines are ignored. Projects have
//! no record kind and are not written.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use fs2::FileExt;
use tracing::{debug, warn};

use super::config::Config;
use super::persistence::Persistence;
use crate::domain::{Component, Item, ItemId, Priority, Status, Task};

const TASK_RECORD: &str = "TASK";
const FIELD_COUNT: usize = 6;

/// Escapes a text field so it survives a round trip through one line
fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Splits a line on unescaped pipes and unescapes each field.
///
/// Only `\\`, `\|`, `\n` and `\r` are escapes. Any other backslash is kept
/// as written, so hand-edited paths like `C:\dir` survive a load.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some(c @ ('\\' | '|')) => current.push(c),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '|' => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

fn format_task(task: &Task) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        TASK_RECORD,
        task.id(),
        escape(&task.title()),
        escape(task.description().unwrap_or("")),
        task.status().as_str(),
        task.priority().as_str()
    )
}

/// Parses one data line. Unknown status or priority values fall back to the
/// defaults so files from older tools still load.
fn parse_task(line: &str) -> Result<Task> {
    let fields = split_record(line);
    if fields[0] != TASK_RECORD {
        anyhow::bail!("unsupported record kind '{}'", fields[0]);
    }
    if fields.len() < FIELD_COUNT {
        anyhow::bail!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            fields.len()
        );
    }

    let id: ItemId = fields[1].parse().context("invalid id")?;
    let status = fields[4].parse::<Status>().unwrap_or_else(|_| {
        debug!(value = %fields[4], "unknown status, using default");
        Status::default()
    });
    let priority = fields[5].parse::<Priority>().unwrap_or_else(|_| {
        debug!(value = %fields[5], "unknown priority, using default");
        Priority::default()
    });
    let description = Some(fields[3].as_str()).filter(|d| !d.is_empty());

    Task::restore(id, &fields[2], description, status, priority).context("invalid task")
}

/// Store for task data in the pipe-delimited text format
#[derive(Debug, Clone)]
pub struct TextFileStore {
    path: PathBuf,
}

impl TextFileStore {
    /// Creates a new text store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the store configured by `config`
    pub fn for_config(config: &Config) -> Self {
        Self::new(config.storage_path())
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every task record. A missing file is an empty store.
    pub fn read_all(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no data file yet, starting empty");
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open data file: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on data file")?;

        let reader = BufReader::new(&file);
        let mut tasks = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_task(&line) {
                Ok(task) => tasks.push(task),
                Err(e) => warn!(line = line_num + 1, error = %format!("{:#}", e), "skipping malformed record"),
            }
        }

        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Writes all tasks to the store (full rewrite)
    pub fn write_all<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("txt.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on data file")?;

            let mut writer = BufWriter::new(&file);
            writeln!(writer, "# tasktree data file").context("Failed to write header")?;
            writeln!(writer, "# generated: {}", Utc::now().to_rfc3339())
                .context("Failed to write header")?;
            writeln!(writer).context("Failed to write header")?;

            let mut count = 0;
            for task in tasks {
                writeln!(writer, "{}", format_task(task)).context("Failed to write task")?;
                count += 1;
            }

            writer.flush().context("Failed to flush data file")?;
            debug!(path = %self.path.display(), count, "wrote tasks");
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

impl Persistence for TextFileStore {
    fn load(&self) -> Result<Vec<Item>> {
        Ok(self.read_all()?.into_iter().map(Item::Task).collect())
    }

    fn flush(&self, items: &[Item]) -> Result<()> {
        self.write_all(items.iter().filter_map(Item::as_task))
    }
}

//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Create | New items | `add`, `urgent`, `project` |
//! | Inspect | Read items | `list`, `show`, `sort`, `filter`, `stats` |
//! | Change | Edit or remove items | `status`, `priority`, `delete`, `clear` |
//! | Interop | Legacy records | `export` |
//! | Session | Interactive loop | `shell` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! Event lines and logs go to stderr, so stdout stays parseable.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logging; `RUST_LOG` overrides it:
//! ```bash
//! tasktree --verbose list
//! RUST_LOG=tasktree=trace tasktree list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod shell;
mod task;

pub use app::{run, Cli, Commands, Session};
pub use output::{Output, OutputFormat};

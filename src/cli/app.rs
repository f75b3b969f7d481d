//! Main CLI application structure

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{shell, task};
use crate::domain::{Priority, SortKey, Status};
use crate::events::{ConsoleListener, Notifier};
use crate::storage::{Config, Guarded, Store, TextFileStore};

#[derive(Parser)]
#[command(name = "tasktree")]
#[command(author, version, about = "Hierarchical task and project tracker")]
#[command(propagate_version = true, args_override_self = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./tasktree.toml, then the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the data file (overrides storage.data_dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Identity presented to the access guard (overrides user.name)
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a task
    ///
    /// Examples:
    ///   tasktree add Write report
    ///   tasktree add "Fix login" --priority high --description "SSO only"
    Add {
        /// Task title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// Longer description
        #[arg(long, short)]
        description: Option<String>,

        /// low, medium, high, critical (or 1-4)
        #[arg(long, short)]
        priority: Option<Priority>,

        /// todo, in_progress, done, cancelled (or 1-4)
        #[arg(long, short)]
        status: Option<Status>,
    },

    /// Add a critical task flagged as urgent
    Urgent {
        /// Task title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// Longer description
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Add a project, optionally with tasks
    ///
    /// Each task is saved to the store and shared with the project.
    Project {
        /// Project title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// Longer description
        #[arg(long, short)]
        description: Option<String>,

        /// Task to create inside the project (repeatable)
        #[arg(long = "task", short = 't')]
        tasks: Vec<String>,
    },

    /// List every item
    List,

    /// Show one item in detail
    Show {
        /// Item ID
        id: String,
    },

    /// Delete an item
    Delete {
        /// Item ID
        id: String,
    },

    /// Change the status of an item
    Status {
        /// Item ID
        id: String,

        /// todo, in_progress, done, cancelled (or 1-4)
        status: Status,
    },

    /// Change the priority of an item
    Priority {
        /// Item ID
        id: String,

        /// low, medium, high, critical (or 1-4)
        priority: Priority,
    },

    /// List items in a chosen order
    Sort {
        /// title, priority or status (defaults to display.default_sort)
        key: Option<SortKey>,
    },

    /// List items with a given status
    Filter {
        /// todo, in_progress, done, cancelled (or 1-4)
        status: Status,
    },

    /// Show item counts
    Stats,

    /// Export tasks as legacy records
    Export,

    /// Remove every item
    Clear,

    /// Start an interactive session
    Shell,
}

/// Everything a command needs, built once per process
pub struct Session {
    config: Config,
    repo: Guarded<Store>,
    output: Output,
}

impl Session {
    /// Loads the store described by `config` behind an access guard for `identity`
    pub fn open(config: Config, identity: String, output: Output) -> Result<Self> {
        let persistence = TextFileStore::for_config(&config);
        let path = persistence.path().to_path_buf();

        let notifier = Arc::new(Notifier::new());
        notifier.add_listener(Arc::new(ConsoleListener));

        let store = Store::open(persistence, notifier)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        debug!(path = %path.display(), items = store.len(), user = %identity, "session opened");

        Ok(Self {
            config,
            repo: Guarded::new(store, identity),
            output,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repo(&self) -> &Guarded<Store> {
        &self.repo
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Runs one command against this session
    pub fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Add {
                title,
                description,
                priority,
                status,
            } => task::add(self, &title.join(" "), description, priority, status),
            Commands::Urgent { title, description } => {
                task::urgent(self, &title.join(" "), description)
            }
            Commands::Project {
                title,
                description,
                tasks,
            } => task::project(self, &title.join(" "), description.as_deref(), &tasks),
            Commands::List => task::list(self),
            Commands::Show { id } => task::show(self, &id),
            Commands::Delete { id } => task::delete(self, &id),
            Commands::Status { id, status } => task::set_status(self, &id, status),
            Commands::Priority { id, priority } => task::set_priority(self, &id, priority),
            Commands::Sort { key } => task::sort(self, key),
            Commands::Filter { status } => task::filter(self, status),
            Commands::Stats => task::stats(self),
            Commands::Export => task::export(self),
            Commands::Clear => task::clear(self),
            Commands::Shell => anyhow::bail!("Already in an interactive session"),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    // Ignored when a subscriber is already installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = Output::new(cli.format);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    let identity = cli.user.unwrap_or_else(|| config.user.effective_name());

    let session = Session::open(config, identity, output)?;

    match cli.command {
        Commands::Shell => shell::run(&session, io::stdin().lock()),
        command => session.execute(command),
    }?;

    debug!("command completed");
    Ok(())
}

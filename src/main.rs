//! tasktree - hierarchical task and project tracker

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = tasktree::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

//! Interactive session
//!
//! Each input line is parsed with the same command set as the binary, so
//! `add Buy milk --priority high` in the shell behaves like
//! `tasktree add Buy milk --priority high`. A failing command is reported and
//! the session carries on.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use tracing::debug;

use super::app::{Commands, Session};

/// Parser for one shell line (no binary name, no global flags)
#[derive(Parser)]
#[command(name = "tasktree", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

/// Splits a line into words; single or double quotes group words together
fn split_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        bail!("unterminated {} quote", q);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn prompt(session: &Session) -> Result<()> {
    let output = session.output();
    if !output.is_json() {
        output.text("tasktree> ");
        io::stdout().flush().context("Failed to flush stdout")?;
    }
    Ok(())
}

/// Handles one line, returning false when the session should end
fn step(session: &Session, line: &str) -> bool {
    let output = session.output();
    match line {
        "" => return true,
        "quit" | "exit" => return false,
        "help" | "?" => {
            output.line(&ShellLine::command().render_help().to_string());
            output.line("  quit, exit  Leave the shell");
            return true;
        }
        _ => {}
    }

    let words = match split_line(line) {
        Ok(words) => words,
        Err(e) => {
            output.error(&e.to_string());
            return true;
        }
    };

    match ShellLine::try_parse_from(words) {
        Ok(parsed) => {
            debug!(command = ?parsed.command, "shell command");
            if let Err(e) = session.execute(parsed.command) {
                output.error(&format!("{:#}", e));
            }
        }
        // Usage errors and `<command> --help` are both rendered by clap
        Err(e) => {
            let _ = e.print();
        }
    }
    true
}

/// Runs the read-eval-print loop until `quit`, `exit` or end of input
pub fn run(session: &Session, input: impl BufRead) -> Result<()> {
    let output = session.output();
    output.line("tasktree shell. Type 'help' for commands, 'quit' to leave.");
    prompt(session)?;

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        if !step(session, line.trim()) {
            break;
        }
        prompt(session)?;
    }

    output.line("");
    output.line("Goodbye.");
    Ok(())
}

//! Interactive shell.
//!
//! Reads commands with line editing and persistent history, and renders each
//! one through a single long-lived [`Session`], so repeated views are served
//! from the result cache. A failing command prints its error and the prompt
//! comes back.

use std::io::Write;
use std::path::Path;

use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use crate::cli::ViewCommand;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::views::{Notice, NoticeLevel};

const PROMPT: &str = "securecheck ❯ ";
const BANNER: &str = "SecureCheck interactive shell. Type 'help' for commands, 'exit' to leave.";

/// One line typed at the prompt.
#[derive(Debug, Parser)]
#[command(name = "securecheck", no_binary_name = true)]
#[command(disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    View(ViewCommand),

    /// Drop cached query results and re-read the database
    Refresh,

    /// Show result cache counters
    Cache,

    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

/// Whether the shell keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Prompt again.
    Continue,
    /// Leave the shell.
    Exit,
}

/// Split a command line into words.
///
/// Words are separated by whitespace. Single or double quotes group words,
/// and a backslash outside single quotes escapes the next character.
///
/// # Errors
///
/// Returns [`Error::InvalidField`] if a quote is left open.
pub fn split_command_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => word.push(c),
            (_, '\\') => {
                if let Some(next) = chars.next() {
                    word.push(next);
                }
                in_word = true;
            }
            (Some(_), c) => word.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(Error::invalid_field("command", line, "matching quotes"));
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

/// Run one line against the session.
///
/// Parse and view errors are written to `out`.
///
/// # Errors
///
/// Returns an error only if output fails.
pub fn execute_line(session: &Session, line: &str, out: &mut dyn Write) -> Result<Flow> {
    let words = match split_command_line(line) {
        Ok(words) if words.is_empty() => return Ok(Flow::Continue),
        Ok(words) => words,
        Err(e) => {
            writeln!(out, "{}", Notice::new(NoticeLevel::Error, e.to_string()))?;
            return Ok(Flow::Continue);
        }
    };

    let command = match ShellLine::try_parse_from(words) {
        Ok(parsed) => parsed.command,
        Err(e) => {
            // Help and usage errors both land here
            write!(out, "{e}")?;
            return Ok(Flow::Continue);
        }
    };

    match command {
        ShellCommand::View(view) => {
            debug!("Shell command: {:?}", view);
            if let Err(e) = session.run(view, out) {
                warn!("Command failed: {}", e);
                writeln!(out, "{}", Notice::new(NoticeLevel::Error, e.to_string()))?;
            }
        }
        ShellCommand::Refresh => {
            let cleared = session.refresh();
            let message = format!("Cleared {cleared} cached results");
            writeln!(out, "{}", Notice::new(NoticeLevel::Info, message))?;
        }
        ShellCommand::Cache => {
            let stats = session.cache_stats();
            writeln!(out, "Hits:    {}", stats.hits)?;
            writeln!(out, "Misses:  {}", stats.misses)?;
            writeln!(out, "Entries: {}", stats.entries)?;
        }
        ShellCommand::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

/// Read and run commands until `exit` or end of input.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or history cannot be
/// saved.
pub fn run(session: &Session, history_path: &Path) -> Result<()> {
    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut editor = DefaultEditor::with_config(config)?;

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    if history_path.exists() {
        editor.load_history(history_path)?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{BANNER}")?;

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if execute_line(session, &line, &mut out)? == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {}
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    editor.save_history(history_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::fixture_database;

    fn session() -> Session {
        Session::with_database(Config::default(), fixture_database())
    }

    fn execute(session: &Session, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = execute_line(session, line, &mut out).unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_split_plain_words() {
        assert_eq!(
            split_command_line("  query  3 -f json ").unwrap(),
            vec!["query", "3", "-f", "json"]
        );
        assert!(split_command_line("   ").unwrap().is_empty());
    }

    #[test]
    fn test_split_quotes() {
        assert_eq!(
            split_command_line(r#"query "Country with most searches""#).unwrap(),
            vec!["query", "Country with most searches"]
        );
        assert_eq!(
            split_command_line(r"traffic --country 'New \ Zealand'").unwrap(),
            vec!["traffic", "--country", r"New \ Zealand"]
        );
        assert_eq!(split_command_line(r#"a "" b"#).unwrap(), vec!["a", "", "b"]);
    }

    #[test]
    fn test_split_escapes() {
        assert_eq!(
            split_command_line(r"traffic --country New\ Zealand").unwrap(),
            vec!["traffic", "--country", "New Zealand"]
        );
    }

    #[test]
    fn test_split_unterminated_quote() {
        assert!(split_command_line(r#"query "open"#).is_err());
    }

    #[test]
    fn test_blank_line_continues() {
        let (flow, text) = execute(&session(), "");
        assert_eq!(flow, Flow::Continue);
        assert!(text.is_empty());
    }

    #[test]
    fn test_exit() {
        assert_eq!(execute(&session(), "exit").0, Flow::Exit);
        assert_eq!(execute(&session(), "quit").0, Flow::Exit);
    }

    #[test]
    fn test_view_command() {
        let (flow, text) = execute(&session(), "traffic --list-countries");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(text, "All\nCanada\nUSA\nIndia\n");
    }

    #[test]
    fn test_unknown_command_keeps_going() {
        let (flow, text) = execute(&session(), "launch rockets");
        assert_eq!(flow, Flow::Continue);
        assert!(text.contains("launch"));
    }

    #[test]
    fn test_failing_view_keeps_going() {
        let (flow, text) = execute(&session(), "query 42");
        assert_eq!(flow, Flow::Continue);
        assert!(text.contains('✖'));
        assert!(text.contains("42"));
    }

    #[test]
    fn test_help_lists_commands() {
        let (_, text) = execute(&session(), "help");
        assert!(text.contains("dashboard"));
        assert!(text.contains("refresh"));
    }

    #[test]
    fn test_refresh_and_cache() {
        let session = session();
        execute(&session, "dashboard");

        let (_, text) = execute(&session, "cache");
        assert!(text.contains("Misses:  1"));
        assert!(text.contains("Entries: 1"));

        let (_, text) = execute(&session, "refresh");
        assert!(text.contains("Cleared 1 cached results"));
        assert_eq!(session.cache_stats().entries, 0);
    }
}

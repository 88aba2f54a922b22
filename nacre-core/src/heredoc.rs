//! Here-document capture.
//!
//! Each `<<` operand is captured before its pipeline runs: a helper process reads lines
//! from standard input until the limiter, writes them to a temporary file in the working
//! directory, and the command then reads that file as its standard input.

use std::fs::File;
use std::io::{BufWriter, IsTerminal, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use nacre_parser::Token;
use nix::sys::wait::WaitStatus;
use nix::unistd::ForkResult;

use crate::expansion::WordExpander;
use crate::input::{self, LineRead};
use crate::{Shell, error, sys, trace_categories};

/// Maximum number of here-documents allowed on a single line.
pub const MAX_HERE_DOCUMENTS: usize = 16;

const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Tracks the temporary files backing captured here-documents.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    counter: usize,
    paths: Vec<PathBuf>,
}

impl Registry {
    /// Reserves a new, unique temporary file path in `dir`.
    fn next_path(&mut self, dir: &Path) -> PathBuf {
        let path = dir.join(format!(".heredoc_{}", self.counter));
        self.counter += 1;
        self.paths.push(path.clone());
        path
    }

    /// Removes every temporary file registered so far.
    pub(crate) fn cleanup(&mut self) {
        for path in self.paths.drain(..) {
            if let Err(err) = std::fs::remove_file(&path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("failed to remove {}: {err}", path.display());
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// Captures the here-document introduced by the given limiter, returning the file its
/// body was written to, opened for reading.
///
/// Body lines are expanded unless any part of the limiter was quoted.
///
/// # Arguments
///
/// * `shell` - The shell capturing the here-document.
/// * `limiter` - The word following the `<<` operator.
pub(crate) fn capture(shell: &mut Shell, limiter: &Token) -> Result<File, error::Error> {
    let dir = shell.working_dir().to_path_buf();
    let path = shell.heredocs_mut().next_path(&dir);

    let body = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(&path)?;

    tracing::debug!(
        target: trace_categories::HEREDOC,
        "capturing here-document until {:?} into {}",
        limiter.text,
        path.display()
    );

    // Only the helper should react to SIGINT while the body is read.
    let guard = sys::signal::IgnoreGuard::new()?;

    match sys::process::fork()? {
        ForkResult::Child => {
            let expander = (!limiter.is_quoted()).then(|| WordExpander::for_shell(shell));
            let code = match read_body(shell.shell_name(), &limiter.text, expander, body) {
                Ok(code) => code,
                Err(err) => {
                    eprintln!("{}: {err}", shell.shell_name());
                    1
                }
            };
            sys::process::exit_child(code)
        }
        ForkResult::Parent { child } => {
            drop(body);
            let status = sys::process::wait_for(child);
            drop(guard);

            match status? {
                WaitStatus::Exited(_, 0) => Ok(File::open(&path)?),
                WaitStatus::Exited(_, INTERRUPTED_EXIT_CODE) | WaitStatus::Signaled(..) => {
                    Err(error::Error::HereDocumentAborted)
                }
                status => {
                    tracing::debug!(target: trace_categories::HEREDOC, "helper ended with {status:?}");
                    Err(error::Error::HereDocumentFailed)
                }
            }
        }
    }
}

fn read_body(
    shell_name: &str,
    limiter: &str,
    expander: Option<WordExpander<'_>>,
    body: File,
) -> Result<u8, error::Error> {
    sys::signal::install_heredoc_handlers()?;

    let show_prompt = std::io::stdin().is_terminal();
    let mut reader = input::stdin_reader()?;
    let mut writer = BufWriter::new(body);

    loop {
        if show_prompt {
            eprint!("> ");
            std::io::stderr().flush()?;
        }

        match input::read_line_from(&mut reader)? {
            LineRead::Line(line) if line == limiter => break,
            LineRead::Line(line) => {
                let line = match &expander {
                    Some(expander) => expander.expand_line(&line),
                    None => line,
                };
                writeln!(writer, "{line}")?;
            }
            LineRead::Eof => {
                eprintln!(
                    "{shell_name}: warning: here-document delimited by end-of-file (wanted `{limiter}')"
                );
                break;
            }
            LineRead::Interrupted => {
                if show_prompt {
                    eprintln!();
                }
                return Ok(130);
            }
        }
    }

    writer.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn registry_paths_are_unique() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut registry = Registry::default();

        let first = registry.next_path(dir.path());
        let second = registry.next_path(dir.path());
        assert_eq!(first, dir.path().join(".heredoc_0"));
        assert_eq!(second, dir.path().join(".heredoc_1"));

        std::fs::write(&first, "body")?;
        registry.cleanup();

        assert!(!first.exists());
        assert!(registry.paths().is_empty());

        assert_eq!(registry.next_path(dir.path()), dir.path().join(".heredoc_2"));
        Ok(())
    }
}

//! Grouping of tokens into pipeline stages, with their redirections applied.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;

use nacre_parser::{OperatorKind, RedirectKind, Token, TokenKind, TokenList};

use crate::{
    Shell, error, heredoc,
    openfiles::{OpenFile, OpenFiles},
    trace_categories,
};

/// Represents the context for executing a built-in command.
pub struct ExecutionContext<'a> {
    /// The shell in which the command is being executed.
    pub shell: &'a mut Shell,
    /// The name of the command being executed.
    pub command_name: String,
    /// The open files tracked by the current context.
    pub open_files: OpenFiles,
}

impl ExecutionContext<'_> {
    /// Returns the standard output file; usable with `write!` et al.
    pub const fn stdout(&mut self) -> &mut OpenFile {
        self.open_files.stdout()
    }

    /// Returns the standard error file; usable with `write!` et al.
    pub const fn stderr(&mut self) -> &mut OpenFile {
        self.open_files.stderr()
    }

    /// Writes an error message to standard error, prefixed with the names of the shell and
    /// the command.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to write.
    pub fn report_error(&mut self, message: impl std::fmt::Display) -> std::io::Result<()> {
        let prefix = format!("{}: {}", self.shell.shell_name(), self.command_name);
        writeln!(self.open_files.stderr(), "{prefix}: {message}")
    }
}

/// Where one of a command's standard streams comes from or goes to.
#[derive(Debug, Default)]
pub enum Redirection {
    /// Not redirected; the stream is inherited (or wired to a pipe).
    #[default]
    Inherit,
    /// A redirection failed; the command must not run.
    Failed,
    /// The stream was redirected to an open file.
    Open(OpenFile),
}

/// One stage of a pipeline, ready to run.
#[derive(Debug, Default)]
pub struct Command {
    /// The command name; the first argument, if any.
    pub name: Option<String>,
    /// The arguments, including the command name.
    pub args: Vec<String>,
    /// The command's standard input.
    pub infile: Redirection,
    /// The command's standard output.
    pub outfile: Redirection,
    /// Redirection errors reported while building the command.
    pub errors: Vec<String>,
}

impl Command {
    /// Returns whether one of the command's redirections failed.
    pub const fn is_failed(&self) -> bool {
        matches!(self.infile, Redirection::Failed) || matches!(self.outfile, Redirection::Failed)
    }

    fn fail(&mut self, kind: RedirectKind, message: String) {
        match kind {
            RedirectKind::In | RedirectKind::Heredoc => self.infile = Redirection::Failed,
            RedirectKind::Out | RedirectKind::Append => self.outfile = Redirection::Failed,
        }
        self.errors.push(message);
    }
}

/// Builds the stages of a pipeline from an expanded token list, opening redirection
/// targets and capturing here-documents along the way.
///
/// A failed redirection marks its command as failed (and is reported) without failing
/// the pipeline. Errors are returned only for conditions that abandon the whole line.
///
/// # Arguments
///
/// * `shell` - The shell the pipeline will run in.
/// * `tokens` - The expanded tokens of the line.
pub(crate) fn build_commands(
    shell: &mut Shell,
    tokens: &mut TokenList,
) -> Result<Vec<Command>, error::Error> {
    if tokens.iter().any(|token| {
        matches!(
            token.operator_kind(),
            Some(OperatorKind::LParen | OperatorKind::RParen)
        )
    }) {
        return Err(error::Error::SubshellUnsupported);
    }

    let heredoc_count = tokens
        .iter()
        .filter(|token| token.operator_kind() == Some(OperatorKind::Heredoc))
        .count();
    if heredoc_count > heredoc::MAX_HERE_DOCUMENTS {
        return Err(error::Error::TooManyHereDocuments);
    }

    let mut commands = vec![];
    for (index, (start, end)) in blocks(tokens).into_iter().enumerate() {
        let mut command = Command::default();

        for token in &mut tokens[start..end] {
            if token.kind != TokenKind::Word {
                continue;
            }

            match token.redirect_context {
                Some(kind) => apply_redirect(shell, &mut command, kind, token)?,
                None => command.args.append(&mut token.fields),
            }
        }

        command.name = command.args.first().cloned();

        for message in &command.errors {
            shell.report(message);
        }

        tracing::debug!(target: trace_categories::COMMANDS, "built stage {index}: {:?}", command.args);
        commands.push(command);
    }

    Ok(commands)
}

/// Returns the half-open token ranges of the pipeline's stages.
fn blocks(tokens: &[Token]) -> Vec<(usize, usize)> {
    let mut ranges = vec![];
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        if token.operator_kind() == Some(OperatorKind::Pipe) {
            ranges.push((start, i));
            start = i + 1;
        }
    }
    ranges.push((start, tokens.len()));

    ranges
}

fn apply_redirect(
    shell: &mut Shell,
    command: &mut Command,
    kind: RedirectKind,
    token: &mut Token,
) -> Result<(), error::Error> {
    // Here-documents are read even for a failed command, so the input stays in step.
    if kind == RedirectKind::Heredoc {
        let file = heredoc::capture(shell, token)?;
        if !command.is_failed() {
            command.infile = Redirection::Open(file.into());
        }
        return Ok(());
    }

    if command.is_failed() {
        return Ok(());
    }

    let Some(file_name) = token.resolved_file.take().filter(|_| !token.ambiguous) else {
        command.fail(kind, format!("{}: ambiguous redirect", token.raw));
        return Ok(());
    };

    match open_redirect_target(&file_name, kind) {
        Ok(file) => {
            let redirection = Redirection::Open(file.into());
            if kind == RedirectKind::In {
                command.infile = redirection;
            } else {
                command.outfile = redirection;
            }
        }
        Err(err) => {
            let reason = error::describe_io_error(&err);
            command.fail(kind, format!("{file_name}: {reason}"));
        }
    }

    Ok(())
}

fn open_redirect_target(file_name: &str, kind: RedirectKind) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    match kind {
        RedirectKind::In | RedirectKind::Heredoc => options.read(true),
        RedirectKind::Out => options.write(true).create(true).truncate(true).mode(0o644),
        RedirectKind::Append => options.append(true).create(true).mode(0o644),
    };

    options.open(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn tokens(line: &str) -> Result<TokenList> {
        Ok(nacre_parser::tokenize(line)?)
    }

    #[test]
    fn splits_blocks_at_pipes() -> Result<()> {
        let tokens = tokens("a | b c | d")?;
        assert_eq!(blocks(&tokens), vec![(0, 1), (2, 4), (5, 6)]);
        Ok(())
    }

    #[test]
    fn open_modes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out");
        let name = path.to_string_lossy().into_owned();

        std::fs::write(&path, "old contents\n")?;
        drop(open_redirect_target(&name, RedirectKind::Append)?);
        assert_eq!(std::fs::read_to_string(&path)?, "old contents\n");

        drop(open_redirect_target(&name, RedirectKind::Out)?);
        assert_eq!(std::fs::read_to_string(&path)?, "");

        let missing = dir.path().join("missing").to_string_lossy().into_owned();
        let err = open_redirect_target(&missing, RedirectKind::In).err();
        assert_eq!(
            err.map(|e| e.kind()),
            Some(std::io::ErrorKind::NotFound)
        );
        Ok(())
    }

    #[test]
    fn failed_command_records_error() {
        let mut command = Command::default();
        assert!(!command.is_failed());
        command.fail(RedirectKind::Out, "x: Permission denied".into());
        assert!(command.is_failed());
        assert!(matches!(command.outfile, Redirection::Failed));
        assert_eq!(command.errors, vec!["x: Permission denied"]);
    }
}

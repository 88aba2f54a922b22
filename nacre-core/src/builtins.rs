//! Infrastructure for shell built-in commands.

use clap::Parser;

use crate::commands;
use crate::error;
use crate::openfiles::OpenFiles;
use crate::{ExecutionResult, Shell};

mod cd;
mod echo;
mod env;
mod exit;
mod export;
mod factory;
mod history;
mod pwd;
mod unset;

pub(crate) use factory::get_default_builtins;
pub use factory::{SimpleCommand, builtin, simple_builtin};

/// Result of executing a built-in command.
pub struct BuiltinResult {
    /// The exit code from the command.
    pub exit_code: ExitCode,
}

/// Exit codes for built-in commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitCode {
    /// The command was successful.
    Success,
    /// The inputs to the command were invalid.
    InvalidUsage,
    /// The command returned a specific custom numerical exit code.
    Custom(u8),
    /// The command is requesting to exit the shell, yielding the given exit code.
    ExitShell(u8),
}

impl From<ExitCode> for ExecutionResult {
    fn from(exit_code: ExitCode) -> Self {
        match exit_code {
            ExitCode::Success => Self::success(),
            ExitCode::InvalidUsage => Self::new(2),
            ExitCode::Custom(code) => Self::new(code),
            ExitCode::ExitShell(code) => Self::exit_shell(code),
        }
    }
}

/// Type of a function implementing a built-in command.
///
/// # Arguments
///
/// * The context in which the command is being executed.
/// * The arguments to the command, including its name.
pub type CommandExecuteFunc =
    fn(commands::ExecutionContext<'_>, Vec<String>) -> Result<BuiltinResult, error::Error>;

/// Trait implemented by built-in shell commands.
pub trait Command: Parser {
    /// Instantiates the built-in command with the given arguments.
    ///
    /// # Arguments
    ///
    /// * `args` - The arguments to the command, including its name.
    fn new<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        Self::try_parse_from(args)
    }

    /// Executes the built-in command in the provided context.
    ///
    /// # Arguments
    ///
    /// * `context` - The context in which the command is being executed.
    fn execute(&self, context: commands::ExecutionContext<'_>) -> Result<ExitCode, error::Error>;
}

/// Encapsulates a registration for a built-in command.
#[derive(Clone)]
pub struct Registration {
    /// Function to execute the builtin.
    pub execute_func: CommandExecuteFunc,

    /// Does the builtin change the state of the shell itself? Such builtins run in the
    /// shell process when they make up a whole pipeline.
    pub modifies_shell: bool,
}

impl Registration {
    /// Marks the builtin as one that changes the shell's own state.
    #[must_use]
    pub const fn modifies_shell(self) -> Self {
        Self {
            modifies_shell: true,
            ..self
        }
    }
}

/// Runs a registered builtin, reporting any error it returns.
///
/// # Arguments
///
/// * `shell` - The shell the builtin runs in.
/// * `name` - The name the builtin was invoked as.
/// * `registration` - The builtin's registration.
/// * `args` - The arguments, including the name.
/// * `open_files` - The builtin's standard streams.
pub(crate) fn invoke(
    shell: &mut Shell,
    name: &str,
    registration: &Registration,
    args: Vec<String>,
    open_files: OpenFiles,
) -> ExecutionResult {
    let context = commands::ExecutionContext {
        shell: &mut *shell,
        command_name: name.to_owned(),
        open_files,
    };

    match (registration.execute_func)(context, args) {
        Ok(result) => result.exit_code.into(),
        Err(err) => {
            tracing::debug!(target: crate::trace_categories::COMMANDS, "builtin {name} failed: {err:?}");
            shell.report(format!("{name}: {err}"));
            ExecutionResult::general_error()
        }
    }
}

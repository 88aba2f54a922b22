use std::collections::HashMap;
use std::io::Write;

#[allow(clippy::wildcard_imports)]
use super::*;

use crate::builtins;
use crate::commands;
use crate::error;

/// A simple command that can be registered as a built-in; it receives its arguments
/// unparsed.
pub trait SimpleCommand {
    /// Executes the built-in command.
    ///
    /// # Arguments
    ///
    /// * `context` - The context in which the command is being executed.
    /// * `args` - The arguments to the command, including its name.
    fn execute<I: Iterator<Item = S>, S: AsRef<str>>(
        context: commands::ExecutionContext<'_>,
        args: I,
    ) -> Result<builtins::BuiltinResult, error::Error>;
}

/// Returns a built-in command registration, given an implementation of the
/// `SimpleCommand` trait.
pub fn simple_builtin<B: SimpleCommand>() -> builtins::Registration {
    builtins::Registration {
        execute_func: exec_simple_builtin::<B>,
        modifies_shell: false,
    }
}

/// Returns a built-in command registration, given an implementation of the
/// `Command` trait.
pub fn builtin<B: builtins::Command>() -> builtins::Registration {
    builtins::Registration {
        execute_func: exec_builtin::<B>,
        modifies_shell: false,
    }
}

fn exec_simple_builtin<T: SimpleCommand>(
    context: commands::ExecutionContext<'_>,
    args: Vec<String>,
) -> Result<builtins::BuiltinResult, error::Error> {
    T::execute(context, args.into_iter())
}

fn exec_builtin<T: builtins::Command>(
    mut context: commands::ExecutionContext<'_>,
    args: Vec<String>,
) -> Result<builtins::BuiltinResult, error::Error> {
    let command = match T::new(args) {
        Ok(command) => command,
        Err(e) => {
            write!(context.stderr(), "{e}")?;
            return Ok(builtins::BuiltinResult {
                exit_code: builtins::ExitCode::InvalidUsage,
            });
        }
    };

    Ok(builtins::BuiltinResult {
        exit_code: command.execute(context)?,
    })
}

pub(crate) fn get_default_builtins() -> HashMap<String, builtins::Registration> {
    let mut m = HashMap::<String, builtins::Registration>::new();

    //
    // Builtins that change the shell's own state.
    //

    m.insert("cd".into(), builtin::<cd::CdCommand>().modifies_shell());
    m.insert(
        "exit".into(),
        simple_builtin::<exit::ExitCommand>().modifies_shell(),
    );
    m.insert(
        "export".into(),
        builtin::<export::ExportCommand>().modifies_shell(),
    );
    m.insert(
        "unset".into(),
        builtin::<unset::UnsetCommand>().modifies_shell(),
    );
    m.insert(
        "history".into(),
        builtin::<history::HistoryCommand>().modifies_shell(),
    );

    //
    // Builtins that only produce output.
    //

    m.insert("echo".into(), simple_builtin::<echo::EchoCommand>());
    m.insert("env".into(), simple_builtin::<env::EnvCommand>());
    m.insert("pwd".into(), builtin::<pwd::PwdCommand>());

    m
}

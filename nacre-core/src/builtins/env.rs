use std::io::Write;

use crate::{builtins, commands, error};

/// Print the environment.
pub(crate) struct EnvCommand;

impl builtins::SimpleCommand for EnvCommand {
    fn execute<I: Iterator<Item = S>, S: AsRef<str>>(
        mut context: commands::ExecutionContext<'_>,
        mut args: I,
    ) -> Result<builtins::BuiltinResult, error::Error> {
        if args.nth(1).is_some() {
            context.report_error("too many arguments")?;
            return Ok(builtins::BuiltinResult {
                exit_code: builtins::ExitCode::Custom(1),
            });
        }

        let entries: Vec<String> = context.shell.env().iter().map(ToString::to_string).collect();
        for entry in entries {
            writeln!(context.stdout(), "{entry}")?;
        }

        Ok(builtins::BuiltinResult {
            exit_code: builtins::ExitCode::Success,
        })
    }
}

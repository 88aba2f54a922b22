use std::io::Write;

use crate::{builtins, commands, error};

/// Exit the shell.
pub(crate) struct ExitCommand;

impl builtins::SimpleCommand for ExitCommand {
    fn execute<I: Iterator<Item = S>, S: AsRef<str>>(
        mut context: commands::ExecutionContext<'_>,
        args: I,
    ) -> Result<builtins::BuiltinResult, error::Error> {
        let args: Vec<String> = args.skip(1).map(|arg| arg.as_ref().to_owned()).collect();

        if context.shell.is_interactive() && !context.shell.is_subshell() {
            writeln!(context.stderr(), "exit")?;
        }

        let exit_code = match args.as_slice() {
            [] => builtins::ExitCode::ExitShell(context.shell.last_exit_status()),
            [arg, rest @ ..] => match parse_exit_code(arg) {
                None => {
                    context.report_error(format!("{arg}: numeric argument required"))?;
                    builtins::ExitCode::ExitShell(2)
                }
                Some(_) if !rest.is_empty() => {
                    context.report_error("too many arguments")?;
                    builtins::ExitCode::Custom(1)
                }
                Some(code) => builtins::ExitCode::ExitShell(code),
            },
        };

        Ok(builtins::BuiltinResult { exit_code })
    }
}

/// Parses an exit code argument, reducing it modulo 256.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_exit_code(arg: &str) -> Option<u8> {
    let value = arg.trim().parse::<i64>().ok()?;
    Some(value.rem_euclid(256) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exit_code_parsing() {
        assert_eq!(parse_exit_code("0"), Some(0));
        assert_eq!(parse_exit_code("42"), Some(42));
        assert_eq!(parse_exit_code("256"), Some(0));
        assert_eq!(parse_exit_code("-1"), Some(255));
        assert_eq!(parse_exit_code("+7"), Some(7));
        assert_eq!(parse_exit_code("abc"), None);
        assert_eq!(parse_exit_code(""), None);
        assert_eq!(parse_exit_code("99999999999999999999"), None);
    }
}

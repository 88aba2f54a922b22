use std::io::Write;

use crate::{builtins, commands, error};

/// Echo text to standard output.
pub(crate) struct EchoCommand;

/// Returns whether the argument is a run of `n` flags, such as `-n` or `-nnn`.
fn is_no_newline_flag(arg: &str) -> bool {
    arg.strip_prefix('-')
        .is_some_and(|flags| !flags.is_empty() && flags.chars().all(|c| c == 'n'))
}

impl builtins::SimpleCommand for EchoCommand {
    fn execute<I: Iterator<Item = S>, S: AsRef<str>>(
        mut context: commands::ExecutionContext<'_>,
        args: I,
    ) -> Result<builtins::BuiltinResult, error::Error> {
        let mut args = args.skip(1).peekable();

        let mut trailing_newline = true;
        while args.next_if(|arg| is_no_newline_flag(arg.as_ref())).is_some() {
            trailing_newline = false;
        }

        let mut s = args
            .map(|arg| arg.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(" ");

        if trailing_newline {
            s.push('\n');
        }

        write!(context.stdout(), "{s}")?;
        context.stdout().flush()?;

        Ok(builtins::BuiltinResult {
            exit_code: builtins::ExitCode::Success,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_flags() {
        assert!(is_no_newline_flag("-n"));
        assert!(is_no_newline_flag("-nnnn"));
        assert!(!is_no_newline_flag("-"));
        assert!(!is_no_newline_flag("-na"));
        assert!(!is_no_newline_flag("n"));
        assert!(!is_no_newline_flag("--n"));
    }
}

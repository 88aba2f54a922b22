use std::io::Write;

use clap::Parser;

use crate::{builtins, commands, error};

/// Display or clear the command history.
#[derive(Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub(crate) struct HistoryCommand {
    /// Clear the history list.
    #[arg(short = 'c')]
    clear: bool,

    /// Only display the last `count` entries.
    count: Option<usize>,
}

impl builtins::Command for HistoryCommand {
    fn execute(
        &self,
        mut context: commands::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, error::Error> {
        if self.clear {
            context.shell.history_mut().clear();
            return Ok(builtins::ExitCode::Success);
        }

        let history = context.shell.history();
        let skip = self
            .count
            .map_or(0, |count| history.count().saturating_sub(count));

        let lines = history
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(index, line)| format!("{:5}  {line}", index + 1))
            .collect::<Vec<_>>();

        for line in lines {
            writeln!(context.stdout(), "{line}")?;
        }

        Ok(builtins::ExitCode::Success)
    }
}

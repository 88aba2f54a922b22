use std::io::Write;

use clap::Parser;

use crate::{builtins, commands, error};

/// Display the current working directory.
#[derive(Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub(crate) struct PwdCommand {
    #[arg(
        short = 'P',
        help = "print the physical directory, without any symbolic links"
    )]
    physical: bool,

    #[arg(short = 'L', help = "print the logical directory (the default)")]
    logical: bool,

    /// Ignored.
    #[arg(hide = true, allow_hyphen_values = true)]
    ignored: Vec<String>,
}

impl builtins::Command for PwdCommand {
    fn execute(
        &self,
        mut context: commands::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, error::Error> {
        let cwd = if self.physical && !self.logical {
            context.shell.working_dir().canonicalize()?
        } else {
            context.shell.working_dir().to_path_buf()
        };

        writeln!(context.stdout(), "{}", cwd.to_string_lossy())?;

        Ok(builtins::ExitCode::Success)
    }
}

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use crate::{builtins, commands, error};

/// Change the current shell working directory.
#[derive(Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub(crate) struct CdCommand {
    /// The directory to change to; defaults to `$HOME`. If it is "-", it is converted to
    /// `$OLDPWD`.
    #[arg(allow_hyphen_values = true)]
    target_dirs: Vec<String>,
}

impl builtins::Command for CdCommand {
    fn execute(
        &self,
        mut context: commands::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, error::Error> {
        if self.target_dirs.len() > 1 {
            context.report_error("too many arguments")?;
            return Ok(builtins::ExitCode::Custom(1));
        }

        let mut should_print = false;
        let target_dir = match self.target_dirs.first().map(String::as_str) {
            // `cd -' is equivalent to `cd $OLDPWD'
            Some("-") => {
                should_print = true;
                if let Some(oldpwd) = context.shell.env().get("OLDPWD") {
                    PathBuf::from(oldpwd)
                } else {
                    context.report_error("OLDPWD not set")?;
                    return Ok(builtins::ExitCode::Custom(1));
                }
            }
            Some(dir) => PathBuf::from(dir),
            // `cd' without arguments is equivalent to `cd $HOME'
            None => {
                if let Some(home) = context.shell.env().get("HOME") {
                    PathBuf::from(home)
                } else {
                    context.report_error("HOME not set")?;
                    return Ok(builtins::ExitCode::Custom(1));
                }
            }
        };

        if let Err(err) = context.shell.set_working_dir(&target_dir) {
            let reason = match &err {
                error::Error::IoError(io_err) => error::describe_io_error(io_err),
                error::Error::NotADirectory(_) => "Not a directory".to_owned(),
                other => other.to_string(),
            };
            context.report_error(format!("{}: {reason}", target_dir.display()))?;
            return Ok(builtins::ExitCode::Custom(1));
        }

        if should_print {
            let cwd = context.shell.working_dir().to_string_lossy().into_owned();
            writeln!(context.stdout(), "{cwd}")?;
        }

        Ok(builtins::ExitCode::Success)
    }
}

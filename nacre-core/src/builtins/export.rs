use std::io::Write;

use clap::Parser;
use itertools::Itertools;

use crate::{builtins, commands, env, error};

/// Add or update exported shell variables.
#[derive(Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub(crate) struct ExportCommand {
    /// Display all exported names.
    #[arg(short = 'p')]
    display_exported_names: bool,

    /// Names to export, each optionally with a value (`NAME=VALUE`).
    #[arg(allow_hyphen_values = true)]
    declarations: Vec<String>,
}

impl builtins::Command for ExportCommand {
    fn execute(
        &self,
        mut context: commands::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, error::Error> {
        if self.declarations.is_empty() {
            display_exported(&mut context)?;
            return Ok(builtins::ExitCode::Success);
        }

        let mut result = builtins::ExitCode::Success;
        for decl in &self.declarations {
            let (name, value) = match decl.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (decl.as_str(), None),
            };

            if !env::valid_variable_name(name) {
                context.report_error(format!("`{decl}': not a valid identifier"))?;
                result = builtins::ExitCode::Custom(1);
                continue;
            }

            match value {
                Some(value) => context.shell.env_mut().set(name, value),
                None => context.shell.env_mut().export_mark(name),
            }
        }

        Ok(result)
    }
}

fn display_exported(context: &mut commands::ExecutionContext<'_>) -> Result<(), error::Error> {
    let lines = context
        .shell
        .env()
        .iter_exported()
        .sorted_by(|a, b| a.name.cmp(&b.name))
        .map(|entry| match &entry.value {
            Some(value) => format!("declare -x {}=\"{value}\"", entry.name),
            None => format!("declare -x {}", entry.name),
        })
        .collect::<Vec<_>>();

    for line in lines {
        writeln!(context.stdout(), "{line}")?;
    }

    Ok(())
}

use clap::Parser;

use crate::{builtins, commands, env, error};

/// Unset variables.
#[derive(Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub(crate) struct UnsetCommand {
    /// Names of variables to unset.
    #[arg(allow_hyphen_values = true)]
    names: Vec<String>,
}

impl builtins::Command for UnsetCommand {
    fn execute(
        &self,
        mut context: commands::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, error::Error> {
        let mut result = builtins::ExitCode::Success;

        for name in &self.names {
            if !env::valid_variable_name(name) {
                context.report_error(format!("`{name}': not a valid identifier"))?;
                result = builtins::ExitCode::Custom(1);
                continue;
            }

            // Unsetting a name that was never set is not an error.
            let _ = context.shell.env_mut().unset(name);
        }

        Ok(result)
    }
}

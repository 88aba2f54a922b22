//! Execution of command lines.

use crate::commands;
use crate::expansion::WordExpander;
use crate::interp;
use crate::results::ExecutionResult;
use crate::{error, trace_categories};

impl crate::Shell {
    /// Validates, tokenizes, expands and runs a single line of input.
    ///
    /// The last exit status is *not* updated; see [`Self::process_line`].
    ///
    /// # Arguments
    ///
    /// * `line` - The line to run, without its trailing newline.
    pub fn run_string(&mut self, line: &str) -> Result<ExecutionResult, error::Error> {
        nacre_parser::validate(line)?;

        let mut tokens = nacre_parser::tokenize(line)?;
        if tokens.is_empty() {
            return Ok(ExecutionResult::new(self.last_exit_status));
        }

        WordExpander::for_shell(self).expand_tokens(&mut tokens);
        tracing::debug!(target: trace_categories::EXPANSION, "expanded tokens: {tokens:?}");

        let commands = commands::build_commands(self, &mut tokens)?;
        interp::execute_pipeline(self, commands)
    }

    /// Processes a line read from the user: records it in history, runs it, reports any
    /// error, and updates the last exit status. Here-document files created for the line
    /// are removed before returning.
    ///
    /// # Arguments
    ///
    /// * `line` - The line to process, without its trailing newline.
    pub fn process_line(&mut self, line: &str) -> ExecutionResult {
        if line.trim().is_empty() {
            return ExecutionResult::new(self.last_exit_status);
        }

        self.history.add(line);

        let result = match self.run_string(line) {
            Ok(result) => result,
            Err(err) => {
                if err.is_system_error() {
                    tracing::error!("{err}");
                }
                if !matches!(err, error::Error::HereDocumentAborted) {
                    self.report(&err);
                }
                ExecutionResult::new(err.exit_status())
            }
        };

        self.heredocs.cleanup();
        self.last_exit_status = result.exit_code.into();

        result
    }
}

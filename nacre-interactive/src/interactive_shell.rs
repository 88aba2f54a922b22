use nacre_core::ExecutionExitCode;

use crate::{InputBackend, InteractivePrompt, Options, ReadResult, ShellError};

/// Represents an interactive shell that displays prompts, reads user input one line at a
/// time, and runs it.
pub struct InteractiveShell<'a, IB: InputBackend> {
    /// The underlying shell instance.
    shell: &'a mut nacre_core::Shell,
    /// The input backend to use.
    input: IB,
    /// Options.
    options: Options,
}

impl<'a, IB: InputBackend> InteractiveShell<'a, IB> {
    /// Creates a new `InteractiveShell` wrapping the given shell instance.
    ///
    /// # Arguments
    ///
    /// * `shell` - The shell instance to wrap.
    /// * `input` - The input backend to use.
    /// * `options` - The options to use.
    pub const fn new(shell: &'a mut nacre_core::Shell, input: IB, options: Options) -> Self {
        Self {
            shell,
            input,
            options,
        }
    }

    /// Runs the read loop until the shell is asked to exit or input runs out, returning
    /// the status the shell should exit with. History is saved before returning.
    pub fn run_interactively(&mut self) -> Result<u8, ShellError> {
        nacre_core::sys::signal::install_interactive_handlers()?;

        let exit_code = loop {
            if let Some(code) = self.run_interactively_once()? {
                break code;
            }
        };

        self.shell.shutdown();

        Ok(exit_code)
    }

    /// Reads and runs a single line. Returns the exit code if the shell should exit.
    fn run_interactively_once(&mut self) -> Result<Option<u8>, ShellError> {
        let prompt = self.options.show_prompt.then(|| InteractivePrompt {
            prompt: self.options.prompt.clone(),
        });

        match self.input.read_line(prompt.as_ref())? {
            ReadResult::Input(line) => {
                let result = self.shell.process_line(&line);
                if result.is_exit() {
                    return Ok(Some(result.exit_code.into()));
                }
            }
            ReadResult::Interrupted => {
                // The line being typed is discarded.
                if self.options.show_prompt {
                    eprintln!();
                }
                self.shell
                    .set_last_exit_status(ExecutionExitCode::Interrupted.into());
            }
            ReadResult::Eof => {
                if self.shell.is_interactive() {
                    eprintln!("exit");
                }
                return Ok(Some(self.shell.last_exit_status()));
            }
        }

        Ok(None)
    }
}

use crate::ShellError;

/// Represents an input backend for reading lines of input.
pub trait InputBackend {
    /// Reads a line of input, using the given prompt.
    ///
    /// # Arguments
    ///
    /// * `prompt` - The prompt to display to the user, if any.
    fn read_line(&mut self, prompt: Option<&InteractivePrompt>) -> Result<ReadResult, ShellError>;
}

/// Result of a read operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadResult {
    /// The user entered a line of input.
    Input(String),
    /// End of input was reached.
    Eof,
    /// The user interrupted the input operation.
    Interrupted,
}

/// Represents an interactive prompt.
#[derive(Clone, Debug)]
pub struct InteractivePrompt {
    /// Prompt to display.
    pub prompt: String,
}

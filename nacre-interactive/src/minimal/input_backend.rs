use std::io::{Read, Write};

use nacre_core::input::{self, LineRead};

use crate::{InputBackend, InteractivePrompt, ReadResult, ShellError};

/// Represents a minimal input backend, taking commands one line at a time from any
/// reader (standard input by default). Prompts are written to standard error.
pub struct MinimalInputBackend<R: Read = std::fs::File> {
    reader: R,
}

impl MinimalInputBackend {
    /// Returns a backend reading from the process's standard input.
    pub fn new() -> Result<Self, ShellError> {
        Ok(Self::with_reader(input::stdin_reader()?))
    }
}

impl<R: Read> MinimalInputBackend<R> {
    /// Returns a backend reading from the given source.
    ///
    /// # Arguments
    ///
    /// * `reader` - The source to read lines from.
    pub const fn with_reader(reader: R) -> Self {
        Self { reader }
    }

    fn display_prompt(prompt: &str) -> Result<(), ShellError> {
        eprint!("{prompt}");
        std::io::stderr().flush()?;
        Ok(())
    }
}

impl<R: Read> InputBackend for MinimalInputBackend<R> {
    fn read_line(&mut self, prompt: Option<&InteractivePrompt>) -> Result<ReadResult, ShellError> {
        if let Some(prompt) = prompt {
            Self::display_prompt(&prompt.prompt)?;
        }

        let result = match input::read_line_from(&mut self.reader).map_err(ShellError::InputError)? {
            LineRead::Line(line) => ReadResult::Input(line),
            LineRead::Eof => ReadResult::Eof,
            LineRead::Interrupted => ReadResult::Interrupted,
        };

        tracing::trace!(target: nacre_core::trace_categories::INPUT, "read: {result:?}");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_lines_until_eof() -> Result<()> {
        let mut backend = MinimalInputBackend::with_reader("echo a\n\nexit 3".as_bytes());

        assert_eq!(backend.read_line(None)?, ReadResult::Input("echo a".into()));
        assert_eq!(backend.read_line(None)?, ReadResult::Input(String::new()));
        assert_eq!(backend.read_line(None)?, ReadResult::Input("exit 3".into()));
        assert_eq!(backend.read_line(None)?, ReadResult::Eof);
        Ok(())
    }
}

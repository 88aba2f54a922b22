//! Library implementing the interactive read loop of the nacre shell.

#![deny(missing_docs)]

mod error;
pub use error::ShellError;

mod input_backend;
pub use input_backend::{InputBackend, InteractivePrompt, ReadResult};

mod interactive_shell;
pub use interactive_shell::InteractiveShell;

mod options;
pub use options::Options;

// Minimal backend, reading unbuffered lines from standard input.
mod minimal;
pub use minimal::MinimalInputBackend;

//! Core implementation of the nacre shell. Implements the shell's abstraction, its
//! interpreter, and the facilities used internally by the shell: word expansion,
//! redirections, here-documents, and process execution.

pub mod builtins;
mod commands;
pub mod env;
mod error;
mod expansion;
mod heredoc;
pub mod history;
pub mod input;
mod interp;
mod openfiles;
mod pathsearch;
mod results;
mod shell;
pub mod sys;
pub mod trace_categories;
mod wellknownvars;

pub use commands::ExecutionContext;
pub use error::Error;
pub use openfiles::{OpenFile, OpenFiles, pipe};
pub use pathsearch::{ResolveError, resolve_command};
pub use results::{ExecutionControlFlow, ExecutionExitCode, ExecutionResult};
pub use shell::{CreateOptions, DEFAULT_HISTORY_FILE_NAME, Shell};

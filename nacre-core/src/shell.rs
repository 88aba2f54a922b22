use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::env::Environment;
use crate::{builtins, error, heredoc, history, sys, wellknownvars};

mod execution;
mod fs;
mod history_file;

/// Default name of the history file, relative to the shell's initial working directory.
pub const DEFAULT_HISTORY_FILE_NAME: &str = ".nacre_history";

/// Options for creating a new shell.
#[derive(Clone, Debug)]
pub struct CreateOptions {
    /// Whether the shell is interactive.
    pub interactive: bool,
    /// Path to the history file; relative paths are resolved against the initial working
    /// directory. If `None`, history is kept in memory only.
    pub history_file: Option<PathBuf>,
    /// Maximum number of history entries to retain.
    pub max_history_entries: usize,
    /// Name of the shell, used to prefix error messages.
    pub shell_name: String,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            interactive: false,
            history_file: Some(PathBuf::from(DEFAULT_HISTORY_FILE_NAME)),
            max_history_entries: history::DEFAULT_MAX_ENTRIES,
            shell_name: "nacre".into(),
        }
    }
}

/// Represents an instance of a shell.
pub struct Shell {
    /// The shell environment, containing its variables.
    env: Environment,

    /// The current working directory.
    working_dir: PathBuf,

    /// The status of the last completed command.
    last_exit_status: u8,

    /// Process ID of the shell itself; the value of `$$`.
    shell_pid: u32,

    /// Whether this process is a forked child running a pipeline stage.
    in_subshell: bool,

    /// Command history.
    history: history::History,

    /// Resolved path of the history file, if any.
    history_file_path: Option<PathBuf>,

    /// Temporary files backing the current line's here-documents.
    heredocs: heredoc::Registry,

    /// Builtin commands.
    builtins: HashMap<String, builtins::Registration>,

    /// Options the shell was created with.
    options: CreateOptions,
}

impl Shell {
    /// Returns a new shell instance created with the given options.
    ///
    /// The environment is inherited from the current process, `SHLVL` and `PWD` are
    /// updated, and the history file (if any) is loaded.
    ///
    /// # Arguments
    ///
    /// * `options` - The options to use when creating the shell.
    pub fn new(options: CreateOptions) -> Result<Self, error::Error> {
        let working_dir = std::env::current_dir()?;
        let history_file_path = options
            .history_file
            .as_ref()
            .map(|path| working_dir.join(path));

        let mut shell = Self {
            env: Environment::from_process(),
            working_dir,
            last_exit_status: 0,
            shell_pid: sys::process::current_pid(),
            in_subshell: false,
            history: history::History::new(options.max_history_entries),
            history_file_path,
            heredocs: heredoc::Registry::default(),
            builtins: builtins::get_default_builtins(),
            options,
        };

        wellknownvars::init_well_known_vars(&mut shell)?;
        shell.load_history();

        Ok(shell)
    }

    /// Returns the shell's environment.
    pub const fn env(&self) -> &Environment {
        &self.env
    }

    /// Returns a mutable reference to the shell's environment.
    pub const fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Returns the exit status of the last command executed in this shell.
    pub const fn last_exit_status(&self) -> u8 {
        self.last_exit_status
    }

    /// Updates the last exit status.
    ///
    /// # Arguments
    ///
    /// * `status` - The new exit status.
    pub const fn set_last_exit_status(&mut self, status: u8) {
        self.last_exit_status = status;
    }

    /// Returns the process ID of the shell.
    pub const fn shell_pid(&self) -> u32 {
        self.shell_pid
    }

    /// Returns the shell's current working directory.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Returns the name of the shell.
    pub fn shell_name(&self) -> &str {
        &self.options.shell_name
    }

    /// Returns whether the shell is interactive.
    pub const fn is_interactive(&self) -> bool {
        self.options.interactive
    }

    /// Returns whether this process is running a pipeline stage on the shell's behalf.
    pub const fn is_subshell(&self) -> bool {
        self.in_subshell
    }

    /// Marks this process as a forked pipeline stage.
    pub(crate) const fn enter_subshell(&mut self) {
        self.in_subshell = true;
    }

    /// Returns the registered builtins.
    pub const fn builtins(&self) -> &HashMap<String, builtins::Registration> {
        &self.builtins
    }

    /// Returns the shell's command history.
    pub const fn history(&self) -> &history::History {
        &self.history
    }

    /// Returns a mutable reference to the shell's command history.
    pub const fn history_mut(&mut self) -> &mut history::History {
        &mut self.history
    }

    pub(crate) const fn heredocs_mut(&mut self) -> &mut heredoc::Registry {
        &mut self.heredocs
    }

    /// Writes a message to standard error, prefixed with the shell's name.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to write.
    pub fn report(&self, message: impl Display) {
        eprintln!("{}: {message}", self.options.shell_name);
    }

    /// Releases the resources held by the shell, saving its history.
    pub fn shutdown(&mut self) {
        self.heredocs.cleanup();
        if let Err(err) = self.save_history() {
            tracing::warn!("failed to save history: {err}");
        }
    }
}

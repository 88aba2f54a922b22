//! Persistence of the shell's command history.

use crate::{error, history};

impl crate::Shell {
    /// Loads the history file, if one is configured. A missing file leaves the history
    /// empty; other failures are logged.
    pub(super) fn load_history(&mut self) {
        let Some(path) = &self.history_file_path else {
            return;
        };

        match history::History::import(path, self.options.max_history_entries) {
            Ok(history) => self.history = history,
            Err(error::Error::IoError(err)) if err.kind() == std::io::ErrorKind::NotFound => (),
            Err(err) => tracing::warn!("failed to load history from {}: {err}", path.display()),
        }
    }

    /// Saves history back to the history file, if one is configured.
    pub fn save_history(&self) -> Result<(), error::Error> {
        if let Some(path) = &self.history_file_path {
            self.history.flush(path)?;
        }

        Ok(())
    }
}

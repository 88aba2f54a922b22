//! Facilities for tracking and persisting the shell's command history.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::error;

/// Default number of entries retained in the history.
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// A bounded ring of previously entered command lines; the oldest entry is evicted once
/// the ring is full.
#[derive(Clone, Debug)]
pub struct History {
    items: VecDeque<String>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl History {
    /// Constructs an empty history.
    ///
    /// # Arguments
    ///
    /// * `max_entries` - The maximum number of entries to retain.
    pub fn new(max_entries: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Constructs a new `History` instance, with its contents initialized from the given saved
    /// history file. Only the most recent `max_entries` lines are kept.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the history file.
    /// * `max_entries` - The maximum number of entries to retain.
    pub fn import(path: impl AsRef<Path>, max_entries: usize) -> Result<Self, error::Error> {
        let mut history = Self::new(max_entries);

        let file = std::fs::File::open(path.as_ref())?;
        let reader = std::io::BufReader::new(file);

        for line in reader.lines() {
            let line = line?;
            if !line.is_empty() {
                history.push(line);
            }
        }

        Ok(history)
    }

    /// Records a command line. Empty lines and lines identical to the most recent entry
    /// are not recorded. Returns whether the line was added.
    ///
    /// # Arguments
    ///
    /// * `line` - The command line to record.
    pub fn add(&mut self, line: &str) -> bool {
        if line.trim().is_empty() || self.items.back().is_some_and(|last| last == line) {
            return false;
        }

        self.push(line.to_owned());
        true
    }

    fn push(&mut self, line: String) {
        if self.max_entries == 0 {
            return;
        }

        while self.items.len() >= self.max_entries {
            self.items.pop_front();
        }
        self.items.push_back(line);
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Rewrites the history file with the current entries.
    ///
    /// # Arguments
    ///
    /// * `history_file_path` - The path to the history file.
    pub fn flush(&self, history_file_path: impl AsRef<Path>) -> Result<(), error::Error> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(history_file_path.as_ref())?;

        let mut writer = std::io::BufWriter::new(file);
        for item in &self.items {
            writeln!(writer, "{item}")?;
        }

        writer.flush()?;

        Ok(())
    }

    /// Returns an iterator over the entries, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.items.iter().map(String::as_str)
    }

    /// Returns the number of entries in the history.
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn skips_empty_and_repeated_lines() {
        let mut history = History::default();
        assert!(history.add("ls"));
        assert!(!history.add("ls"));
        assert!(!history.add("   "));
        assert!(history.add("pwd"));
        assert!(history.add("ls"));

        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["ls", "pwd", "ls"]);
    }

    #[test]
    fn evicts_oldest() {
        let mut history = History::new(3);
        for line in ["a", "b", "c", "d"] {
            history.add(line);
        }

        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["b", "c", "d"]);
    }

    #[test]
    fn import_trims_to_capacity() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("history");
        std::fs::write(&path, "one\n\ntwo\nthree\n")?;

        let history = History::import(&path, 2)?;
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["two", "three"]);
        Ok(())
    }

    #[test]
    fn flush_rewrites_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("history");
        std::fs::write(&path, "stale\nstale\nstale\n")?;

        let mut history = History::default();
        history.add("echo hi");
        history.add("exit");
        history.flush(&path)?;

        assert_eq!(std::fs::read_to_string(&path)?, "echo hi\nexit\n");

        let reloaded = History::import(&path, DEFAULT_MAX_ENTRIES)?;
        assert_eq!(reloaded.count(), 2);
        Ok(())
    }
}

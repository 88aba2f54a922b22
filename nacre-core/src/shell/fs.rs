//! Working directory management.

use std::path::{Path, PathBuf};

use normalize_path::NormalizePath as _;

use crate::error;

impl crate::Shell {
    /// Sets the shell's current working directory to the given path, updating `PWD`
    /// and `OLDPWD`.
    ///
    /// # Arguments
    ///
    /// * `target_dir` - The path to set as the working directory.
    pub fn set_working_dir(&mut self, target_dir: impl AsRef<Path>) -> Result<(), error::Error> {
        let abs_path = self.absolute_path(target_dir.as_ref());

        match std::fs::metadata(&abs_path) {
            Ok(m) => {
                if !m.is_dir() {
                    return Err(error::Error::NotADirectory(abs_path));
                }
            }
            Err(e) => {
                return Err(e.into());
            }
        }

        // Normalize the path (but don't canonicalize it).
        let cleaned_path = abs_path.normalize();

        std::env::set_current_dir(&cleaned_path)?;

        // An OLDPWD is synthesized from PWD before it is overwritten.
        if !self.env.contains("OLDPWD") {
            if let Some(pwd) = self.env.get("PWD").map(ToOwned::to_owned) {
                self.env.set("OLDPWD", pwd);
            }
        }

        let oldpwd = std::mem::replace(&mut self.working_dir, cleaned_path);

        self.env
            .set("OLDPWD", oldpwd.to_string_lossy().into_owned());
        self.env
            .set("PWD", self.working_dir.to_string_lossy().into_owned());

        Ok(())
    }

    /// Returns the given path, made absolute relative to the working directory.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to make absolute.
    pub fn absolute_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

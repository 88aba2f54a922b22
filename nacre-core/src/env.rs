//! Implements the shell's environment store.

use std::ffi::CString;
use std::fmt::Display;

use crate::error;

/// A single entry in the environment: a name with an optional value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvEntry {
    /// The name of the variable.
    pub name: String,
    /// The value of the variable; `None` for names exported without a value.
    pub value: Option<String>,
}

impl Display for EnvEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Represents the environment owned by a shell session.
///
/// Two ordered collections are maintained: the entries with a value, which form the
/// environment handed to child processes, and the exported names, which additionally
/// include names exported without ever being given a value.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    envp: Vec<EnvEntry>,
    exported: Vec<EnvEntry>,
}

/// Checks whether the given string is a valid variable name.
///
/// # Arguments
///
/// * `name` - The name to check.
pub fn valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

impl Environment {
    /// Returns an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an environment populated from the given name/value pairs; entries with
    /// invalid names are skipped.
    ///
    /// # Arguments
    ///
    /// * `vars` - The pairs to populate the environment with.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut env = Self::new();
        for (name, value) in vars {
            let name = name.into();
            if valid_variable_name(&name) {
                env.set(name, value.into());
            }
        }
        env
    }

    /// Returns an environment populated from the current process's environment.
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars_os().map(|(name, value)| {
            (
                name.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        }))
    }

    /// Looks up the value of a variable.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.envp
            .iter()
            .find(|entry| entry.name == name)
            .and_then(|entry| entry.value.as_deref())
    }

    /// Returns whether the given name is known to the environment at all, including names
    /// exported without a value.
    ///
    /// # Arguments
    ///
    /// * `name` - The name to look for.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some() || self.exported.iter().any(|entry| entry.name == name)
    }

    /// Sets a variable, replacing it in place if already present or appending it otherwise.
    /// The variable is exported.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the variable.
    /// * `value` - The value to assign.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        upsert(&mut self.envp, &name, Some(value.clone()));
        upsert(&mut self.exported, &name, Some(value));
    }

    /// Removes a variable, preserving the order of the remaining entries. Returns whether
    /// anything was removed.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the variable.
    pub fn unset(&mut self, name: &str) -> bool {
        let before = self.envp.len() + self.exported.len();
        self.envp.retain(|entry| entry.name != name);
        self.exported.retain(|entry| entry.name != name);
        before != self.envp.len() + self.exported.len()
    }

    /// Ensures the given name is exported, even if it has no value.
    ///
    /// # Arguments
    ///
    /// * `name` - The name to export.
    pub fn export_mark(&mut self, name: &str) {
        if !self.exported.iter().any(|entry| entry.name == name) {
            let value = self.get(name).map(ToOwned::to_owned);
            self.exported.push(EnvEntry {
                name: name.to_owned(),
                value,
            });
        }
    }

    /// Returns an iterator over the entries with values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EnvEntry> {
        self.envp.iter()
    }

    /// Returns an iterator over the exported entries, in insertion order.
    pub fn iter_exported(&self) -> impl Iterator<Item = &EnvEntry> {
        self.exported.iter()
    }

    /// Renders the entries with values as `NAME=VALUE` strings suitable for `execve`.
    pub fn to_envp(&self) -> Result<Vec<CString>, error::Error> {
        let mut envp = Vec::with_capacity(self.envp.len());
        for entry in &self.envp {
            envp.push(CString::new(entry.to_string())?);
        }
        Ok(envp)
    }
}

fn upsert(entries: &mut Vec<EnvEntry>, name: &str, value: Option<String>) {
    if let Some(entry) = entries.iter_mut().find(|entry| entry.name == name) {
        entry.value = value;
    } else {
        entries.push(EnvEntry {
            name: name.to_owned(),
            value,
        });
    }
}

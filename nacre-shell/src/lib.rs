//! Crate for nacre, a small POSIX-style interactive shell.

pub mod args;
pub mod config;
pub mod entry;
pub mod events;
mod productinfo;

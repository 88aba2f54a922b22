//! Trace utilities

/// Trace category for command execution.
pub const COMMANDS: &str = "commands";
/// Trace category for word expansion.
pub const EXPANSION: &str = "expansion";
/// Trace category for here-document capture.
pub const HEREDOC: &str = "heredoc";
/// Trace category for user input.
pub const INPUT: &str = "input";
/// Trace category for parsing.
pub const PARSE: &str = "parse";

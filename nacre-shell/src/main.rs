//! Implements the command-line interface for the `nacre` shell.

/// Main entry point for the `nacre` shell.
fn main() {
    nacre_shell::entry::run();
}

//! Command-line argument handling. The shell accepts no arguments; anything given is
//! collected only so it can be rejected with a usage message.

use clap::Parser;

use crate::productinfo;

/// Parsed command-line arguments for the nacre shell.
#[derive(Parser, Debug)]
#[clap(name = productinfo::PRODUCT_NAME,
       disable_help_flag = true,
       disable_version_flag = true)]
#[allow(clippy::module_name_repetitions)]
pub struct CommandLineArgs {
    /// Arguments that were passed anyway.
    #[arg(hide = true, allow_hyphen_values = true, trailing_var_arg = true)]
    pub unexpected: Vec<String>,
}

/// Error returned when the shell is invoked with arguments.
#[derive(Debug, thiserror::Error)]
#[error("{}: usage: {} (no arguments accepted)", productinfo::PRODUCT_NAME, productinfo::PRODUCT_NAME)]
pub struct UsageError;

impl CommandLineArgs {
    /// Parses the given arguments (including the program name), rejecting any beyond the
    /// program name.
    ///
    /// # Arguments
    ///
    /// * `args` - The arguments to parse.
    pub fn parse_args<I, S>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString> + Clone,
    {
        let parsed = Self::try_parse_from(args).map_err(|_| UsageError)?;
        if parsed.unexpected.is_empty() {
            Ok(parsed)
        } else {
            Err(UsageError)
        }
    }
}

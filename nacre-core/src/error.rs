use std::path::PathBuf;

/// Monolithic error type for the shell
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input line was not syntactically valid.
    #[error("{0}")]
    ParseError(#[from] nacre_parser::ParseError),

    /// The input line could not be tokenized.
    #[error("{0}")]
    TokenizerError(#[from] nacre_parser::TokenizerError),

    /// Parenthesized pipelines were used.
    #[error("subshell grouping is not supported")]
    SubshellUnsupported,

    /// More here-documents were requested on one line than are allowed.
    #[error("maximum here-document count exceeded")]
    TooManyHereDocuments,

    /// Here-document capture was interrupted by the user.
    #[error("here-document capture aborted")]
    HereDocumentAborted,

    /// Here-document capture failed in its helper process.
    #[error("failed to capture here-document")]
    HereDocumentFailed,

    /// The given path is not a directory.
    #[error("{}: Not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// An I/O error occurred.
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    /// A system error occurred.
    #[error("system error: {0}")]
    ErrnoError(#[from] nix::errno::Errno),

    /// An error occurred while creating a child process.
    #[error("failed to create child process: {0}")]
    ChildCreationFailure(String),

    /// The given open file cannot be read from.
    #[error("cannot read from {0}")]
    OpenFileNotReadable(&'static str),

    /// The given open file cannot be written to.
    #[error("cannot write to {0}")]
    OpenFileNotWritable(&'static str),

    /// A string destined for a child process contained a NUL byte.
    #[error("argument contains an embedded NUL byte")]
    NulInArgument(#[from] std::ffi::NulError),
}

impl Error {
    /// Returns the exit status a failed line reports for this error.
    pub const fn exit_status(&self) -> u8 {
        match self {
            Self::ParseError(_) | Self::SubshellUnsupported | Self::TooManyHereDocuments => 2,
            Self::HereDocumentAborted => 130,
            _ => 1,
        }
    }

    /// Returns whether the error reflects a failure of the system itself (as opposed to
    /// a problem with the line being run).
    pub const fn is_system_error(&self) -> bool {
        matches!(self, Self::ErrnoError(_) | Self::ChildCreationFailure(_))
    }
}

/// Describes an I/O error the way the C library does, without the error code suffix that
/// `std::io::Error` appends.
///
/// # Arguments
///
/// * `err` - The error to describe.
pub(crate) fn describe_io_error(err: &std::io::Error) -> String {
    err.raw_os_error().map_or_else(
        || err.to_string(),
        |code| nix::errno::Errno::from_raw(code).desc().to_owned(),
    )
}

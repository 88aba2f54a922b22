/// Represents a syntax error found while validating a line of input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line contained a token that is not valid at its position.
    #[error("syntax error near unexpected token `{token}'")]
    UnexpectedToken {
        /// The text of the offending token; `newline` at end of input.
        token: String,
        /// Byte offset of the offending token in the line.
        offset: usize,
    },

    /// A quoted substring was not terminated before the end of the line.
    #[error("unexpected EOF while looking for matching `{quote}'")]
    UnterminatedQuote {
        /// The quote character that was left open.
        quote: char,
        /// Byte offset of the opening quote.
        offset: usize,
    },
}

impl ParseError {
    /// Returns the byte offset in the line at which the error was detected.
    pub const fn offset(&self) -> usize {
        match self {
            Self::UnexpectedToken { offset, .. } | Self::UnterminatedQuote { offset, .. } => {
                *offset
            }
        }
    }
}

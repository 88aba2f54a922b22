//! Implements the grammar validator and tokenizer used by the nacre shell.
//!
//! Input lines are first checked against the shell grammar with [`validate`], which
//! walks the string without allocating any tokens. Lines that pass are then split into
//! a [`TokenList`] by [`tokenize`].

mod error;
mod tokenizer;
mod validator;

pub use error::ParseError;
pub use tokenizer::{
    OperatorKind, Quoting, RedirectKind, Token, TokenKind, TokenList, TokenizerError,
    WordSegment, drop_empty_words, tokenize,
};
pub use validator::validate;

//! Grammar validation for a single line of input.
//!
//! The recognizer accepts:
//!
//! ```text
//! input    := WS* pipeline WS* EOF
//! pipeline := WS* command (WS* '|' WS* pipeline)?
//! command  := simple_cmd | '(' pipeline ')' redirect*
//! redirect := ('<' | '>' | '<<' | '>>') WS* word
//! word     := (bare | '...' | "...")+
//! ```

use std::cell::Cell;

use winnow::combinator::{alt, eof, peek};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::stream::LocatingSlice;
use winnow::token::{any, take_while};

use crate::error::ParseError;
use crate::tokenizer::{is_blank, is_special};

/// Type alias for parser error
type PError = winnow::error::ErrMode<ContextError>;

/// Type alias for input stream
type StrStream<'a> = LocatingSlice<&'a str>;

#[derive(Clone, Copy, Debug)]
enum Failure {
    UnexpectedToken,
    UnterminatedQuote(char),
}

/// Records where validation first failed; the grammar never needs to backtrack past a
/// failure, so the first one recorded is the one reported.
struct ValidationContext {
    original_len: usize,
    failure: Cell<Option<(usize, Failure)>>,
}

impl ValidationContext {
    const fn new(line: &str) -> Self {
        Self {
            original_len: line.len(),
            failure: Cell::new(None),
        }
    }

    fn offset(&self, input: &StrStream<'_>) -> usize {
        self.original_len - input.len()
    }

    fn fail(&self, input: &StrStream<'_>, failure: Failure) -> PError {
        if self.failure.get().is_none() {
            self.failure.set(Some((self.offset(input), failure)));
        }
        winnow::error::ErrMode::Backtrack(ContextError::default())
    }
}

/// Checks that a line of input is syntactically valid.
///
/// Blank lines are valid. No tokens are produced; see [`crate::tokenize`] for that.
///
/// # Arguments
///
/// * `line` - The line to validate, without its trailing newline.
pub fn validate(line: &str) -> Result<(), ParseError> {
    let ctx = ValidationContext::new(line);
    let mut stream = LocatingSlice::new(line);

    match input_line(&ctx, &mut stream) {
        Ok(()) => Ok(()),
        Err(_) => {
            let (offset, failure) = ctx
                .failure
                .get()
                .unwrap_or((ctx.offset(&stream), Failure::UnexpectedToken));

            let err = match failure {
                Failure::UnexpectedToken => ParseError::UnexpectedToken {
                    token: offending_token(line, offset),
                    offset,
                },
                Failure::UnterminatedQuote(quote) => ParseError::UnterminatedQuote { quote, offset },
            };

            tracing::debug!(target: "parse", "rejected {line:?}: {err}");
            Err(err)
        }
    }
}

fn offending_token(line: &str, offset: usize) -> String {
    let rest = line.get(offset..).unwrap_or_default();
    let Some(first) = rest.chars().next() else {
        return "newline".to_owned();
    };

    if let Some(op) = ["<<", ">>", "||"].into_iter().find(|op| rest.starts_with(op)) {
        return op.to_owned();
    }

    if is_special(first) {
        return first.to_string();
    }

    rest.chars().take_while(|c| !is_special(*c)).collect()
}

// ============================================================================
// Leaf parsers
// ============================================================================

fn blanks<'a>() -> impl Parser<StrStream<'a>, &'a str, PError> {
    take_while(0.., is_blank)
}

fn bare_run<'a>() -> impl Parser<StrStream<'a>, &'a str, PError> {
    take_while(1.., |c: char| !is_special(c))
}

fn quoted_body<'a>(quote: char) -> impl Parser<StrStream<'a>, &'a str, PError> {
    take_while(0.., move |c: char| c != quote)
}

fn peek_char<'a>() -> impl Parser<StrStream<'a>, char, PError> {
    peek(any)
}

fn next_char<'a>() -> impl Parser<StrStream<'a>, char, PError> {
    any
}

fn redirect_operator<'a>() -> impl Parser<StrStream<'a>, &'a str, PError> {
    alt(("<<", ">>", "<", ">"))
}

fn pipe_operator<'a>() -> impl Parser<StrStream<'a>, &'a str, PError> {
    "|"
}

fn end_of_input<'a>() -> impl Parser<StrStream<'a>, &'a str, PError> {
    eof
}

// ============================================================================
// Grammar rules
// ============================================================================

fn input_line(ctx: &ValidationContext, input: &mut StrStream<'_>) -> Result<(), PError> {
    blanks().parse_next(input)?;
    if end_of_input().parse_next(input).is_ok() {
        return Ok(());
    }

    pipeline(ctx, input)?;
    blanks().parse_next(input)?;

    if end_of_input().parse_next(input).is_err() {
        return Err(ctx.fail(input, Failure::UnexpectedToken));
    }

    Ok(())
}

fn pipeline(ctx: &ValidationContext, input: &mut StrStream<'_>) -> Result<(), PError> {
    command(ctx, input)?;

    loop {
        blanks().parse_next(input)?;
        if !input.starts_with('|') || input.starts_with("||") {
            return Ok(());
        }

        pipe_operator().parse_next(input)?;
        command(ctx, input)?;
    }
}

fn command(ctx: &ValidationContext, input: &mut StrStream<'_>) -> Result<(), PError> {
    blanks().parse_next(input)?;

    if !input.starts_with('(') {
        return simple_command(ctx, input);
    }

    next_char().parse_next(input)?;
    pipeline(ctx, input)?;
    blanks().parse_next(input)?;

    if !input.starts_with(')') {
        return Err(ctx.fail(input, Failure::UnexpectedToken));
    }
    next_char().parse_next(input)?;

    loop {
        blanks().parse_next(input)?;
        if !input.starts_with(['<', '>']) {
            return Ok(());
        }
        redirect(ctx, input)?;
    }
}

fn simple_command(ctx: &ValidationContext, input: &mut StrStream<'_>) -> Result<(), PError> {
    let mut elements = 0usize;

    loop {
        blanks().parse_next(input)?;

        match peek_char().parse_next(input) {
            Ok('<' | '>') => redirect(ctx, input)?,
            Ok(c) if c == '\'' || c == '"' || !is_special(c) => word(ctx, input)?,
            _ => break,
        }

        elements += 1;
    }

    if elements == 0 {
        return Err(ctx.fail(input, Failure::UnexpectedToken));
    }

    Ok(())
}

fn redirect(ctx: &ValidationContext, input: &mut StrStream<'_>) -> Result<(), PError> {
    redirect_operator().parse_next(input)?;
    blanks().parse_next(input)?;
    word(ctx, input)
}

fn word(ctx: &ValidationContext, input: &mut StrStream<'_>) -> Result<(), PError> {
    let mut parts = 0usize;

    loop {
        match peek_char().parse_next(input) {
            Ok(quote @ ('\'' | '"')) => quoted(ctx, input, quote)?,
            Ok(c) if !is_special(c) => {
                bare_run().parse_next(input)?;
            }
            _ => break,
        }

        parts += 1;
    }

    if parts == 0 {
        return Err(ctx.fail(input, Failure::UnexpectedToken));
    }

    Ok(())
}

fn quoted(ctx: &ValidationContext, input: &mut StrStream<'_>, quote: char) -> Result<(), PError> {
    let start = input.checkpoint();
    next_char().parse_next(input)?;
    quoted_body(quote).parse_next(input)?;

    if end_of_input().parse_next(input).is_ok() {
        input.reset(&start);
        return Err(ctx.fail(input, Failure::UnterminatedQuote(quote)));
    }

    next_char().parse_next(input)?;
    Ok(())
}

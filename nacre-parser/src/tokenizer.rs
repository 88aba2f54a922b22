/// Kinds of operator recognized by the tokenizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorKind {
    /// `|`
    Pipe,
    /// `<`
    In,
    /// `>`
    Out,
    /// `<<`
    Heredoc,
    /// `>>`
    Append,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

impl OperatorKind {
    /// Returns the redirection performed by this operator, if it is a redirection operator.
    pub const fn redirect_kind(self) -> Option<RedirectKind> {
        match self {
            Self::In => Some(RedirectKind::In),
            Self::Out => Some(RedirectKind::Out),
            Self::Heredoc => Some(RedirectKind::Heredoc),
            Self::Append => Some(RedirectKind::Append),
            Self::Pipe | Self::LParen | Self::RParen => None,
        }
    }

    /// Returns the source text of the operator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pipe => "|",
            Self::In => "<",
            Self::Out => ">",
            Self::Heredoc => "<<",
            Self::Append => ">>",
            Self::LParen => "(",
            Self::RParen => ")",
        }
    }
}

/// Kinds of redirection that may apply to a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectKind {
    /// Read a file as standard input.
    In,
    /// Write standard output to a file, truncating it.
    Out,
    /// Feed following input lines as standard input.
    Heredoc,
    /// Append standard output to a file.
    Append,
}

/// Classifies a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// An operator.
    Operator(OperatorKind),
    /// A word, possibly made of several quoted and unquoted pieces.
    Word,
    /// A run of blanks separating words.
    Space,
    /// A placeholder left behind once a token's contents have been moved out.
    Dummy,
}

/// Describes how a piece of a word was quoted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Quoting {
    /// Not quoted.
    #[default]
    Unquoted,
    /// Inside single quotes.
    Single,
    /// Inside double quotes.
    Double,
}

/// A contiguous piece of a word sharing the same quoting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordSegment {
    /// The text of the segment, without its surrounding quotes.
    pub text: String,
    /// How the segment was quoted.
    pub quoting: Quoting,
}

/// Represents a token extracted from a line of input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The text of the token; for words, the concatenated segment text.
    pub text: String,
    /// The source text the token was created from, including any quotes.
    pub raw: String,
    /// Combined quoting of the token: unquoted only if no segment was quoted.
    pub quoting: Quoting,
    /// Whether a quoted segment was left unterminated.
    pub unclosed: bool,
    /// The redirection this word is the operand of, if any.
    pub redirect_context: Option<RedirectKind>,
    /// Set when expansion of a redirection operand did not yield exactly one word.
    pub ambiguous: bool,
    /// The file name resolved for a redirection operand, once expanded.
    pub resolved_file: Option<String>,
    /// The quoted and unquoted pieces making up a word.
    pub segments: Vec<WordSegment>,
    /// The fields a word yields as arguments; rewritten by expansion.
    pub fields: Vec<String>,
    /// Byte offset of the token in the input line.
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, raw: &str, offset: usize) -> Self {
        Self {
            kind,
            text: String::new(),
            raw: raw.to_owned(),
            quoting: Quoting::Unquoted,
            unclosed: false,
            redirect_context: None,
            ambiguous: false,
            resolved_file: None,
            segments: vec![],
            fields: vec![],
            offset,
        }
    }

    fn operator(op: OperatorKind, offset: usize) -> Self {
        let mut token = Self::new(TokenKind::Operator(op), op.as_str(), offset);
        token.text = op.as_str().to_owned();
        token
    }

    fn word(text: &str, raw: &str, quoting: Quoting, unclosed: bool, offset: usize) -> Self {
        let mut token = Self::new(TokenKind::Word, raw, offset);
        token.text = text.to_owned();
        token.quoting = quoting;
        token.unclosed = unclosed;
        token.segments.push(WordSegment {
            text: text.to_owned(),
            quoting,
        });
        token.fields.push(text.to_owned());
        token
    }

    /// Returns whether this token is a word.
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// Returns the operator kind, if this token is an operator.
    pub const fn operator_kind(&self) -> Option<OperatorKind> {
        match self.kind {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    /// Returns whether any part of this token was quoted.
    pub fn is_quoted(&self) -> bool {
        self.quoting != Quoting::Unquoted
    }

    /// Moves the token out, leaving a [`TokenKind::Dummy`] placeholder in its place.
    pub fn take(&mut self) -> Self {
        let offset = self.offset;
        std::mem::replace(self, Self::new(TokenKind::Dummy, "", offset))
    }

    fn absorb(&mut self, other: Self) {
        self.text.push_str(&other.text);
        self.raw.push_str(&other.raw);
        if self.quoting == Quoting::Unquoted {
            self.quoting = other.quoting;
        }
        self.unclosed |= other.unclosed;
        self.redirect_context = self.redirect_context.or(other.redirect_context);
        self.segments.extend(other.segments);
        self.fields = vec![self.text.clone()];
    }
}

/// An ordered sequence of tokens.
pub type TokenList = Vec<Token>;

/// Represents an error that occurred during tokenization.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    /// A quoted word was left open; validation should have rejected the line.
    #[error("unterminated quote at offset {0}")]
    UnterminatedQuote(usize),
}

pub(crate) const fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

pub(crate) const fn is_special(c: char) -> bool {
    matches!(c, '|' | '&' | '<' | '>' | '(' | ')' | '\'' | '"') || is_blank(c)
}

fn operator_at(input: &str) -> Option<OperatorKind> {
    if input.starts_with("<<") {
        Some(OperatorKind::Heredoc)
    } else if input.starts_with(">>") {
        Some(OperatorKind::Append)
    } else if input.starts_with("||") {
        None
    } else {
        match input.chars().next()? {
            '<' => Some(OperatorKind::In),
            '>' => Some(OperatorKind::Out),
            '|' => Some(OperatorKind::Pipe),
            '(' => Some(OperatorKind::LParen),
            ')' => Some(OperatorKind::RParen),
            _ => None,
        }
    }
}

/// Breaks a line into tokens.
///
/// Adjacent quoted and unquoted pieces are merged into single words, words following a
/// redirection operator are tagged with that redirection, and blanks are dropped.
///
/// # Arguments
///
/// * `line` - The line to tokenize; normally one already accepted by [`crate::validate`].
pub fn tokenize(line: &str) -> Result<TokenList, TokenizerError> {
    let mut tokens = scan(line);

    tag_redirect_operands(&mut tokens);
    merge_adjacent_words(&mut tokens);
    tokens.retain(|token| !matches!(token.kind, TokenKind::Space | TokenKind::Dummy));
    drop_empty_words(&mut tokens);

    if let Some(token) = tokens.iter().find(|token| token.unclosed) {
        return Err(TokenizerError::UnterminatedQuote(token.offset));
    }

    tracing::debug!(target: "parse", "tokenized {line:?} into {} token(s)", tokens.len());

    Ok(tokens)
}

/// Removes zero-length words that were not quoted and are not redirection operands.
pub fn drop_empty_words(tokens: &mut TokenList) {
    tokens.retain(|token| {
        !token.is_word()
            || token.is_quoted()
            || token.redirect_context.is_some()
            || !token.text.is_empty()
    });
}

fn scan(line: &str) -> TokenList {
    let mut tokens = vec![];
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        let offset = line.len() - rest.len();

        let (token, consumed) = if let Some(op) = operator_at(rest) {
            (Token::operator(op, offset), op.as_str().len())
        } else if is_blank(c) {
            let len = rest.find(|c: char| !is_blank(c)).unwrap_or(rest.len());
            (Token::new(TokenKind::Space, " ", offset), len)
        } else if c == '\'' || c == '"' {
            scan_quoted(rest, c, offset)
        } else {
            let len = match rest.find(is_special) {
                Some(0) => c.len_utf8(),
                Some(len) => len,
                None => rest.len(),
            };
            let text = rest.get(..len).unwrap_or_default();
            (
                Token::word(text, text, Quoting::Unquoted, false, offset),
                len,
            )
        };

        tokens.push(token);
        rest = rest.get(consumed..).unwrap_or_default();
    }

    tokens
}

fn scan_quoted(input: &str, quote: char, offset: usize) -> (Token, usize) {
    let quoting = if quote == '\'' {
        Quoting::Single
    } else {
        Quoting::Double
    };

    let body = input.get(1..).unwrap_or_default();
    match body.find(quote) {
        Some(end) => {
            let text = body.get(..end).unwrap_or_default();
            let consumed = end + 2;
            let raw = input.get(..consumed).unwrap_or_default();
            (Token::word(text, raw, quoting, false, offset), consumed)
        }
        None => (Token::word(body, input, quoting, true, offset), input.len()),
    }
}

fn tag_redirect_operands(tokens: &mut TokenList) {
    let mut pending = None;

    for token in tokens {
        match token.kind {
            TokenKind::Operator(op) => pending = op.redirect_kind(),
            TokenKind::Word => {
                if let Some(kind) = pending.take() {
                    token.redirect_context = Some(kind);
                }
            }
            TokenKind::Space | TokenKind::Dummy => (),
        }
    }
}

fn merge_adjacent_words(tokens: &mut TokenList) {
    let mut head: Option<usize> = None;

    for i in 0..tokens.len() {
        if !tokens[i].is_word() {
            head = None;
            continue;
        }

        match head {
            Some(h) => {
                let token = tokens[i].take();
                tokens[h].absorb(token);
            }
            None => head = Some(i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn tokenize_empty() -> Result<()> {
        assert!(tokenize("")?.is_empty());
        assert!(tokenize("   \t ")?.is_empty());
        Ok(())
    }

    #[test]
    fn tokenize_simple_words() -> Result<()> {
        let tokens = tokenize("echo  hello world")?;
        assert_eq!(texts(&tokens), vec!["echo", "hello", "world"]);
        assert!(tokens.iter().all(Token::is_word));
        Ok(())
    }

    #[test]
    fn tokenize_operators() -> Result<()> {
        let tokens = tokenize("a>>b<<c|d<e>f")?;
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Word,
                TokenKind::Operator(OperatorKind::Append),
                TokenKind::Word,
                TokenKind::Operator(OperatorKind::Heredoc),
                TokenKind::Word,
                TokenKind::Operator(OperatorKind::Pipe),
                TokenKind::Word,
                TokenKind::Operator(OperatorKind::In),
                TokenKind::Word,
                TokenKind::Operator(OperatorKind::Out),
                TokenKind::Word,
            ]
        );
        Ok(())
    }

    #[test]
    fn tokenize_parens() -> Result<()> {
        let tokens = tokenize("(echo hi) > out")?;
        assert_eq!(tokens[0].operator_kind(), Some(OperatorKind::LParen));
        assert_eq!(tokens[3].operator_kind(), Some(OperatorKind::RParen));
        Ok(())
    }

    #[test]
    fn tokenize_quotes_preserve_spacing() -> Result<()> {
        let tokens = tokenize("echo 'a  b' \"c  d\"")?;
        assert_eq!(texts(&tokens), vec!["echo", "a  b", "c  d"]);
        assert_eq!(tokens[1].quoting, Quoting::Single);
        assert_eq!(tokens[2].quoting, Quoting::Double);
        Ok(())
    }

    #[test]
    fn tokenize_merges_adjacent_pieces() -> Result<()> {
        let tokens = tokenize("echo word1\"word2\"'x'")?;
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "word1word2x");
        assert_eq!(tokens[1].raw, "word1\"word2\"'x'");
        assert_eq!(tokens[1].quoting, Quoting::Double);
        assert_eq!(tokens[1].segments.len(), 3);
        assert_eq!(tokens[1].segments[0].quoting, Quoting::Unquoted);
        Ok(())
    }

    #[test]
    fn tokenize_keeps_quoted_empty_word() -> Result<()> {
        let tokens = tokenize("echo \"\" ''")?;
        assert_eq!(texts(&tokens), vec!["echo", "", ""]);
        Ok(())
    }

    #[test]
    fn tokenize_tags_redirect_operands() -> Result<()> {
        let tokens = tokenize("cat < in >out >> 'app'end << EOF")?;
        let tagged: Vec<_> = tokens
            .iter()
            .filter(|t| t.is_word())
            .map(|t| (t.text.as_str(), t.redirect_context))
            .collect();
        assert_eq!(
            tagged,
            vec![
                ("cat", None),
                ("in", Some(RedirectKind::In)),
                ("out", Some(RedirectKind::Out)),
                ("append", Some(RedirectKind::Append)),
                ("EOF", Some(RedirectKind::Heredoc)),
            ]
        );
        Ok(())
    }

    #[test]
    fn tokenize_has_no_spaces_or_adjacent_words() -> Result<()> {
        for line in [
            "a b c",
            "a\"b\" c'd'e",
            "x|y | z",
            "  <in  cat   >  out ",
            "echo \"$HOME\"/x",
        ] {
            let tokens = tokenize(line)?;
            assert!(tokens.iter().all(|t| t.kind != TokenKind::Space));
            assert!(tokens.windows(2).all(|pair| {
                !(pair[0].is_word()
                    && pair[1].is_word()
                    && pair[0].offset + pair[0].raw.len() == pair[1].offset)
            }));
        }
        Ok(())
    }

    #[test]
    fn tokenize_is_stable_on_minimal_input() -> Result<()> {
        let first = tokenize("echo a | cat > f")?;
        let rejoined = first
            .iter()
            .map(|t| t.raw.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let second = tokenize(&rejoined)?;
        assert_eq!(texts(&first), texts(&second));
        Ok(())
    }

    #[test]
    fn tokenize_unterminated_quote_is_error() {
        assert_eq!(
            tokenize("echo 'abc"),
            Err(TokenizerError::UnterminatedQuote(5))
        );
    }

    #[test]
    fn tokenize_stray_ampersand_does_not_loop() -> Result<()> {
        let tokens = tokenize("a & b")?;
        assert_eq!(texts(&tokens), vec!["a", "&", "b"]);
        Ok(())
    }

    #[test]
    fn take_leaves_dummy() -> Result<()> {
        let mut tokens = tokenize("echo")?;
        let taken = tokens[0].take();
        assert_eq!(taken.text, "echo");
        assert_eq!(tokens[0].kind, TokenKind::Dummy);
        Ok(())
    }
}

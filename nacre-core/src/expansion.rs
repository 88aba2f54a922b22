//! Parameter and tilde expansion of words.

use nacre_parser::{Quoting, RedirectKind, Token, TokenList, WordSegment};

use crate::{Shell, env::Environment, trace_categories};

/// Expands words against a snapshot of the shell state they refer to.
pub(crate) struct WordExpander<'a> {
    env: &'a Environment,
    last_exit_status: u8,
    shell_pid: u32,
}

impl<'a> WordExpander<'a> {
    pub(crate) const fn new(env: &'a Environment, last_exit_status: u8, shell_pid: u32) -> Self {
        Self {
            env,
            last_exit_status,
            shell_pid,
        }
    }

    pub(crate) fn for_shell(shell: &'a Shell) -> Self {
        Self::new(shell.env(), shell.last_exit_status(), shell.shell_pid())
    }

    /// Expands every word in the list in place, then drops words that expanded to nothing.
    ///
    /// Here-document limiters are left untouched. Redirection operands are resolved to a
    /// file name, or marked ambiguous when they do not expand to exactly one field.
    pub(crate) fn expand_tokens(&self, tokens: &mut TokenList) {
        for token in tokens.iter_mut().filter(|token| token.is_word()) {
            if token.redirect_context == Some(RedirectKind::Heredoc) {
                continue;
            }

            self.expand_word(token);

            if token.redirect_context.is_some() {
                if let [file] = token.fields.as_slice() {
                    token.resolved_file = Some(file.clone());
                } else {
                    token.ambiguous = true;
                }
            }
        }

        nacre_parser::drop_empty_words(tokens);
    }

    fn expand_word(&self, token: &mut Token) {
        let mut fields = FieldBuilder::default();

        for (index, segment) in token.segments.iter().enumerate() {
            match segment.quoting {
                Quoting::Single => {
                    fields.mark_quoted();
                    fields.push_literal(&segment.text);
                }
                Quoting::Double => {
                    fields.mark_quoted();
                    self.expand_segment(&segment.text, &mut fields, Splitting::Disabled, false);
                }
                Quoting::Unquoted => {
                    let before_quote = token
                        .segments
                        .get(index + 1)
                        .is_some_and(|next| next.quoting != Quoting::Unquoted);
                    self.expand_segment(
                        &segment.text,
                        &mut fields,
                        Splitting::Enabled,
                        before_quote,
                    );
                }
            }
        }

        let mut expanded = fields.finish();

        if let Some(first) = expanded.first_mut() {
            if starts_with_literal_tilde(&token.segments) {
                if let Some(home) = self.env.get("HOME") {
                    *first = expand_tilde(first, home);
                }
            }
        }

        let text = expanded.join(" ");
        if text != token.text {
            tracing::debug!(target: trace_categories::EXPANSION, "expanded {:?} to {text:?}", token.raw);
        }

        token.text = text;
        token.fields = expanded;
    }

    fn expand_segment(
        &self,
        text: &str,
        fields: &mut FieldBuilder,
        splitting: Splitting,
        before_quote: bool,
    ) {
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                fields.push_char(c);
                continue;
            }

            let value = match chars.peek().copied() {
                Some('?') => {
                    chars.next();
                    self.last_exit_status.to_string()
                }
                Some('$') => {
                    chars.next();
                    self.shell_pid.to_string()
                }
                Some(d) if d.is_ascii_digit() => {
                    chars.next();
                    String::new()
                }
                Some(n) if n == '_' || n.is_ascii_alphabetic() => {
                    let mut name = String::new();
                    while let Some(n) = chars.next_if(|n| *n == '_' || n.is_ascii_alphanumeric()) {
                        name.push(n);
                    }
                    self.env.get(&name).unwrap_or_default().to_owned()
                }
                // A trailing `$` ahead of a quoted segment vanishes, as in `$"text"`.
                None if before_quote => continue,
                _ => {
                    fields.push_char('$');
                    continue;
                }
            };

            match splitting {
                Splitting::Enabled => fields.push_split(&value),
                Splitting::Disabled => fields.push_literal(&value),
            }
        }
    }

    /// Expands variables in a here-document body line. The result is not split.
    pub(crate) fn expand_line(&self, line: &str) -> String {
        let mut fields = FieldBuilder::default();
        self.expand_segment(line, &mut fields, Splitting::Disabled, false);
        fields.finish().join(" ")
    }
}

#[derive(Clone, Copy)]
enum Splitting {
    Enabled,
    Disabled,
}

/// Accumulates the fields a word expands to.
#[derive(Default)]
struct FieldBuilder {
    fields: Vec<String>,
    current: String,
    started: bool,
    pending_break: bool,
}

impl FieldBuilder {
    fn push_char(&mut self, c: char) {
        self.flush_break();
        self.current.push(c);
        self.started = true;
    }

    fn push_literal(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.flush_break();
        self.current.push_str(s);
        self.started = true;
    }

    fn push_split(&mut self, value: &str) {
        for c in value.chars() {
            if matches!(c, ' ' | '\t' | '\n') {
                self.pending_break = true;
            } else {
                self.push_char(c);
            }
        }
    }

    fn mark_quoted(&mut self) {
        self.flush_break();
        self.started = true;
    }

    fn flush_break(&mut self) {
        if std::mem::take(&mut self.pending_break) && self.started {
            self.fields.push(std::mem::take(&mut self.current));
            self.started = false;
        }
    }

    fn finish(mut self) -> Vec<String> {
        if self.started {
            self.fields.push(self.current);
        }
        self.fields
    }
}

fn starts_with_literal_tilde(segments: &[WordSegment]) -> bool {
    segments
        .first()
        .is_some_and(|s| s.quoting == Quoting::Unquoted && s.text.starts_with('~'))
}

fn expand_tilde(field: &str, home: &str) -> String {
    if field == "~" {
        home.to_owned()
    } else if let Some(rest) = field.strip_prefix("~/") {
        format!("{home}/{rest}")
    } else {
        field.to_owned()
    }
}

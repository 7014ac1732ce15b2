//! # Lexer - Scanning Source Text Into Lexical Tokens
//!
//! This module provides the first stage of parsing: breaking a range of
//! source text into a flat [`TokenStream`].
//!
//! ## Classification Order
//!
//! At every position the first matching class wins:
//!
//! ```text
//! whitespace → custom rules → comment → symbol → charquote
//!            → open bracket → close bracket → string → punctuation
//! ```
//!
//! Whitespace is skipped (newlines become [`LexKind::Newline`] tokens when
//! [`LexOptions::emit_newlines`] is set). Custom rules run before any
//! built-in class so a language can override lexical syntax. A control
//! character that is not whitespace is a fatal [`LexError`].
//!
//! ## Depth Control
//!
//! Brackets nest. While the current depth is below `max_depth`, an opening
//! bracket is emitted as [`LexKind::OpenParen`] so the grammar can see
//! inside the group. Past that depth the whole balanced group becomes one
//! opaque [`LexKind::ListSpan`] token:
//!
//! ```text
//! "(a (b c))" at depth 0 → [semantic-list "(a (b c))"]
//! "(a (b c))" at depth 1 → [open-paren, symbol a, semantic-list "(b c)", close-paren]
//! ```
//!
//! The interior of a list span can be lexed later with
//! [`Lexer::expand_list`].
//!
//! ## Leniency
//!
//! Unterminated strings, block comments and lists run to the end of the
//! scanned range rather than failing, so half-typed source still lexes.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use regex::Regex;

use crate::error::LexError;
use crate::syntax_table::{CommentDelimiter, SyntaxTable};
use crate::token::{LexKind, LexToken, Span, TokenStream};

/// Switches that change what the lexer emits, independent of the syntax table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexOptions {
    /// Emit a [`LexKind::Newline`] token for every `\n`.
    pub emit_newlines: bool,
    /// Emit comments as [`LexKind::Comment`] tokens instead of dropping them.
    pub keep_comments: bool,
}

impl Default for LexOptions {
    fn default() -> Self {
        Self {
            emit_newlines: false,
            keep_comments: true,
        }
    }
}

type Handler = Arc<dyn Fn(&str, Span) -> Option<LexToken> + Send + Sync>;

/// A caller-registered lexical extension: a pattern and a handler.
///
/// The pattern is anchored at the scan position. When it matches, the
/// handler receives the full source text and the matched span and may
/// return a token. Scanning resumes after whichever ends later, the match
/// or the returned token, so a handler can consume more than its pattern.
#[derive(Clone)]
pub struct CustomRule {
    source: String,
    regex: Regex,
    handler: Handler,
}

impl CustomRule {
    pub fn new<F>(pattern: &str, handler: F) -> Result<Self, LexError>
    where
        F: Fn(&str, Span) -> Option<LexToken> + Send + Sync + 'static,
    {
        let regex = Regex::new(&format!(r"\A(?:{pattern})")).map_err(|source| {
            LexError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            handler: Arc::new(handler),
        })
    }

    /// A rule that emits a [`LexKind::Custom`] token named `name` over each match.
    pub fn token(name: &str, pattern: &str) -> Result<Self, LexError> {
        let kind = LexKind::custom(name);
        Self::new(pattern, move |_, span| {
            Some(LexToken::new(kind.clone(), span.start, span.end))
        })
    }

    /// A rule that silently consumes each match.
    pub fn skip(pattern: &str) -> Result<Self, LexError> {
        Self::new(pattern, |_, _| None)
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("pattern", &self.source)
            .finish_non_exhaustive()
    }
}

/// A configured lexer: syntax table, options and custom rules.
#[derive(Debug, Clone, Default)]
pub struct Lexer {
    syntax: SyntaxTable,
    options: LexOptions,
    rules: Vec<CustomRule>,
}

impl Lexer {
    pub fn new(syntax: SyntaxTable) -> Self {
        Self {
            syntax,
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: LexOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a custom rule. Rules are tried in registration order.
    pub fn with_rule(mut self, rule: CustomRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn syntax(&self) -> &SyntaxTable {
        &self.syntax
    }

    pub fn options(&self) -> LexOptions {
        self.options
    }

    /// Lex `range` of `text`, emitting brackets as tokens up to `max_depth`
    /// levels of nesting.
    pub fn lex(
        &self,
        text: &str,
        range: Range<usize>,
        max_depth: usize,
    ) -> Result<TokenStream, LexError> {
        let Range { start, end } = range;
        if start > end
            || end > text.len()
            || !text.is_char_boundary(start)
            || !text.is_char_boundary(end)
        {
            return Err(LexError::InvalidRange {
                start,
                end,
                len: text.len(),
            });
        }

        let mut scanner = Scanner {
            lexer: self,
            text,
            pos: start,
            end,
            depth: 0,
            max_depth,
            tokens: Vec::new(),
        };
        scanner.run()?;

        Ok(TokenStream::new(scanner.tokens, Span::new(start, end)))
    }

    /// The text between a list span's opening and closing delimiters.
    ///
    /// An unterminated list has no closing delimiter, so its interior runs
    /// to the end of the span. A span that does not start with an opening
    /// bracket is returned unchanged.
    pub fn list_interior(&self, text: &str, list: Span) -> Span {
        let Some(slice) = text.get(list.range()) else {
            return list;
        };
        let Some(open) = slice.chars().next() else {
            return list;
        };
        let Some(close) = self.syntax.closer_for(open) else {
            return list;
        };

        let start = list.start + open.len_utf8();
        let end = if slice.len() > open.len_utf8() && slice.ends_with(close) {
            list.end - close.len_utf8()
        } else {
            list.end
        };
        Span::new(start, end)
    }

    /// Lex the interior of a list span at `max_depth`.
    pub fn expand_list(
        &self,
        text: &str,
        list: Span,
        max_depth: usize,
    ) -> Result<TokenStream, LexError> {
        let interior = self.list_interior(text, list);
        self.lex(text, interior.range(), max_depth)
    }
}

/// Lex `range` of `text` with the default (C-like) syntax table.
pub fn lex(text: &str, range: Range<usize>, max_depth: usize) -> Result<TokenStream, LexError> {
    Lexer::default().lex(text, range, max_depth)
}

/// Single-pass scanning state over one range.
struct Scanner<'l, 't> {
    lexer: &'l Lexer,
    text: &'t str,
    pos: usize,
    end: usize,
    depth: usize,
    max_depth: usize,
    tokens: Vec<LexToken>,
}

impl Scanner<'_, '_> {
    fn run(&mut self) -> Result<(), LexError> {
        let lexer = self.lexer;
        let syntax = &lexer.syntax;

        while let Some(c) = self.peek() {
            let start = self.pos;

            if c.is_whitespace() {
                if c == '\n' && lexer.options.emit_newlines {
                    self.push(LexKind::Newline, start, start + 1);
                } else {
                    self.pos += c.len_utf8();
                }
                continue;
            }

            if self.custom_rule()? {
                continue;
            }

            if let Some(delim) = syntax.comment_at(&self.text[start..self.end]) {
                let end = self.comment_end(start, delim);
                if lexer.options.keep_comments {
                    self.push(LexKind::Comment, start, end);
                } else {
                    self.pos = end;
                }
                continue;
            }

            if syntax.is_symbol_char(c) {
                let end = self.run_of(start, |c| syntax.is_symbol_char(c));
                self.push(LexKind::Symbol, start, end);
            } else if syntax.is_escape(c) {
                let end = self.run_of(start, |c| syntax.is_escape(c));
                self.push(LexKind::CharQuote, start, end);
            } else if syntax.closer_for(c).is_some() {
                if self.depth < self.max_depth {
                    self.depth += 1;
                    self.push(LexKind::OpenParen, start, start + c.len_utf8());
                } else {
                    let end = self.list_end(start);
                    self.push(LexKind::ListSpan, start, end);
                }
            } else if syntax.is_closer(c) {
                self.depth = self.depth.saturating_sub(1);
                self.push(LexKind::CloseParen, start, start + c.len_utf8());
            } else if syntax.is_string_quote(c) {
                let end = self.string_end(start, c);
                self.push(LexKind::String, start, end);
            } else if c.is_control() {
                return Err(LexError::UnclassifiedCharacter {
                    ch: c,
                    offset: start,
                });
            } else {
                self.push(LexKind::Punctuation, start, start + c.len_utf8());
            }
        }

        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..self.end].chars().next()
    }

    fn push(&mut self, kind: LexKind, start: usize, end: usize) {
        self.tokens.push(LexToken::new(kind, start, end));
        self.pos = end;
    }

    /// End of the run of characters satisfying `pred` that starts at `start`.
    fn run_of(&self, start: usize, pred: impl Fn(char) -> bool) -> usize {
        self.text[start..self.end]
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(self.end, |(i, _)| start + i)
    }

    fn custom_rule(&mut self) -> Result<bool, LexError> {
        let lexer = self.lexer;

        for rule in &lexer.rules {
            let Some(found) = rule.regex.find(&self.text[self.pos..self.end]) else {
                continue;
            };
            let matched = Span::new(self.pos, self.pos + found.end());
            let token = (rule.handler)(self.text, matched);

            let mut next = matched.end;
            if let Some(token) = &token {
                if token.start < self.pos
                    || token.start > token.end
                    || token.end > self.end
                    || !self.text.is_char_boundary(token.end)
                {
                    return Err(LexError::CustomTokenOutOfRange {
                        pattern: rule.source.clone(),
                        start: token.start,
                        end: token.end,
                        position: self.pos,
                    });
                }
                next = next.max(token.end);
            }

            // An empty match that produced nothing would never advance.
            if next == self.pos {
                continue;
            }

            if let Some(token) = token {
                self.tokens.push(token);
            }
            self.pos = next;
            return Ok(true);
        }

        Ok(false)
    }

    fn comment_end(&self, start: usize, delim: CommentDelimiter<'_>) -> usize {
        match delim {
            CommentDelimiter::Line { .. } => self.text[start..self.end]
                .find('\n')
                .map_or(self.end, |i| start + i),
            CommentDelimiter::Block { open, close } => {
                let body = start + open.len();
                match self.text[body..self.end].find(close) {
                    Some(i) => body + i + close.len(),
                    None => {
                        log::debug!("unterminated block comment starting at {start}");
                        self.end
                    }
                }
            }
        }
    }

    fn string_end(&self, start: usize, quote: char) -> usize {
        let syntax = &self.lexer.syntax;
        let mut chars = self.text[start..self.end].char_indices().skip(1);

        while let Some((i, c)) = chars.next() {
            if syntax.is_escape(c) {
                chars.next();
            } else if c == quote {
                return start + i + c.len_utf8();
            }
        }

        log::debug!("unterminated string starting at {start}");
        self.end
    }

    /// End of the balanced group opening at `start`, skipping over strings,
    /// comments and escaped characters inside it.
    fn list_end(&self, start: usize) -> usize {
        let syntax = &self.lexer.syntax;
        let mut level = 0usize;
        let mut i = start;

        while i < self.end {
            let rest = &self.text[i..self.end];
            let Some(c) = rest.chars().next() else {
                break;
            };

            if let Some(delim) = syntax.comment_at(rest) {
                i = self.comment_end(i, delim);
                continue;
            }
            if syntax.is_string_quote(c) {
                i = self.string_end(i, c);
                continue;
            }

            i += c.len_utf8();
            if syntax.is_escape(c) {
                if let Some(escaped) = self.text[i..self.end].chars().next() {
                    i += escaped.len_utf8();
                }
            } else if syntax.closer_for(c).is_some() {
                level += 1;
            } else if syntax.is_closer(c) {
                level = level.saturating_sub(1);
                if level == 0 {
                    return i;
                }
            }
        }

        log::debug!("unbalanced list starting at {start}");
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kinds<'a>(lexer: &Lexer, text: &'a str, depth: usize) -> Vec<(LexKind, &'a str)> {
        lexer
            .lex(text, 0..text.len(), depth)
            .unwrap()
            .iter()
            .map(|t| (t.kind.clone(), t.text(text)))
            .collect()
    }

    fn c_like(text: &str, depth: usize) -> Vec<(LexKind, &str)> {
        kinds(&Lexer::default(), text, depth)
    }

    fn lisp(text: &str, depth: usize) -> Vec<(LexKind, &str)> {
        kinds(&Lexer::new(SyntaxTable::lisp()), text, depth)
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(c_like("", 0), vec![]);
        assert_eq!(c_like("   \n\t ", 0), vec![]);
    }

    #[test]
    fn lex_declaration() {
        assert_eq!(
            c_like("int x = 42;", 0),
            vec![
                (LexKind::Symbol, "int"),
                (LexKind::Symbol, "x"),
                (LexKind::Punctuation, "="),
                (LexKind::Symbol, "42"),
                (LexKind::Punctuation, ";"),
            ]
        );
    }

    #[rstest]
    #[case(0, vec![(LexKind::ListSpan, "(a (b c))")])]
    #[case(1, vec![
        (LexKind::OpenParen, "("),
        (LexKind::Symbol, "a"),
        (LexKind::ListSpan, "(b c)"),
        (LexKind::CloseParen, ")"),
    ])]
    #[case(2, vec![
        (LexKind::OpenParen, "("),
        (LexKind::Symbol, "a"),
        (LexKind::OpenParen, "("),
        (LexKind::Symbol, "b"),
        (LexKind::Symbol, "c"),
        (LexKind::CloseParen, ")"),
        (LexKind::CloseParen, ")"),
    ])]
    fn depth_limits_list_visibility(
        #[case] depth: usize,
        #[case] expected: Vec<(LexKind, &str)>,
    ) {
        assert_eq!(lisp("(a (b c))", depth), expected);
    }

    #[test]
    fn close_paren_restores_depth() {
        assert_eq!(
            lisp("(a) (b)", 1),
            vec![
                (LexKind::OpenParen, "("),
                (LexKind::Symbol, "a"),
                (LexKind::CloseParen, ")"),
                (LexKind::OpenParen, "("),
                (LexKind::Symbol, "b"),
                (LexKind::CloseParen, ")"),
            ]
        );
    }

    #[test]
    fn list_span_skips_brackets_inside_strings_and_comments() {
        let text = "(a \")\" ; )\n b) c";
        assert_eq!(
            lisp(text, 0),
            vec![
                (LexKind::ListSpan, "(a \")\" ; )\n b)"),
                (LexKind::Symbol, "c"),
            ]
        );
    }

    #[test]
    fn unbalanced_list_runs_to_end() {
        assert_eq!(lisp("x (a (b", 0), vec![
            (LexKind::Symbol, "x"),
            (LexKind::ListSpan, "(a (b"),
        ]);
    }

    #[test]
    fn comments_are_kept_by_default() {
        assert_eq!(
            c_like("sym1 /*c*/ sym2 // tail", 0),
            vec![
                (LexKind::Symbol, "sym1"),
                (LexKind::Comment, "/*c*/"),
                (LexKind::Symbol, "sym2"),
                (LexKind::Comment, "// tail"),
            ]
        );
    }

    #[test]
    fn comments_can_be_dropped() {
        let lexer = Lexer::default().with_options(LexOptions {
            keep_comments: false,
            ..LexOptions::default()
        });
        assert_eq!(
            kinds(&lexer, "sym1 /*c*/ sym2", 0),
            vec![(LexKind::Symbol, "sym1"), (LexKind::Symbol, "sym2")]
        );
    }

    #[test]
    fn line_comment_stops_before_newline() {
        assert_eq!(
            lisp("; hello\nfoo", 0),
            vec![(LexKind::Comment, "; hello"), (LexKind::Symbol, "foo")]
        );
    }

    #[test]
    fn unterminated_block_comment_runs_to_end() {
        assert_eq!(
            c_like("a /* never closed", 0),
            vec![(LexKind::Symbol, "a"), (LexKind::Comment, "/* never closed")]
        );
    }

    #[test]
    fn strings_respect_escapes() {
        assert_eq!(
            c_like(r#""a \" b" x"#, 0),
            vec![(LexKind::String, r#""a \" b""#), (LexKind::Symbol, "x")]
        );
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        assert_eq!(
            c_like("x \"open", 0),
            vec![(LexKind::Symbol, "x"), (LexKind::String, "\"open")]
        );
    }

    #[test]
    fn escape_run_is_charquote() {
        assert_eq!(
            c_like(r"a \\ b", 0),
            vec![
                (LexKind::Symbol, "a"),
                (LexKind::CharQuote, r"\\"),
                (LexKind::Symbol, "b"),
            ]
        );
    }

    #[test]
    fn newlines_on_request() {
        let lexer = Lexer::default().with_options(LexOptions {
            emit_newlines: true,
            ..LexOptions::default()
        });
        assert_eq!(
            kinds(&lexer, "a\r\nb\n", 0),
            vec![
                (LexKind::Symbol, "a"),
                (LexKind::Newline, "\n"),
                (LexKind::Symbol, "b"),
                (LexKind::Newline, "\n"),
            ]
        );
    }

    #[test]
    fn unicode_symbols_and_punctuation() {
        assert_eq!(
            c_like("café ↔ x", 0),
            vec![
                (LexKind::Symbol, "café"),
                (LexKind::Punctuation, "↔"),
                (LexKind::Symbol, "x"),
            ]
        );
    }

    #[test]
    fn control_character_is_fatal() {
        let err = lex("a \u{7} b", 0..5, 0).unwrap_err();
        assert!(matches!(
            err,
            LexError::UnclassifiedCharacter {
                ch: '\u{7}',
                offset: 2
            }
        ));
    }

    #[test]
    fn custom_rules_run_before_builtins() {
        let lexer = Lexer::default()
            .with_rule(CustomRule::token("number", r"[0-9]+\.[0-9]+").unwrap());
        assert_eq!(
            kinds(&lexer, "x 3.14 7", 0),
            vec![
                (LexKind::Symbol, "x"),
                (LexKind::custom("number"), "3.14"),
                (LexKind::Symbol, "7"),
            ]
        );
    }

    #[test]
    fn custom_rule_shadows_comment_opener() {
        // Custom rules are tried before comment openers.
        let lexer = Lexer::default().with_rule(CustomRule::token("doc", r"///[^\n]*").unwrap());
        assert_eq!(
            kinds(&lexer, "/// Docs.\nx // note", 0),
            vec![
                (LexKind::custom("doc"), "/// Docs."),
                (LexKind::Symbol, "x"),
                (LexKind::Comment, "// note"),
            ]
        );
    }

    #[test]
    fn custom_skip_rule_emits_nothing() {
        let lexer = Lexer::default().with_rule(CustomRule::skip(r"#![^\n]*").unwrap());
        assert_eq!(
            kinds(&lexer, "#!/bin/run\nmain", 0),
            vec![(LexKind::Symbol, "main")]
        );
    }

    #[test]
    fn custom_handler_may_consume_past_its_match() {
        // A heredoc: the pattern only recognises the opener, the handler
        // finds the terminator.
        let rule = CustomRule::new("<<END", |text, span| {
            let close = text[span.end..].find("END").map_or(text.len(), |i| span.end + i + 3);
            Some(LexToken::new(LexKind::custom("heredoc"), span.start, close))
        })
        .unwrap();
        let lexer = Lexer::default().with_rule(rule);
        assert_eq!(
            kinds(&lexer, "x <<END body ( END y", 0),
            vec![
                (LexKind::Symbol, "x"),
                (LexKind::custom("heredoc"), "<<END body ( END"),
                (LexKind::Symbol, "y"),
            ]
        );
    }

    #[test]
    fn custom_token_before_scan_position_is_rejected() {
        let rule = CustomRule::new("@", |_, span| {
            Some(LexToken::new(LexKind::custom("at"), 0, span.end))
        })
        .unwrap();
        let lexer = Lexer::default().with_rule(rule);
        let err = lexer.lex("ab @", 0..4, 0).unwrap_err();
        assert!(matches!(
            err,
            LexError::CustomTokenOutOfRange { position: 3, .. }
        ));
    }

    #[test]
    fn invalid_custom_pattern() {
        let err = CustomRule::token("bad", "(unclosed").unwrap_err();
        assert!(matches!(err, LexError::InvalidPattern { .. }));
    }

    #[test]
    fn lex_sub_range() {
        let text = "abc def ghi";
        let stream = lex(text, 4..7, 0).unwrap();
        assert_eq!(stream.range(), Span::new(4, 7));
        assert_eq!(
            stream.tokens(),
            &[LexToken::new(LexKind::Symbol, 4, 7)]
        );
    }

    #[rstest]
    #[case(3, 2)]
    #[case(0, 12)]
    fn invalid_range(#[case] start: usize, #[case] end: usize) {
        let err = lex("abc def ghi", start..end, 0).unwrap_err();
        assert!(matches!(err, LexError::InvalidRange { len: 11, .. }));
    }

    #[test]
    fn range_inside_multibyte_char_is_invalid() {
        let err = lex("é", 1..2, 0).unwrap_err();
        assert!(matches!(err, LexError::InvalidRange { .. }));
    }

    #[test]
    fn expand_list_lexes_interior() {
        let lexer = Lexer::new(SyntaxTable::lisp());
        let text = "(a (b c))";
        let outer = lexer.lex(text, 0..text.len(), 0).unwrap();
        let list = outer.tokens()[0].span();
        assert_eq!(lexer.list_interior(text, list), Span::new(1, 8));

        let inner = lexer.expand_list(text, list, 0).unwrap();
        let got: Vec<_> = inner.iter().map(|t| (t.kind.clone(), t.text(text))).collect();
        assert_eq!(
            got,
            vec![(LexKind::Symbol, "a"), (LexKind::ListSpan, "(b c)")]
        );
    }

    #[test]
    fn unterminated_list_interior_runs_to_end() {
        let lexer = Lexer::new(SyntaxTable::lisp());
        assert_eq!(
            lexer.list_interior("(a b", Span::new(0, 4)),
            Span::new(1, 4)
        );
        assert_eq!(lexer.list_interior("()", Span::new(0, 2)), Span::new(1, 1));
        assert_eq!(lexer.list_interior("ab", Span::new(0, 2)), Span::new(0, 2));
    }

    #[test]
    fn tokens_are_ordered_and_in_bounds() {
        let text = "(defun f (x) \"doc ( \" ; c\n (g x [y z]))";
        for depth in 0..4 {
            let stream = Lexer::new(SyntaxTable::lisp())
                .lex(text, 0..text.len(), depth)
                .unwrap();
            let mut last_end = 0;
            for token in &stream {
                assert!(token.start >= last_end, "overlap at {token:?}");
                assert!(token.start < token.end && token.end <= text.len());
                last_end = token.end;
            }
        }
    }
}

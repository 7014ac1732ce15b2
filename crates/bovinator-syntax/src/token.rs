//! Lexical token types shared by the lexer and the rule matcher.
//!
//! A [`LexToken`] is nothing more than a kind and a byte range. Tokens never
//! copy source text; callers slice the original text with [`LexToken::text`]
//! whenever they need it.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// A byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Returns true if `start <= end <= len`.
    #[must_use]
    pub fn fits(self, len: usize) -> bool {
        self.start <= self.end && self.end <= len
    }

    /// The smallest span covering both `self` and `other`.
    #[must_use]
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// The lexical class of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LexKind {
    /// A run of word or symbol constituent characters
    Symbol,
    /// A single punctuation character
    Punctuation,
    /// An opening bracket inside the configured nesting depth
    OpenParen,
    /// A closing bracket
    CloseParen,
    /// A whole bracketed group beyond the nesting depth, kept opaque
    ListSpan,
    /// A quoted string including its quotes
    String,
    /// A line or block comment including its delimiters
    Comment,
    /// A run of escape characters outside of strings
    CharQuote,
    /// A line break, only produced when the lexer emits newlines
    Newline,
    /// A token produced by a caller-registered lexer rule
    Custom(Arc<str>),
}

impl LexKind {
    pub fn custom(name: &str) -> Self {
        LexKind::Custom(Arc::from(name))
    }

    /// Whether a matched token of this kind is collected as its source text.
    ///
    /// List spans and comments are collected as their span instead, since
    /// their text is an unparsed region rather than a value.
    pub fn is_text_bearing(&self) -> bool {
        !matches!(self, LexKind::ListSpan | LexKind::Comment)
    }

    /// The conventional grammar name of this kind.
    pub fn name(&self) -> &str {
        match self {
            LexKind::Symbol => "symbol",
            LexKind::Punctuation => "punctuation",
            LexKind::OpenParen => "open-paren",
            LexKind::CloseParen => "close-paren",
            LexKind::ListSpan => "semantic-list",
            LexKind::String => "string",
            LexKind::Comment => "comment",
            LexKind::CharQuote => "charquote",
            LexKind::Newline => "newline",
            LexKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for LexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexed token: a kind and the byte range it covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LexToken {
    pub kind: LexKind,
    pub start: usize,
    pub end: usize,
}

impl LexToken {
    pub fn new(kind: LexKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Slice this token's text out of the source it was lexed from.
    ///
    /// Returns an empty string if the token does not belong to `source`.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or_default()
    }

    pub fn is_comment(&self) -> bool {
        self.kind == LexKind::Comment
    }
}

/// The output of one lex pass: tokens in the order they end, plus the
/// range of text that was scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<LexToken>,
    range: Span,
}

impl TokenStream {
    pub fn new(tokens: Vec<LexToken>, range: Span) -> Self {
        Self { tokens, range }
    }

    pub fn tokens(&self) -> &[LexToken] {
        &self.tokens
    }

    /// The range of source text this stream was lexed from.
    pub fn range(&self) -> Span {
        self.range
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LexToken> {
        self.tokens.iter()
    }

    pub fn into_tokens(self) -> Vec<LexToken> {
        self.tokens
    }

    /// Render one line per token as `kind start..end "text"`.
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            out.push_str(&format!(
                "{} {} {:?}\n",
                token.kind,
                token.span(),
                token.text(source)
            ));
        }
        out
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a LexToken;
    type IntoIter = std::slice::Iter<'a, LexToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

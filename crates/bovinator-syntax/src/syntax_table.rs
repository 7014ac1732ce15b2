//! Character classes for the lexer.
//!
//! A [`SyntaxTable`] says which characters are symbol constituents, which
//! pairs bracket a list, which quote a string and which sequences open a
//! comment. Everything the table does not claim is punctuation, except
//! control characters, which the lexer refuses to classify.

/// How a comment that starts at some position is terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentDelimiter<'a> {
    /// Runs to the end of the line (the newline is not part of the comment)
    Line { open: &'a str },
    /// Runs to the closing delimiter (inclusive)
    Block { open: &'a str, close: &'a str },
}

impl<'a> CommentDelimiter<'a> {
    pub fn open(&self) -> &'a str {
        match *self {
            CommentDelimiter::Line { open } | CommentDelimiter::Block { open, .. } => open,
        }
    }
}

/// Per-language lexical syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTable {
    symbol_chars: String,
    brackets: Vec<(char, char)>,
    string_quotes: Vec<char>,
    escape: Option<char>,
    line_comments: Vec<String>,
    block_comments: Vec<(String, String)>,
}

impl Default for SyntaxTable {
    /// A C-like table: `_` and `$` extend symbols, `//` and `/* */`
    /// comments, single and double quoted strings.
    fn default() -> Self {
        Self {
            symbol_chars: "_$".to_string(),
            brackets: vec![('(', ')'), ('[', ']'), ('{', '}')],
            string_quotes: vec!['"', '\''],
            escape: Some('\\'),
            line_comments: vec!["//".to_string()],
            block_comments: vec![("/*".to_string(), "*/".to_string())],
        }
    }
}

impl SyntaxTable {
    /// A table for Lisp-style s-expressions: most operator characters are
    /// symbol constituents and `;` starts a line comment.
    pub fn lisp() -> Self {
        Self {
            symbol_chars: "-_+*/<>=!?:&%$~^.@".to_string(),
            brackets: vec![('(', ')'), ('[', ']')],
            string_quotes: vec!['"'],
            escape: Some('\\'),
            line_comments: vec![";".to_string()],
            block_comments: Vec::new(),
        }
    }

    /// Characters, beyond alphanumerics, that continue a symbol.
    pub fn with_symbol_chars(mut self, chars: &str) -> Self {
        self.symbol_chars = chars.to_string();
        self
    }

    pub fn with_brackets(mut self, brackets: Vec<(char, char)>) -> Self {
        self.brackets = brackets;
        self
    }

    pub fn with_string_quotes(mut self, quotes: Vec<char>) -> Self {
        self.string_quotes = quotes;
        self
    }

    pub fn with_escape(mut self, escape: Option<char>) -> Self {
        self.escape = escape;
        self
    }

    /// Add a line comment prefix. Empty prefixes are ignored.
    pub fn with_line_comment(mut self, open: &str) -> Self {
        if !open.is_empty() {
            self.line_comments.push(open.to_string());
        }
        self
    }

    /// Add a block comment delimiter pair. Pairs with an empty side are ignored.
    pub fn with_block_comment(mut self, open: &str, close: &str) -> Self {
        if !open.is_empty() && !close.is_empty() {
            self.block_comments
                .push((open.to_string(), close.to_string()));
        }
        self
    }

    pub fn without_comments(mut self) -> Self {
        self.line_comments.clear();
        self.block_comments.clear();
        self
    }

    pub fn is_symbol_char(&self, c: char) -> bool {
        c.is_alphanumeric() || self.symbol_chars.contains(c)
    }

    /// The closing bracket for `c`, if `c` opens a list.
    pub fn closer_for(&self, c: char) -> Option<char> {
        self.brackets
            .iter()
            .find(|(open, _)| *open == c)
            .map(|(_, close)| *close)
    }

    pub fn is_closer(&self, c: char) -> bool {
        self.brackets.iter().any(|(_, close)| *close == c)
    }

    pub fn is_string_quote(&self, c: char) -> bool {
        self.string_quotes.contains(&c)
    }

    pub fn is_escape(&self, c: char) -> bool {
        self.escape == Some(c)
    }

    /// The comment opened at the start of `rest`, if any. Block comments
    /// are checked before line comments.
    pub fn comment_at(&self, rest: &str) -> Option<CommentDelimiter<'_>> {
        self.block_comments
            .iter()
            .find(|(open, _)| rest.starts_with(open.as_str()))
            .map(|(open, close)| CommentDelimiter::Block { open, close })
            .or_else(|| {
                self.line_comments
                    .iter()
                    .find(|open| rest.starts_with(open.as_str()))
                    .map(|open| CommentDelimiter::Line { open })
            })
    }
}

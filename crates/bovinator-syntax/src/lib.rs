//! # bovinator-syntax
//!
//! The lexical layer of bovinator: turns a range of source text into a flat
//! stream of typed spans that the grammar engine matches against.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → TokenStream → (bovinator-engine) → Semantic Tokens
//!               (SyntaxTable + CustomRules)
//! ```
//!
//! The lexer is language agnostic. What counts as a symbol, a bracket, a
//! string or a comment comes from a [`SyntaxTable`]; anything a table cannot
//! express can be added with [`CustomRule`]s, which run before the built-in
//! classes.
//!
//! ## Tokens Are Spans
//!
//! A [`LexToken`] stores a [`LexKind`] and a byte range, never text. Slicing
//! the source with a token's span always reproduces the exact lexeme:
//!
//! ```
//! use bovinator_syntax::{lex, LexKind};
//!
//! let text = "int x = 42;";
//! let stream = lex(text, 0..text.len(), 0).unwrap();
//!
//! let first = &stream.tokens()[0];
//! assert_eq!(first.kind, LexKind::Symbol);
//! assert_eq!(first.text(text), "int");
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! bovinator-syntax/
//! ├── lib.rs           # This file - public API
//! ├── token.rs         # Span, LexKind, LexToken, TokenStream
//! ├── syntax_table.rs  # Per-language character classes
//! ├── lexer.rs         # Depth-limited scanner and custom rules
//! ├── error.rs         # LexError
//! └── fixtures/        # Sample sources lexed by generated tests
//! ```

pub mod error;
pub mod lexer;
pub mod syntax_table;
pub mod token;

pub use error::LexError;
pub use lexer::{CustomRule, LexOptions, Lexer, lex};
pub use syntax_table::{CommentDelimiter, SyntaxTable};
pub use token::{LexKind, LexToken, Span, TokenStream};

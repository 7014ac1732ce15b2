//! # bovinator-engine
//!
//! Grammar-driven parsing on top of `bovinator-syntax`: a backtracking rule
//! matcher and a toplevel driver that turns a whole document into a list of
//! semantic tokens.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → TokenStream → toplevel loop → expand hook → Vec<SemanticToken>
//!                                         │
//!                                   MatchContext
//!                                (ordered alternatives,
//!                                 backtracking, actions)
//! ```
//!
//! A [`Grammar`] is plain data built at runtime. A [`ParserSession`] pairs
//! it with a lexer configuration and caches the result of the last parse.
//!
//! ## Example
//!
//! ```
//! use bovinator_engine::{Grammar, MatchItem, ParserSession, Rule, SemanticToken, Tag, TagClass};
//!
//! let grammar = Grammar::builder()
//!     .nonterminal("toplevel", vec![
//!         Rule::new(vec![
//!             MatchItem::keyword("int"),
//!             MatchItem::symbol(),
//!             MatchItem::punctuation(";"),
//!         ])
//!         .with_action(|_, values, span| {
//!             let name = values[1].as_text().unwrap_or_default();
//!             Ok(Some(SemanticToken::new(Tag::new(name, TagClass::Variable), span)))
//!         }),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! let mut session = ParserSession::new(grammar);
//! let tokens = session.parse_all("int x; int y;").unwrap();
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[1].as_tag().unwrap().name, "y");
//! assert_eq!((tokens[1].start(), tokens[1].end()), (7, 13));
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! bovinator-engine/
//! ├── lib.rs       # This file - public API
//! ├── grammar.rs   # Grammar tables, rules, match items
//! ├── matcher.rs   # TokenCursor, MatchContext, limits
//! ├── session.rs   # ParserSession: toplevel loop, cache, hooks
//! ├── value.rs     # Value, Tag, SemanticToken
//! └── error.rs     # GrammarError, ParseError, EngineError
//! ```

pub mod error;
pub mod grammar;
pub mod matcher;
pub mod session;
pub mod value;

pub use error::{EngineError, GrammarError, ParseError};
pub use grammar::{
    Action, ActionResult, Grammar, GrammarBuilder, MatchItem, Rule, TOPLEVEL, ValuePattern,
};
pub use matcher::{Limits, MAX_RECURSION_LIMIT, MatchContext, ParseOptions, TokenCursor};
pub use session::{ExpandHook, ParserSession, Progress, ProgressHook, SessionBuilder, SessionStats};
pub use value::{SemanticToken, Tag, TagClass, Value};

pub use bovinator_syntax::{LexKind, Lexer, Span, SyntaxTable};

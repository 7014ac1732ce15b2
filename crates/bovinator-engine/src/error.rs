use std::time::Duration;

use bovinator_syntax::{LexError, Span};
use thiserror::Error;

/// A toplevel unit that no `toplevel` alternative could classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("parse error: no toplevel rule matches at offset {position}")]
pub struct ParseError {
    pub position: usize,
}

/// Problems found while building a grammar table.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar has no `toplevel` nonterminal")]
    MissingToplevel,

    #[error("nonterminal `{name}` referenced from `{referenced_by}` is not defined")]
    UndefinedNonterminal { name: String, referenced_by: String },

    #[error("nonterminal `{0}` is defined more than once")]
    DuplicateNonterminal(String),

    #[error("invalid value pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Everything that can abort a parse.
///
/// A nonterminal that simply fails to match is not an error; the matcher
/// reports it as `None` so enclosing rules can try their next alternative.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("toplevel rule matched without consuming input at offset {position}")]
    Stalled { position: usize },

    #[error("recursion limit of {limit} exceeded while matching `{nonterminal}`")]
    RecursionLimitExceeded { nonterminal: String, limit: usize },

    #[error("parse budget of {limit} steps exhausted")]
    BudgetExhausted { limit: u64 },

    #[error("parse exceeded its time limit of {limit:?}")]
    DeadlineExceeded { limit: Duration },

    #[error("unknown nonterminal `{0}`")]
    UnknownNonterminal(String),

    #[error("rule for `{nonterminal}` produced span {span} outside text of length {len}")]
    InvalidSpan {
        nonterminal: String,
        span: Span,
        len: usize,
    },

    #[error("action failed: {0}")]
    Action(String),
}

impl EngineError {
    /// The source offset this error points at, when it has one.
    pub fn position(&self) -> Option<usize> {
        match self {
            EngineError::Parse(err) => Some(err.position),
            EngineError::Stalled { position } => Some(*position),
            EngineError::Lex(LexError::UnclassifiedCharacter { offset, .. }) => Some(*offset),
            _ => None,
        }
    }
}

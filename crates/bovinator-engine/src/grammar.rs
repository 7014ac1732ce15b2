//! # Grammar Tables
//!
//! A grammar is data: an ordered table from nonterminal name to an ordered
//! list of [`Rule`]s. Each rule is a sequence of [`MatchItem`]s plus an
//! action that turns what was collected into a [`SemanticToken`].
//!
//! ```text
//! toplevel  → [ semantic-list ]                          → action
//! defun     → [ symbol "defun", symbol, semantic-list ]  → action
//! ```
//!
//! Declaration order is the only disambiguation the engine knows: the first
//! rule of a nonterminal that matches structurally wins, even when a later
//! rule would have consumed more.
//!
//! ## Building a Grammar
//!
//! ```
//! use bovinator_engine::{Grammar, MatchItem, Rule};
//!
//! let grammar = Grammar::builder()
//!     .nonterminal("toplevel", vec![
//!         Rule::new(vec![MatchItem::nonterminal("pair")]),
//!     ])
//!     .nonterminal("pair", vec![
//!         Rule::new(vec![MatchItem::symbol(), MatchItem::symbol()]),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! assert!(grammar.contains("pair"));
//! ```
//!
//! [`build`](GrammarBuilder::build) validates the table: `toplevel` must
//! exist, every referenced nonterminal must be defined and names must be
//! unique.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bovinator_syntax::{LexKind, Span};
use regex::Regex;

use crate::error::{EngineError, GrammarError};
use crate::matcher::MatchContext;
use crate::value::{SemanticToken, Value};

/// The nonterminal the toplevel driver matches repeatedly.
pub const TOPLEVEL: &str = "toplevel";

/// What an action returns: a token, `None` to discard the match, or a
/// fatal error.
pub type ActionResult = Result<Option<SemanticToken>, EngineError>;

/// A rule's action, invoked with the collected values and the matched span.
pub type Action = Arc<dyn Fn(&mut MatchContext<'_>, Vec<Value>, Span) -> ActionResult + Send + Sync>;

/// A constraint on a terminal's source text.
#[derive(Debug, Clone)]
pub enum ValuePattern {
    /// The text must equal this string exactly.
    Literal(String),
    /// The whole text must match this regex.
    Regex(Regex),
}

impl ValuePattern {
    /// Compile `pattern` anchored at both ends.
    pub fn regex(pattern: &str) -> Result<Self, GrammarError> {
        Regex::new(&format!(r"\A(?:{pattern})\z"))
            .map(ValuePattern::Regex)
            .map_err(|source| GrammarError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            ValuePattern::Literal(literal) => literal == text,
            ValuePattern::Regex(regex) => regex.is_match(text),
        }
    }
}

/// One element of a rule.
#[derive(Debug, Clone)]
pub enum MatchItem {
    /// A lexical token of `kind`, optionally constrained by its text.
    Terminal {
        kind: LexKind,
        pattern: Option<ValuePattern>,
    },
    /// A reference to another nonterminal in the same grammar.
    Nonterminal(String),
}

impl MatchItem {
    pub fn terminal(kind: LexKind) -> Self {
        MatchItem::Terminal {
            kind,
            pattern: None,
        }
    }

    /// A terminal whose text must equal `text`.
    pub fn literal(kind: LexKind, text: impl Into<String>) -> Self {
        MatchItem::Terminal {
            kind,
            pattern: Some(ValuePattern::Literal(text.into())),
        }
    }

    /// A terminal whose whole text must match `pattern`.
    pub fn regex(kind: LexKind, pattern: &str) -> Result<Self, GrammarError> {
        Ok(MatchItem::Terminal {
            kind,
            pattern: Some(ValuePattern::regex(pattern)?),
        })
    }

    pub fn nonterminal(name: impl Into<String>) -> Self {
        MatchItem::Nonterminal(name.into())
    }

    pub fn symbol() -> Self {
        Self::terminal(LexKind::Symbol)
    }

    /// A symbol spelled exactly `word`.
    pub fn keyword(word: &str) -> Self {
        Self::literal(LexKind::Symbol, word)
    }

    pub fn punctuation(text: &str) -> Self {
        Self::literal(LexKind::Punctuation, text)
    }

    pub fn open_paren() -> Self {
        Self::terminal(LexKind::OpenParen)
    }

    pub fn close_paren() -> Self {
        Self::terminal(LexKind::CloseParen)
    }

    pub fn list() -> Self {
        Self::terminal(LexKind::ListSpan)
    }

    pub fn string() -> Self {
        Self::terminal(LexKind::String)
    }
}

/// One alternative of a nonterminal.
#[derive(Clone)]
pub struct Rule {
    items: Vec<MatchItem>,
    action: Option<Action>,
}

impl Rule {
    /// A rule with the default action.
    ///
    /// The default passes a lone nonterminal's payload through unchanged;
    /// any other rule produces a [`Value::List`] of everything collected.
    pub fn new(items: Vec<MatchItem>) -> Self {
        Self {
            items,
            action: None,
        }
    }

    /// A rule with no items. It always matches and consumes nothing.
    pub fn epsilon() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut MatchContext<'_>, Vec<Value>, Span) -> ActionResult + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    pub fn items(&self) -> &[MatchItem] {
        &self.items
    }

    pub fn is_epsilon(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("items", &self.items)
            .field("action", &self.action.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
struct Nonterminal {
    name: String,
    rules: Vec<Rule>,
}

/// A validated, read-only grammar table.
#[derive(Debug, Clone)]
pub struct Grammar {
    nonterminals: Vec<Nonterminal>,
    index: HashMap<String, usize>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// The alternatives of `name`, in priority order.
    pub fn rules(&self, name: &str) -> Option<&[Rule]> {
        self.index
            .get(name)
            .map(|&i| self.nonterminals[i].rules.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Nonterminal names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nonterminals.iter().map(|nt| nt.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.nonterminals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nonterminals.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct GrammarBuilder {
    nonterminals: Vec<Nonterminal>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with its alternatives in priority order.
    pub fn nonterminal(mut self, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.nonterminals.push(Nonterminal {
            name: name.into(),
            rules,
        });
        self
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut index = HashMap::with_capacity(self.nonterminals.len());
        for (i, nt) in self.nonterminals.iter().enumerate() {
            if index.insert(nt.name.clone(), i).is_some() {
                return Err(GrammarError::DuplicateNonterminal(nt.name.clone()));
            }
        }

        if !index.contains_key(TOPLEVEL) {
            return Err(GrammarError::MissingToplevel);
        }

        for nt in &self.nonterminals {
            for rule in &nt.rules {
                for item in &rule.items {
                    if let MatchItem::Nonterminal(name) = item
                        && !index.contains_key(name)
                    {
                        return Err(GrammarError::UndefinedNonterminal {
                            name: name.clone(),
                            referenced_by: nt.name.clone(),
                        });
                    }
                }
            }
        }

        Ok(Grammar {
            nonterminals: self.nonterminals,
            index,
        })
    }
}

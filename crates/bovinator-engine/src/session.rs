//! # Parser Sessions
//!
//! A [`ParserSession`] is the per-document driver. It owns everything a
//! parse needs and caches the last successful result:
//!
//! ```text
//! parse_all(text)
//!   ├─ cache valid for text? ──yes──→ cached tokens
//!   └─ no
//!       ├─ lex 0..len once
//!       ├─ loop: match `toplevel` → expand hook → append
//!       └─ store (tokens, len) as the cache
//! ```
//!
//! The cache is keyed on the text length alone, the same cheap check an
//! editor buffer would use between edits. Callers that change text without
//! changing its length must call [`ParserSession::invalidate`].

use std::fmt;
use std::sync::Arc;

use bovinator_syntax::{LexToken, Lexer, TokenStream};

use crate::error::{EngineError, ParseError};
use crate::grammar::{Grammar, TOPLEVEL};
use crate::matcher::{MatchContext, ParseOptions, TokenCursor};
use crate::value::SemanticToken;

/// Rewrites each toplevel token into zero or more tokens.
pub type ExpandHook = Box<dyn Fn(SemanticToken) -> Vec<SemanticToken> + Send + Sync>;

/// Observes how far through the text a parse has got.
pub type ProgressHook = Box<dyn FnMut(Progress) + Send>;

/// Byte offset reached by the toplevel loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let percent = self.position.min(self.total) * 100 / self.total;
        u8::try_from(percent).unwrap_or(100)
    }
}

/// Counters describing the work a session has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub lex_passes: usize,
    pub parses: usize,
    pub cache_hits: usize,
}

#[derive(Debug, Clone)]
struct ParseCache {
    tokens: Vec<SemanticToken>,
    text_end: usize,
}

impl ParseCache {
    fn is_valid_for(&self, text: &str) -> bool {
        self.text_end == text.len()
    }
}

/// Parses documents with one grammar and remembers the last result.
pub struct ParserSession {
    grammar: Arc<Grammar>,
    lexer: Lexer,
    options: ParseOptions,
    expand: Option<ExpandHook>,
    on_progress: Option<ProgressHook>,
    cache: Option<ParseCache>,
    stats: SessionStats,
}

impl ParserSession {
    /// A session with the default lexer and options.
    pub fn new(grammar: impl Into<Arc<Grammar>>) -> Self {
        Self::builder(grammar).build()
    }

    pub fn builder(grammar: impl Into<Arc<Grammar>>) -> SessionBuilder {
        SessionBuilder {
            grammar: grammar.into(),
            lexer: Lexer::default(),
            options: ParseOptions::default(),
            expand: None,
            on_progress: None,
        }
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// The tokens of the last successful parse, if still cached.
    pub fn cached(&self) -> Option<&[SemanticToken]> {
        self.cache.as_ref().map(|cache| cache.tokens.as_slice())
    }

    pub fn is_cached(&self, text: &str) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|cache| cache.is_valid_for(text))
    }

    /// Drop the cached parse so the next [`parse_all`](Self::parse_all)
    /// starts from scratch.
    pub fn invalidate(&mut self) {
        if self.cache.take().is_some() {
            log::debug!("parse cache invalidated");
        }
    }

    /// Lex the whole of `text` with this session's lexer and depth.
    pub fn lex(&self, text: &str) -> Result<TokenStream, EngineError> {
        Ok(self.lexer.lex(text, 0..text.len(), self.options.max_depth)?)
    }

    /// Match `name` once at the start of `text`, bypassing the cache.
    pub fn match_nonterminal(
        &self,
        text: &str,
        name: &str,
    ) -> Result<Option<SemanticToken>, EngineError> {
        let stream = self.lex(text)?;
        let mut ctx = MatchContext::new(text, &self.grammar, &self.lexer, self.options);
        let (_, token) = ctx.match_nonterminal(TokenCursor::new(&stream), name)?;
        Ok(token)
    }

    /// Parse `text` into semantic tokens, or return the cached tokens if
    /// they are still valid for it.
    ///
    /// A failed parse leaves the cache empty.
    pub fn parse_all(&mut self, text: &str) -> Result<&[SemanticToken], EngineError> {
        if self.is_cached(text) {
            self.stats.cache_hits += 1;
            log::debug!("parse cache hit for {} bytes", text.len());
        } else {
            self.cache = None;
            let tokens = self.parse_toplevel(text)?;
            self.cache = Some(ParseCache {
                tokens,
                text_end: text.len(),
            });
        }
        Ok(self.cached().unwrap_or_default())
    }

    fn parse_toplevel(&mut self, text: &str) -> Result<Vec<SemanticToken>, EngineError> {
        self.stats.parses += 1;
        let stream = self.lexer.lex(text, 0..text.len(), self.options.max_depth)?;
        self.stats.lex_passes += 1;
        log::debug!("lexed {} tokens from {} bytes", stream.len(), text.len());

        let total = text.len();
        let skip_comments = self.options.skip_comments;
        let mut ctx = MatchContext::new(text, &self.grammar, &self.lexer, self.options);
        let mut cursor = TokenCursor::new(&stream);
        let mut tokens = Vec::new();

        while !cursor.at_end() {
            if skip_comments && cursor.peek().is_some_and(LexToken::is_comment) {
                cursor = cursor.advance(1);
                continue;
            }

            let position = cursor.offset();
            log::trace!("toplevel at {position}/{total}");
            if let Some(report) = self.on_progress.as_mut() {
                report(Progress { position, total });
            }

            let (next, token) = ctx.match_nonterminal(cursor, TOPLEVEL)?;
            if cursor.only_comments_remain() && next.index() == cursor.index() {
                break;
            }
            let Some(token) = token else {
                log::warn!("no toplevel rule matches at offset {position}");
                return Err(ParseError { position }.into());
            };
            if next.index() == cursor.index() {
                return Err(EngineError::Stalled { position });
            }

            match &self.expand {
                Some(expand) => tokens.extend(expand(token)),
                None => tokens.push(token),
            }
            cursor = next;
        }

        if let Some(report) = self.on_progress.as_mut() {
            report(Progress {
                position: total,
                total,
            });
        }
        log::debug!(
            "parsed {} semantic tokens in {} steps",
            tokens.len(),
            ctx.steps()
        );
        Ok(tokens)
    }
}

impl fmt::Debug for ParserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserSession")
            .field("grammar", &self.grammar.names().collect::<Vec<_>>())
            .field("lexer", &self.lexer)
            .field("options", &self.options)
            .field("expand", &self.expand.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .field("cached", &self.cache.as_ref().map(|c| c.tokens.len()))
            .field("stats", &self.stats)
            .finish()
    }
}

/// Configures a [`ParserSession`].
pub struct SessionBuilder {
    grammar: Arc<Grammar>,
    lexer: Lexer,
    options: ParseOptions,
    expand: Option<ExpandHook>,
    on_progress: Option<ProgressHook>,
}

impl SessionBuilder {
    pub fn with_lexer(mut self, lexer: Lexer) -> Self {
        self.lexer = lexer;
        self
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_expand_hook<F>(mut self, expand: F) -> Self
    where
        F: Fn(SemanticToken) -> Vec<SemanticToken> + Send + Sync + 'static,
    {
        self.expand = Some(Box::new(expand));
        self
    }

    pub fn with_progress<F>(mut self, on_progress: F) -> Self
    where
        F: FnMut(Progress) + Send + 'static,
    {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    pub fn build(self) -> ParserSession {
        ParserSession {
            grammar: self.grammar,
            lexer: self.lexer,
            options: self.options,
            expand: self.expand,
            on_progress: self.on_progress,
            cache: None,
            stats: SessionStats::default(),
        }
    }
}

//! # Rule Matcher
//!
//! Ordered-choice, backtracking recursive descent over a lexed
//! [`TokenStream`].
//!
//! ```text
//! match_nonterminal(cursor, "decl")
//!   ├─ rule 0: [symbol "int", symbol, ";"]   ✗ fails at ";", rewind
//!   ├─ rule 1: [symbol "int", symbol, "=" …] ✓ action → SemanticToken
//!   └─ rule 2: never tried
//! ```
//!
//! Backtracking is free: a [`TokenCursor`] is a slice and an index, so every
//! alternative starts from a copy of the same cursor and a failed one
//! leaves nothing behind.
//!
//! Terminal items step over `comment` tokens unless the item itself asks
//! for a comment. Nonterminal items recurse and collect the child's payload
//! with its span stripped. Once a rule has matched every item its action
//! runs. The first rule to get that far wins, whatever the action returns.
//!
//! ## Limits
//!
//! Grammars are data supplied at runtime, so a left-recursive rule or a
//! pathological input must not take the process down. Recursion depth,
//! item attempts and wall-clock time are all bounded by [`Limits`];
//! exceeding any of them aborts the whole parse. Nested matches run on a
//! stack that grows on demand, so any recursion limit up to
//! [`MAX_RECURSION_LIMIT`] ends in an error rather than an overflow.

use std::time::{Duration, Instant};

use bovinator_syntax::{LexKind, LexToken, Lexer, Span, TokenStream};

use crate::error::EngineError;
use crate::grammar::{Grammar, MatchItem, Rule};
use crate::value::{SemanticToken, Value};

/// How often, in steps, the deadline is compared against the clock.
const DEADLINE_CHECK_INTERVAL: u64 = 256;

/// Largest accepted [`Limits::recursion_limit`]. Larger values are clamped.
pub const MAX_RECURSION_LIMIT: usize = 16_384;

/// Stack headroom below which a nested match switches to a new segment.
const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each newly allocated stack segment.
const STACK_GROWTH_SIZE: usize = 2 * 1024 * 1024;

/// A position in a token stream. Copying a cursor is how the matcher
/// backtracks.
#[derive(Debug, Clone, Copy)]
pub struct TokenCursor<'t> {
    tokens: &'t [LexToken],
    pos: usize,
    end: usize,
}

impl<'t> TokenCursor<'t> {
    /// A cursor at the first token of `stream`.
    pub fn new(stream: &'t TokenStream) -> Self {
        Self {
            tokens: stream.tokens(),
            pos: 0,
            end: stream.range().end,
        }
    }

    /// Index of the next token in the stream.
    pub fn index(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// The next raw token, comments included.
    pub fn peek(&self) -> Option<&'t LexToken> {
        self.tokens.get(self.pos)
    }

    /// The next token and the cursor after it, optionally stepping over
    /// comments first.
    pub fn next_token(self, skip_comments: bool) -> Option<(&'t LexToken, Self)> {
        let mut pos = self.pos;
        while let Some(token) = self.tokens.get(pos) {
            pos += 1;
            if skip_comments && token.is_comment() {
                continue;
            }
            return Some((token, Self { pos, ..self }));
        }
        None
    }

    /// Skip `n` raw tokens, stopping at the end of the stream.
    #[must_use]
    pub fn advance(self, n: usize) -> Self {
        Self {
            pos: self.pos.saturating_add(n).min(self.tokens.len()),
            ..self
        }
    }

    /// Source offset of the next non-comment token, or the end of the
    /// lexed range when there is none.
    pub fn offset(&self) -> usize {
        self.remaining()
            .iter()
            .find(|token| !token.is_comment())
            .map_or(self.end, |token| token.start)
    }

    /// True when nothing but comments (or nothing at all) is left.
    pub fn only_comments_remain(&self) -> bool {
        self.remaining().iter().all(LexToken::is_comment)
    }

    pub fn remaining(&self) -> &'t [LexToken] {
        self.tokens.get(self.pos..).unwrap_or_default()
    }
}

/// Resource bounds for a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of nonterminal matches, at most
    /// [`MAX_RECURSION_LIMIT`].
    pub recursion_limit: usize,
    /// Maximum number of item attempts, if bounded.
    pub step_budget: Option<u64>,
    /// Maximum wall-clock time, if bounded.
    pub timeout: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            recursion_limit: 256,
            step_budget: None,
            timeout: None,
        }
    }
}

/// Per-session parse settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Bracket depth the lexer opens before folding groups into list spans.
    pub max_depth: usize,
    /// Step over comment tokens between toplevel matches.
    pub skip_comments: bool,
    pub limits: Limits,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: 0,
            skip_comments: true,
            limits: Limits::default(),
        }
    }
}

/// What one alternative came to.
enum RuleOutcome<'t> {
    /// An item did not match; try the next alternative.
    Failed,
    Matched(TokenCursor<'t>, SemanticToken),
    /// Every item matched but the action declined to produce a token.
    Discarded,
}

/// State shared by every match within one parse: the source, the grammar,
/// and the counters behind [`Limits`].
///
/// Actions receive the context mutably so they can match sub-regions of
/// the text, such as the inside of a list span, under the same limits.
pub struct MatchContext<'a> {
    text: &'a str,
    grammar: &'a Grammar,
    lexer: &'a Lexer,
    options: ParseOptions,
    depth: usize,
    steps: u64,
    deadline: Option<Instant>,
}

impl<'a> MatchContext<'a> {
    pub fn new(
        text: &'a str,
        grammar: &'a Grammar,
        lexer: &'a Lexer,
        options: ParseOptions,
    ) -> Self {
        let deadline = options
            .limits
            .timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));
        Self {
            text,
            grammar,
            lexer,
            options,
            depth: 0,
            steps: 0,
            deadline,
        }
    }

    /// The full source text being parsed.
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn grammar(&self) -> &'a Grammar {
        self.grammar
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Item attempts made so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Match the nonterminal `name` at `cursor`.
    ///
    /// Returns the cursor after the match and the produced token. A failed
    /// match returns the original cursor and `None`.
    pub fn match_nonterminal<'t>(
        &mut self,
        cursor: TokenCursor<'t>,
        name: &str,
    ) -> Result<(TokenCursor<'t>, Option<SemanticToken>), EngineError> {
        let grammar = self.grammar;
        let rules = grammar
            .rules(name)
            .ok_or_else(|| EngineError::UnknownNonterminal(name.to_string()))?;

        let limit = self
            .options
            .limits
            .recursion_limit
            .min(MAX_RECURSION_LIMIT);
        if self.depth >= limit {
            return Err(EngineError::RecursionLimitExceeded {
                nonterminal: name.to_string(),
                limit,
            });
        }

        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH_SIZE, || {
            self.match_alternatives(cursor, name, rules)
        });
        self.depth -= 1;
        result
    }

    /// Lex the inside of a list span and match `name` once at its start.
    pub fn match_list(
        &mut self,
        list: Span,
        name: &str,
    ) -> Result<Option<SemanticToken>, EngineError> {
        let lexer = self.lexer;
        let stream = lexer.expand_list(self.text, list, self.options.max_depth)?;
        let (_, token) = self.match_nonterminal(TokenCursor::new(&stream), name)?;
        Ok(token)
    }

    /// Lex the inside of a list span and match `name` repeatedly until it
    /// is exhausted. Tokens that start no match are skipped one at a time.
    pub fn parse_list(
        &mut self,
        list: Span,
        name: &str,
    ) -> Result<Vec<SemanticToken>, EngineError> {
        let lexer = self.lexer;
        let stream = lexer.expand_list(self.text, list, self.options.max_depth)?;

        let mut cursor = TokenCursor::new(&stream);
        let mut tokens = Vec::new();
        while !cursor.only_comments_remain() {
            if cursor.peek().is_some_and(LexToken::is_comment) {
                cursor = cursor.advance(1);
                continue;
            }
            match self.match_nonterminal(cursor, name)? {
                (next, Some(token)) if next.index() > cursor.index() => {
                    tokens.push(token);
                    cursor = next;
                }
                _ => {
                    log::trace!("{name}: skipping token at {}", cursor.offset());
                    cursor = cursor.advance(1);
                }
            }
        }
        Ok(tokens)
    }

    fn match_alternatives<'t>(
        &mut self,
        cursor: TokenCursor<'t>,
        name: &str,
        rules: &[Rule],
    ) -> Result<(TokenCursor<'t>, Option<SemanticToken>), EngineError> {
        for (index, rule) in rules.iter().enumerate() {
            match self.match_rule(cursor, name, rule)? {
                RuleOutcome::Matched(next, token) => {
                    log::trace!("{name}[{index}] matched {}", token.span);
                    return Ok((next, Some(token)));
                }
                RuleOutcome::Discarded => {
                    log::trace!("{name}[{index}] matched, discarded by action");
                    return Ok((cursor, None));
                }
                RuleOutcome::Failed => {
                    log::trace!("{name}[{index}] failed at {}", cursor.offset());
                }
            }
        }
        Ok((cursor, None))
    }

    fn match_rule<'t>(
        &mut self,
        origin: TokenCursor<'t>,
        name: &str,
        rule: &Rule,
    ) -> Result<RuleOutcome<'t>, EngineError> {
        let mut cursor = origin;
        let mut values = Vec::with_capacity(rule.items().len().max(1));
        let mut start = None;
        let mut end = None;

        if rule.is_epsilon() {
            values.push(Value::Nil);
        }

        for item in rule.items() {
            self.tick()?;
            match item {
                MatchItem::Nonterminal(child) => {
                    let (next, token) = self.match_nonterminal(cursor, child)?;
                    let Some(token) = token else {
                        return Ok(RuleOutcome::Failed);
                    };
                    if next.index() > cursor.index() {
                        start = start.or(Some(token.start()));
                        end = Some(end.map_or(token.end(), |e: usize| e.max(token.end())));
                    }
                    values.push(token.payload);
                    cursor = next;
                }
                MatchItem::Terminal { kind, pattern } => {
                    let skip_comments = *kind != LexKind::Comment;
                    let Some((token, next)) = cursor.next_token(skip_comments) else {
                        return Ok(RuleOutcome::Failed);
                    };
                    if token.kind != *kind {
                        return Ok(RuleOutcome::Failed);
                    }
                    let lexeme = token.text(self.text);
                    if let Some(pattern) = pattern
                        && !pattern.matches(lexeme)
                    {
                        return Ok(RuleOutcome::Failed);
                    }
                    values.push(if kind.is_text_bearing() {
                        Value::Text(lexeme.to_string())
                    } else {
                        Value::Span(token.span())
                    });
                    start = start.or(Some(token.start));
                    end = Some(end.map_or(token.end, |e: usize| e.max(token.end)));
                    cursor = next;
                }
            }
        }

        let start = start.unwrap_or_else(|| origin.offset());
        let span = Span::new(start, end.unwrap_or(start).max(start));

        let produced = match rule.action() {
            Some(action) => action(self, values, span)?,
            None => Some(default_action(rule, values, span)),
        };
        let Some(token) = produced else {
            return Ok(RuleOutcome::Discarded);
        };

        if !token.span.fits(self.text.len()) {
            return Err(EngineError::InvalidSpan {
                nonterminal: name.to_string(),
                span: token.span,
                len: self.text.len(),
            });
        }
        Ok(RuleOutcome::Matched(cursor, token))
    }

    fn tick(&mut self) -> Result<(), EngineError> {
        self.steps += 1;
        let limits = self.options.limits;

        if let Some(limit) = limits.step_budget
            && self.steps > limit
        {
            return Err(EngineError::BudgetExhausted { limit });
        }

        if let Some(deadline) = self.deadline
            && (self.steps == 1 || self.steps % DEADLINE_CHECK_INTERVAL == 0)
            && Instant::now() >= deadline
        {
            return Err(EngineError::DeadlineExceeded {
                limit: limits.timeout.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// A lone nonterminal passes its payload through; anything else becomes a
/// list of what was collected.
fn default_action(rule: &Rule, mut values: Vec<Value>, span: Span) -> SemanticToken {
    if let [MatchItem::Nonterminal(_)] = rule.items()
        && values.len() == 1
        && let Some(payload) = values.pop()
    {
        return SemanticToken::new(payload, span);
    }
    SemanticToken::new(Value::List(values), span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::TOPLEVEL;
    use bovinator_syntax::SyntaxTable;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn texts(values: &[&str]) -> Value {
        Value::List(values.iter().map(|v| Value::from(*v)).collect())
    }

    fn grammar(extra: Vec<(&str, Vec<Rule>)>) -> Grammar {
        let mut builder = Grammar::builder();
        let mut has_toplevel = false;
        for (name, rules) in extra {
            has_toplevel |= name == TOPLEVEL;
            builder = builder.nonterminal(name, rules);
        }
        if !has_toplevel {
            builder = builder.nonterminal(TOPLEVEL, vec![Rule::epsilon()]);
        }
        builder.build().unwrap()
    }

    fn run_with(
        grammar: &Grammar,
        text: &str,
        name: &str,
        options: ParseOptions,
    ) -> Result<(usize, Option<SemanticToken>), EngineError> {
        let lexer = Lexer::default();
        let stream = lexer.lex(text, 0..text.len(), options.max_depth)?;
        let mut ctx = MatchContext::new(text, grammar, &lexer, options);
        let (cursor, token) = ctx.match_nonterminal(TokenCursor::new(&stream), name)?;
        Ok((cursor.index(), token))
    }

    fn run(grammar: &Grammar, text: &str, name: &str) -> (usize, Option<SemanticToken>) {
        run_with(grammar, text, name, ParseOptions::default()).unwrap()
    }

    #[test]
    fn cursor_skips_comments_on_request() {
        let text = "a /* c */ b";
        let stream = bovinator_syntax::lex(text, 0..text.len(), 0).unwrap();
        let cursor = TokenCursor::new(&stream).advance(1);
        assert_eq!(cursor.offset(), 10);
        assert!(cursor.peek().unwrap().is_comment());

        let (token, next) = cursor.next_token(true).unwrap();
        assert_eq!(token.text(text), "b");
        assert!(next.at_end());
        assert_eq!(next.offset(), text.len());

        let (raw, _) = cursor.next_token(false).unwrap();
        assert_eq!(raw.kind, LexKind::Comment);
    }

    #[test]
    fn cursor_only_comments_remain() {
        let text = "a // trailing";
        let stream = bovinator_syntax::lex(text, 0..text.len(), 0).unwrap();
        let cursor = TokenCursor::new(&stream);
        assert!(!cursor.only_comments_remain());
        assert!(cursor.advance(1).only_comments_remain());
        assert!(cursor.advance(10).at_end());
    }

    #[test]
    fn first_alternative_wins() {
        let g = grammar(vec![(
            "pair",
            vec![
                Rule::new(vec![MatchItem::symbol()]),
                Rule::new(vec![MatchItem::symbol(), MatchItem::symbol()]),
            ],
        )]);
        let (consumed, token) = run(&g, "a b", "pair");
        let token = token.unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(token.payload, texts(&["a"]));
        assert_eq!(token.span, Span::new(0, 1));
    }

    #[test]
    fn failed_alternative_rewinds() {
        let g = grammar(vec![(
            "stmt",
            vec![
                Rule::new(vec![MatchItem::symbol(), MatchItem::punctuation(";")]),
                Rule::new(vec![MatchItem::symbol(), MatchItem::punctuation(",")]),
            ],
        )]);
        let (consumed, token) = run(&g, "a ,", "stmt");
        let token = token.unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(token.payload, texts(&["a", ","]));
        assert_eq!(token.span, Span::new(0, 3));
    }

    #[test]
    fn no_alternative_matches() {
        let g = grammar(vec![("word", vec![Rule::new(vec![MatchItem::keyword("int")])])]);
        assert_eq!(run(&g, "char", "word"), (0, None));
        assert_eq!(run(&g, "", "word"), (0, None));
    }

    #[test]
    fn epsilon_matches_at_end_of_stream() {
        let g = grammar(vec![
            (
                "opt",
                vec![Rule::new(vec![MatchItem::symbol()]), Rule::epsilon()],
            ),
            (
                "decl",
                vec![Rule::new(vec![
                    MatchItem::symbol(),
                    MatchItem::nonterminal("opt"),
                ])],
            ),
        ]);

        let (_, token) = run(&g, "x", "decl");
        let token = token.unwrap();
        assert_eq!(
            token.payload,
            Value::List(vec![Value::from("x"), Value::List(vec![Value::Nil])])
        );
        assert_eq!(token.span, Span::new(0, 1));

        let (consumed, token) = run(&g, "", "opt");
        assert_eq!(consumed, 0);
        assert_eq!(token.unwrap().span, Span::new(0, 0));
    }

    #[test]
    fn comments_are_transparent_to_terminals() {
        let g = grammar(vec![(
            "pair",
            vec![Rule::new(vec![MatchItem::symbol(), MatchItem::symbol()])],
        )]);
        let (_, plain) = run(&g, "a b", "pair");
        let (consumed, commented) = run(&g, "a /*c*/ b", "pair");
        assert_eq!(plain.unwrap().payload, commented.clone().unwrap().payload);
        assert_eq!(consumed, 3);
        assert_eq!(commented.unwrap().span, Span::new(0, 9));
    }

    #[test]
    fn comment_items_see_comments() {
        let g = grammar(vec![(
            "documented",
            vec![Rule::new(vec![
                MatchItem::terminal(LexKind::Comment),
                MatchItem::symbol(),
            ])],
        )]);
        let (_, token) = run(&g, "// doc\nx", "documented");
        let token = token.unwrap();
        assert_eq!(
            token.payload,
            Value::List(vec![Value::Span(Span::new(0, 6)), Value::from("x")])
        );
        assert_eq!(token.span, Span::new(0, 8));
    }

    #[test]
    fn nested_payload_is_collected_without_span() {
        let g = grammar(vec![
            (
                "name",
                vec![Rule::new(vec![MatchItem::symbol()]).with_action(|_, values, span| {
                    Ok(Some(SemanticToken::new(values[0].clone(), span)))
                })],
            ),
            (
                "assign",
                vec![Rule::new(vec![
                    MatchItem::nonterminal("name"),
                    MatchItem::punctuation("="),
                    MatchItem::symbol(),
                ])],
            ),
        ]);
        let (_, token) = run(&g, "x = 1", "assign");
        let token = token.unwrap();
        assert_eq!(token.payload, texts(&["x", "=", "1"]));
        assert_eq!(token.span, Span::new(0, 5));
    }

    #[test]
    fn lone_nonterminal_passes_payload_through() {
        let g = grammar(vec![
            (
                "inner",
                vec![Rule::new(vec![MatchItem::symbol()])
                    .with_action(|_, _, span| Ok(Some(SemanticToken::new("inner", span))))],
            ),
            ("outer", vec![Rule::new(vec![MatchItem::nonterminal("inner")])]),
        ]);
        let (_, token) = run(&g, "abc", "outer");
        assert_eq!(token.unwrap(), SemanticToken::new("inner", Span::new(0, 3)));
    }

    #[test]
    fn list_spans_collect_spans() {
        let g = grammar(vec![(
            "call",
            vec![Rule::new(vec![MatchItem::symbol(), MatchItem::list()])],
        )]);
        let (_, token) = run(&g, "f(a, b)", "call");
        assert_eq!(
            token.unwrap().payload,
            Value::List(vec![Value::from("f"), Value::Span(Span::new(1, 7))])
        );
    }

    #[test]
    fn discarded_match_stops_alternatives() {
        let g = grammar(vec![(
            "word",
            vec![
                Rule::new(vec![MatchItem::symbol()]).with_action(|_, _, _| Ok(None)),
                Rule::new(vec![MatchItem::symbol()]),
            ],
        )]);
        assert_eq!(run(&g, "a", "word"), (0, None));
    }

    #[test]
    fn action_errors_propagate() {
        let g = grammar(vec![(
            "word",
            vec![
                Rule::new(vec![MatchItem::symbol()])
                    .with_action(|_, _, _| Err(EngineError::Action("rejected".into()))),
            ],
        )]);
        let err = run_with(&g, "a", "word", ParseOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::Action(ref msg) if msg == "rejected"));
    }

    #[test]
    fn out_of_bounds_span_is_rejected() {
        let g = grammar(vec![(
            "word",
            vec![Rule::new(vec![MatchItem::symbol()])
                .with_action(|_, _, _| Ok(Some(SemanticToken::new("x", Span::new(0, 100)))))],
        )]);
        let err = run_with(&g, "a", "word", ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidSpan { ref nonterminal, len: 1, .. } if nonterminal == "word"
        ));
    }

    #[test]
    fn unknown_nonterminal() {
        let g = grammar(vec![]);
        let err = run_with(&g, "a", "missing", ParseOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownNonterminal(ref n) if n == "missing"));
    }

    #[test]
    fn left_recursion_hits_the_limit() {
        let g = grammar(vec![(
            "expr",
            vec![
                Rule::new(vec![
                    MatchItem::nonterminal("expr"),
                    MatchItem::punctuation("+"),
                    MatchItem::symbol(),
                ]),
                Rule::new(vec![MatchItem::symbol()]),
            ],
        )]);
        let err = run_with(&g, "a + b", "expr", ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::RecursionLimitExceeded { ref nonterminal, limit: 256 }
                if nonterminal == "expr"
        ));
    }

    fn left_recursive() -> Grammar {
        grammar(vec![(
            "expr",
            vec![
                Rule::new(vec![
                    MatchItem::nonterminal("expr"),
                    MatchItem::punctuation("+"),
                    MatchItem::symbol(),
                ]),
                Rule::new(vec![MatchItem::symbol()]),
            ],
        )])
    }

    #[rstest]
    #[case::deep(4_000, 4_000)]
    #[case::clamped(usize::MAX, MAX_RECURSION_LIMIT)]
    fn high_recursion_limit_errors_instead_of_overflowing(
        #[case] configured: usize,
        #[case] enforced: usize,
    ) {
        let options = ParseOptions {
            limits: Limits {
                recursion_limit: configured,
                ..Limits::default()
            },
            ..ParseOptions::default()
        };
        let err = run_with(&left_recursive(), "a + b", "expr", options).unwrap_err();
        assert!(matches!(
            err,
            EngineError::RecursionLimitExceeded { ref nonterminal, limit }
                if nonterminal == "expr" && limit == enforced
        ));
    }

    #[test]
    fn step_budget_is_enforced() {
        let g = grammar(vec![(
            "triple",
            vec![Rule::new(vec![
                MatchItem::symbol(),
                MatchItem::symbol(),
                MatchItem::symbol(),
            ])],
        )]);
        let mut options = ParseOptions::default();
        options.limits.step_budget = Some(2);
        let err = run_with(&g, "a b c", "triple", options).unwrap_err();
        assert!(matches!(err, EngineError::BudgetExhausted { limit: 2 }));

        options.limits.step_budget = Some(3);
        assert!(run_with(&g, "a b c", "triple", options).unwrap().1.is_some());
    }

    #[test]
    fn zero_timeout_expires_immediately() {
        let g = grammar(vec![("word", vec![Rule::new(vec![MatchItem::symbol()])])]);
        let mut options = ParseOptions::default();
        options.limits.timeout = Some(Duration::ZERO);
        let err = run_with(&g, "a", "word", options).unwrap_err();
        assert!(matches!(err, EngineError::DeadlineExceeded { .. }));
    }

    #[test]
    fn match_list_reads_the_interior() {
        let g = grammar(vec![(
            "pair",
            vec![Rule::new(vec![MatchItem::symbol(), MatchItem::symbol()])],
        )]);
        let text = "(a b)";
        let lexer = Lexer::default();
        let mut ctx = MatchContext::new(text, &g, &lexer, ParseOptions::default());
        let token = ctx.match_list(Span::new(0, 5), "pair").unwrap().unwrap();
        assert_eq!(token.payload, texts(&["a", "b"]));
        assert_eq!(token.span, Span::new(1, 4));
    }

    #[test]
    fn parse_list_skips_unmatched_tokens() {
        let g = grammar(vec![(
            "word",
            vec![Rule::new(vec![
                MatchItem::regex(LexKind::Symbol, "[a-z]+").unwrap(),
            ])],
        )]);
        let text = "[a 1 ; b /* c */]";
        let lexer = Lexer::new(SyntaxTable::default());
        let mut ctx = MatchContext::new(text, &g, &lexer, ParseOptions::default());
        let tokens = ctx.parse_list(Span::new(0, text.len()), "word").unwrap();
        let spans: Vec<_> = tokens.iter().map(|t| t.span).collect();
        assert_eq!(spans, vec![Span::new(1, 2), Span::new(7, 8)]);
    }
}

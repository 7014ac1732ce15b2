//! Demo grammar for Emacs Lisp style definitions.
//!
//! Each toplevel list is matched from the inside with
//! [`MatchContext::match_list`], so the lexer only ever needs depth 0.
//! Forms the grammar does not know become `code` tags named after their
//! head symbol.

use bovinator_engine::{
    ActionResult, EngineError, Grammar, GrammarError, LexKind, MatchContext, MatchItem, Rule,
    SemanticToken, Span, TOPLEVEL, Tag, TagClass, Value,
};

fn code_tag(name: &str) -> Tag {
    Tag::new(name, TagClass::Custom("code".to_string()))
}

fn first_value(_: &mut MatchContext<'_>, values: Vec<Value>, span: Span) -> ActionResult {
    let value = values.into_iter().next().unwrap_or_default();
    Ok(Some(SemanticToken::new(value, span)))
}

/// The matched source text, verbatim.
fn source_text(ctx: &mut MatchContext<'_>, _: Vec<Value>, span: Span) -> ActionResult {
    let text = ctx.text().get(span.range()).unwrap_or_default();
    Ok(Some(SemanticToken::new(text, span)))
}

/// The last collected value, e.g. the symbol after a quote.
fn last_value(_: &mut MatchContext<'_>, mut values: Vec<Value>, span: Span) -> ActionResult {
    let value = values.pop().unwrap_or_default();
    Ok(Some(SemanticToken::new(value, span)))
}

fn text(value: &Value) -> &str {
    value.as_text().unwrap_or_default()
}

fn unquote(doc: &str) -> &str {
    doc.strip_prefix('"')
        .and_then(|d| d.strip_suffix('"'))
        .unwrap_or(doc)
}

fn with_doc(tag: Tag, doc: &Value) -> Tag {
    match doc.as_text() {
        Some(doc) => tag.with_attribute("doc", unquote(doc)),
        None => tag,
    }
}

fn toplevel() -> Vec<Rule> {
    let atom = |kind: LexKind| {
        Rule::new(vec![MatchItem::terminal(kind)]).with_action(|ctx, _, span| {
            let name = ctx.text().get(span.range()).unwrap_or_default();
            Ok(Some(SemanticToken::new(code_tag(name), span)))
        })
    };

    vec![
        Rule::new(vec![MatchItem::list()]).with_action(|ctx, values, span| {
            let Some(list) = values[0].as_span() else {
                return Ok(None);
            };
            let token = ctx.match_list(list, "form")?;
            Ok(token.map(|token| token.with_span(span)))
        }),
        atom(LexKind::Symbol),
        atom(LexKind::String),
        atom(LexKind::Punctuation),
        atom(LexKind::CharQuote),
    ]
}

fn forms() -> Result<Vec<Rule>, GrammarError> {
    Ok(vec![
        Rule::new(vec![
            MatchItem::keyword("defun"),
            MatchItem::symbol(),
            MatchItem::list(),
            MatchItem::nonterminal("doc"),
        ])
        .with_action(|ctx, values, span| {
            let tag = Tag::new(text(&values[1]), TagClass::Function);
            let tag = arguments(ctx, tag, &values[2])?;
            Ok(Some(SemanticToken::new(with_doc(tag, &values[3]), span)))
        }),
        Rule::new(vec![
            MatchItem::keyword("defmacro"),
            MatchItem::symbol(),
            MatchItem::list(),
            MatchItem::nonterminal("doc"),
        ])
        .with_action(|ctx, values, span| {
            let tag = Tag::new(text(&values[1]), TagClass::Custom("macro".to_string()));
            let tag = arguments(ctx, tag, &values[2])?;
            Ok(Some(SemanticToken::new(with_doc(tag, &values[3]), span)))
        }),
        Rule::new(vec![
            MatchItem::regex(LexKind::Symbol, "def(var|const|custom)")?,
            MatchItem::symbol(),
            MatchItem::nonterminal("value"),
            MatchItem::nonterminal("doc"),
        ])
        .with_action(|_, values, span| {
            let mut tag = Tag::new(text(&values[1]), TagClass::Variable);
            if text(&values[0]) == "defconst" {
                tag = tag.with_attribute("constant", "t");
            }
            if !values[2].is_nil() {
                tag = tag.with_attribute("value", values[2].clone());
            }
            Ok(Some(SemanticToken::new(with_doc(tag, &values[3]), span)))
        }),
        Rule::new(vec![
            MatchItem::keyword("require"),
            MatchItem::nonterminal("feature"),
        ])
        .with_action(|_, values, span| {
            let tag = Tag::new(text(&values[1]), TagClass::Include);
            Ok(Some(SemanticToken::new(tag, span)))
        }),
        Rule::new(vec![
            MatchItem::keyword("provide"),
            MatchItem::nonterminal("feature"),
        ])
        .with_action(|_, values, span| {
            let tag = Tag::new(text(&values[1]), TagClass::Package);
            Ok(Some(SemanticToken::new(tag, span)))
        }),
        Rule::new(vec![MatchItem::nonterminal("code")]),
    ])
}

/// Attach the argument list span and the argument names found in it.
fn arguments(ctx: &mut MatchContext<'_>, tag: Tag, args: &Value) -> Result<Tag, EngineError> {
    let Some(args) = args.as_span() else {
        return Ok(tag);
    };
    let names: Vec<Value> = ctx
        .parse_list(args, "argument")?
        .into_iter()
        .map(|token| token.payload)
        .collect();
    Ok(tag
        .with_attribute("args", args)
        .with_attribute("arguments", names))
}

pub fn grammar() -> Result<Grammar, GrammarError> {
    Grammar::builder()
        .nonterminal(TOPLEVEL, toplevel())
        .nonterminal("form", forms()?)
        .nonterminal(
            "code",
            vec![
                Rule::new(vec![MatchItem::symbol()]).with_action(|_, values, span| {
                    Ok(Some(SemanticToken::new(code_tag(text(&values[0])), span)))
                }),
                Rule::epsilon()
                    .with_action(|_, _, span| Ok(Some(SemanticToken::new(code_tag(""), span)))),
            ],
        )
        .nonterminal(
            "doc",
            vec![
                Rule::new(vec![MatchItem::string()]).with_action(first_value),
                Rule::epsilon().with_action(first_value),
            ],
        )
        .nonterminal(
            "value",
            vec![
                Rule::new(vec![MatchItem::symbol()]).with_action(source_text),
                Rule::new(vec![MatchItem::string()]).with_action(source_text),
                Rule::new(vec![MatchItem::list()]).with_action(source_text),
                Rule::new(vec![MatchItem::punctuation("'"), MatchItem::symbol()])
                    .with_action(source_text),
                Rule::new(vec![MatchItem::punctuation("'"), MatchItem::list()])
                    .with_action(source_text),
                Rule::epsilon().with_action(first_value),
            ],
        )
        .nonterminal(
            "feature",
            vec![
                Rule::new(vec![MatchItem::punctuation("'"), MatchItem::symbol()])
                    .with_action(last_value),
                Rule::new(vec![MatchItem::symbol()]).with_action(first_value),
            ],
        )
        .nonterminal(
            "argument",
            vec![Rule::new(vec![MatchItem::symbol()]).with_action(first_value)],
        )
        .build()
}

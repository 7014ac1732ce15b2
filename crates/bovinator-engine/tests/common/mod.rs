//! Shared grammar for the integration tests: a small Emacs Lisp subset
//! parsed at depth 0, where each toplevel form is one list span.

use bovinator_engine::{
    ActionResult, Grammar, MatchContext, MatchItem, Rule, SemanticToken, Span, TOPLEVEL, Tag,
    TagClass, Value,
};

/// Passes the first collected value through with the rule's span.
fn first_value(_: &mut MatchContext<'_>, values: Vec<Value>, span: Span) -> ActionResult {
    let value = values.into_iter().next().unwrap_or_default();
    Ok(Some(SemanticToken::new(value, span)))
}

fn text(value: &Value) -> &str {
    value.as_text().unwrap_or_default()
}

pub fn lisp_grammar() -> Grammar {
    Grammar::builder()
        .nonterminal(
            TOPLEVEL,
            vec![Rule::new(vec![MatchItem::list()]).with_action(|ctx, values, span| {
                let Some(list) = values[0].as_span() else {
                    return Ok(None);
                };
                let token = ctx.match_list(list, "definition")?;
                Ok(token.map(|token| token.with_span(span)))
            })],
        )
        .nonterminal(
            "definition",
            vec![
                Rule::new(vec![
                    MatchItem::keyword("defun"),
                    MatchItem::symbol(),
                    MatchItem::list(),
                    MatchItem::nonterminal("doc"),
                ])
                .with_action(|ctx, values, span| {
                    let mut tag = Tag::new(text(&values[1]), TagClass::Function);
                    if let Some(args) = values[2].as_span() {
                        let names = ctx
                            .parse_list(args, "argument")?
                            .into_iter()
                            .map(|token| token.payload)
                            .collect::<Vec<_>>();
                        tag = tag
                            .with_attribute("args", args)
                            .with_attribute("arguments", names);
                    }
                    if let Some(doc) = values[3].as_text() {
                        tag = tag.with_attribute("doc", doc);
                    }
                    Ok(Some(SemanticToken::new(tag, span)))
                }),
                Rule::new(vec![
                    MatchItem::keyword("defvar"),
                    MatchItem::symbol(),
                    MatchItem::nonterminal("value"),
                ])
                .with_action(|_, values, span| {
                    let mut tag = Tag::new(text(&values[1]), TagClass::Variable);
                    if !values[2].is_nil() {
                        tag = tag.with_attribute("value", values[2].clone());
                    }
                    Ok(Some(SemanticToken::new(tag, span)))
                }),
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
                Rule::new(vec![MatchItem::symbol()]).with_action(first_value),
                Rule::new(vec![MatchItem::string()]).with_action(first_value),
                Rule::epsilon().with_action(first_value),
            ],
        )
        .nonterminal(
            "argument",
            vec![Rule::new(vec![MatchItem::symbol()]).with_action(first_value)],
        )
        .build()
        .unwrap()
}

/// One line per token, in the token's display form.
#[allow(dead_code)]
pub fn render(tokens: &[SemanticToken]) -> String {
    tokens.iter().map(|token| format!("{token}\n")).collect()
}

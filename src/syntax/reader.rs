//! The reader: source text in, values out.
//!
//! Purely syntactic — no name resolution, no expansion. `'x` reads as a
//! `Quote` node; backtick and comma read as ordinary `quasi-quote` /
//! `unquote` combinations for the expander to interpret.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::errors::{self, QuillError, Result};
use crate::syntax::Span;
use crate::value::{Value, ValueKind};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct QuillParser;

/// Reads a whole source buffer into its top-level forms.
pub fn read(source: &str) -> Result<Vec<Value>> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }

    let pairs =
        QuillParser::parse(Rule::program, source).map_err(convert_parse_error)?;
    let program = pairs.peek().expect("pest guarantees the program rule");

    program
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(build_term)
        .collect()
}

fn build_term(pair: Pair<Rule>) -> Result<Value> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::number => {
            let text = pair.as_str();
            let value = text.parse::<u64>().map_err(|_| {
                errors::parse(format!("number literal '{text}' out of range"), Some(span))
            })?;
            Ok(Value::new(ValueKind::Num(value), Some(span)))
        }

        Rule::atom => Ok(Value::new(
            ValueKind::Atom(pair.as_str().to_string()),
            Some(span),
        )),

        Rule::string => {
            let content = unescape_string(pair.as_str());
            Ok(Value::new(ValueKind::Str(content), Some(span)))
        }

        Rule::list => {
            let items: Vec<Value> = pair
                .into_inner()
                .map(build_term)
                .collect::<Result<_>>()?;
            Ok(list_with_span(items, span))
        }

        Rule::quoted => {
            let inner = expect_inner(pair, span)?;
            Ok(Value::new(ValueKind::Quote(build_term(inner)?), Some(span)))
        }

        Rule::quasiquoted => {
            let inner = expect_inner(pair, span)?;
            Ok(prefix_form("quasi-quote", build_term(inner)?, span))
        }

        Rule::unquoted => {
            let inner = expect_inner(pair, span)?;
            Ok(prefix_form("unquote", build_term(inner)?, span))
        }

        rule => Err(errors::parse(
            format!("unsupported rule: {rule:?}"),
            Some(span),
        )),
    }
}

fn expect_inner(pair: Pair<Rule>, span: Span) -> Result<Pair<Rule>> {
    pair.into_inner()
        .next()
        .ok_or_else(|| errors::parse("expected a term after prefix", Some(span)))
}

/// Builds the proper list `(items…)`, tagging every spine node with the
/// list's span.
fn list_with_span(items: Vec<Value>, span: Span) -> Value {
    let mut value = Value::new(ValueKind::Nil, Some(span));
    for item in items.into_iter().rev() {
        value = Value::new(ValueKind::Cons(item, value), Some(span));
    }
    value
}

/// `` `x `` reads as `(quasi-quote x)` and `,x` as `(unquote x)`.
fn prefix_form(name: &str, inner: Value, span: Span) -> Value {
    let head = Value::new(ValueKind::Atom(name.to_string()), Some(span));
    let nil = Value::new(ValueKind::Nil, Some(span));
    let rest = Value::new(ValueKind::Cons(inner, nil), Some(span));
    Value::new(ValueKind::Cons(head, rest), Some(span))
}

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn unescape_string(text: &str) -> String {
    // Strip the surrounding quotes; the grammar guarantees they exist.
    let inner = &text[1..text.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

fn convert_parse_error(error: pest::error::Error<Rule>) -> QuillError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        pest::error::InputLocation::Span((start, end)) => Span { start, end },
    };

    errors::parse(error.variant.message().to_string(), Some(span))
}

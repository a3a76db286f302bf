//! The macro expander: a fixed-point rewriter over a single value.
//!
//! Expansion is purely syntactic from the evaluator's point of view, but
//! running a macro body is itself evaluation, so the expander and the
//! evaluator are mutually recursive at the form level. Macro arguments
//! are passed unevaluated; whatever the macro returns is expanded again
//! until the head is no longer a macro.

use crate::env::Env;
use crate::errors::{self, Result};
use crate::eval::{self, EvalContext};
use crate::value::{Value, ValueKind};

pub const MAX_EXPANSION_DEPTH: usize = 128;

/// Fully expands `form` in `env`. Idempotent on forms that contain no
/// macro calls.
pub fn expand(form: &Value, env: &Env, ctx: &mut EvalContext) -> Result<Value> {
    expand_at(form, env, ctx, 0)
}

fn expand_at(form: &Value, env: &Env, ctx: &mut EvalContext, depth: usize) -> Result<Value> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(errors::recursion(form.span()));
    }

    // Surface quote nodes normalise to (quote x) so downstream handling
    // is uniform.
    if let ValueKind::Quote(inner) = form.kind() {
        return Ok(Value::list(vec![Value::atom("quote"), inner.clone()]));
    }
    if !form.is_cons() {
        return Ok(form.clone());
    }

    let head = form.head().expect("cons has a head");
    let tail = form.tail().expect("cons has a tail");

    if let Some(name) = head.as_atom() {
        match name {
            // No recursion into quoted data.
            "quote" => return Ok(form.clone()),

            "quasi-quote" => {
                let args = tail.assert_list()?;
                if args.len() != 1 {
                    return Err(errors::arity("1", args.len(), form.span()));
                }
                return quasiquote(&args[0]);
            }

            _ => {
                if let Some(macro_fn) = env.lookup_macro(name) {
                    // Arguments reach the macro body unevaluated.
                    let args = tail.assert_list()?;
                    let replacement = eval::apply_closure(&macro_fn, args, ctx, depth)?;
                    return expand_at(&replacement, env, ctx, depth + 1);
                }
                if let Some(expanded) = expand_shaped(name, &head, &tail, env, ctx, depth)? {
                    return Ok(expanded);
                }
            }
        }
    }

    // Ordinary combination: expand the head and every element of the
    // spine, preserving any dotted tail. The remaining special forms
    // (if, block, while, throw, …) only have expression-valued slots, and
    // bare atoms are inert under this walk, so it is exactly their shape.
    let expanded_head = expand_at(&head, env, ctx, depth + 1)?;
    let expanded_tail = expand_spine(&tail, env, ctx, depth + 1)?;
    Ok(Value::cons(expanded_head, expanded_tail))
}

/// Shape-aware expansion for the special forms with slots that must not be
/// walked as expressions: `fn*` (name and parameter list), `set` (its
/// `(id name)` target), and `try*` (the catch binder). Returns `None` for
/// malformed shapes, which then take the generic walk and fail in the
/// evaluator with a proper diagnostic.
fn expand_shaped(
    name: &str,
    head: &Value,
    tail: &Value,
    env: &Env,
    ctx: &mut EvalContext,
    depth: usize,
) -> Result<Option<Value>> {
    match name {
        "fn*" => {
            let args = tail.assert_list()?;
            if args.len() < 3 {
                return Ok(None);
            }
            let mut items = vec![head.clone(), args[0].clone(), args[1].clone()];
            for body in &args[2..] {
                items.push(expand_at(body, env, ctx, depth + 1)?);
            }
            Ok(Some(Value::list(items)))
        }

        "set" => {
            let args = tail.assert_list()?;
            if args.len() != 2 {
                return Ok(None);
            }
            let expr = expand_at(&args[1], env, ctx, depth + 1)?;
            Ok(Some(Value::list(vec![
                head.clone(),
                args[0].clone(),
                expr,
            ])))
        }

        "try*" => {
            let args = tail.assert_list()?;
            if args.len() != 2 {
                return Ok(None);
            }
            let expr = expand_at(&args[0], env, ctx, depth + 1)?;
            let clause = match args[1].try_list() {
                Some((parts, None)) if parts.len() == 2 => Value::list(vec![
                    parts[0].clone(),
                    expand_at(&parts[1], env, ctx, depth + 1)?,
                ]),
                _ => args[1].clone(),
            };
            Ok(Some(Value::list(vec![head.clone(), expr, clause])))
        }

        _ => Ok(None),
    }
}

fn expand_spine(form: &Value, env: &Env, ctx: &mut EvalContext, depth: usize) -> Result<Value> {
    match form.kind() {
        ValueKind::Cons(head, tail) => {
            let expanded_head = expand_at(head, env, ctx, depth)?;
            let expanded_tail = expand_spine(tail, env, ctx, depth)?;
            Ok(Value::cons(expanded_head, expanded_tail))
        }
        _ => expand_at(form, env, ctx, depth),
    }
}

/// Walks a quasiquoted template into code that reconstructs it.
///
/// `,x` positions insert the expression itself, to be evaluated in place;
/// a nested backtick inside a template reads the same way (a reader-level
/// unquote). Every other cons becomes a `(cons A B)` construction and
/// every leaf becomes `(quote t)`.
fn quasiquote(template: &Value) -> Result<Value> {
    let ValueKind::Cons(head, tail) = template.kind() else {
        return Ok(Value::list(vec![Value::atom("quote"), template.clone()]));
    };

    if matches!(head.as_atom(), Some("unquote" | "quasi-quote")) {
        let args = tail.assert_list()?;
        if args.len() != 1 {
            return Err(errors::arity("1", args.len(), template.span()));
        }
        return Ok(args[0].clone());
    }

    Ok(Value::list(vec![
        Value::atom("cons"),
        quasiquote(head)?,
        quasiquote(tail)?,
    ]))
}

//! The tree-walking evaluator.
//!
//! `eval` drives a rewrite loop: each pass either returns a value or
//! replaces the current form and environment and goes around again. `if`
//! and `block` tails, `try*` catch bodies, and closure bodies all continue
//! the loop instead of recursing, so deeply recursive library code only
//! grows the Rust stack through argument evaluation — which is guarded by
//! an explicit depth limit.

use crate::env::Env;
use crate::errors::{self, ErrorKind, Result};
use crate::expand;
use crate::primitives::OutputSink;
use crate::syntax::Span;
use crate::value::{Closure, Params, Value, ValueKind};

pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Per-run evaluation state threaded through the evaluator, the expander,
/// and every primitive.
pub struct EvalContext<'o> {
    pub output: &'o mut dyn OutputSink,
    pub max_depth: usize,
}

/// The view a primitive gets of its call site: evaluated arguments, the
/// caller's environment, and the shared context.
pub struct CallScope<'a, 'o> {
    pub args: Vec<Value>,
    pub env: &'a Env,
    pub ctx: &'a mut EvalContext<'o>,
    pub span: Option<Span>,
    pub depth: usize,
}

impl CallScope<'_, '_> {
    /// The nth argument, or `Nil` past the end.
    pub fn at(&self, nth: usize) -> Value {
        self.args.get(nth).cloned().unwrap_or_else(Value::nil)
    }

    pub fn assert_arity(&self, size: usize) -> Result<()> {
        if self.args.len() != size {
            return Err(errors::arity(size.to_string(), self.args.len(), self.span));
        }
        Ok(())
    }

    pub fn assert_at_least(&self, size: usize) -> Result<()> {
        if self.args.len() < size {
            return Err(errors::arity(format!("{size}+"), self.args.len(), self.span));
        }
        Ok(())
    }

    /// Evaluates a value as code in the caller's environment.
    pub fn eval(&mut self, form: &Value) -> Result<Value> {
        eval_at(form, self.env, self.ctx, self.depth + 1)
    }
}

pub fn eval(form: &Value, env: &Env, ctx: &mut EvalContext) -> Result<Value> {
    eval_at(form, env, ctx, 0)
}

pub(crate) fn eval_at(
    form: &Value,
    env: &Env,
    ctx: &mut EvalContext,
    depth: usize,
) -> Result<Value> {
    if depth > ctx.max_depth {
        return Err(errors::recursion(form.span()));
    }

    let mut form = form.clone();
    let mut env = env.clone();

    loop {
        let is_combination = match form.kind() {
            ValueKind::Cons(..) => true,
            ValueKind::Atom(name) if !name.starts_with(':') => {
                return env
                    .lookup_value(name)
                    .ok_or_else(|| errors::unbound(name.clone(), form.span()));
            }
            // `'x` straight from the reader; equivalent to `(quote x)`.
            ValueKind::Quote(inner) => return Ok(inner.clone()),
            // Nil, numbers, strings, keywords, aggregates, and callables
            // evaluate to themselves.
            _ => false,
        };
        if !is_combination {
            return Ok(form);
        }

        // One expansion pass at this layer; nested layers re-enter the
        // expander as they are evaluated.
        let expanded = expand::expand(&form, &env, ctx)?;
        if !expanded.is_cons() {
            form = expanded;
            continue;
        }

        let span = expanded.span().or(form.span());
        let (items, dotted) = expanded.try_list().expect("cons has a spine");
        if dotted.is_some() {
            return Err(errors::type_mismatch("proper list", "dotted pair", span));
        }
        let head = &items[0];
        let args = &items[1..];

        if let Some(name) = head.as_atom() {
            match name {
                "quote" => {
                    if args.len() != 1 {
                        return Err(errors::arity("1", args.len(), span));
                    }
                    return Ok(args[0].clone());
                }

                "if" => {
                    if args.len() < 2 || args.len() > 3 {
                        return Err(errors::arity("2 or 3", args.len(), span));
                    }
                    let cond = eval_at(&args[0], &env, ctx, depth + 1)?;
                    if cond.is_truthy() {
                        form = args[1].clone();
                    } else if let Some(alternative) = args.get(2) {
                        form = alternative.clone();
                    } else {
                        return Ok(Value::nil());
                    }
                    continue;
                }

                "block" | "begin" => {
                    let Some((last, init)) = args.split_last() else {
                        return Ok(Value::nil());
                    };
                    for arg in init {
                        eval_at(arg, &env, ctx, depth + 1)?;
                    }
                    form = last.clone();
                    continue;
                }

                "let" => {
                    if args.len() != 2 {
                        return Err(errors::arity("2", args.len(), span));
                    }
                    let name = args[0].assert_atom()?.to_string();
                    let value = eval_at(&args[1], &env, ctx, depth + 1)?;
                    env.define_value(name, value);
                    return Ok(Value::nil());
                }

                "set*" => {
                    if args.len() != 2 {
                        return Err(errors::arity("2", args.len(), span));
                    }
                    let name = args[0].assert_atom()?.to_string();
                    let value = eval_at(&args[1], &env, ctx, depth + 1)?;
                    env.root().define_value(name, value);
                    return Ok(Value::nil());
                }

                "setm*" => {
                    if args.len() != 2 {
                        return Err(errors::arity("2", args.len(), span));
                    }
                    let name = args[0].assert_atom()?.to_string();
                    let value = eval_at(&args[1], &env, ctx, depth + 1)?;
                    value.assert_closure()?;
                    env.root().define_macro(name, value);
                    return Ok(Value::nil());
                }

                "fn*" => return make_closure(args, &env, span),

                "set!" => {
                    if args.len() != 2 {
                        return Err(errors::arity("2", args.len(), span));
                    }
                    let name = args[0].assert_atom()?;
                    let value = eval_at(&args[1], &env, ctx, depth + 1)?;
                    if !env.set_value(name, value) {
                        return Err(errors::unbound(name, args[0].span()));
                    }
                    return Ok(Value::nil());
                }

                "set" => {
                    // Library-surface spelling: (set (id name) expr).
                    if args.len() != 2 {
                        return Err(errors::arity("2", args.len(), span));
                    }
                    let target = args[0].assert_list()?;
                    if target.len() != 2 || target[0].as_atom() != Some("id") {
                        return Err(errors::type_mismatch(
                            "(id name) target",
                            args[0].type_name(),
                            args[0].span(),
                        ));
                    }
                    let name = target[1].assert_atom()?;
                    let value = eval_at(&args[1], &env, ctx, depth + 1)?;
                    if !env.set_value(name, value) {
                        return Err(errors::unbound(name, target[1].span()));
                    }
                    return Ok(Value::nil());
                }

                "while" => {
                    if args.is_empty() {
                        return Err(errors::arity("1+", 0, span));
                    }
                    loop {
                        let cond = eval_at(&args[0], &env, ctx, depth + 1)?;
                        if !cond.is_truthy() {
                            break;
                        }
                        for body in &args[1..] {
                            eval_at(body, &env, ctx, depth + 1)?;
                        }
                    }
                    return Ok(Value::nil());
                }

                "throw" => {
                    if args.len() != 1 {
                        return Err(errors::arity("1", args.len(), span));
                    }
                    let value = eval_at(&args[0], &env, ctx, depth + 1)?;
                    return Err(errors::user(value));
                }

                "try*" => {
                    // (try* expr (name body)); catches user throws only.
                    if args.len() != 2 {
                        return Err(errors::arity("2", args.len(), span));
                    }
                    let clause = args[1].assert_list()?;
                    if clause.len() != 2 {
                        return Err(errors::type_mismatch(
                            "(name body) catch clause",
                            args[1].type_name(),
                            args[1].span(),
                        ));
                    }
                    let err_name = clause[0].assert_atom()?.to_string();
                    match eval_at(&args[0], &env, ctx, depth + 1) {
                        Ok(value) => return Ok(value),
                        Err(error) => match error.kind {
                            ErrorKind::User { value } => {
                                let frame = env.child();
                                frame.define_value(err_name, value);
                                env = frame;
                                form = clause[1].clone();
                                continue;
                            }
                            _ => return Err(error),
                        },
                    }
                }

                _ => {}
            }
        }

        // Ordinary application: evaluate the head, then every argument
        // left to right.
        let callee = eval_at(head, &env, ctx, depth + 1)?;
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(eval_at(arg, &env, ctx, depth + 1)?);
        }

        match callee.kind() {
            ValueKind::Closure(closure) => {
                let call_env = bind_params(&callee, closure, values, span)?;
                let body = closure.body.clone();
                env = call_env;
                form = body;
                continue;
            }
            ValueKind::Primitive(primitive) => {
                let scope = CallScope {
                    args: values,
                    env: &env,
                    ctx,
                    span,
                    depth,
                };
                return (primitive.func)(scope);
            }
            _ => {
                return Err(errors::type_mismatch(
                    "function",
                    callee.type_name(),
                    span,
                ))
            }
        }
    }
}

/// Applies a closure to already-materialised argument values. The
/// evaluator uses this for nothing (calls inline into the loop above); the
/// expander uses it to run macro bodies on unevaluated argument forms, and
/// `apply`-style primitives use it for first-class calls.
pub(crate) fn apply_closure(
    callee: &Value,
    args: Vec<Value>,
    ctx: &mut EvalContext,
    depth: usize,
) -> Result<Value> {
    let closure = callee.assert_closure()?;
    let env = bind_params(callee, closure, args, callee.span())?;
    eval_at(&closure.body, &env, ctx, depth + 1)
}

fn make_closure(args: &[Value], env: &Env, span: Option<Span>) -> Result<Value> {
    if args.len() < 3 {
        return Err(errors::arity("3+", args.len(), span));
    }
    let name = args[0].assert_atom()?.to_string();
    let params = parse_params(&args[1])?;
    let body = if args.len() == 3 {
        args[2].clone()
    } else {
        let mut items = Vec::with_capacity(args.len() - 1);
        items.push(Value::atom("block"));
        items.extend(args[2..].iter().cloned());
        Value::list(items)
    };

    Ok(Value::closure(Closure {
        name: Some(name),
        params,
        body,
        env: env.clone(),
    }))
}

fn parse_params(form: &Value) -> Result<Params> {
    let items = form.assert_list()?;
    let mut required = Vec::new();
    let mut rest = None;

    let mut iter = items.iter();
    while let Some(item) = iter.next() {
        let name = item.assert_atom()?;
        if name != "&rest" {
            required.push(name.to_string());
            continue;
        }
        let Some(tail) = iter.next() else {
            return Err(errors::type_mismatch(
                "parameter name after &rest",
                "end of list",
                form.span(),
            ));
        };
        rest = Some(tail.assert_atom()?.to_string());
        if iter.next().is_some() {
            return Err(errors::type_mismatch(
                "&rest tail as the final parameter",
                "extra parameters",
                form.span(),
            ));
        }
    }

    Ok(Params { required, rest })
}

/// Binds formals in a child of the closure's captured environment. The
/// closure's own name is bound first so named functions can recurse.
fn bind_params(
    callee: &Value,
    closure: &Closure,
    args: Vec<Value>,
    span: Option<Span>,
) -> Result<Env> {
    let required = closure.params.required.len();
    let variadic = closure.params.rest.is_some();
    if (!variadic && args.len() != required) || (variadic && args.len() < required) {
        return Err(errors::arity(closure.params.arity(), args.len(), span));
    }

    let frame = closure.env.child();
    if let Some(name) = &closure.name {
        frame.define_value(name.clone(), callee.clone());
    }

    let mut values = args.into_iter();
    for name in &closure.params.required {
        let value = values.next().expect("arity checked above");
        frame.define_value(name.clone(), value);
    }
    if let Some(rest) = &closure.params.rest {
        frame.define_value(rest.clone(), Value::list(values.collect()));
    }

    Ok(frame)
}

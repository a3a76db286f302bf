// Runtime introspection primitives.

use crate::env::Env;
use crate::expand;
use crate::primitives::{bind, boolean};
use crate::value::{PrimFn, Value, ValueKind};

/// The tag of a value, as a keyword.
///
/// Usage: (type-of <x>)
///
/// Example:
///   (type-of 3) ; => :num
pub const PRIM_TYPE_OF: PrimFn = |scope| {
    scope.assert_arity(1)?;
    Ok(Value::atom(format!(":{}", scope.at(0).type_name())))
};

/// Usage: (atom? <x>)
pub const PRIM_IS_ATOM: PrimFn = |scope| {
    scope.assert_arity(1)?;
    Ok(boolean(matches!(scope.at(0).kind(), ValueKind::Atom(_))))
};

/// Usage: (num? <x>)
pub const PRIM_IS_NUM: PrimFn = |scope| {
    scope.assert_arity(1)?;
    Ok(boolean(matches!(scope.at(0).kind(), ValueKind::Num(_))))
};

/// Usage: (str? <x>)
pub const PRIM_IS_STR: PrimFn = |scope| {
    scope.assert_arity(1)?;
    Ok(boolean(matches!(scope.at(0).kind(), ValueKind::Str(_))))
};

/// Usage: (fn? <x>)
pub const PRIM_IS_FN: PrimFn = |scope| {
    scope.assert_arity(1)?;
    Ok(boolean(matches!(
        scope.at(0).kind(),
        ValueKind::Closure(_) | ValueKind::Primitive(_)
    )))
};

/// One full expander pass over a value, in the caller's environment.
///
/// Usage: (expand <form>)
pub const PRIM_EXPAND: PrimFn = |scope| {
    scope.assert_arity(1)?;
    let form = scope.at(0);
    expand::expand(&form, scope.env, scope.ctx)
};

/// Evaluates a value as code in the caller's environment.
///
/// Usage: (eval <form>)
pub const PRIM_EVAL: PrimFn = |mut scope| {
    scope.assert_arity(1)?;
    let form = scope.at(0);
    scope.eval(&form)
};

pub fn register(env: &Env) {
    bind(env, "type-of", PRIM_TYPE_OF);
    bind(env, "atom?", PRIM_IS_ATOM);
    bind(env, "num?", PRIM_IS_NUM);
    bind(env, "str?", PRIM_IS_STR);
    bind(env, "fn?", PRIM_IS_FN);
    bind(env, "expand", PRIM_EXPAND);
    bind(env, "eval", PRIM_EVAL);
}

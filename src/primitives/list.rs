// Cons-pair and list primitives.

use crate::env::Env;
use crate::errors;
use crate::primitives::{bind, boolean};
use crate::value::{PrimFn, Value};

/// Builds a pair.
///
/// Usage: (cons <head> <tail>)
///
/// Example:
///   (cons 1 '(2 3)) ; => (1 2 3)
pub const PRIM_CONS: PrimFn = |scope| {
    scope.assert_arity(2)?;
    Ok(Value::cons(scope.at(0), scope.at(1)))
};

/// First element of a pair.
///
/// Usage: (head <pair>)
pub const PRIM_HEAD: PrimFn = |scope| {
    scope.assert_arity(1)?;
    let value = scope.at(0);
    value
        .head()
        .ok_or_else(|| errors::type_mismatch("cons pair", value.type_name(), scope.span))
};

/// Rest of a pair.
///
/// Usage: (tail <pair>)
pub const PRIM_TAIL: PrimFn = |scope| {
    scope.assert_arity(1)?;
    let value = scope.at(0);
    value
        .tail()
        .ok_or_else(|| errors::type_mismatch("cons pair", value.type_name(), scope.span))
};

/// Usage: (cons? <x>)
pub const PRIM_IS_CONS: PrimFn = |scope| {
    scope.assert_arity(1)?;
    Ok(boolean(scope.at(0).is_cons()))
};

/// Usage: (nil? <x>)
pub const PRIM_IS_NIL: PrimFn = |scope| {
    scope.assert_arity(1)?;
    Ok(boolean(scope.at(0).is_nil()))
};

/// Builds a proper list of its arguments.
///
/// Usage: (list <x> ...)
pub const PRIM_LIST: PrimFn = |scope| Ok(Value::list(scope.args.clone()));

/// Zero-based element access.
///
/// Usage: (list/nth <list> <n>)
pub const PRIM_NTH: PrimFn = |scope| {
    scope.assert_arity(2)?;
    let items = scope.at(0).assert_list()?;
    let index = scope.at(1).assert_num()? as usize;
    items.get(index).cloned().ok_or_else(|| {
        errors::user(Value::str(format!(
            "index {} out of bounds for list of length {}",
            index,
            items.len()
        )))
    })
};

pub fn register(env: &Env) {
    bind(env, "cons", PRIM_CONS);
    bind(env, "head", PRIM_HEAD);
    bind(env, "tail", PRIM_TAIL);
    bind(env, "cons?", PRIM_IS_CONS);
    bind(env, "nil?", PRIM_IS_NIL);
    bind(env, "list", PRIM_LIST);
    bind(env, "list/nth", PRIM_NTH);
}

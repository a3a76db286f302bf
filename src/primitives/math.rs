// Arithmetic and comparison primitives. Numbers are unsigned 64-bit;
// arithmetic saturates instead of wrapping.

use crate::env::Env;
use crate::primitives::{bind, boolean};
use crate::value::{PrimFn, Value};

/// Adds numbers.
///
/// Usage: (+ <a> <b> ...)
///
/// Example:
///   (+ 1 2 3) ; => 6
pub const PRIM_ADD: PrimFn = |scope| {
    let mut sum: u64 = 0;
    for arg in &scope.args {
        sum = sum.saturating_add(arg.assert_num()?);
    }
    Ok(Value::num(sum))
};

/// Subtracts from the first argument. Saturates at zero.
///
/// Usage: (- <a> <b> ...)
///
/// Example:
///   (- 10 3 2) ; => 5
pub const PRIM_SUB: PrimFn = |scope| {
    scope.assert_at_least(1)?;
    let mut result = scope.at(0).assert_num()?;
    for arg in &scope.args[1..] {
        result = result.saturating_sub(arg.assert_num()?);
    }
    Ok(Value::num(result))
};

/// Multiplies numbers.
///
/// Usage: (* <a> <b> ...)
///
/// Example:
///   (* 2 3 4) ; => 24
pub const PRIM_MUL: PrimFn = |scope| {
    scope.assert_at_least(1)?;
    let mut product: u64 = 1;
    for arg in &scope.args {
        product = product.saturating_mul(arg.assert_num()?);
    }
    Ok(Value::num(product))
};

/// Structural equality.
///
/// Usage: (= <a> <b>)
pub const PRIM_EQ: PrimFn = |scope| {
    scope.assert_arity(2)?;
    Ok(boolean(scope.at(0).structural_eq(&scope.at(1))))
};

/// Numeric less-than.
///
/// Usage: (< <a> <b>)
pub const PRIM_LT: PrimFn = |scope| {
    scope.assert_arity(2)?;
    Ok(boolean(scope.at(0).assert_num()? < scope.at(1).assert_num()?))
};

/// Numeric greater-than.
///
/// Usage: (> <a> <b>)
pub const PRIM_GT: PrimFn = |scope| {
    scope.assert_arity(2)?;
    Ok(boolean(scope.at(0).assert_num()? > scope.at(1).assert_num()?))
};

pub fn register(env: &Env) {
    bind(env, "+", PRIM_ADD);
    bind(env, "-", PRIM_SUB);
    bind(env, "*", PRIM_MUL);
    bind(env, "=", PRIM_EQ);
    bind(env, "<", PRIM_LT);
    bind(env, ">", PRIM_GT);
}

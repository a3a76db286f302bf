// String primitives. Lengths and slice indices are byte-based.

use crate::env::Env;
use crate::errors;
use crate::primitives::{bind, boolean};
use crate::value::{PrimFn, Value};

/// Usage: (str/len <s>)
pub const PRIM_STR_LEN: PrimFn = |scope| {
    scope.assert_arity(1)?;
    let value = scope.at(0);
    Ok(Value::num(value.assert_str()?.len() as u64))
};

/// Concatenates the printed content of its string arguments.
///
/// Usage: (str/concat <s> ...)
pub const PRIM_STR_CONCAT: PrimFn = |scope| {
    let mut out = String::new();
    for arg in &scope.args {
        out.push_str(arg.assert_str()?);
    }
    Ok(Value::str(out))
};

/// Byte slice of a string.
///
/// Usage: (str/slice <s> <start> <end>)
pub const PRIM_STR_SLICE: PrimFn = |scope| {
    scope.assert_arity(3)?;
    let value = scope.at(0);
    let s = value.assert_str()?;
    let start = scope.at(1).assert_num()? as usize;
    let end = scope.at(2).assert_num()? as usize;

    if start > end || end > s.len() || !s.is_char_boundary(start) || !s.is_char_boundary(end) {
        return Err(errors::user(Value::str(format!(
            "slice {start}..{end} out of bounds for string of length {}",
            s.len()
        ))));
    }
    Ok(Value::str(&s[start..end]))
};

/// Usage: (str/contains? <s> <needle>)
pub const PRIM_STR_CONTAINS: PrimFn = |scope| {
    scope.assert_arity(2)?;
    let value = scope.at(0);
    let needle = scope.at(1);
    Ok(boolean(value.assert_str()?.contains(needle.assert_str()?)))
};

pub fn register(env: &Env) {
    bind(env, "str/len", PRIM_STR_LEN);
    bind(env, "str/concat", PRIM_STR_CONCAT);
    bind(env, "str/slice", PRIM_STR_SLICE);
    bind(env, "str/contains?", PRIM_STR_CONTAINS);
}

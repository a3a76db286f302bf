// Vector primitives: the mutable sequence aggregate. Vectors compare by
// identity and mutate in place.

use std::cell::RefCell;

use crate::env::Env;
use crate::errors::{self, Result};
use crate::primitives::bind;
use crate::value::{PrimFn, Value, ValueKind};

fn with_vec<T>(value: &Value, f: impl FnOnce(&RefCell<Vec<Value>>) -> Result<T>) -> Result<T> {
    match value.kind() {
        ValueKind::Vector(items) => f(items),
        _ => Err(errors::type_mismatch("vec", value.type_name(), value.span())),
    }
}

/// Builds a vector of its arguments.
///
/// Usage: (vec <x> ...)
pub const PRIM_VEC: PrimFn = |scope| Ok(Value::vector(scope.args.clone()));

/// Usage: (vec/len <v>)
pub const PRIM_VEC_LEN: PrimFn = |scope| {
    scope.assert_arity(1)?;
    with_vec(&scope.at(0), |items| {
        Ok(Value::num(items.borrow().len() as u64))
    })
};

/// Usage: (vec/get <v> <n>)
pub const PRIM_VEC_GET: PrimFn = |scope| {
    scope.assert_arity(2)?;
    let index = scope.at(1).assert_num()? as usize;
    with_vec(&scope.at(0), |items| {
        items.borrow().get(index).cloned().ok_or_else(|| {
            errors::user(Value::str(format!(
                "index {} out of bounds for vec of length {}",
                index,
                items.borrow().len()
            )))
        })
    })
};

/// Replaces an element in place.
///
/// Usage: (vec/set! <v> <n> <x>)
pub const PRIM_VEC_SET: PrimFn = |scope| {
    scope.assert_arity(3)?;
    let index = scope.at(1).assert_num()? as usize;
    with_vec(&scope.at(0), |items| {
        let mut items = items.borrow_mut();
        if index >= items.len() {
            return Err(errors::user(Value::str(format!(
                "index {} out of bounds for vec of length {}",
                index,
                items.len()
            ))));
        }
        items[index] = scope.at(2);
        Ok(Value::nil())
    })
};

/// Usage: (vec/push! <v> <x>)
pub const PRIM_VEC_PUSH: PrimFn = |scope| {
    scope.assert_arity(2)?;
    with_vec(&scope.at(0), |items| {
        items.borrow_mut().push(scope.at(1));
        Ok(Value::nil())
    })
};

/// Removes and returns the last element, or `Nil` when empty.
///
/// Usage: (vec/pop! <v>)
pub const PRIM_VEC_POP: PrimFn = |scope| {
    scope.assert_arity(1)?;
    with_vec(&scope.at(0), |items| {
        Ok(items.borrow_mut().pop().unwrap_or_else(Value::nil))
    })
};

pub fn register(env: &Env) {
    bind(env, "vec", PRIM_VEC);
    bind(env, "vec/len", PRIM_VEC_LEN);
    bind(env, "vec/get", PRIM_VEC_GET);
    bind(env, "vec/set!", PRIM_VEC_SET);
    bind(env, "vec/push!", PRIM_VEC_PUSH);
    bind(env, "vec/pop!", PRIM_VEC_POP);
}

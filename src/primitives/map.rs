// Hash-map primitives. Entries are keyed by the printed rendition of the
// key value; the original key is kept so map/keys can return it.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::env::Env;
use crate::errors::{self, Result};
use crate::primitives::bind;
use crate::value::{PrimFn, Value, ValueKind};

fn with_map<T>(
    value: &Value,
    f: impl FnOnce(&RefCell<HashMap<String, (Value, Value)>>) -> Result<T>,
) -> Result<T> {
    match value.kind() {
        ValueKind::Map(entries) => f(entries),
        _ => Err(errors::type_mismatch("map", value.type_name(), value.span())),
    }
}

/// Builds a map from alternating keys and values.
///
/// Usage: (hash-map <key> <value> ...)
///
/// Example:
///   (hash-map :a 1 :b 2)
pub const PRIM_HASH_MAP: PrimFn = |scope| {
    if scope.args.len() % 2 != 0 {
        return Err(errors::arity(
            "an even number of",
            scope.args.len(),
            scope.span,
        ));
    }
    let mut entries = HashMap::new();
    for pair in scope.args.chunks(2) {
        entries.insert(pair[0].to_string(), (pair[0].clone(), pair[1].clone()));
    }
    Ok(Value::map(entries))
};

/// Looks a key up; `Nil` when absent.
///
/// Usage: (map/get <m> <key>)
pub const PRIM_MAP_GET: PrimFn = |scope| {
    scope.assert_arity(2)?;
    let key = scope.at(1).to_string();
    with_map(&scope.at(0), |entries| {
        Ok(entries
            .borrow()
            .get(&key)
            .map(|(_, value)| value.clone())
            .unwrap_or_else(Value::nil))
    })
};

/// Inserts or replaces in place.
///
/// Usage: (map/set! <m> <key> <value>)
pub const PRIM_MAP_SET: PrimFn = |scope| {
    scope.assert_arity(3)?;
    let key = scope.at(1);
    with_map(&scope.at(0), |entries| {
        entries
            .borrow_mut()
            .insert(key.to_string(), (key.clone(), scope.at(2)));
        Ok(Value::nil())
    })
};

/// Usage: (map/len <m>)
pub const PRIM_MAP_LEN: PrimFn = |scope| {
    scope.assert_arity(1)?;
    with_map(&scope.at(0), |entries| {
        Ok(Value::num(entries.borrow().len() as u64))
    })
};

/// The keys, as a vector, in no particular order.
///
/// Usage: (map/keys <m>)
pub const PRIM_MAP_KEYS: PrimFn = |scope| {
    scope.assert_arity(1)?;
    with_map(&scope.at(0), |entries| {
        let keys = entries
            .borrow()
            .values()
            .map(|(key, _)| key.clone())
            .collect();
        Ok(Value::vector(keys))
    })
};

pub fn register(env: &Env) {
    bind(env, "hash-map", PRIM_HASH_MAP);
    bind(env, "map/get", PRIM_MAP_GET);
    bind(env, "map/set!", PRIM_MAP_SET);
    bind(env, "map/len", PRIM_MAP_LEN);
    bind(env, "map/keys", PRIM_MAP_KEYS);
}

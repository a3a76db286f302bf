// I/O primitives. All output goes through the injected sink; file access
// is blocking and surfaces OS errors as runtime errors.

use std::fs;

use crate::env::Env;
use crate::errors;
use crate::primitives::bind;
use crate::value::{PrimFn, Value, ValueKind};

/// Prints its arguments. Strings print their content without quotes;
/// everything else prints in reader syntax.
///
/// Usage: (print <x> ...)
pub const PRIM_PRINT: PrimFn = |scope| {
    let mut text = String::new();
    for arg in &scope.args {
        match arg.kind() {
            ValueKind::Str(s) => text.push_str(s),
            _ => text.push_str(&arg.to_string()),
        }
    }
    scope.ctx.output.emit(&text);
    Ok(Value::nil())
};

/// Reads a whole file into a string.
///
/// Usage: (read-file <path>)
pub const PRIM_READ_FILE: PrimFn = |scope| {
    scope.assert_arity(1)?;
    let value = scope.at(0);
    let path = value.assert_str()?;
    let content = fs::read_to_string(path)
        .map_err(|e| errors::io(format!("cannot read '{path}': {e}")))?;
    Ok(Value::str(content))
};

pub fn register(env: &Env) {
    bind(env, "print", PRIM_PRINT);
    bind(env, "read-file", PRIM_READ_FILE);
}

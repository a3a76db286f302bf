// The C-ABI bridge. Arguments are marshalled into a flat word array and
// the native entry point is called through a transmuted function pointer,
// so the declared signature must match the callee exactly.

use std::ffi::{CStr, CString};

use libc::RTLD_LAZY;

use crate::env::Env;
use crate::errors::{self, Result};
use crate::primitives::bind;
use crate::value::{CType, Foreign, PrimFn, Value, ValueKind};

fn parse_ctype(value: &Value) -> Result<CType> {
    match value.as_atom() {
        Some("int") => Ok(CType::Int),
        Some("string") => Ok(CType::Str),
        Some("nil") => Ok(CType::Nil),
        _ => Err(errors::ffi(
            format!("unknown ffi type '{value}' (expected int, string, or nil)"),
            value.span(),
        )),
    }
}

/// Loads a shared object.
///
/// Usage: (ffi/open <path>)
pub const PRIM_FFI_OPEN: PrimFn = |scope| {
    scope.assert_arity(1)?;
    let value = scope.at(0);
    let path = value.assert_str()?;

    let c_path = CString::new(path)
        .map_err(|_| errors::ffi("library path contains a nul byte", scope.span))?;
    let handle = unsafe { libc::dlopen(c_path.as_ptr(), RTLD_LAZY) };

    if handle.is_null() {
        return Err(errors::ffi(format!("cannot open library '{path}'"), scope.span));
    }
    Ok(Value::foreign(Foreign::Library { handle }))
};

/// Resolves a symbol with a declared signature. The final element of the
/// type list is the return type.
///
/// Usage: (ffi/get <lib> <name> '(<type> ... <ret>))
///
/// Example:
///   (ffi/get lib "abs" '(int int))
pub const PRIM_FFI_GET: PrimFn = |scope| {
    scope.assert_arity(3)?;
    let lib = scope.at(0);
    let ValueKind::Foreign(Foreign::Library { handle }) = lib.kind() else {
        return Err(errors::type_mismatch("library handle", lib.type_name(), scope.span));
    };

    let name_value = scope.at(1);
    let name = name_value.assert_str()?;
    let types = scope.at(2).assert_list()?;
    if types.is_empty() {
        return Err(errors::ffi("signature needs at least a return type", scope.span));
    }
    let sig = types.iter().map(parse_ctype).collect::<Result<Vec<_>>>()?;

    let c_name = CString::new(name)
        .map_err(|_| errors::ffi("symbol name contains a nul byte", scope.span))?;
    let ptr = unsafe { libc::dlsym(*handle, c_name.as_ptr()) };

    if ptr.is_null() {
        return Err(errors::ffi(format!("cannot resolve symbol '{name}'"), scope.span));
    }
    Ok(Value::foreign(Foreign::Function { ptr, sig }))
};

/// Calls a resolved foreign function.
///
/// Usage: (ffi/apply <fn> (list <arg> ...))
pub const PRIM_FFI_APPLY: PrimFn = |scope| {
    scope.assert_arity(2)?;
    let callee = scope.at(0);
    let ValueKind::Foreign(Foreign::Function { ptr, sig }) = callee.kind() else {
        return Err(errors::type_mismatch(
            "foreign function",
            callee.type_name(),
            scope.span,
        ));
    };

    let args = scope.at(1).assert_list()?;
    let (ret_type, arg_types) = sig.split_last().expect("signature is non-empty");
    if args.len() != arg_types.len() {
        return Err(errors::ffi(
            format!(
                "wrong number of arguments: signature takes {}, got {}",
                arg_types.len(),
                args.len()
            ),
            scope.span,
        ));
    }

    // Keep marshalled C strings alive until after the call.
    let mut words = Vec::with_capacity(args.len());
    let mut c_strings = Vec::new();
    for (arg, ty) in args.iter().zip(arg_types) {
        match ty {
            CType::Int => words.push(arg.assert_num()? as i64),
            CType::Str => {
                let c_str = CString::new(arg.assert_str()?)
                    .map_err(|_| errors::ffi("string argument contains a nul byte", arg.span()))?;
                words.push(c_str.as_ptr() as i64);
                c_strings.push(c_str);
            }
            CType::Nil => {
                return Err(errors::ffi("nil is only valid as a return type", arg.span()));
            }
        }
    }

    let result = unsafe {
        let func: extern "C" fn(*const i64) -> i64 = std::mem::transmute(*ptr);
        func(words.as_ptr())
    };

    match ret_type {
        CType::Int => Ok(Value::num(result as u64)),
        CType::Nil => Ok(Value::nil()),
        CType::Str => {
            if result == 0 {
                return Err(errors::ffi("foreign function returned a null string", scope.span));
            }
            let c_str = unsafe { CStr::from_ptr(result as *const libc::c_char) };
            let text = c_str
                .to_str()
                .map_err(|_| errors::ffi("foreign function returned invalid utf-8", scope.span))?;
            Ok(Value::str(text))
        }
    }
};

pub fn register(env: &Env) {
    bind(env, "ffi/open", PRIM_FFI_OPEN);
    bind(env, "ffi/get", PRIM_FFI_GET);
    bind(env, "ffi/apply", PRIM_FFI_APPLY);
}

//! Host primitives, grouped by concern. Each submodule exposes a
//! `register` function that installs its operators into a frame;
//! [`install`] fans out to all of them and is called exactly once, while
//! seeding the root environment.

use crate::env::Env;
use crate::value::{PrimFn, Value};

pub mod ffi;
pub mod io;
pub mod list;
pub mod map;
pub mod math;
pub mod rt;
pub mod string;
pub mod vec;

/// Where `print` writes. Injected so output is capturable in tests and
/// owned by the driver in the CLI.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

/// Discards all output.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str) {}
}

/// Installs every primitive into the given (root) frame.
pub fn install(env: &Env) {
    list::register(env);
    math::register(env);
    string::register(env);
    vec::register(env);
    map::register(env);
    io::register(env);
    rt::register(env);
    ffi::register(env);
}

pub(crate) fn bind(env: &Env, name: &'static str, func: PrimFn) {
    env.define_value(name, Value::primitive(name, func));
}

/// Predicates answer with the `true` atom or `Nil`; `Nil` is the only
/// false value.
pub(crate) fn boolean(condition: bool) -> Value {
    if condition {
        Value::atom("true")
    } else {
        Value::nil()
    }
}

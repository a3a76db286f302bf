#![allow(dead_code)]

use quill::engine::{BufferSink, Interpreter};
use quill::errors::Result;
use quill::value::Value;

/// Evaluates a whole buffer in a fresh interpreter, returning the last
/// form's value.
pub fn eval_str(source: &str) -> Result<Value> {
    Interpreter::new().eval_source("<test>", source, &mut BufferSink::new())
}

/// Like `eval_str`, but also returns everything `print` emitted.
pub fn eval_with_output(source: &str) -> (Result<Value>, String) {
    let interpreter = Interpreter::new();
    let mut sink = BufferSink::new();
    let result = interpreter.eval_source("<test>", source, &mut sink);
    (result, sink.buffer)
}

/// Asserts that a buffer evaluates to the given number.
pub fn assert_num(source: &str, expected: u64) {
    let value = eval_str(source).unwrap_or_else(|e| panic!("{source} failed: {e}"));
    assert_eq!(value.as_num(), Some(expected), "value of {source}");
}

/// Asserts that a buffer's result prints as `expected`.
pub fn assert_prints(source: &str, expected: &str) {
    let value = eval_str(source).unwrap_or_else(|e| panic!("{source} failed: {e}"));
    assert_eq!(value.to_string(), expected, "printed form of {source}");
}

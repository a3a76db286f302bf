mod common;

use common::{assert_num, assert_prints, eval_str};
use quill::engine::{BufferSink, Interpreter};
use quill::errors::ErrorCategory;
use quill::eval::EvalContext;
use quill::expand;
use quill::primitives::NullSink;
use quill::value::Value;

// ---
// Test Setup
// ---

fn expand_one(interpreter: &Interpreter, source: &str) -> Value {
    let mut sink = BufferSink::new();
    let forms = interpreter
        .expand_source("<test>", source, &mut sink)
        .unwrap_or_else(|e| panic!("{source} failed to expand: {e}"));
    assert_eq!(forms.len(), 1, "expected one form in {source}");
    forms.into_iter().next().unwrap()
}

fn expand_value(interpreter: &Interpreter, form: &Value) -> Value {
    let mut sink = NullSink;
    let mut ctx = EvalContext {
        output: &mut sink,
        max_depth: 256,
    };
    expand::expand(form, interpreter.root(), &mut ctx)
        .unwrap_or_else(|e| panic!("{form} failed to expand: {e}"))
}

// ---
// Macro definition and expansion
// ---

#[test]
fn defun_expands_to_set_star() {
    let interpreter = Interpreter::new();
    let expanded = expand_one(&interpreter, "(defun sq (x) (* x x))");
    assert_eq!(expanded.to_string(), "(set* sq (fn* sq (x) (* x x)))");
}

#[test]
fn defined_macros_run_at_call_sites() {
    assert_num("(defun sq (x) (* x x)) (sq 9)", 81);
}

#[test]
fn macro_arguments_arrive_unevaluated() {
    assert_prints(
        "(defmacro first-arg (x) `(quote ,x))
         (= (first-arg (+ 1 2)) '(+ 1 2))",
        "true",
    );
}

#[test]
fn expansion_runs_to_a_fixed_point() {
    assert_num(
        "(defmacro add-one (x) `(+ ,x 1))
         (defmacro add-one-alias (x) `(add-one ,x))
         (add-one-alias 4)",
        5,
    );
}

#[test]
fn runaway_macro_recursion_is_bounded() {
    let err = eval_str("(defmacro spin (x) `(spin ,x)) (spin 1)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Recursion);
}

#[test]
fn setm_star_requires_a_closure() {
    let err = eval_str("(setm* m 3)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeMismatch);
}

#[test]
fn when_expands_to_if() {
    assert_num("(when (< 1 2) 7)", 7);
    assert_prints("(when () 7)", "()");
}

#[test]
fn value_and_macro_namespaces_are_disjoint() {
    // `twice` is simultaneously a function (argument position) and a
    // macro (head position).
    assert_prints(
        "(set* twice (fn* twice (x) (* 2 x)))
         (setm* twice (fn* twice (x) `(+ ,x ,x)))
         (list (twice 4) (list/map twice '(3)))",
        "(8 (6))",
    );
}

// ---
// Quote and quasiquote
// ---

#[test]
fn quoted_forms_are_not_expanded() {
    assert_prints("(defmacro bad (x) `(+ ,x 1)) '(bad 1)", "(bad 1)");
}

#[test]
fn quasiquote_without_unquote_equals_quote() {
    let interpreter = Interpreter::new();
    let quasi = expand_one(&interpreter, "`x");
    let plain = expand_one(&interpreter, "'x");
    assert!(quasi.structural_eq(&plain), "{quasi} != {plain}");
}

#[test]
fn quasiquote_splices_unquoted_values() {
    assert_prints("(let b 5) (= `(a ,b c) (list 'a b 'c))", "true");
    assert_prints("(let x 5) `(a ,x b)", "(a 5 b)");
}

#[test]
fn nested_unquote_reaches_inner_positions() {
    assert_prints("(let b 2) `(a (1 ,b))", "(a (1 2))");
}

// ---
// Idempotence
// ---

#[test]
fn expansion_is_idempotent_on_macro_free_forms() {
    let interpreter = Interpreter::new();
    for source in [
        "(if (< 1 2) (+ 1 2) (* 3 4))",
        "(fn* f (x &rest xs) (cons x xs))",
        "'(a b (c))",
        "`(a ,b)",
        "(block (let x 1) (while (< x 3) (set! x (+ x 1))) x)",
    ] {
        let once = expand_one(&interpreter, source);
        let twice = expand_value(&interpreter, &once);
        assert!(once.structural_eq(&twice), "{source}: {once} != {twice}");
    }
}

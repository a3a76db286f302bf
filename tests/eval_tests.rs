mod common;

use common::{assert_num, assert_prints, eval_str, eval_with_output};
use quill::errors::{ErrorCategory, ErrorKind};

// ---
// Arithmetic and self-evaluating forms
// ---

#[test]
fn basic_arithmetic() {
    assert_num("(+ 1 2)", 3);
    assert_num("(- 10 3 2)", 5);
    assert_num("(* 2 3 4)", 24);
    assert_num("(+ (* 2 10) (- 5 2))", 23);
}

#[test]
fn subtraction_saturates_at_zero() {
    assert_num("(- 1 5)", 0);
}

#[test]
fn literals_evaluate_to_themselves() {
    assert_prints("42", "42");
    assert_prints("\"hi\"", "\"hi\"");
    assert_prints("()", "()");
    assert_prints(":key", ":key");
}

#[test]
fn comparisons_answer_true_or_nil() {
    assert_prints("(< 1 2)", "true");
    assert_prints("(< 2 1)", "()");
    assert_prints("(= '(1 2) (list 1 2))", "true");
    assert_prints("(= \"a\" \"b\")", "()");
}

// ---
// Quote and special forms
// ---

#[test]
fn quote_returns_the_form_unevaluated() {
    assert_prints("'x", "x");
    assert_prints("(quote (foo 1 2))", "(foo 1 2)");
    assert_prints("''x", "'x");
}

#[test]
fn if_chooses_a_branch_and_defaults_to_nil() {
    assert_num("(if (< 1 2) 10 20)", 10);
    assert_num("(if () 10 20)", 20);
    assert_prints("(if () 10)", "()");
}

#[test]
fn block_sequences_and_returns_the_last_value() {
    assert_num("(block 1 2 3)", 3);
    assert_prints("(block)", "()");
    assert_num("(begin (let x 1) (+ x 1))", 2);
}

#[test]
fn let_defines_in_the_current_frame() {
    assert_num("(let x 5) x", 5);
    // A let inside a function call does not leak out.
    let err = eval_str("(set* f (fn* f (a) (let y a))) (f 1) y").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Unbound);
}

#[test]
fn set_bang_reassigns_the_nearest_binding() {
    assert_num("(set* x 1) (set! x 2) x", 2);
    assert_num("(set* x 1) (set (id x) 9) x", 9);

    let err = eval_str("(set! missing 1)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Unbound);
}

#[test]
fn while_loops_until_the_condition_is_nil() {
    assert_num("(set* i 0) (while (< i 5) (set! i (+ i 1))) i", 5);
    assert_prints("(while () 1)", "()");
}

// ---
// Closures
// ---

#[test]
fn named_closures_apply_and_recurse() {
    assert_num("(set* inc (fn* inc (x) (+ x 1))) (inc 41)", 42);
    assert_num(
        "(defun fib (n)
           (if (< n 2)
               n
               (+ (fib (- n 1)) (fib (- n 2)))))
         (fib 10)",
        55,
    );
}

#[test]
fn closures_capture_their_definition_site() {
    assert_num(
        "(set* n 100)
         (set* make-adder (fn* make-adder (n) (fn* adder (x) (+ x n))))
         ((make-adder 5) 3)",
        8,
    );
}

#[test]
fn rest_parameters_collect_surplus_arguments() {
    assert_prints("(set* f (fn* f (a &rest xs) (cons a xs))) (f 1 2 3)", "(1 2 3)");
    assert_prints("(set* f (fn* f (a &rest xs) xs)) (f 1)", "()");
}

#[test]
fn arity_mismatches_are_distinct_errors() {
    let err = eval_str("(set* inc (fn* inc (x) (+ x 1))) (inc 1 2)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Arity);

    let err = eval_str("(head 1 2)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Arity);
}

// ---
// Error surface
// ---

#[test]
fn head_of_a_number_is_a_type_mismatch() {
    let err = eval_str("(head 3)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeMismatch);
}

#[test]
fn unbound_symbols_are_reported() {
    let err = eval_str("(foo)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Unbound);

    let err = eval_str("bare-name").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Unbound);
}

#[test]
fn throw_carries_the_value_verbatim() {
    let err = eval_str("(throw :boom)").unwrap_err();
    match err.kind {
        ErrorKind::User { value } => assert_eq!(value.as_atom(), Some(":boom")),
        other => panic!("expected a user error, got {other}"),
    }
}

#[test]
fn calling_a_non_function_is_a_type_mismatch() {
    let err = eval_str("(3 4)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeMismatch);
}

#[test]
fn runaway_recursion_is_bounded() {
    let err = eval_str("(defun f (n) (+ 1 (f n))) (f 0)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Recursion);
}

#[test]
fn try_star_catches_user_throws_only() {
    assert_prints("(try* (throw :boom) (e e))", ":boom");
    assert_num("(try* (+ 1 2) (e 99))", 3);
    assert_num("(try* (block (throw 7) 1) (e (+ e 1)))", 8);

    // Non-user errors keep unwinding.
    let err = eval_str("(try* (head 3) (e e))").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeMismatch);
}

// ---
// Prelude library
// ---

#[test]
fn cond_selects_the_first_live_arm() {
    assert_num("(cond ((< 1 2) 1) ('true 2))", 1);
    assert_num("(cond ((< 2 1) 1) ('true 2))", 2);
}

#[test]
fn cond_without_a_live_arm_throws_no_match() {
    let err = eval_str("(cond ((< 2 1) 1))").unwrap_err();
    match err.kind {
        ErrorKind::User { value } => assert_eq!(value.as_atom(), Some(":no-match")),
        other => panic!("expected a user error, got {other}"),
    }
}

#[test]
fn list_library_round_trips() {
    assert_num("(list/length '(1 2 3))", 3);
    assert_prints("(list/reverse '(1 2 3))", "(3 2 1)");
    assert_prints("(list/append '(1 2) '(3))", "(1 2 3)");
    assert_prints("(defun sq (x) (* x x)) (list/map sq '(1 2 3))", "(1 4 9)");
}

#[test]
fn reverse_preserves_length_and_involutes() {
    assert_prints(
        "(= (list/length (list/reverse '(1 2 3 4))) (list/length '(1 2 3 4)))",
        "true",
    );
    assert_prints("(= (list/reverse (list/reverse '(1 2 3))) '(1 2 3))", "true");
}

// ---
// Aggregates
// ---

#[test]
fn vectors_mutate_in_place() {
    assert_num("(set* v (vec 1 2)) (vec/push! v 3) (vec/len v)", 3);
    assert_num("(set* v (vec 1 2 3)) (vec/get v 1)", 2);
    assert_num("(set* v (vec 1 2 3)) (vec/set! v 0 9) (vec/get v 0)", 9);
    assert_num("(set* v (vec 1 2)) (vec/pop! v)", 2);

    let err = eval_str("(vec/get (vec 1) 5)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::User);
}

#[test]
fn maps_key_by_printed_rendition() {
    assert_num("(set* m (hash-map :a 1 :b 2)) (map/get m :a)", 1);
    assert_prints("(map/get (hash-map :a 1) :missing)", "()");
    assert_num("(set* m (hash-map)) (map/set! m \"k\" 7) (map/get m \"k\")", 7);
    assert_num("(set* m (hash-map :a 1 :b 2)) (map/len m)", 2);

    let err = eval_str("(hash-map :a)").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Arity);
}

// ---
// Output and introspection
// ---

#[test]
fn print_writes_strings_raw_and_values_readably() {
    let (result, output) = eval_with_output("(print \"x = \" (+ 40 2))");
    assert!(result.is_ok());
    assert_eq!(output, "x = 42");
}

#[test]
fn type_of_answers_with_keywords() {
    assert_prints("(type-of 3)", ":num");
    assert_prints("(type-of '(1))", ":cons");
    assert_prints("(type-of (fn* f (x) x))", ":closure");
    assert_prints("(type-of head)", ":primitive");
}

#[test]
fn eval_runs_data_as_code() {
    assert_num("(eval '(+ 1 2))", 3);
    assert_num("(let form (list '+ 20 22)) (eval form)", 42);
}

// ---
// Interpreter isolation
// ---

#[test]
fn fresh_interpreters_share_nothing() {
    assert!(eval_str("(set* shared 1) shared").is_ok());
    let err = eval_str("shared").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Unbound);
}

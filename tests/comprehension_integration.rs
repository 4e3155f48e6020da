//! Integration tests for comprehension scopes: short-circuiting, in-scope
//! recovery, and nesting.

use tailwater::prelude::*;
use tailwater::{assert_exit_failure, assert_exit_success};

fn runtime() -> Runtime<()> {
    Runtime::new(())
}

#[test]
fn failing_eval_short_circuits_the_block() {
    let z = comprehension::<(), String, _, _>(|scope| {
        let y = comprehension::<(), String, _, _>(|inner| {
            let n = inner.eval(fail(String::from("wrong")));
            pure::<(), String, i32>(n)
        });
        let x = comprehension::<(), String, _, _>(|inner| {
            let n = inner.eval(pure(5));
            pure(n)
        });

        let b = scope.eval(y);
        let a = scope.eval(x);
        pure(a * b)
    });

    assert_exit_failure!(runtime().run(z), "wrong");
}

#[test]
fn recovery_inside_a_comprehension() {
    let z = comprehension::<(), String, _, _>(|scope| {
        let y = comprehension::<(), String, _, _>(|inner| {
            let n = inner.eval(fail(String::from("wrong")));
            pure::<(), String, i32>(n)
        });
        let x = comprehension::<(), String, _, _>(|inner| {
            let n = inner.eval(pure(5));
            pure(n)
        });

        let b = scope.eval(y.recover(|_| pure(5)));
        let a = scope.eval(x);
        pure(a * b)
    });

    assert_exit_success!(runtime().run(z), 25);
}

#[test]
fn statements_after_a_failing_eval_never_run() {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    let reached = Arc::new(AtomicU32::new(0));
    let witness = reached.clone();

    let effect = comprehension::<(), String, _, _>(move |scope| {
        witness.fetch_add(1, Ordering::SeqCst);
        let _ = scope.eval(fail::<(), String, i32>(String::from("stop")));
        witness.fetch_add(10, Ordering::SeqCst);
        pure(0)
    });

    assert_exit_failure!(runtime().run(effect), "stop");
    assert_eq!(reached.load(Ordering::SeqCst), 1);
}

#[test]
fn comprehensions_nest_three_levels() {
    let effect = comprehension::<(), String, _, _>(|outer| {
        let middle = comprehension::<(), String, _, _>(|mid| {
            let innermost = comprehension::<(), String, _, _>(|inner| {
                let n = inner.eval(pure(2));
                pure(n + 1)
            });
            let n = mid.eval(innermost);
            pure(n * 10)
        });
        let n = outer.eval(middle);
        pure(n + 12)
    });

    assert_exit_success!(runtime().run(effect), 42);
}

#[test]
fn inner_failure_is_recoverable_at_the_outer_level() {
    let effect = comprehension::<(), String, _, _>(|outer| {
        let failing = comprehension::<(), String, _, _>(|inner| {
            let n = inner.eval(fail::<(), String, i32>(String::from("inner")));
            pure(n)
        });
        let n = outer.eval(failing.recover(|msg| pure(msg.len() as i32)));
        pure(n)
    });

    assert_exit_success!(runtime().run(effect), 5);
}

#[test]
fn defects_raised_by_evaluated_effects_propagate() {
    let effect = comprehension::<(), String, _, _>(|scope| {
        let n = scope.eval(effect_total::<(), String, i32, _>(|| panic!("boom")));
        pure(n)
    });

    let exit = runtime().run(effect);
    assert_eq!(
        exit.defect().and_then(|d| d.message().map(str::to_owned)),
        Some("boom".to_string())
    );
}

#[test]
fn comprehension_reads_the_environment_in_force() {
    struct Env {
        lhs: i32,
        rhs: i32,
    }

    let effect = comprehension::<Env, String, _, _>(|scope| {
        let lhs = scope.eval(asks(|env: &Env| env.lhs));
        let rhs = scope.eval(asks(|env: &Env| env.rhs));
        pure(lhs * rhs)
    });

    let runtime = Runtime::new(Env { lhs: 6, rhs: 7 });
    assert_exit_success!(runtime.run(effect), 42);
}

#[test]
fn comprehension_composes_with_transactional_style_sequencing() {
    // A comprehension wrapping collection operators behaves like the
    // equivalent and_then chain.
    let effect = comprehension::<(), String, _, _>(|scope| {
        let values = scope.eval(sequence(vec![pure(1), pure(2), pure(3)]));
        let total: i32 = values.iter().sum();
        pure(total)
    });

    assert_exit_success!(runtime().run(effect), 6);
}

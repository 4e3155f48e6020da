//! Integration tests for the evaluation loop: stack safety, environment
//! scoping, and the boundary between captured and fatal panics.

use tailwater::prelude::*;
use tailwater::{assert_exit_failure, assert_exit_success};

#[test]
fn one_hundred_thousand_chained_and_thens() {
    let mut chained = pure::<(), String, _>(0_u64);
    for _ in 0..100_000 {
        chained = chained.and_then(|x| pure(x + 1));
    }

    let runtime = Runtime::new(());
    assert_exit_success!(runtime.run(chained), 100_000);
}

#[test]
fn one_hundred_thousand_maps() {
    let mut mapped = pure::<(), String, _>(0_u64);
    for _ in 0..100_000 {
        mapped = mapped.map(|x| x + 1);
    }

    let runtime = Runtime::new(());
    assert_exit_success!(runtime.run(mapped), 100_000);
}

#[test]
fn deep_recover_chain_is_stack_safe() {
    let mut effect = fail::<(), String, u64>("seed".to_string());
    for n in 0..50_000_u64 {
        effect = effect.recover(move |_| pure(n)).and_then(|_| fail("again".to_string()));
    }

    let runtime = Runtime::new(());
    assert_exit_failure!(runtime.run(effect), "again");
}

#[test]
fn forever_surfaces_failure_immediately() {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    let iterations = Arc::new(AtomicU32::new(0));
    let witness = iterations.clone();

    let runtime = Runtime::new(());
    let exit = runtime.run(forever(move || {
        let witness = witness.clone();
        effect_total::<(), String, _, _>(move || witness.fetch_add(1, Ordering::SeqCst))
            .and_then(|count| fail_if(count >= 4, || "stopped".to_string()))
    }));

    assert_exit_failure!(exit, "stopped");
    assert_eq!(iterations.load(Ordering::SeqCst), 5);
}

#[test]
fn provide_nests_and_unnests() {
    let runtime = Runtime::new("outer".to_string());

    let innermost = asks::<String, String, _, _>(|env| env.clone()).provide("inner".to_string());
    let middle = asks::<String, String, _, _>(|env| env.clone())
        .zip(innermost)
        .provide("middle".to_string());
    let effect = asks::<String, String, _, _>(|env| env.clone()).zip(middle);

    let exit = runtime.run(effect);
    assert_exit_success!(
        exit,
        (
            "outer".to_string(),
            ("middle".to_string(), "inner".to_string())
        )
    );
}

#[test]
fn fatal_panic_is_never_represented_as_an_exit() {
    let runtime = Runtime::new(());
    let payload = std::panic::catch_unwind(move || {
        runtime.run(effect::<(), i32, _>(|| {
            std::panic::panic_any(Fatal::new("simulated vm failure"))
        }))
    })
    .unwrap_err();

    let fatal = payload.downcast::<Fatal>().expect("fatal payload");
    assert_eq!(fatal.message(), Some("simulated vm failure"));
}

#[test]
fn fatal_panic_skips_cause_handlers() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let handler_ran = Arc::new(AtomicBool::new(false));
    let witness = handler_ran.clone();

    let runtime = Runtime::new(());
    let result = std::panic::catch_unwind(move || {
        runtime.run(
            effect_total::<(), String, i32, _>(|| {
                std::panic::panic_any(Fatal::new("simulated vm failure"))
            })
            .recover_cause(move |_| {
                witness.store(true, Ordering::SeqCst);
                pure(0)
            }),
        )
    });

    assert!(result.is_err());
    assert!(!handler_ran.load(Ordering::SeqCst));
}

#[test]
fn run_unwrap_raises_the_wrapper_for_expected_failures() {
    let runtime = Runtime::new(());
    let payload = std::panic::catch_unwind(move || {
        runtime.run_unwrap(fail::<(), _, i32>("wrapped".to_string()))
    })
    .unwrap_err();

    let wrapper = payload
        .downcast::<UnhandledFailure<String>>()
        .expect("unhandled failure wrapper");
    assert_eq!(wrapper.into_inner(), "wrapped");
}

#[test]
fn run_unwrap_resumes_defect_payloads() {
    #[derive(Debug, PartialEq)]
    struct DriverError(u32);

    let runtime = Runtime::new(());
    let payload = std::panic::catch_unwind(move || {
        runtime.run_unwrap(effect_total::<(), String, i32, _>(|| {
            std::panic::panic_any(DriverError(11))
        }))
    })
    .unwrap_err();

    assert_eq!(payload.downcast_ref::<DriverError>(), Some(&DriverError(11)));
}

#[test]
fn independent_runtimes_run_on_independent_threads() {
    let handles: Vec<_> = (0..4_i64)
        .map(|seed| {
            std::thread::spawn(move || {
                let runtime = Runtime::new(seed);
                let mut effect = asks::<i64, String, _, _>(|n| *n);
                for _ in 0..1_000 {
                    effect = effect.map(|x| x + 1);
                }
                runtime.run(effect).success()
            })
        })
        .collect();

    for (seed, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(seed as i64 + 1_000));
    }
}

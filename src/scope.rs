//! Comprehension scopes: imperative sequencing with early exit.
//!
//! [`comprehension`](crate::comprehension) lets a block of ordinary Rust
//! drive effects one at a time through [`Scope::eval`] instead of nesting
//! `and_then` closures. The first failing `eval` short-circuits the whole
//! block with that failure's cause.
//!
//! Each scope carries a per-evaluation identity. The early exit travels as a
//! private panic payload tagged with that identity, and the owning
//! comprehension catches only payloads carrying its own tag, so nested
//! comprehensions never swallow each other's exits. Because the exit uses
//! the host panic channel, a custom panic hook will observe (and may log)
//! these control-flow unwinds even though they are always caught.
//!
//! # Example
//!
//! ```rust
//! use tailwater::{comprehension, fail, pure, Runtime};
//!
//! let runtime = Runtime::new(());
//!
//! // The failing eval wins; the later one never runs.
//! let effect = comprehension::<(), String, _, _>(|scope| {
//!     let b = scope.eval(fail::<(), String, i32>(String::from("wrong")));
//!     let a = scope.eval(pure(5));
//!     pure::<(), String, _>(a * b)
//! });
//! assert_eq!(runtime.run(effect).failure(), Some("wrong".to_string()));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::panic;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::effect::Effect;
use crate::repr::{cast, AnyEnv, RawCause};
use crate::runtime::Machine;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(0);

/// The untyped identity and environment of one comprehension evaluation.
#[derive(Clone)]
pub(crate) struct RawScope {
    id: u64,
    env: AnyEnv,
}

impl RawScope {
    pub(crate) fn new(env: AnyEnv) -> Self {
        RawScope {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
            env,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

/// The panic payload of a comprehension's early exit.
///
/// Carries the identity of the scope it belongs to; only the matching
/// comprehension frame converts it back into a failure.
pub(crate) struct ScopeExit {
    pub(crate) scope: u64,
    pub(crate) cause: RawCause,
}

/// The capability handed to a comprehension body.
///
/// A scope evaluates inner effects on the spot, under the environment the
/// comprehension itself was evaluated with. It must not outlive its body:
/// an [`eval`](Scope::eval) performed after the body returned has no
/// matching catcher, and its early exit surfaces as a defect.
pub struct Scope<R, E> {
    id: u64,
    env: AnyEnv,
    _types: PhantomData<fn(R) -> E>,
}

impl<R, E> fmt::Debug for Scope<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope").field("id", &self.id).finish()
    }
}

impl<R, E> Scope<R, E>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
{
    pub(crate) fn from_raw(raw: &RawScope) -> Self {
        Scope {
            id: raw.id,
            env: Arc::clone(&raw.env),
            _types: PhantomData,
        }
    }

    /// Run an effect now and hand its success value back to the body.
    ///
    /// On failure the whole comprehension short-circuits with the effect's
    /// cause; statements after the failing `eval` never run.
    ///
    /// ```rust
    /// use tailwater::{comprehension, fail, pure, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let effect = comprehension::<(), String, _, _>(|scope| {
    ///     let recovered = scope.eval(fail(String::from("nope")).recover(|_| pure(5)));
    ///     pure(recovered * 5)
    /// });
    /// assert_eq!(runtime.run(effect).success(), Some(25));
    /// ```
    pub fn eval<A>(&self, effect: Effect<R, E, A>) -> A
    where
        A: Send + 'static,
    {
        match Machine::new(Arc::clone(&self.env)).run(effect.into_tree()) {
            Ok(value) => cast::<A>(value),
            Err(cause) => panic::panic_any(ScopeExit {
                scope: self.id,
                cause,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{asks, comprehension, effect_total, fail, pure};
    use crate::exit::Exit;
    use crate::runtime::Runtime;

    fn run<E, A>(effect: Effect<(), E, A>) -> Exit<E, A>
    where
        E: Send + 'static,
        A: Send + 'static,
    {
        Runtime::new(()).run(effect)
    }

    #[test]
    fn sequential_evals_multiply() {
        let effect = comprehension::<(), String, _, _>(|scope| {
            let a = scope.eval(pure(5));
            let b = scope.eval(pure(4));
            pure(a * b)
        });
        assert_eq!(run(effect).success(), Some(20));
    }

    #[test]
    fn first_failure_short_circuits() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let later_ran = Arc::new(AtomicBool::new(false));
        let witness = later_ran.clone();

        let effect = comprehension::<(), String, _, _>(move |scope| {
            let b = scope.eval(fail::<(), String, i32>(String::from("wrong")));
            let a = scope.eval(effect_total(move || {
                witness.store(true, Ordering::SeqCst);
                5
            }));
            pure::<(), String, _>(a * b)
        });

        assert_eq!(run(effect).failure(), Some("wrong".to_string()));
        assert!(!later_ran.load(Ordering::SeqCst));
    }

    #[test]
    fn recovery_inside_a_comprehension() {
        let effect = comprehension::<(), String, _, _>(|scope| {
            let b = scope.eval(fail(String::from("wrong")).recover(|_| pure(5)));
            let a = scope.eval(pure(5));
            pure(a * b)
        });
        assert_eq!(run(effect).success(), Some(25));
    }

    #[test]
    fn nested_comprehensions_catch_their_own_exits() {
        let effect = comprehension::<(), String, _, _>(|outer| {
            let inner = comprehension::<(), String, _, _>(|scope| {
                let n = scope.eval(fail(String::from("inner failed")));
                pure::<(), String, i32>(n)
            });
            let recovered = outer.eval(inner.recover(|msg| pure(msg.len() as i32)));
            pure(recovered)
        });
        assert_eq!(run(effect).success(), Some(12));
    }

    #[test]
    fn nested_failure_propagates_outward_unhandled() {
        let effect = comprehension::<(), String, _, _>(|outer| {
            let inner = comprehension::<(), String, _, _>(|scope| {
                let n = scope.eval(fail(String::from("inner failed")));
                pure::<(), String, i32>(n)
            });
            let n = outer.eval(inner);
            pure(n + 1)
        });
        assert_eq!(run(effect).failure(), Some("inner failed".to_string()));
    }

    #[test]
    fn comprehension_sees_the_current_environment() {
        let runtime = Runtime::new(7_i32);
        let effect = comprehension::<i32, String, _, _>(|scope| {
            let n = scope.eval(asks(|env: &i32| *env));
            pure(n * 6)
        });
        assert_eq!(runtime.run(effect).success(), Some(42));
    }

    #[test]
    fn comprehension_under_provide_sees_the_provided_environment() {
        let runtime = Runtime::new(1_i32);
        let inner = comprehension::<i32, String, _, _>(|scope| {
            let n = scope.eval(asks(|env: &i32| *env));
            pure(n)
        });
        assert_eq!(runtime.run(inner.provide(99)).success(), Some(99));
    }

    #[test]
    fn eval_outside_the_body_surfaces_as_defect() {
        // Smuggle the early exit into a plain map closure: the comprehension
        // completes first, so nothing catches the exit and the general guard
        // reclassifies it as a defect.
        let effect = comprehension::<(), String, _, _>(|scope| {
            let exit_late = {
                let scope = Scope::<(), String> {
                    id: scope.id,
                    env: Arc::clone(&scope.env),
                    _types: PhantomData,
                };
                move |_: i32| -> i32 { scope.eval(fail(String::from("late"))) }
            };
            pure(1).map(exit_late)
        });
        let exit = run(effect);
        assert!(exit.defect().is_some());
    }

    #[test]
    fn body_panic_becomes_defect() {
        let effect = comprehension::<(), String, _, _>(|_scope| -> Effect<(), String, i32> {
            panic!("body exploded")
        });
        let defect = run(effect).defect().expect("defect");
        assert_eq!(defect.message(), Some("body exploded"));
    }
}

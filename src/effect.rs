//! Effect values: lazy, composable descriptions of computations.
//!
//! An [`Effect<R, E, A>`] describes a computation that reads an environment
//! `R`, may fail with a typed error `E`, and succeeds with an `A`. Nothing
//! runs until the value is handed to a [`Runtime`](crate::Runtime); until
//! then an effect is just an immutable tree built from nine primitives, and
//! every combinator in this module lowers to those primitives.
//!
//! # Failure channels
//!
//! Effects fail in two ways, and the combinators are strict about which one
//! they see:
//!
//! - **Expected failures** (`E`) are visible to [`recover`](Effect::recover),
//!   [`map_error`](Effect::map_error), [`attempt`](Effect::attempt) and
//!   friends.
//! - **Defects** (escaped panics) bypass all of those and are visible only to
//!   [`fold_cause`](Effect::fold_cause) and
//!   [`recover_cause`](Effect::recover_cause).
//!
//! # Examples
//!
//! ## Basic composition
//!
//! ```rust
//! use tailwater::{pure, Runtime};
//!
//! let effect = pure::<(), String, _>(5)
//!     .map(|x| x * 2)
//!     .and_then(|x| pure(x + 10));
//!
//! let runtime = Runtime::new(());
//! assert_eq!(runtime.run(effect).success(), Some(20));
//! ```
//!
//! ## Using the environment
//!
//! ```rust
//! use tailwater::{asks, Runtime};
//!
//! struct Env {
//!     base_url: String,
//! }
//!
//! let effect = asks::<Env, String, _, _>(|env| format!("{}/users", env.base_url));
//!
//! let runtime = Runtime::new(Env {
//!     base_url: "https://api".to_string(),
//! });
//! assert_eq!(
//!     runtime.run(effect).success(),
//!     Some("https://api/users".to_string())
//! );
//! ```
//!
//! ## Capturing panics as typed failures
//!
//! ```rust
//! use tailwater::{effect, Runtime};
//!
//! let runtime = Runtime::new(());
//! let exit = runtime.run(effect::<(), i32, _>(|| panic!("io exploded")));
//! assert_eq!(
//!     exit.failure().and_then(|d| d.message().map(str::to_owned)),
//!     Some("io exploded".to_string())
//! );
//! ```

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::panic;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cause::{Cause, Defect, Fatal};
use crate::exit::Exit;
use crate::repr::{cast, AnyEnv, AnyValue, RawCause, Tree};
use crate::scope::Scope;

/// A lazy computation that needs an environment `R`, may fail with `E`, and
/// succeeds with an `A`.
///
/// Effect values are immutable and inert; running one requires a
/// [`Runtime`](crate::Runtime). They are also one-shot: Rust's ownership
/// model makes each value describe a single evaluation, and the places where
/// re-running matters ([`forever`], [`Effect::summarized`]) take a factory
/// closure instead.
pub struct Effect<R, E, A> {
    tree: Tree,
    _types: PhantomData<fn(R) -> (E, A)>,
}

impl<R, E, A> fmt::Debug for Effect<R, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("tree", &"<suspended>")
            .finish()
    }
}

impl<R, E, A> Effect<R, E, A>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    pub(crate) fn from_tree(tree: Tree) -> Self {
        Effect {
            tree,
            _types: PhantomData,
        }
    }

    pub(crate) fn into_tree(self) -> Tree {
        self.tree
    }

    // ========== Sequencing ==========

    /// Transform the success value.
    ///
    /// Failures of either kind pass through untouched.
    ///
    /// ```rust
    /// use tailwater::{pure, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let exit = runtime.run(pure::<(), String, _>(5).map(|x| x * 2));
    /// assert_eq!(exit.success(), Some(10));
    /// ```
    pub fn map<B, F>(self, f: F) -> Effect<R, E, B>
    where
        F: FnOnce(A) -> B + Send + 'static,
        B: Send + 'static,
    {
        Effect::from_tree(Tree::FlatMap(
            Box::new(self.tree),
            Box::new(move |value| Tree::Succeed(Box::new(f(cast::<A>(value))))),
        ))
    }

    /// Sequence another effect after this one.
    ///
    /// The continuation only runs on success; failures short-circuit.
    ///
    /// ```rust
    /// use tailwater::{fail, pure, Runtime};
    ///
    /// let runtime = Runtime::new(());
    ///
    /// let chained = pure::<(), String, _>(5).and_then(|x| pure(x + 1));
    /// assert_eq!(runtime.run(chained).success(), Some(6));
    ///
    /// let short = fail::<(), _, i32>("nope".to_string()).and_then(|x| pure(x + 1));
    /// assert_eq!(runtime.run(short).failure(), Some("nope".to_string()));
    /// ```
    pub fn and_then<B, F>(self, f: F) -> Effect<R, E, B>
    where
        F: FnOnce(A) -> Effect<R, E, B> + Send + 'static,
        B: Send + 'static,
    {
        Effect::from_tree(Tree::FlatMap(
            Box::new(self.tree),
            Box::new(move |value| f(cast::<A>(value)).tree),
        ))
    }

    /// Sequence two effects and pair their results.
    ///
    /// Strictly left to right: a failure on the left means the right effect
    /// never runs.
    pub fn zip<B>(self, other: Effect<R, E, B>) -> Effect<R, E, (A, B)>
    where
        B: Send + 'static,
    {
        self.and_then(move |a| other.map(move |b| (a, b)))
    }

    /// Sequence two effects and combine their results.
    ///
    /// ```rust
    /// use tailwater::{pure, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let exit = runtime.run(pure::<(), String, _>(2).zip_with(pure(3), |a, b| a * b));
    /// assert_eq!(exit.success(), Some(6));
    /// ```
    pub fn zip_with<B, C, F>(self, other: Effect<R, E, B>, f: F) -> Effect<R, E, C>
    where
        F: FnOnce(A, B) -> C + Send + 'static,
        B: Send + 'static,
        C: Send + 'static,
    {
        self.and_then(move |a| other.map(move |b| f(a, b)))
    }

    /// Perform a side effect with the value and return the value.
    ///
    /// If the side effect fails, the whole computation fails.
    #[inline]
    pub fn tap<F>(self, f: F) -> Self
    where
        F: FnOnce(&A) -> Effect<R, E, ()> + Send + 'static,
        A: Clone,
    {
        self.and_then(move |value| {
            let kept = value.clone();
            f(&value).map(move |_| kept)
        })
    }

    // ========== Failure handling ==========

    /// Transform the expected failure.
    ///
    /// Defects pass through unchanged; so do successes.
    ///
    /// ```rust
    /// use tailwater::{fail, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let exit = runtime.run(
    ///     fail::<(), _, i32>("timeout".to_string()).map_error(|e| format!("query: {}", e)),
    /// );
    /// assert_eq!(exit.failure(), Some("query: timeout".to_string()));
    /// ```
    pub fn map_error<E2, F>(self, f: F) -> Effect<R, E2, A>
    where
        F: FnOnce(E) -> E2 + Send + 'static,
        E2: Send + 'static,
    {
        self.fold_cause(move |cause| halt(cause.map(f)), pure)
    }

    /// Continue with one of two effects depending on the full cause.
    ///
    /// This is the only combinator whose failure branch observes defects;
    /// everything else lets them flow through. The handlers may change both
    /// the error and the success type.
    ///
    /// ```rust
    /// use tailwater::{effect_total, pure, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let effect = effect_total::<(), String, i32, _>(|| panic!("boom")).fold_cause(
    ///     |cause| pure::<(), String, _>(if cause.is_defect() { "defect" } else { "expected" }),
    ///     |_| pure::<(), String, _>("success"),
    /// );
    /// assert_eq!(runtime.run(effect).success(), Some("defect"));
    /// ```
    pub fn fold_cause<B, E2, F, S>(self, on_failure: F, on_success: S) -> Effect<R, E2, B>
    where
        F: FnOnce(Cause<E>) -> Effect<R, E2, B> + Send + 'static,
        S: FnOnce(A) -> Effect<R, E2, B> + Send + 'static,
        B: Send + 'static,
        E2: Send + 'static,
    {
        Effect::from_tree(Tree::Fold(
            Box::new(self.tree),
            Box::new(move |value| on_success(cast::<A>(value)).tree),
            Box::new(move |cause| on_failure(cause.into_typed::<E>()).tree),
        ))
    }

    /// Continue with one of two effects depending on the outcome, observing
    /// only expected failures.
    ///
    /// A defect is re-raised unchanged without entering either handler.
    pub fn fold<B, E2, F, S>(self, on_failure: F, on_success: S) -> Effect<R, E2, B>
    where
        F: FnOnce(E) -> Effect<R, E2, B> + Send + 'static,
        S: FnOnce(A) -> Effect<R, E2, B> + Send + 'static,
        B: Send + 'static,
        E2: Send + 'static,
    {
        self.fold_cause(
            move |cause| match cause {
                Cause::Expected(e) => on_failure(e),
                Cause::Panic(d) => halt(Cause::Panic(d)),
            },
            on_success,
        )
    }

    /// Recover from an expected failure with another effect.
    ///
    /// Defects are not recoverable here; they pass through untouched. This is
    /// the single canonical recovery combinator.
    ///
    /// ```rust
    /// use tailwater::{fail, pure, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let exit = runtime.run(fail::<(), String, _>("nope".to_string()).recover(|_| pure(42)));
    /// assert_eq!(exit.success(), Some(42));
    /// ```
    pub fn recover<F>(self, handler: F) -> Effect<R, E, A>
    where
        F: FnOnce(E) -> Effect<R, E, A> + Send + 'static,
    {
        self.fold(handler, pure)
    }

    /// Recover from any cause, defects included.
    pub fn recover_cause<F>(self, handler: F) -> Effect<R, E, A>
    where
        F: FnOnce(Cause<E>) -> Effect<R, E, A> + Send + 'static,
    {
        self.fold_cause(handler, pure)
    }

    /// Replace an expected failure with a default value.
    pub fn recover_default(self, default: A) -> Effect<R, E, A> {
        self.fold(move |_| pure(default), pure)
    }

    /// Surface the expected channel as a `Result`, always succeeding.
    ///
    /// Defects are NOT captured: they still propagate past `attempt`. Use
    /// [`fold_cause`](Effect::fold_cause) when a defect must be observed.
    ///
    /// ```rust
    /// use tailwater::{fail, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let exit = runtime.run(fail::<(), _, i32>("nope".to_string()).attempt());
    /// assert_eq!(exit.success(), Some(Err("nope".to_string())));
    /// ```
    pub fn attempt(self) -> Effect<R, Infallible, Result<A, E>> {
        self.fold(|e| pure(Err(e)), |a| pure(Ok(a)))
    }

    /// Swap the success and expected-failure channels.
    ///
    /// Defects are NOT swapped; they still propagate as defects.
    pub fn flip(self) -> Effect<R, A, E> {
        self.fold(pure, fail)
    }

    /// Convert any expected failure into a defect, removing the error channel.
    ///
    /// The failure value itself becomes the defect payload, so a cause-aware
    /// observer downstream can still recover it.
    ///
    /// ```rust
    /// use tailwater::{fail, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let exit = runtime.run(fail::<(), _, i32>("bad state".to_string()).or_die());
    /// let defect = exit.defect().expect("defect");
    /// assert_eq!(defect.downcast_ref::<String>().map(String::as_str), Some("bad state"));
    /// ```
    pub fn or_die(self) -> Effect<R, Infallible, A> {
        self.fold_cause(
            |cause| match cause {
                Cause::Expected(e) => halt(Cause::Panic(Defect::new(e))),
                Cause::Panic(d) => halt(Cause::Panic(d)),
            },
            pure,
        )
    }

    // ========== Validation ==========

    /// Fail when the predicate rejects the success value.
    ///
    /// ```rust
    /// use tailwater::{pure, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let exit = runtime.run(
    ///     pure::<(), String, _>(15).check(|age| *age >= 18, || "too young".to_string()),
    /// );
    /// assert_eq!(exit.failure(), Some("too young".to_string()));
    /// ```
    #[inline]
    pub fn check<P, F>(self, predicate: P, error_fn: F) -> Self
    where
        P: FnOnce(&A) -> bool + Send + 'static,
        F: FnOnce() -> E + Send + 'static,
    {
        self.and_then(move |value| {
            if predicate(&value) {
                pure(value)
            } else {
                fail(error_fn())
            }
        })
    }

    /// Run the effect for its side effects when the condition holds.
    ///
    /// When the condition is false the effect is skipped entirely and the
    /// result is an immediate success; either way the value is discarded.
    #[inline]
    pub fn guard(self, condition: bool) -> Effect<R, E, ()> {
        if condition {
            self.map(|_| ())
        } else {
            unit()
        }
    }

    // ========== Environment ==========

    /// Supply the environment, eliminating the requirement.
    ///
    /// The returned effect runs against any outer environment; the inner one
    /// sees only the provided value.
    ///
    /// ```rust
    /// use tailwater::{asks, Runtime};
    ///
    /// let effect = asks::<i32, String, _, _>(|n| n * 2).provide(21);
    /// let runtime = Runtime::new(());
    /// assert_eq!(runtime.run(effect).success(), Some(42));
    /// ```
    pub fn provide<R2>(self, env: R) -> Effect<R2, E, A>
    where
        R2: Send + Sync + 'static,
    {
        let env: AnyEnv = Arc::new(env);
        Effect::from_tree(Tree::Provide(Box::new(self.tree), env))
    }

    /// Run against a projection of a larger environment.
    pub fn local<R2, F>(self, f: F) -> Effect<R2, E, A>
    where
        F: FnOnce(&R2) -> R + Send + 'static,
        R2: Send + Sync + 'static,
    {
        asks_effect(move |outer: &R2| self.provide(f(outer)))
    }

    // ========== Timing ==========

    /// Run a summary effect before and after this one and combine the two
    /// observations.
    ///
    /// The summary is taken from a factory because each evaluation needs a
    /// fresh effect value.
    pub fn summarized<B, C, S, D>(self, summary: S, diff: D) -> Effect<R, E, (C, A)>
    where
        S: Fn() -> Effect<R, E, B> + Send + 'static,
        D: FnOnce(B, B) -> C + Send + 'static,
        B: Send + 'static,
        C: Send + 'static,
    {
        let before = summary();
        before.and_then(move |start| {
            self.and_then(move |value| summary().map(move |end| (diff(start, end), value)))
        })
    }

    /// Measure wall-clock evaluation time.
    ///
    /// ```rust
    /// use tailwater::{pure, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let (elapsed, value) = runtime.run(pure::<(), String, _>(42).measured()).unwrap();
    /// assert_eq!(value, 42);
    /// assert!(elapsed <= std::time::Duration::from_secs(1));
    /// ```
    pub fn measured(self) -> Effect<R, E, (Duration, A)> {
        self.summarized(
            || effect_total(Instant::now),
            |start, end| end.duration_since(start),
        )
    }
}

impl<R, A> Effect<R, Defect, A>
where
    R: Send + Sync + 'static,
    A: Send + 'static,
{
    /// Reclassify a captured panic as a typed failure, or abort the run.
    ///
    /// The caller supplies the refinement: returning `Ok` keeps the failure
    /// on the expected channel with the new type; handing the defect back
    /// re-raises its payload (wrapped in [`Fatal`]) so the entire run aborts
    /// through the panic channel.
    ///
    /// ```rust
    /// use tailwater::{effect, Runtime};
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct BadInput(String);
    ///
    /// let runtime = Runtime::new(());
    /// let refined = effect::<(), i32, _>(|| std::panic::panic_any(BadInput("0x".into())))
    ///     .refine_or_die(|defect| defect.downcast::<BadInput>());
    /// assert_eq!(runtime.run(refined).failure(), Some(BadInput("0x".into())));
    /// ```
    pub fn refine_or_die<E2, F>(self, refine: F) -> Effect<R, E2, A>
    where
        F: FnOnce(Defect) -> Result<E2, Defect> + Send + 'static,
        E2: Send + 'static,
    {
        self.fold(
            move |defect| match refine(defect) {
                Ok(error) => fail(error),
                Err(unmatched) => panic::panic_any(Fatal::from_payload(unmatched.into_payload())),
            },
            pure,
        )
    }
}

impl<R, E, A> Effect<R, E, Option<A>>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Unwrap the option, failing when it is `None`.
    ///
    /// ```rust
    /// use tailwater::{pure, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// let exit = runtime.run(
    ///     pure::<(), String, _>(None::<i32>).some_or_fail(|| "missing".to_string()),
    /// );
    /// assert_eq!(exit.failure(), Some("missing".to_string()));
    /// ```
    pub fn some_or_fail<F>(self, error_fn: F) -> Effect<R, E, A>
    where
        F: FnOnce() -> E + Send + 'static,
    {
        self.and_then(move |option| from_option(option, error_fn))
    }

    /// Unwrap the option, substituting a default when it is `None`.
    pub fn some_or(self, default: A) -> Effect<R, E, A> {
        self.map(move |option| option.unwrap_or(default))
    }

    /// Unwrap the option, continuing with a fallback effect when it is `None`.
    pub fn some_or_else<F>(self, fallback: F) -> Effect<R, E, A>
    where
        F: FnOnce() -> Effect<R, E, A> + Send + 'static,
    {
        self.and_then(move |option| match option {
            Some(value) => pure(value),
            None => fallback(),
        })
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// An effect that succeeds with the given value.
///
/// ```rust
/// use tailwater::{pure, Runtime};
///
/// let runtime = Runtime::new(());
/// assert_eq!(runtime.run(pure::<(), String, _>(42)).success(), Some(42));
/// ```
pub fn pure<R, E, A>(value: A) -> Effect<R, E, A>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    Effect::from_tree(Tree::Succeed(Box::new(value)))
}

/// An effect that fails with the given expected failure.
pub fn fail<R, E, A>(error: E) -> Effect<R, E, A>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    Effect::from_tree(Tree::Fail(RawCause::expected(error)))
}

/// An effect that fails with a full [`Cause`], defect or expected.
pub fn halt<R, E, A>(cause: Cause<E>) -> Effect<R, E, A>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    Effect::from_tree(Tree::Fail(RawCause::from_typed(cause)))
}

/// Lift a finished [`Exit`] back into an effect.
pub fn done<R, E, A>(exit: Exit<E, A>) -> Effect<R, E, A>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    match exit {
        Exit::Success(value) => pure(value),
        Exit::Failure(cause) => halt(cause),
    }
}

/// An effect that succeeds with `()`.
pub fn unit<R, E>() -> Effect<R, E, ()>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
{
    pure(())
}

/// Read the whole environment.
pub fn ask<R, E>() -> Effect<R, E, R>
where
    R: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    asks(|env: &R| env.clone())
}

/// Read a value out of the environment.
///
/// ```rust
/// use tailwater::{asks, Runtime};
///
/// struct Env {
///     port: u16,
/// }
///
/// let runtime = Runtime::new(Env { port: 8080 });
/// assert_eq!(
///     runtime.run(asks::<Env, String, _, _>(|env| env.port)).success(),
///     Some(8080)
/// );
/// ```
pub fn asks<R, E, A, F>(f: F) -> Effect<R, E, A>
where
    F: FnOnce(&R) -> A + Send + 'static,
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    Effect::from_tree(Tree::Access(Box::new(move |env| {
        let env = env
            .downcast_ref::<R>()
            .expect("environment type matches the effect's requirement");
        Tree::Succeed(Box::new(f(env)))
    })))
}

/// Build an effect from the environment.
///
/// The function runs when evaluation reaches this node, and the effect it
/// returns is evaluated in its place.
pub fn asks_effect<R, E, A, F>(f: F) -> Effect<R, E, A>
where
    F: FnOnce(&R) -> Effect<R, E, A> + Send + 'static,
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    Effect::from_tree(Tree::Access(Box::new(move |env| {
        let env = env
            .downcast_ref::<R>()
            .expect("environment type matches the effect's requirement");
        f(env).tree
    })))
}

/// Run a side-effecting thunk, capturing a non-fatal panic as an expected
/// [`Defect`].
///
/// This is the only place a panic lands on the expected channel; anywhere
/// else an escaped panic becomes a defect. A [`Fatal`] payload is re-raised
/// even here.
///
/// ```rust
/// use tailwater::{effect, Runtime};
///
/// let runtime = Runtime::new(());
/// let exit = runtime.run(effect::<(), _, _>(|| "hello".len()));
/// assert_eq!(exit.success(), Some(5));
/// ```
pub fn effect<R, A, F>(thunk: F) -> Effect<R, Defect, A>
where
    F: FnOnce() -> A + Send + 'static,
    R: Send + Sync + 'static,
    A: Send + 'static,
{
    Effect::from_tree(Tree::TrySync(Box::new(move || -> AnyValue {
        Box::new(thunk())
    })))
}

/// Run a side-effecting thunk that is not expected to panic.
///
/// If it panics anyway, the panic becomes a defect, not an expected failure.
pub fn effect_total<R, E, A, F>(thunk: F) -> Effect<R, E, A>
where
    F: FnOnce() -> A + Send + 'static,
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    Effect::from_tree(Tree::Sync(Box::new(move || -> AnyValue {
        Box::new(thunk())
    })))
}

/// Defer the construction of an effect until evaluation.
///
/// This is the fix-point vehicle: self-referential effects like [`forever`]
/// are tied lazily through `suspend` instead of building a cyclic value.
pub fn suspend<R, E, A, F>(f: F) -> Effect<R, E, A>
where
    F: FnOnce() -> Effect<R, E, A> + Send + 'static,
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    Effect::from_tree(Tree::FlatMap(
        Box::new(Tree::Succeed(Box::new(()))),
        Box::new(move |_| f().tree),
    ))
}

/// An imperative block over effects, with early exit on failure.
///
/// The body receives a [`Scope`] whose [`eval`](Scope::eval) runs an inner
/// effect on the spot: on success the value is returned to the body, and on
/// failure the whole comprehension short-circuits with that cause. Each
/// comprehension catches only its own exits, so nesting composes.
///
/// The scope must not escape the body. An `eval` performed outside it (from
/// a plain `map` closure, say) is not caught by anything and surfaces as a
/// defect.
///
/// ```rust
/// use tailwater::{comprehension, pure, Runtime};
///
/// let runtime = Runtime::new(());
/// let effect = comprehension::<(), String, _, _>(|scope| {
///     let a = scope.eval(pure(2));
///     let b = scope.eval(pure(3));
///     pure(a * b)
/// });
/// assert_eq!(runtime.run(effect).success(), Some(6));
/// ```
pub fn comprehension<R, E, A, F>(body: F) -> Effect<R, E, A>
where
    F: FnOnce(&Scope<R, E>) -> Effect<R, E, A> + Send + 'static,
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    Effect::from_tree(Tree::Scoped(Box::new(move |raw| {
        let scope = Scope::from_raw(raw);
        body(&scope).tree
    })))
}

/// Fail when the condition holds, succeed with `()` otherwise.
pub fn fail_if<R, E, F>(condition: bool, error_fn: F) -> Effect<R, E, ()>
where
    F: FnOnce() -> E,
    R: Send + Sync + 'static,
    E: Send + 'static,
{
    if condition {
        fail(error_fn())
    } else {
        unit()
    }
}

/// Lift an `Option`, failing when it is `None`.
pub fn from_option<R, E, A, F>(option: Option<A>, error_fn: F) -> Effect<R, E, A>
where
    F: FnOnce() -> E,
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    match option {
        Some(value) => pure(value),
        None => fail(error_fn()),
    }
}

/// Lift a `Result` into the effect world.
pub fn from_result<R, E, A>(result: Result<A, E>) -> Effect<R, E, A>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    match result {
        Ok(value) => pure(value),
        Err(error) => fail(error),
    }
}

/// Repeat an effect forever.
///
/// Each iteration is built fresh from the factory; the recursion is tied
/// lazily through [`suspend`], so the loop is stack-safe. The only way out is
/// failure, which surfaces immediately.
///
/// ```rust
/// use tailwater::{fail, forever, Runtime};
///
/// let runtime = Runtime::new(());
/// let exit = runtime.run(forever(|| fail::<(), _, i32>("gave up".to_string())));
/// assert_eq!(exit.failure(), Some("gave up".to_string()));
/// ```
pub fn forever<R, E, A, F>(mut make: F) -> Effect<R, E, Infallible>
where
    F: FnMut() -> Effect<R, E, A> + Send + 'static,
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    suspend(move || {
        let step = make();
        step.and_then(move |_| forever(make))
    })
}

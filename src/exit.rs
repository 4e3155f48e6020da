//! The terminal value of effect evaluation.
//!
//! Running an effect always produces an [`Exit`]: either the success value or
//! a [`Cause`] explaining the failure. `Exit` is a pure value with the usual
//! sum-type surface plus the extractors the runtime's callers reach for:
//! [`unwrap`](Exit::unwrap), [`unwrap_or_else`](Exit::unwrap_or_else),
//! [`success`](Exit::success) and the total [`fold`](Exit::fold).
//!
//! # Example
//!
//! ```rust
//! use tailwater::{pure, Runtime};
//!
//! let runtime = Runtime::new(());
//! let exit = runtime.run(pure::<(), String, _>(42));
//! assert_eq!(exit.success(), Some(42));
//! ```

use std::any::Any;
use std::fmt;
use std::panic;

use crate::cause::{Cause, Defect};

/// The result of running an effect to completion.
#[derive(Debug)]
pub enum Exit<E, A> {
    /// The effect produced a value.
    Success(A),
    /// The effect failed with the given cause.
    Failure(Cause<E>),
}

impl<E, A> Exit<E, A> {
    // ========== Predicates ==========

    /// Returns `true` if the effect produced a value.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Exit::Success(_))
    }

    /// Returns `true` if the effect failed for any reason.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Exit::Failure(_))
    }

    // ========== Transformations ==========

    /// Transform the success value; the identity on failures.
    pub fn map<B, F>(self, f: F) -> Exit<E, B>
    where
        F: FnOnce(A) -> B,
    {
        match self {
            Exit::Success(a) => Exit::Success(f(a)),
            Exit::Failure(c) => Exit::Failure(c),
        }
    }

    /// Transform the expected failure inside a `Failure`; defects and
    /// successes are untouched.
    pub fn map_error<E2, F>(self, f: F) -> Exit<E2, A>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Exit::Success(a) => Exit::Success(a),
            Exit::Failure(c) => Exit::Failure(c.map(f)),
        }
    }

    // ========== Extractors ==========

    /// The success value, discarding any failure.
    pub fn success(self) -> Option<A> {
        match self {
            Exit::Success(a) => Some(a),
            Exit::Failure(_) => None,
        }
    }

    /// The cause, discarding any success value.
    pub fn cause(self) -> Option<Cause<E>> {
        match self {
            Exit::Success(_) => None,
            Exit::Failure(c) => Some(c),
        }
    }

    /// The expected failure, if the exit is a failure of the declared channel.
    pub fn failure(self) -> Option<E> {
        self.cause().and_then(Cause::into_failure)
    }

    /// The defect, if the exit is an untyped failure.
    pub fn defect(self) -> Option<Defect> {
        self.cause().and_then(Cause::into_defect)
    }

    /// The success value, or the result of applying `f` to the cause.
    ///
    /// ```rust
    /// use tailwater::{Cause, Exit};
    ///
    /// let failed: Exit<String, i32> = Exit::Failure(Cause::expected("nope".into()));
    /// assert_eq!(failed.unwrap_or_else(|_| -1), -1);
    /// ```
    pub fn unwrap_or_else<F>(self, f: F) -> A
    where
        F: FnOnce(Cause<E>) -> A,
    {
        match self {
            Exit::Success(a) => a,
            Exit::Failure(c) => f(c),
        }
    }

    /// Total eliminator over the three outcomes.
    pub fn fold<B>(
        self,
        on_expected: impl FnOnce(E) -> B,
        on_defect: impl FnOnce(Defect) -> B,
        on_success: impl FnOnce(A) -> B,
    ) -> B {
        match self {
            Exit::Success(a) => on_success(a),
            Exit::Failure(c) => c.fold(on_expected, on_defect),
        }
    }

    /// Adapt to the std `Result` vocabulary.
    pub fn into_result(self) -> Result<A, Cause<E>> {
        match self {
            Exit::Success(a) => Ok(a),
            Exit::Failure(c) => Err(c),
        }
    }
}

impl<E, A> Exit<E, A>
where
    E: Send + 'static,
{
    /// The success value, re-raising failures through the panic channel.
    ///
    /// A defect resumes its original payload, preserving whatever the host
    /// attached to it. An expected failure that is itself a [`Defect`] is
    /// resumed the same way; any other expected failure panics with an
    /// [`UnhandledFailure`] wrapper carrying the value.
    ///
    /// ```rust,should_panic
    /// use tailwater::{fail, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// runtime.run(fail::<(), _, i32>("nope".to_string())).unwrap();
    /// ```
    pub fn unwrap(self) -> A {
        match self {
            Exit::Success(a) => a,
            Exit::Failure(Cause::Panic(defect)) => defect.resume(),
            Exit::Failure(Cause::Expected(error)) => {
                let probe: Box<dyn Any + Send> = Box::new(error);
                match probe.downcast::<Defect>() {
                    Ok(defect) => defect.resume(),
                    Err(payload) => {
                        let error = *payload
                            .downcast::<E>()
                            .expect("failure payload round-trips to its declared type");
                        panic::panic_any(UnhandledFailure::new(error))
                    }
                }
            }
        }
    }
}

/// Wrapper raised by [`Exit::unwrap`] and [`Runtime::run_unwrap`] when a run
/// ends in an expected failure.
///
/// The wrapper travels through the panic channel via `std::panic::panic_any`,
/// so a caller that catches the unwind can downcast to it and recover the
/// typed failure with [`into_inner`](UnhandledFailure::into_inner).
///
/// [`Runtime::run_unwrap`]: crate::Runtime::run_unwrap
#[derive(Debug)]
pub struct UnhandledFailure<E>(E);

impl<E> UnhandledFailure<E> {
    /// Wrap an expected failure.
    pub fn new(error: E) -> Self {
        UnhandledFailure(error)
    }

    /// Borrow the wrapped failure.
    pub fn get(&self) -> &E {
        &self.0
    }

    /// Unwrap the failure.
    pub fn into_inner(self) -> E {
        self.0
    }
}

impl<E: fmt::Debug> fmt::Display for UnhandledFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect failed with unhandled failure: {:?}", self.0)
    }
}

impl<E: fmt::Debug> std::error::Error for UnhandledFailure<E> {}

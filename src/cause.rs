//! Failure vocabulary for effect evaluation.
//!
//! Evaluation can end badly in two distinct ways, and this module keeps them
//! apart:
//!
//! - An **expected failure** is a typed value of the effect's declared error
//!   channel `E`, raised deliberately with [`fail`](crate::fail) or captured
//!   from a panicking thunk by [`effect`](crate::effect).
//! - A **defect** is an untyped panic payload that escaped effectful code
//!   outside of [`effect`](crate::effect). Defects are invisible to the
//!   error-channel combinators (`recover`, `map_error`, `attempt`) and are
//!   only observable through the cause-aware ones (`fold_cause`,
//!   `recover_cause`).
//!
//! [`Cause`] is the tagged union of the two. [`Defect`] wraps the raw panic
//! payload; [`Fatal`] marks payloads the runtime must never capture at all.
//!
//! # Example
//!
//! ```rust
//! use tailwater::{Cause, Defect};
//!
//! let expected: Cause<String> = Cause::expected("not found".to_string());
//! assert_eq!(expected.failure(), Some(&"not found".to_string()));
//! assert!(expected.defect().is_none());
//!
//! let defect: Cause<String> = Cause::die("index out of bounds");
//! assert!(defect.failure().is_none());
//! assert_eq!(defect.defect().and_then(Defect::message), Some("index out of bounds"));
//! ```

use std::any::Any;
use std::fmt;
use std::panic;

/// An untyped defect: the payload of a panic that escaped effectful code.
///
/// A `Defect` is deliberately opaque. It can be inspected with
/// [`message`](Defect::message) and [`downcast_ref`](Defect::downcast_ref),
/// taken apart with [`downcast`](Defect::downcast), or re-raised with
/// [`resume`](Defect::resume), but it never pretends to be a typed error.
///
/// # Example
///
/// ```rust
/// use tailwater::Defect;
///
/// let defect = Defect::new("connection reset");
/// assert_eq!(defect.message(), Some("connection reset"));
/// assert_eq!(defect.downcast_ref::<&str>(), Some(&"connection reset"));
/// ```
pub struct Defect(Box<dyn Any + Send>);

impl Defect {
    /// Wrap a value as a defect payload.
    ///
    /// Wrapping a `Defect` in a `Defect` flattens to the original, so
    /// payloads stay one layer deep however they were classified.
    pub fn new(payload: impl Any + Send) -> Self {
        let boxed: Box<dyn Any + Send> = Box::new(payload);
        match boxed.downcast::<Defect>() {
            Ok(defect) => *defect,
            Err(other) => Defect(other),
        }
    }

    /// Wrap a raw panic payload, as produced by `std::panic::catch_unwind`.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        Defect(payload)
    }

    /// The panic message, when the payload is a `&str` or `String`.
    ///
    /// Payloads raised with `panic!("...")` are always one of the two;
    /// payloads raised with `std::panic::panic_any` usually are not.
    pub fn message(&self) -> Option<&str> {
        if let Some(s) = self.0.downcast_ref::<&'static str>() {
            Some(s)
        } else {
            self.0.downcast_ref::<String>().map(String::as_str)
        }
    }

    /// Borrow the payload as a concrete type, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Take the payload as a concrete type, handing the defect back on a miss.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tailwater::Defect;
    ///
    /// let defect = Defect::new(404_u32);
    /// match defect.downcast::<u32>() {
    ///     Ok(code) => assert_eq!(code, 404),
    ///     Err(_) => panic!("payload was a u32"),
    /// }
    /// ```
    pub fn downcast<T: Any>(self) -> Result<T, Defect> {
        match self.0.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(payload) => Err(Defect(payload)),
        }
    }

    /// Unwrap the raw panic payload.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.0
    }

    /// Re-raise the original payload through the panic channel.
    pub fn resume(self) -> ! {
        panic::resume_unwind(self.0)
    }
}

impl fmt::Debug for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "Defect({:?})", msg),
            None => write!(f, "Defect(<non-string payload>)"),
        }
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "{}", msg),
            None => write!(f, "<non-string payload>"),
        }
    }
}

/// A panic payload the runtime must never capture.
///
/// Panicking with a `Fatal` payload (via `std::panic::panic_any`) aborts the
/// entire run: every guard in the interpreter re-raises it instead of
/// converting it into a [`Cause`]. This models unrecoverable host failures;
/// genuine out-of-memory or stack exhaustion aborts the process before the
/// runtime ever sees it, so `Fatal` is how such conditions are simulated and
/// tested.
///
/// # Example
///
/// ```rust,should_panic
/// use tailwater::{effect, Fatal, Runtime};
///
/// let runtime = Runtime::new(());
/// // Not captured as an expected failure: the run itself panics.
/// runtime.run(effect::<(), (), _>(|| {
///     std::panic::panic_any(Fatal::new("virtual machine error"))
/// }));
/// ```
pub struct Fatal(Box<dyn Any + Send>);

impl Fatal {
    /// A fatal condition described by a message.
    pub fn new(message: impl Into<String>) -> Self {
        Fatal(Box::new(message.into()))
    }

    /// A fatal condition carrying an arbitrary payload.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        Fatal(payload)
    }

    /// The message, when the payload is a `&str` or `String`.
    pub fn message(&self) -> Option<&str> {
        if let Some(s) = self.0.downcast_ref::<&'static str>() {
            Some(s)
        } else {
            self.0.downcast_ref::<String>().map(String::as_str)
        }
    }

    /// Unwrap the payload.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.0
    }
}

impl fmt::Debug for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "Fatal({:?})", msg),
            None => write!(f, "Fatal(<non-string payload>)"),
        }
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "{}", msg),
            None => write!(f, "<non-string payload>"),
        }
    }
}

/// Why an effect failed: a typed expected failure or an untyped defect.
///
/// `Cause` is a pure value. The error-channel combinators only ever see the
/// [`Expected`](Cause::Expected) variant; [`Panic`](Cause::Panic) flows past
/// them untouched and is observable only to the cause-aware combinators.
#[derive(Debug)]
pub enum Cause<E> {
    /// A failure of the effect's declared error channel.
    Expected(E),
    /// A panic that escaped effectful code; never part of the declared channel.
    Panic(Defect),
}

impl<E> Cause<E> {
    // ========== Constructors ==========

    /// A typed, declared failure.
    pub fn expected(error: E) -> Self {
        Cause::Expected(error)
    }

    /// An untyped defect wrapping the given payload.
    pub fn die(payload: impl Any + Send) -> Self {
        Cause::Panic(Defect::new(payload))
    }

    // ========== Predicates ==========

    /// Returns `true` for an expected failure.
    #[inline]
    pub fn is_expected(&self) -> bool {
        matches!(self, Cause::Expected(_))
    }

    /// Returns `true` for a defect.
    #[inline]
    pub fn is_defect(&self) -> bool {
        matches!(self, Cause::Panic(_))
    }

    // ========== Projections ==========

    /// The expected failure, if that is what this cause is.
    ///
    /// ```rust
    /// use tailwater::Cause;
    ///
    /// let cause: Cause<&str> = Cause::expected("nope");
    /// assert_eq!(cause.failure(), Some(&"nope"));
    /// assert_eq!(Cause::<&str>::die("boom").failure(), None);
    /// ```
    pub fn failure(&self) -> Option<&E> {
        match self {
            Cause::Expected(e) => Some(e),
            Cause::Panic(_) => None,
        }
    }

    /// The defect, if that is what this cause is.
    pub fn defect(&self) -> Option<&Defect> {
        match self {
            Cause::Expected(_) => None,
            Cause::Panic(d) => Some(d),
        }
    }

    /// Consume the cause, yielding the expected failure if present.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Cause::Expected(e) => Some(e),
            Cause::Panic(_) => None,
        }
    }

    /// Consume the cause, yielding the defect if present.
    pub fn into_defect(self) -> Option<Defect> {
        match self {
            Cause::Expected(_) => None,
            Cause::Panic(d) => Some(d),
        }
    }

    // ========== Transformations ==========

    /// Transform the expected failure; the identity on defects.
    ///
    /// ```rust
    /// use tailwater::Cause;
    ///
    /// let cause: Cause<u32> = Cause::expected(4);
    /// assert_eq!(cause.map(|code| code * 100).failure(), Some(&400));
    ///
    /// let defect: Cause<u32> = Cause::die("boom");
    /// assert!(defect.map(|code| code * 100).is_defect());
    /// ```
    pub fn map<E2, F>(self, f: F) -> Cause<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Cause::Expected(e) => Cause::Expected(f(e)),
            Cause::Panic(d) => Cause::Panic(d),
        }
    }

    /// Total eliminator over both variants.
    pub fn fold<B>(self, on_expected: impl FnOnce(E) -> B, on_defect: impl FnOnce(Defect) -> B) -> B {
        match self {
            Cause::Expected(e) => on_expected(e),
            Cause::Panic(d) => on_defect(d),
        }
    }
}

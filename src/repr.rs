//! Type-erased effect representation.
//!
//! The typed [`Effect`](crate::Effect) facade lowers every constructor and
//! combinator into this defunctionalized tree. Values travel as
//! `Box<dyn Any + Send>` and continuations as boxed `FnOnce`s, so a single
//! interpreter loop can drive effects of any value type; the typed layer
//! inserts the matching downcast on each side of the boundary. A downcast
//! miss is unreachable from the typed API, which is why [`cast`] treats it
//! as a bug rather than a recoverable error.

use std::any::Any;
use std::sync::Arc;

use crate::cause::{Cause, Defect};
use crate::scope::RawScope;

/// A type-erased success value.
pub(crate) type AnyValue = Box<dyn Any + Send>;

/// A type-erased environment entry on the interpreter's environment stack.
pub(crate) type AnyEnv = Arc<dyn Any + Send + Sync>;

/// A type-erased flat-map continuation.
pub(crate) type Cont = Box<dyn FnOnce(AnyValue) -> Tree + Send>;

/// A type-erased failure continuation, as carried by a fold frame.
pub(crate) type FailCont = Box<dyn FnOnce(RawCause) -> Tree + Send>;

/// A type-erased environment access.
pub(crate) type AccessFn = Box<dyn FnOnce(&(dyn Any + Send + Sync)) -> Tree + Send>;

/// A type-erased side-effecting thunk.
pub(crate) type Thunk = Box<dyn FnOnce() -> AnyValue + Send>;

/// A type-erased comprehension body.
pub(crate) type ScopedBody = Box<dyn FnOnce(&RawScope) -> Tree + Send>;

/// The nine primitives of the effect algebra, erased.
pub(crate) enum Tree {
    /// Yield a value.
    Succeed(AnyValue),
    /// Yield a failing exit with the given cause.
    Fail(RawCause),
    /// Yield the effect obtained by applying the function to the current
    /// environment.
    Access(AccessFn),
    /// Sequence the inner effect, then the continuation.
    FlatMap(Box<Tree>, Cont),
    /// Sequence the inner effect under a both-branches frame; the only
    /// construct whose failure branch observes defects.
    Fold(Box<Tree>, Cont, FailCont),
    /// Run the thunk assuming it never panics; an escaping panic is a defect.
    Sync(Thunk),
    /// Run the thunk, capturing a non-fatal panic as an expected [`Defect`].
    TrySync(Thunk),
    /// An imperative block with a non-local exit bound to its own identity.
    Scoped(ScopedBody),
    /// Replace the environment for the duration of the inner effect.
    Provide(Box<Tree>, AnyEnv),
}

/// A cause whose expected payload is erased.
pub(crate) enum RawCause {
    Expected(AnyValue),
    Panic(Box<dyn Any + Send>),
}

impl RawCause {
    pub(crate) fn expected<E: Send + 'static>(error: E) -> Self {
        RawCause::Expected(Box::new(error))
    }

    pub(crate) fn from_typed<E: Send + 'static>(cause: Cause<E>) -> Self {
        match cause {
            Cause::Expected(e) => RawCause::Expected(Box::new(e)),
            Cause::Panic(d) => RawCause::Panic(d.into_payload()),
        }
    }

    pub(crate) fn into_typed<E: 'static>(self) -> Cause<E> {
        match self {
            RawCause::Expected(value) => Cause::Expected(cast::<E>(value)),
            RawCause::Panic(payload) => Cause::Panic(Defect::from_payload(payload)),
        }
    }
}

/// Recover a typed value from the erased boundary.
///
/// The typed facade guarantees the payload type, so a miss here is a bug in
/// the facade itself, never in user code.
pub(crate) fn cast<T: 'static>(value: AnyValue) -> T {
    *value
        .downcast::<T>()
        .expect("type mismatch in effect continuation")
}

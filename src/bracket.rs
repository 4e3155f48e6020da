//! Bracket pattern for safe resource management.
//!
//! The bracket pattern guarantees that a resource acquired at the start of a
//! computation is released at the end, whatever the computation did:
//!
//! - [`bracket`] - acquire/use/release with guaranteed cleanup
//! - [`bracket_exit`] - cleanup that can distinguish success from failure
//! - [`bracket_ignore`] - cleanup around an effect that does not touch the
//!   resource
//!
//! The contract, precisely:
//!
//! 1. If acquisition fails, nothing else runs; the bracket fails with that
//!    cause.
//! 2. After a successful acquisition, release runs exactly once, on every
//!    exit path of use, defects included.
//! 3. Release has no expected failure channel. If it raises a defect anyway,
//!    that cause is swallowed and the use outcome is returned; with the
//!    `tracing` feature enabled the swallowed cause is logged at `warn`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use tailwater::{bracket, effect_total, fail, Runtime};
//!
//! let released = Arc::new(AtomicBool::new(false));
//! let witness = released.clone();
//!
//! let effect = bracket(
//!     effect_total::<(), String, _, _>(|| "resource"),
//!     move |_resource| effect_total(move || witness.store(true, Ordering::SeqCst)),
//!     |_resource| fail::<(), String, i32>("use blew up".to_string()),
//! );
//!
//! let runtime = Runtime::new(());
//! assert_eq!(runtime.run(effect).failure(), Some("use blew up".to_string()));
//! assert!(released.load(Ordering::SeqCst));
//! ```

use std::convert::Infallible;

use crate::effect::{done, pure, Effect};
use crate::exit::Exit;

/// Acquire a resource, use it, and release it on every exit path.
///
/// `use_fn` borrows the resource to build the using effect; `release` then
/// consumes it. Release never sees the outcome; use [`bracket_exit`] when
/// cleanup must distinguish success from failure.
pub fn bracket<R, E, S, B, Rel, Use>(
    acquire: Effect<R, E, S>,
    release: Rel,
    use_fn: Use,
) -> Effect<R, E, B>
where
    Rel: FnOnce(S) -> Effect<R, Infallible, ()> + Send + 'static,
    Use: FnOnce(&S) -> Effect<R, E, B> + Send + 'static,
    R: Send + Sync + 'static,
    E: Send + 'static,
    S: Send + 'static,
    B: Send + 'static,
{
    bracket_exit(acquire, move |resource, _exit: &Exit<E, B>| release(resource), use_fn)
}

/// [`bracket`] with an outcome-aware release.
///
/// The release function receives the resource and a reference to the exit of
/// the using effect, so it can commit on success and roll back on failure.
/// The exit itself is re-yielded as the bracket's result afterwards.
pub fn bracket_exit<R, E, S, B, Rel, Use>(
    acquire: Effect<R, E, S>,
    release: Rel,
    use_fn: Use,
) -> Effect<R, E, B>
where
    Rel: FnOnce(S, &Exit<E, B>) -> Effect<R, Infallible, ()> + Send + 'static,
    Use: FnOnce(&S) -> Effect<R, E, B> + Send + 'static,
    R: Send + Sync + 'static,
    E: Send + 'static,
    S: Send + 'static,
    B: Send + 'static,
{
    acquire.and_then(move |resource| {
        let attempt = use_fn(&resource).fold_cause(
            |cause| pure(Exit::Failure(cause)),
            |value| pure(Exit::Success(value)),
        );
        attempt.and_then(move |exit| {
            let cleanup = release(resource, &exit);
            cleanup
                .fold_cause(
                    |cause| {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(defect = ?cause.defect(), "resource cleanup failed");
                        #[cfg(not(feature = "tracing"))]
                        let _ = cause;
                        pure(())
                    },
                    |_| pure(()),
                )
                .and_then(move |_| done(exit))
        })
    })
}

/// [`bracket`] around an effect that does not look at the resource.
///
/// Useful when acquisition exists purely for its side effect, a lock or a
/// session, and the work in the middle is already a complete effect value.
pub fn bracket_ignore<R, E, S, B, Rel>(
    acquire: Effect<R, E, S>,
    release: Rel,
    use_effect: Effect<R, E, B>,
) -> Effect<R, E, B>
where
    Rel: FnOnce(S) -> Effect<R, Infallible, ()> + Send + 'static,
    R: Send + Sync + 'static,
    E: Send + 'static,
    S: Send + 'static,
    B: Send + 'static,
{
    bracket(acquire, release, move |_resource| use_effect)
}

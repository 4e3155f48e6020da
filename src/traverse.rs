//! Traverse and sequence utilities for collections of effects.
//!
//! - [`sequence`]: convert a collection of effects into one effect producing
//!   all the values, strictly left to right, stopping at the first expected
//!   failure.
//! - [`traverse`]: map a function over a collection and sequence the results.
//! - [`for_each`]: traverse for effects run purely for their side effects.
//!
//! `traverse` holds the law `traverse(xs, f) == sequence(xs.map(f))` exactly,
//! including the order of side effects: `f` is applied eagerly to every
//! element up front in both spellings, and only the evaluation of the built
//! effects short-circuits.
//!
//! The std `Result` siblings [`sequence_results`] and [`partition_results`]
//! cover the pure half of the vocabulary.
//!
//! # Examples
//!
//! ```rust
//! use tailwater::{fail, pure, traverse::sequence, Runtime};
//!
//! let runtime = Runtime::new(());
//!
//! let all = sequence(vec![
//!     pure::<(), String, _>(1),
//!     pure(2),
//!     pure(3),
//! ]);
//! assert_eq!(runtime.run(all).success(), Some(vec![1, 2, 3]));
//!
//! let short = sequence(vec![
//!     pure::<(), String, _>(1),
//!     fail("error".to_string()),
//!     pure(3),
//! ]);
//! assert_eq!(runtime.run(short).failure(), Some("error".to_string()));
//! ```

use crate::effect::{pure, Effect};

/// Sequence a collection of effects into an effect of a collection.
///
/// Evaluation is strictly left to right and stops at the first expected
/// failure; elements after it never run. On success the output order equals
/// the input order.
pub fn sequence<R, E, A, I>(effects: I) -> Effect<R, E, Vec<A>>
where
    I: IntoIterator<Item = Effect<R, E, A>>,
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    let mut collected = pure(Vec::new());
    for effect in effects {
        collected = collected.zip_with(effect, |mut values, value| {
            values.push(value);
            values
        });
    }
    collected
}

/// Apply an effectful function to every element and sequence the results.
///
/// `f` is applied to the whole input eagerly, then the effects are sequenced;
/// this is exactly `sequence(items.map(f))`.
///
/// ```rust
/// use tailwater::{pure, traverse::traverse, Runtime};
///
/// let runtime = Runtime::new(());
/// let doubled = traverse(vec![1, 2, 3], |x| pure::<(), String, _>(x * 2));
/// assert_eq!(runtime.run(doubled).success(), Some(vec![2, 4, 6]));
/// ```
pub fn traverse<R, E, A, B, I, F>(items: I, f: F) -> Effect<R, E, Vec<B>>
where
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> Effect<R, E, B>,
    R: Send + Sync + 'static,
    E: Send + 'static,
    B: Send + 'static,
{
    sequence(items.into_iter().map(f).collect::<Vec<_>>())
}

/// Traverse a collection purely for effects, discarding the values.
pub fn for_each<R, E, A, B, I, F>(items: I, f: F) -> Effect<R, E, ()>
where
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> Effect<R, E, B>,
    R: Send + Sync + 'static,
    E: Send + 'static,
    B: Send + 'static,
{
    traverse(items, f).map(|_| ())
}

/// Collect an iterator of `Result`s, stopping at the first error.
///
/// ```rust
/// use tailwater::traverse::sequence_results;
///
/// let ok: Result<Vec<i32>, String> = sequence_results(vec![Ok(1), Ok(2)]);
/// assert_eq!(ok, Ok(vec![1, 2]));
///
/// let err: Result<Vec<i32>, String> =
///     sequence_results(vec![Ok(1), Err("bad".to_string()), Ok(3)]);
/// assert_eq!(err, Err("bad".to_string()));
/// ```
pub fn sequence_results<T, E, I>(results: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    results.into_iter().collect()
}

/// Split an iterator of `Result`s into its successes and its errors.
pub fn partition_results<T, E, I>(results: I) -> (Vec<T>, Vec<E>)
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(error) => errors.push(error),
        }
    }
    (values, errors)
}

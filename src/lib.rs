//! # Tailwater
//!
//! > *"Tailwater runs from the dam"*
//!
//! A synchronous typed effect runtime for Rust.
//!
//! ## Philosophy
//!
//! **Tailwater** describes effectful programs as first-class values and runs
//! them later on a stack-safe interpreter. An [`Effect<R, E, A>`] carries its
//! requirements in its type: an environment `R` it reads, an expected failure
//! channel `E`, and a success value `A`. Composition happens on values;
//! execution happens exactly once, at the edge, through a [`Runtime`].
//!
//! Failures stay honest along the way. A typed failure raised with [`fail`]
//! travels on the expected channel where [`Effect::recover`] and friends can
//! see it; a panic that escapes effectful code becomes an untyped *defect*
//! that flows past ordinary handlers and is only observable to the
//! cause-aware combinators. The interpreter itself never grows the host
//! stack: a hundred thousand chained `and_then`s evaluate in a tight loop.
//!
//! ## Quick example
//!
//! ```rust
//! use tailwater::{asks, comprehension, fail, pure, Runtime};
//!
//! struct Env {
//!     threshold: i32,
//! }
//!
//! let effect = comprehension::<Env, String, _, _>(|scope| {
//!     let threshold = scope.eval(asks(|env: &Env| env.threshold));
//!     let reading = scope.eval(pure(40).check(
//!         move |r| *r < threshold,
//!         || "reading out of range".to_string(),
//!     ));
//!     pure(reading * 2)
//! });
//!
//! let runtime = Runtime::new(Env { threshold: 50 });
//! assert_eq!(runtime.run(effect).success(), Some(80));
//! ```
//!
//! ## Resource safety
//!
//! [`bracket`] guarantees release on every exit path after a successful
//! acquisition, and [`Effect::transact`] layers commit-on-success,
//! rollback-on-any-failure semantics over a [`Transactor`] connection carried
//! in the environment.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod bracket;
pub mod cause;
pub mod effect;
pub mod exit;
pub mod io;
mod repr;
pub mod runtime;
pub mod scope;
pub mod testing;
pub mod transact;
pub mod traverse;

#[cfg(feature = "tracing")]
pub mod instrument;

// Re-exports - core types
pub use cause::{Cause, Defect, Fatal};
pub use effect::Effect;
pub use exit::{Exit, UnhandledFailure};
pub use runtime::Runtime;
pub use scope::Scope;

// Re-export constructors
pub use effect::{
    ask, asks, asks_effect, comprehension, done, effect, effect_total, fail, fail_if, forever,
    from_option, from_result, halt, pure, suspend, unit,
};

// Re-export resource management
pub use bracket::{bracket, bracket_exit, bracket_ignore};
pub use transact::Transactor;

// Re-export collection operators
pub use traverse::{for_each, partition_results, sequence, sequence_results, traverse};

// Other re-exports
pub use io::IO;

// Re-export tracing (when feature enabled)
#[cfg(feature = "tracing")]
pub use instrument::EffectTracingExt;

/// Prelude module for convenient imports
pub mod prelude {
    // Core types
    pub use crate::cause::{Cause, Defect, Fatal};
    pub use crate::effect::Effect;
    pub use crate::exit::{Exit, UnhandledFailure};
    pub use crate::runtime::Runtime;
    pub use crate::scope::Scope;

    // Constructors
    pub use crate::effect::{
        ask, asks, asks_effect, comprehension, done, effect, effect_total, fail, fail_if, forever,
        from_option, from_result, halt, pure, suspend, unit,
    };

    // Resource management
    pub use crate::bracket::{bracket, bracket_exit, bracket_ignore};
    pub use crate::transact::Transactor;

    // Collections
    pub use crate::traverse::{for_each, partition_results, sequence, sequence_results, traverse};

    // Services and testing
    pub use crate::io::IO;
    pub use crate::testing::MockEnv;
    pub use crate::{assert_exit_defect, assert_exit_failure, assert_exit_success};

    #[cfg(feature = "tracing")]
    pub use crate::instrument::EffectTracingExt;
}

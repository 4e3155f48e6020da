//! IO helpers: effects over services extracted from the environment.
//!
//! The helpers here build environment-reading effects without naming the
//! whole environment: the closure's parameter type picks the service, and
//! `AsRef<T>` extracts it from whatever composite environment the runtime
//! carries.
//!
//! # Environment pattern
//!
//! ```rust
//! use tailwater::{Runtime, IO};
//!
//! struct Database {
//!     users: Vec<String>,
//! }
//!
//! impl Database {
//!     fn find_user(&self, id: usize) -> Option<String> {
//!         self.users.get(id).cloned()
//!     }
//! }
//!
//! struct AppEnv {
//!     db: Database,
//! }
//!
//! impl AsRef<Database> for AppEnv {
//!     fn as_ref(&self) -> &Database {
//!         &self.db
//!     }
//! }
//!
//! let runtime = Runtime::new(AppEnv {
//!     db: Database {
//!         users: vec!["Alice".to_string()],
//!     },
//! });
//!
//! // Type inference figures out we need Database from AppEnv.
//! let effect = IO::read::<Database, _, _, AppEnv>(|db| db.find_user(0));
//! assert_eq!(runtime.run(effect).success(), Some(Some("Alice".to_string())));
//! ```
//!
//! # Read vs write
//!
//! The distinction is semantic: `read` for queries, `write` for operations
//! that change state. Both hand the closure a shared reference, so mutation
//! goes through interior mutability (`Mutex`, atomics, and so on), the same
//! way the [`Transactor`](crate::Transactor) connections do.
//!
//! # Total vs try
//!
//! `read`/`write` assume the operation does not panic; a panic becomes a
//! defect. `try_read`/`try_write` capture a non-fatal panic on the expected
//! channel as a [`Defect`], ready for
//! [`refine_or_die`](crate::Effect::refine_or_die).

use std::convert::Infallible;

use crate::cause::Defect;
use crate::effect::{asks, asks_effect, fail, pure, Effect};
use crate::runtime::try_catch;

/// Namespace for service-extraction effect constructors.
#[derive(Debug, Clone, Copy)]
pub struct IO;

impl IO {
    /// An effect from a read-only operation on a service.
    pub fn read<T, A, F, R>(f: F) -> Effect<R, Infallible, A>
    where
        F: FnOnce(&T) -> A + Send + 'static,
        T: 'static,
        A: Send + 'static,
        R: AsRef<T> + Send + Sync + 'static,
    {
        asks(move |env: &R| f(env.as_ref()))
    }

    /// An effect from a state-changing operation on a service.
    ///
    /// Semantically distinct from [`read`](IO::read) to mark intent; the
    /// closure still receives a shared reference.
    pub fn write<T, A, F, R>(f: F) -> Effect<R, Infallible, A>
    where
        F: FnOnce(&T) -> A + Send + 'static,
        T: 'static,
        A: Send + 'static,
        R: AsRef<T> + Send + Sync + 'static,
    {
        asks(move |env: &R| f(env.as_ref()))
    }

    /// A fallible read: a panic in the operation becomes an expected
    /// [`Defect`].
    pub fn try_read<T, A, F, R>(f: F) -> Effect<R, Defect, A>
    where
        F: FnOnce(&T) -> A + Send + 'static,
        T: 'static,
        A: Send + 'static,
        R: AsRef<T> + Send + Sync + 'static,
    {
        asks_effect(move |env: &R| match try_catch(|| f(env.as_ref())) {
            Ok(value) => pure(value),
            Err(defect) => fail(defect),
        })
    }

    /// A fallible write: a panic in the operation becomes an expected
    /// [`Defect`].
    pub fn try_write<T, A, F, R>(f: F) -> Effect<R, Defect, A>
    where
        F: FnOnce(&T) -> A + Send + 'static,
        T: 'static,
        A: Send + 'static,
        R: AsRef<T> + Send + Sync + 'static,
    {
        asks_effect(move |env: &R| match try_catch(|| f(env.as_ref())) {
            Ok(value) => pure(value),
            Err(defect) => fail(defect),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;
    use std::sync::Mutex;

    struct Database {
        value: i32,
    }

    struct Logger {
        messages: Mutex<Vec<String>>,
    }

    struct Env {
        db: Database,
        logger: Logger,
    }

    impl AsRef<Database> for Env {
        fn as_ref(&self) -> &Database {
            &self.db
        }
    }

    impl AsRef<Logger> for Env {
        fn as_ref(&self) -> &Logger {
            &self.logger
        }
    }

    fn runtime() -> Runtime<Env> {
        Runtime::new(Env {
            db: Database { value: 42 },
            logger: Logger {
                messages: Mutex::new(Vec::new()),
            },
        })
    }

    #[test]
    fn read_extracts_the_right_service() {
        let runtime = runtime();
        let effect = IO::read::<Database, _, _, Env>(|db| db.value);
        assert_eq!(runtime.run(effect).success(), Some(42));
    }

    #[test]
    fn write_through_interior_mutability() {
        let runtime = runtime();
        let effect = IO::write::<Logger, _, _, Env>(|logger| {
            logger.messages.lock().unwrap().push("hello".to_string());
        });
        assert_eq!(runtime.run(effect).success(), Some(()));
        assert_eq!(
            *runtime.env().logger.messages.lock().unwrap(),
            vec!["hello".to_string()]
        );
    }

    #[test]
    fn services_compose_with_combinators() {
        let runtime = runtime();
        let effect = IO::read::<Database, _, _, Env>(|db| db.value)
            .map(|v| v * 2)
            .and_then(|v| IO::read::<Database, _, _, Env>(move |db| v + db.value));
        assert_eq!(runtime.run(effect).success(), Some(126));
    }

    #[test]
    fn try_read_captures_panics_as_expected_defects() {
        let runtime = runtime();
        let effect = IO::try_read::<Database, i32, _, Env>(|_| panic!("driver bug"));
        let failure = runtime.run(effect).failure().expect("expected defect");
        assert_eq!(failure.message(), Some("driver bug"));
    }

    #[test]
    fn try_read_success_passes_through() {
        let runtime = runtime();
        let effect = IO::try_read::<Database, _, _, Env>(|db| db.value + 1);
        assert_eq!(runtime.run(effect).success(), Some(43));
    }
}

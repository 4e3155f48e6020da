//! Transactional execution over a connection in the environment.
//!
//! [`Effect::transact`] wraps an effect in commit/rollback semantics against
//! a connection handle extracted from the environment with `AsRef`. The
//! composite-environment pattern mirrors the rest of the crate's service
//! extraction: the environment owns the connection, `AsRef<C>` hands it out.
//!
//! The semantics are those of a transaction boundary:
//!
//! - Before the effect runs, the connection's auto-commit flag is saved and
//!   disabled; from then on the work is invisible to other sessions.
//! - On success the transaction commits.
//! - On ANY failure, expected or defect, it rolls back.
//! - The saved auto-commit flag is restored on every path, and the effect's
//!   original outcome is re-yielded.
//!
//! Nested `transact` calls are independent: a nested transaction that already
//! committed is not undone by an outer rollback.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Mutex;
//! use tailwater::{asks, Runtime, Transactor};
//!
//! #[derive(Default)]
//! struct Conn {
//!     auto_commit: Mutex<bool>,
//!     committed: Mutex<u32>,
//! }
//!
//! impl Transactor for Conn {
//!     fn auto_commit(&self) -> bool {
//!         *self.auto_commit.lock().unwrap()
//!     }
//!     fn set_auto_commit(&self, enabled: bool) {
//!         *self.auto_commit.lock().unwrap() = enabled;
//!     }
//!     fn commit(&self) {
//!         *self.committed.lock().unwrap() += 1;
//!     }
//!     fn rollback(&self) {}
//! }
//!
//! struct Env {
//!     conn: Conn,
//! }
//!
//! impl AsRef<Conn> for Env {
//!     fn as_ref(&self) -> &Conn {
//!         &self.conn
//!     }
//! }
//!
//! let runtime = Runtime::new(Env { conn: Conn::default() });
//! let effect = asks::<Env, String, _, _>(|_| 42).transact::<Conn>();
//! assert_eq!(runtime.run(effect).success(), Some(42));
//! assert_eq!(*runtime.env().conn.committed.lock().unwrap(), 1);
//! ```

use crate::bracket::bracket_exit;
use crate::effect::{asks, Effect};
use crate::exit::Exit;

/// A connection that can scope work into transactions.
///
/// Implementations use interior mutability; the runtime only ever hands out
/// shared references to the environment. A failing implementation signals by
/// panicking, which surfaces as a defect (and, inside the release path of
/// `transact`, is swallowed like any other cleanup defect).
pub trait Transactor: Send + Sync {
    /// Whether each statement currently commits on its own.
    fn auto_commit(&self) -> bool;

    /// Switch statement-level auto-commit on or off.
    fn set_auto_commit(&self, enabled: bool);

    /// Make the work since the transaction began durable.
    fn commit(&self);

    /// Discard the work since the transaction began.
    fn rollback(&self);
}

impl<R, E, A> Effect<R, E, A>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Run this effect inside a transaction on the environment's connection.
    ///
    /// Commits on success; rolls back on any failure, defects included; the
    /// prior auto-commit flag is restored either way and the original
    /// outcome is re-yielded. See the [module docs](crate::transact) for the
    /// full contract and an example.
    pub fn transact<C>(self) -> Effect<R, E, A>
    where
        C: Transactor + 'static,
        R: AsRef<C>,
    {
        let begin = asks(|env: &R| {
            let conn: &C = env.as_ref();
            let prior = conn.auto_commit();
            conn.set_auto_commit(false);
            prior
        });

        bracket_exit(
            begin,
            move |prior: bool, exit: &Exit<E, A>| {
                let succeeded = exit.is_success();
                asks(move |env: &R| {
                    let conn: &C = env.as_ref();
                    if succeeded {
                        conn.commit();
                    } else {
                        conn.rollback();
                    }
                    conn.set_auto_commit(prior);
                })
            },
            move |_prior| self,
        )
    }
}

//! The trampolined interpreter and the [`Runtime`] capability.
//!
//! Evaluation never recurses per construct: a [`Machine`] keeps an explicit
//! continuation stack and an explicit environment stack and walks the effect
//! tree in a tight loop, so arbitrarily deep `and_then` chains evaluate in
//! constant host stack.
//!
//! A `Runtime` is an immutable value binding an environment. It is cheap to
//! clone and safe to share; every run gets a fresh machine, so concurrent
//! runs from different threads never share interpreter state.
//!
//! # Example
//!
//! ```rust
//! use tailwater::{asks, Runtime};
//!
//! struct Env {
//!     multiplier: i32,
//! }
//!
//! let runtime = Runtime::new(Env { multiplier: 21 });
//! let exit = runtime.run(asks::<Env, String, _, _>(|env| env.multiplier * 2));
//! assert_eq!(exit.success(), Some(42));
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::cause::Defect;
use crate::effect::Effect;
use crate::exit::Exit;
use crate::repr::{cast, AnyEnv, AnyValue, Cont, FailCont, RawCause, Tree};
use crate::scope::{RawScope, ScopeExit};

/// A frame on the machine's continuation stack.
enum Frame {
    /// A plain flat-map continuation; discarded during unwinding.
    Continue(Cont),
    /// A fold frame carrying both branches; the first one reached during
    /// unwinding wins.
    Recover {
        on_success: Cont,
        on_failure: FailCont,
    },
    /// Restore the environment pushed by a `Provide`; processed on both the
    /// success path and the unwinding path.
    RestoreEnv,
}

/// One evaluation of one effect: a current-effect register, a continuation
/// stack and an environment stack.
pub(crate) struct Machine {
    frames: SmallVec<[Frame; 16]>,
    envs: SmallVec<[AnyEnv; 4]>,
}

impl Machine {
    pub(crate) fn new(env: AnyEnv) -> Self {
        let mut envs = SmallVec::new();
        envs.push(env);
        Machine {
            frames: SmallVec::new(),
            envs,
        }
    }

    /// Drive the tree to completion.
    pub(crate) fn run(mut self, root: Tree) -> Result<AnyValue, RawCause> {
        let mut current = root;
        loop {
            current = match current {
                Tree::Succeed(value) => match self.next_continuation() {
                    Some(k) => guarded(move || k(value)),
                    None => return Ok(value),
                },
                Tree::Fail(cause) => match self.unwind() {
                    Some(on_failure) => guarded(move || on_failure(cause)),
                    None => return Err(cause),
                },
                Tree::Access(f) => {
                    let env = Arc::clone(self.current_env());
                    guarded(move || f(&*env))
                }
                Tree::FlatMap(inner, k) => {
                    self.frames.push(Frame::Continue(k));
                    *inner
                }
                Tree::Fold(inner, on_success, on_failure) => {
                    self.frames.push(Frame::Recover {
                        on_success,
                        on_failure,
                    });
                    *inner
                }
                Tree::Sync(thunk) => guarded(move || Tree::Succeed(thunk())),
                Tree::TrySync(thunk) => match try_catch(thunk) {
                    Ok(value) => Tree::Succeed(value),
                    Err(defect) => Tree::Fail(RawCause::Expected(Box::new(defect))),
                },
                Tree::Scoped(body) => {
                    let scope = RawScope::new(Arc::clone(self.current_env()));
                    let id = scope.id();
                    match panic::catch_unwind(AssertUnwindSafe(move || body(&scope))) {
                        Ok(tree) => tree,
                        Err(payload) => {
                            if payload.is::<crate::cause::Fatal>() {
                                panic::resume_unwind(payload);
                            }
                            match payload.downcast::<ScopeExit>() {
                                Ok(exit) if exit.scope == id => Tree::Fail(exit.cause),
                                Ok(foreign) => panic::resume_unwind(foreign),
                                Err(other) => Tree::Fail(RawCause::Panic(other)),
                            }
                        }
                    }
                }
                Tree::Provide(inner, env) => {
                    self.envs.push(env);
                    self.frames.push(Frame::RestoreEnv);
                    *inner
                }
            };
        }
    }

    /// Pop to the next continuation on the success path, restoring
    /// environments on the way.
    fn next_continuation(&mut self) -> Option<Cont> {
        while let Some(frame) = self.frames.pop() {
            match frame {
                Frame::Continue(k) => return Some(k),
                Frame::Recover { on_success, .. } => return Some(on_success),
                Frame::RestoreEnv => {
                    self.envs.pop();
                }
            }
        }
        None
    }

    /// Pop to the nearest fold frame's failure branch, discarding plain
    /// continuations and restoring environments on the way.
    fn unwind(&mut self) -> Option<FailCont> {
        while let Some(frame) = self.frames.pop() {
            match frame {
                Frame::Continue(_) => {}
                Frame::Recover { on_failure, .. } => return Some(on_failure),
                Frame::RestoreEnv => {
                    self.envs.pop();
                }
            }
        }
        None
    }

    fn current_env(&self) -> &AnyEnv {
        self.envs
            .last()
            .expect("environment stack never empties during a run")
    }
}

/// Run a closure produced by user code, reclassifying a non-fatal panic as a
/// defect. [`Fatal`](crate::Fatal) payloads are re-raised untouched.
///
/// A comprehension exit reaching this guard is orphaned (its owner's catch
/// sits only around the body invocation, never around continuations), so it
/// is reclassified like any other panic.
fn guarded(f: impl FnOnce() -> Tree) -> Tree {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(tree) => tree,
        Err(payload) => {
            if payload.is::<crate::cause::Fatal>() {
                panic::resume_unwind(payload);
            }
            Tree::Fail(RawCause::Panic(payload))
        }
    }
}

/// Run a thunk, capturing a non-fatal panic as a [`Defect`].
///
/// [`Fatal`](crate::Fatal) payloads are re-raised untouched.
pub(crate) fn try_catch<T>(f: impl FnOnce() -> T) -> Result<T, Defect> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => {
            if payload.is::<crate::cause::Fatal>() {
                panic::resume_unwind(payload);
            }
            Err(Defect::from_payload(payload))
        }
    }
}

/// An immutable capability for running effects against one environment.
///
/// The runtime captures its environment by value at construction and treats
/// it opaquely from then on. Cloning shares the environment; there is no
/// process-wide runtime and no other global state.
pub struct Runtime<R> {
    env: Arc<R>,
}

impl<R> fmt::Debug for Runtime<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").field("env", &"<env>").finish()
    }
}

impl<R> Clone for Runtime<R> {
    fn clone(&self) -> Self {
        Runtime {
            env: Arc::clone(&self.env),
        }
    }
}

impl<R> Runtime<R>
where
    R: Send + Sync + 'static,
{
    /// Bind an environment.
    pub fn new(env: R) -> Self {
        Runtime { env: Arc::new(env) }
    }

    /// Borrow the bound environment.
    pub fn env(&self) -> &R {
        &self.env
    }

    /// Run an effect to its [`Exit`].
    ///
    /// Every invocation gets a fresh interpreter; nothing is shared between
    /// runs except the environment value itself.
    ///
    /// ```rust
    /// use tailwater::{fail, pure, Runtime};
    ///
    /// let runtime = Runtime::new(());
    /// assert_eq!(runtime.run(pure::<(), String, _>(1)).success(), Some(1));
    /// assert_eq!(
    ///     runtime.run(fail::<(), _, i32>("nope".to_string())).failure(),
    ///     Some("nope".to_string())
    /// );
    /// ```
    pub fn run<E, A>(&self, effect: Effect<R, E, A>) -> Exit<E, A>
    where
        E: Send + 'static,
        A: Send + 'static,
    {
        let env: AnyEnv = self.env.clone() as AnyEnv;
        match Machine::new(env).run(effect.into_tree()) {
            Ok(value) => Exit::Success(cast::<A>(value)),
            Err(cause) => Exit::Failure(cause.into_typed::<E>()),
        }
    }

    /// Run an effect and unwrap its success value.
    ///
    /// An expected failure panics with an
    /// [`UnhandledFailure`](crate::UnhandledFailure) wrapper; a defect
    /// resumes its original payload. See [`Exit::unwrap`].
    pub fn run_unwrap<E, A>(&self, effect: Effect<R, E, A>) -> A
    where
        E: Send + 'static,
        A: Send + 'static,
    {
        self.run(effect).unwrap()
    }
}

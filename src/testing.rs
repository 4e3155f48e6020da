//! Testing utilities: environment builders and exit assertions.
//!
//! # MockEnv builder
//!
//! ```rust
//! use tailwater::testing::MockEnv;
//!
//! struct Database {
//!     data: Vec<String>,
//! }
//!
//! let env = MockEnv::new()
//!     .with(|| Database { data: vec!["test".to_string()] })
//!     .build();
//! ```
//!
//! # Assertion macros
//!
//! ```rust
//! use tailwater::{assert_exit_failure, assert_exit_success, fail, pure, Runtime};
//!
//! let runtime = Runtime::new(());
//! assert_exit_success!(runtime.run(pure::<(), String, _>(42)), 42);
//! assert_exit_failure!(runtime.run(fail::<(), _, i32>("nope".to_string())), "nope");
//! ```

/// Builder for test environments.
///
/// Chains components into a nested tuple, so a test can assemble exactly the
/// services its effects extract without declaring a bespoke struct.
///
/// # Example
///
/// ```rust
/// use tailwater::testing::MockEnv;
///
/// struct Config {
///     debug: bool,
/// }
///
/// struct Database {
///     url: String,
/// }
///
/// let env = MockEnv::new()
///     .with(|| Config { debug: true })
///     .with(|| Database { url: "test://localhost".to_string() })
///     .build();
///
/// // env is now (((), Config), Database)
/// let ((_, config), db) = env;
/// assert!(config.debug);
/// assert_eq!(db.url, "test://localhost");
/// ```
#[derive(Debug)]
pub struct MockEnv<Env> {
    env: Env,
}

impl MockEnv<()> {
    /// Create a new empty mock environment.
    pub fn new() -> Self {
        Self { env: () }
    }
}

impl Default for MockEnv<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Env> MockEnv<Env> {
    /// Add a component to the environment.
    ///
    /// The component is created lazily by the provided function.
    pub fn with<F, T>(self, f: F) -> MockEnv<(Env, T)>
    where
        F: FnOnce() -> T,
    {
        MockEnv {
            env: (self.env, f()),
        }
    }

    /// Build the final environment.
    pub fn build(self) -> Env {
        self.env
    }
}

/// Assert that an exit is a success, optionally with a specific value.
///
/// ```rust
/// use tailwater::{assert_exit_success, pure, Runtime};
///
/// let runtime = Runtime::new(());
/// assert_exit_success!(runtime.run(pure::<(), String, _>(7)));
/// assert_exit_success!(runtime.run(pure::<(), String, _>(7)), 7);
/// ```
#[macro_export]
macro_rules! assert_exit_success {
    ($exit:expr) => {
        match $exit {
            $crate::Exit::Success(_) => {}
            $crate::Exit::Failure(cause) => {
                panic!("Expected Success, got Failure: {:?}", cause);
            }
        }
    };
    ($exit:expr, $expected:expr) => {
        match $exit {
            $crate::Exit::Success(value) => assert_eq!(value, $expected),
            $crate::Exit::Failure(cause) => {
                panic!("Expected Success({:?}), got Failure: {:?}", $expected, cause);
            }
        }
    };
}

/// Assert that an exit is an expected failure, optionally with a specific
/// error value.
///
/// A defect does not satisfy this assertion; use
/// [`assert_exit_defect!`](crate::assert_exit_defect) for that.
#[macro_export]
macro_rules! assert_exit_failure {
    ($exit:expr) => {
        match $exit {
            $crate::Exit::Failure($crate::Cause::Expected(_)) => {}
            $crate::Exit::Failure($crate::Cause::Panic(defect)) => {
                panic!("Expected an expected failure, got defect: {:?}", defect);
            }
            $crate::Exit::Success(value) => {
                panic!("Expected Failure, got Success: {:?}", value);
            }
        }
    };
    ($exit:expr, $expected:expr) => {
        match $exit {
            $crate::Exit::Failure($crate::Cause::Expected(error)) => {
                assert_eq!(error, $expected);
            }
            $crate::Exit::Failure($crate::Cause::Panic(defect)) => {
                panic!("Expected an expected failure, got defect: {:?}", defect);
            }
            $crate::Exit::Success(value) => {
                panic!("Expected Failure, got Success: {:?}", value);
            }
        }
    };
}

/// Assert that an exit is a defect.
///
/// ```rust
/// use tailwater::{assert_exit_defect, effect_total, Runtime};
///
/// let runtime = Runtime::new(());
/// assert_exit_defect!(runtime.run(effect_total::<(), String, i32, _>(|| panic!("boom"))));
/// ```
#[macro_export]
macro_rules! assert_exit_defect {
    ($exit:expr) => {
        match $exit {
            $crate::Exit::Failure($crate::Cause::Panic(_)) => {}
            $crate::Exit::Failure($crate::Cause::Expected(error)) => {
                panic!("Expected a defect, got expected failure: {:?}", error);
            }
            $crate::Exit::Success(value) => {
                panic!("Expected a defect, got Success: {:?}", value);
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl<E, A> Arbitrary for crate::Exit<E, A>
where
    E: Arbitrary + Send + 'static,
    A: Arbitrary + Send + 'static,
{
    type Parameters = (A::Parameters, E::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let (a_params, e_params) = args;
        prop_oneof![
            any_with::<A>(a_params).prop_map(crate::Exit::Success),
            any_with::<E>(e_params)
                .prop_map(|e| crate::Exit::Failure(crate::Cause::Expected(e))),
            any::<String>()
                .prop_map(|msg| crate::Exit::Failure(crate::Cause::die(msg))),
        ]
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{effect_total, fail, pure};
    use crate::runtime::Runtime;

    #[test]
    fn mock_env_new() {
        let env = MockEnv::new().build();
        assert_eq!(env, ());
    }

    #[test]
    fn mock_env_with_multiple() {
        let env = MockEnv::new()
            .with(|| "hello")
            .with(|| 42)
            .with(|| true)
            .build();

        let (((_, s), _n), b) = env;
        assert_eq!(s, "hello");
        assert!(b);
    }

    #[test]
    fn assert_exit_success_macro() {
        let runtime = Runtime::new(());
        assert_exit_success!(runtime.run(pure::<(), String, _>(42)), 42);
    }

    #[test]
    fn assert_exit_failure_macro() {
        let runtime = Runtime::new(());
        assert_exit_failure!(runtime.run(fail::<(), _, i32>("e".to_string())), "e");
    }

    #[test]
    fn assert_exit_defect_macro() {
        let runtime = Runtime::new(());
        assert_exit_defect!(runtime.run(effect_total::<(), String, i32, _>(|| panic!("boom"))));
    }

    #[test]
    #[should_panic(expected = "Expected Success, got Failure")]
    fn assert_exit_success_panics_on_failure() {
        let runtime = Runtime::new(());
        assert_exit_success!(runtime.run(fail::<(), _, i32>("e".to_string())));
    }

    #[test]
    #[should_panic(expected = "Expected Failure, got Success")]
    fn assert_exit_failure_panics_on_success() {
        let runtime = Runtime::new(());
        assert_exit_failure!(runtime.run(pure::<(), String, _>(42)));
    }

    #[test]
    #[should_panic(expected = "Expected a defect, got expected failure")]
    fn assert_exit_defect_panics_on_expected_failure() {
        let runtime = Runtime::new(());
        assert_exit_defect!(runtime.run(fail::<(), _, i32>("e".to_string())));
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn exit_arbitrary_generates_valid_instances(
                exit in any::<crate::Exit<String, i32>>()
            ) {
                match exit {
                    crate::Exit::Success(_) => prop_assert!(exit.is_success()),
                    crate::Exit::Failure(_) => prop_assert!(exit.is_failure()),
                }
            }
        }
    }
}

//! Tracing support for effects.
//!
//! This module provides the [`EffectTracingExt::instrument`] method for
//! tying an effect's evaluation to a `tracing` span. Feature-gated behind
//! `#[cfg(feature = "tracing")]`.
//!
//! Evaluation is synchronous, so instrumentation records events inside the
//! given span at the evaluation boundaries: one when evaluation reaches the
//! effect and one when it completes, tagged with the outcome.

use crate::effect::{halt, pure, suspend, Effect};

/// Extension trait adding tracing instrumentation to effects.
///
/// Only available when the `tracing` feature is enabled.
pub trait EffectTracingExt<R, E, A>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    /// Record this effect's evaluation inside a tracing span.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tailwater::{pure, Runtime};
    /// use tailwater::instrument::EffectTracingExt;
    /// use tracing::info_span;
    ///
    /// let runtime = Runtime::new(());
    /// let effect = pure::<(), String, _>(42).instrument(info_span!("answer"));
    /// assert_eq!(runtime.run(effect).success(), Some(42));
    /// ```
    fn instrument(self, span: tracing::Span) -> Effect<R, E, A>;
}

impl<R, E, A> EffectTracingExt<R, E, A> for Effect<R, E, A>
where
    R: Send + Sync + 'static,
    E: Send + 'static,
    A: Send + 'static,
{
    fn instrument(self, span: tracing::Span) -> Effect<R, E, A> {
        let on_start = span.clone();
        let on_failure = span.clone();
        let on_success = span;
        suspend(move || {
            on_start.in_scope(|| tracing::trace!("effect evaluation started"));
            self
        })
        .fold_cause(
            move |cause| {
                on_failure.in_scope(|| {
                    tracing::debug!(defect = cause.is_defect(), "effect evaluation failed")
                });
                halt(cause)
            },
            move |value| {
                on_success.in_scope(|| tracing::trace!("effect evaluation succeeded"));
                pure(value)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{effect_total, fail};
    use crate::runtime::Runtime;

    #[test]
    fn instrument_returns_value() {
        let runtime = Runtime::new(());
        let effect = pure::<(), String, _>(42).instrument(tracing::info_span!("test_span"));
        assert_eq!(runtime.run(effect).success(), Some(42));
    }

    #[test]
    fn error_in_span_propagates() {
        let runtime = Runtime::new(());
        let effect =
            fail::<(), _, i32>("oops".to_string()).instrument(tracing::info_span!("failing"));
        assert_eq!(runtime.run(effect).failure(), Some("oops".to_string()));
    }

    #[test]
    fn defect_in_span_propagates() {
        let runtime = Runtime::new(());
        let effect = effect_total::<(), String, i32, _>(|| panic!("boom"))
            .instrument(tracing::debug_span!("defective"));
        assert!(runtime.run(effect).defect().is_some());
    }

    #[test]
    fn nested_spans_compose() {
        let runtime = Runtime::new(());
        let inner = pure::<(), String, _>(1).instrument(tracing::debug_span!("inner_op"));
        let outer = inner.and_then(|x| pure(x + 1).instrument(tracing::debug_span!("outer_op")));
        assert_eq!(runtime.run(outer).success(), Some(2));
    }
}

//! Trial - one named code path taking part in an experiment

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde_json::Value;

use crate::observation::{Failure, Observation};

/// A zero-argument code path producing `T` or failing with `E`.
pub type Callable<T, E> = Box<dyn Fn() -> Result<T, E> + Send + Sync>;

/// Decides whether a control value and a trial value agree.
pub type Comparator<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Projects a value into its reported form.
pub type Cleaner<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;

/// Name given to the control's observation.
pub const CONTROL_NAME: &str = "Control";

/// Trial wraps a callable with the name it reports under.
///
/// The control is a `Trial` too. A trial holds no run state: every call to
/// [`run`](Self::run) returns a fresh [`Observation`], so the same trial can be
/// driven by concurrent experiment runs.
pub struct Trial<T, E> {
    name: String,
    callable: Callable<T, E>,
}

/// Outcome of running one participant.
///
/// A caught panic keeps its original payload so that a panicking control can
/// be resumed after publishing.
pub(crate) struct Execution<T, E> {
    pub(crate) observation: Observation<T, E>,
    pub(crate) panic: Option<Box<dyn Any + Send>>,
}

impl<T, E> Trial<T, E> {
    /// Create a trial from a name and a callable.
    pub fn new<F>(name: impl Into<String>, callable: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callable: Box::new(callable),
        }
    }

    /// Get the trial name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the callable directly, without observing it.
    pub(crate) fn execute(&self) -> Result<T, E> {
        (self.callable)()
    }

    /// Invoke the callable once and record what happened.
    ///
    /// Errors and panics raised by the callable are captured. The cleaner runs
    /// outside the timed section and its panics are not captured.
    pub(crate) fn run(&self, cleaner: Option<&Cleaner<T>>) -> Execution<T, E> {
        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.callable)()));
        let duration = start.elapsed();

        let execution = match outcome {
            Ok(Ok(value)) => {
                let cleaned = cleaner.map(|clean| clean(&value));
                Execution {
                    observation: Observation::succeeded(&self.name, duration, value, cleaned),
                    panic: None,
                }
            }
            Ok(Err(err)) => Execution {
                observation: Observation::failed(&self.name, duration, Failure::Error(err)),
                panic: None,
            },
            Err(payload) => Execution {
                observation: Observation::failed(
                    &self.name,
                    duration,
                    Failure::from_panic(payload.as_ref()),
                ),
                panic: Some(payload),
            },
        };

        tracing::trace!(
            participant = %self.name,
            elapsed_us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX),
            failed = execution.observation.is_failure(),
            "participant finished"
        );
        execution
    }
}

impl<T, E> fmt::Debug for Trial<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trial")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Evaluate a trial observation against the control observation.
///
/// Only a pair of produced values is compared. Ignore predicates run first, in
/// order, and the first one returning `true` marks the trial ignored. When
/// either side failed the trial stays unmatched and no predicate is invoked.
pub(crate) fn evaluate<T, E>(
    control: &Observation<T, E>,
    trial: &mut Observation<T, E>,
    comparator: &Comparator<T>,
    ignores: &[Comparator<T>],
) {
    let (Some(control_value), Some(trial_value)) = (control.result(), trial.result()) else {
        return;
    };

    if ignores.iter().any(|ignore| ignore(control_value, trial_value)) {
        trial.mark_ignored();
        return;
    }

    let matched = comparator(control_value, trial_value);
    trial.mark_matched(matched);
}

//! Experiment runner - executes one run of a configured experiment

use std::panic;

use chrono::Utc;

use super::config::ExperimentConfig;
use super::schedule::{self, Mode, Unit};
use crate::error::{Error, MismatchError, Result};
use crate::observation::{Failure, Observation};
use crate::results::Results;
use crate::trial::{evaluate, Execution, Trial};

impl<T, E> ExperimentConfig<T, E>
where
    T: Send,
    E: Send,
{
    /// Run the experiment and return the control's outcome.
    ///
    /// The control and every trial execute exactly once, in random order,
    /// sequentially or on one thread each. Each trial is then evaluated
    /// against the control and the [`Results`] are published before this
    /// returns. Trial errors and panics are recorded, never returned.
    ///
    /// When the enablement predicate returns `false` only the control runs
    /// and nothing is published.
    ///
    /// # Errors
    ///
    /// - [`Error::Mismatch`] if error-on-mismatch is set and any trial is
    ///   unmatched (checked first, after publishing)
    /// - [`Error::Operation`] with the control's own error
    ///
    /// # Panics
    ///
    /// Resumes the control's panic after publishing. Panics raised by the
    /// enablement predicate, context supplier, comparator, ignore predicates,
    /// cleaner or publisher propagate immediately.
    pub fn run(&self) -> Result<T, E> {
        if let Some(trial) = self.short_circuit_trial() {
            tracing::debug!(
                experiment = %self.name,
                trial = %trial.name(),
                "returning trial result without running the experiment"
            );
            return trial.execute().map_err(Error::Operation);
        }

        if !(self.enabled)() {
            tracing::debug!(experiment = %self.name, "experiment disabled, running control only");
            return self.control.execute().map_err(Error::Operation);
        }

        let span = tracing::debug_span!("experiment", name = %self.name);
        let _entered = span.enter();

        let started_at = Utc::now();
        let mut executions = self.execute_participants();
        let Execution {
            observation: control,
            panic: control_panic,
        } = executions.remove(0);

        let mut trials: Vec<Observation<T, E>> =
            executions.into_iter().map(|e| e.observation).collect();
        for trial in &mut trials {
            evaluate(&control, trial, &self.comparator, &self.ignores);
        }

        let results = Results::new(
            self.name.clone(),
            started_at,
            (self.context)(),
            control,
            trials,
        );
        self.publisher.publish(&results);
        tracing::debug!(
            matched = results.matched(),
            ignored = results.ignored(),
            "experiment published"
        );

        if self.error_on_mismatch && results.has_mismatches() {
            return Err(Error::Mismatch(Box::new(MismatchError::new(results))));
        }

        match results.into_control().into_result() {
            Ok(value) => Ok(value),
            Err(Failure::Error(err)) => Err(Error::Operation(err)),
            Err(Failure::Panic(message)) => {
                panic::resume_unwind(control_panic.unwrap_or_else(|| Box::new(message)))
            }
        }
    }

    /// The single trial to hand back directly, if the escape hatch applies.
    fn short_circuit_trial(&self) -> Option<&Trial<T, E>> {
        let predicate = self.use_trial.as_ref()?;
        match self.trials.as_slice() {
            [only] if predicate() => Some(only),
            _ => None,
        }
    }

    /// Execute the control and all trials; the control's execution comes first.
    fn execute_participants(&self) -> Vec<Execution<T, E>> {
        let cleaner = self.cleaner.as_ref();
        let units: Vec<Unit<'_, Execution<T, E>>> = std::iter::once(&self.control)
            .chain(&self.trials)
            .map(|participant| {
                Box::new(move || participant.run(cleaner)) as Unit<'_, Execution<T, E>>
            })
            .collect();

        let mode = if self.parallel {
            Mode::Parallel
        } else {
            Mode::Sequential
        };
        schedule::run_shuffled(units, mode)
    }
}

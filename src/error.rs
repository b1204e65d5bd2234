//! Error types for experimentalist
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use std::fmt;

use thiserror::Error;

use crate::observation::Observation;
use crate::results::Results;

/// Result type alias
pub type Result<T, E> = std::result::Result<T, Error<T, E>>;

/// Experimentalist error types
#[derive(Error, Debug)]
pub enum Error<T, E> {
    /// The code path whose value is handed back to the caller returned an error.
    ///
    /// This is the control's error, passed through unchanged. When the experiment
    /// is short-circuited to its single trial, it is that trial's error.
    #[error("{0}")]
    Operation(E),

    /// A trial disagreed with the control and the experiment errors on mismatch
    #[error("{0}")]
    Mismatch(Box<MismatchError<T, E>>),
}

impl<T, E> Error<T, E> {
    /// Unwrap the executed path's own error, if this is one.
    #[must_use]
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(err) => Some(err),
            Self::Mismatch(_) => None,
        }
    }

    /// Get the mismatch details, if this is a mismatch.
    #[must_use]
    pub fn mismatch(&self) -> Option<&MismatchError<T, E>> {
        match self {
            Self::Operation(_) => None,
            Self::Mismatch(mismatch) => Some(mismatch.as_ref()),
        }
    }

    /// Check whether this error was synthesized from a mismatch.
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch(_))
    }
}

/// Raised after publishing when a trial did not match the control.
///
/// The message shows the control, the first trial, and every other trial that
/// did not match.
///
/// Carries the complete [`Results`] of the run so callers can inspect every
/// observation, not just the formatted message.
#[derive(Debug)]
pub struct MismatchError<T, E> {
    results: Results<T, E>,
}

impl<T, E> MismatchError<T, E> {
    pub(crate) const fn new(results: Results<T, E>) -> Self {
        Self { results }
    }

    /// Get the results of the mismatched run.
    #[must_use]
    pub const fn results(&self) -> &Results<T, E> {
        &self.results
    }

    /// Take ownership of the results of the mismatched run.
    #[must_use]
    pub fn into_results(self) -> Results<T, E> {
        self.results
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Display for MismatchError<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Experiment {} observations mismatched:",
            self.results.name()
        )?;
        writeln!(f, "  Control: {}", Outcome(self.results.control()))?;
        let reported = self
            .results
            .trials()
            .iter()
            .enumerate()
            .filter(|(index, trial)| *index == 0 || !trial.matched())
            .map(|(_, trial)| trial);
        for trial in reported {
            writeln!(f, "  {}: {}", trial.name(), Outcome(trial))?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug, E: fmt::Debug> std::error::Error for MismatchError<T, E> {}

/// Renders an observation's value, or its failure, for diagnostics.
struct Outcome<'a, T, E>(&'a Observation<T, E>);

impl<T: fmt::Debug, E: fmt::Debug> fmt::Display for Outcome<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0.result(), self.0.failure()) {
            (Some(value), _) => write!(f, "{value:?}"),
            (None, Some(failure)) => write!(f, "failed with {failure:?}"),
            (None, None) => f.write_str("<no outcome>"),
        }
    }
}

//! Observation - the recorded outcome of one participant

use std::any::Any;
use std::fmt;
use std::time::Duration;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Why a participant produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure<E> {
    /// The callable returned `Err`.
    Error(E),
    /// The callable panicked; holds the panic message.
    Panic(String),
}

impl<E> Failure<E> {
    /// Build a failure from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panic(message)
    }

    /// Get the returned error, if the callable returned one.
    #[must_use]
    pub const fn error(&self) -> Option<&E> {
        match self {
            Self::Error(err) => Some(err),
            Self::Panic(_) => None,
        }
    }

    /// Check whether the callable panicked.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panic(_))
    }
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(err) => write!(f, "{err}"),
            Self::Panic(message) => write!(f, "panicked: {message}"),
        }
    }
}

/// Observation records one execution of the control or of a trial.
///
/// Exactly one of [`result`](Self::result) and [`failure`](Self::failure) is
/// populated. The `matched` and `ignored` flags are only meaningful for trial
/// observations and are written once, when the trial is evaluated against the
/// control.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<T, E> {
    name: String,
    duration: Duration,
    result: Option<T>,
    cleaned_result: Option<Value>,
    failure: Option<Failure<E>>,
    matched: bool,
    ignored: bool,
}

impl<T, E> Observation<T, E> {
    /// Create an observation of a participant that produced a value.
    pub(crate) fn succeeded(
        name: impl Into<String>,
        duration: Duration,
        result: T,
        cleaned_result: Option<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            duration,
            result: Some(result),
            cleaned_result,
            failure: None,
            matched: false,
            ignored: false,
        }
    }

    /// Create an observation of a participant that failed.
    pub(crate) fn failed(name: impl Into<String>, duration: Duration, failure: Failure<E>) -> Self {
        Self {
            name: name.into(),
            duration,
            result: None,
            cleaned_result: None,
            failure: Some(failure),
            matched: false,
            ignored: false,
        }
    }

    /// Get the participant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the wall-clock duration of the execution.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Get the produced value, if the participant succeeded.
    #[must_use]
    pub const fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Get the cleaned value, if a cleaner is configured and the participant succeeded.
    #[must_use]
    pub const fn cleaned_result(&self) -> Option<&Value> {
        self.cleaned_result.as_ref()
    }

    /// Get the captured failure, if the participant failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure<E>> {
        self.failure.as_ref()
    }

    /// Check whether the participant failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// Whether this trial matched the control.
    #[must_use]
    pub const fn matched(&self) -> bool {
        self.matched
    }

    /// Whether an ignore predicate suppressed comparison for this trial.
    #[must_use]
    pub const fn ignored(&self) -> bool {
        self.ignored
    }

    pub(crate) fn mark_matched(&mut self, matched: bool) {
        debug_assert!(!self.ignored, "ignored observations are never compared");
        self.matched = matched;
    }

    pub(crate) fn mark_ignored(&mut self) {
        self.ignored = true;
    }

    /// Convert into the outcome the participant's callable produced.
    ///
    /// # Errors
    ///
    /// Returns the captured failure if the participant failed.
    pub fn into_result(self) -> Result<T, Failure<E>> {
        match (self.result, self.failure) {
            (Some(value), _) => Ok(value),
            (None, Some(failure)) => Err(failure),
            (None, None) => unreachable!("observation holds neither a result nor a failure"),
        }
    }
}

impl<T: Serialize, E: fmt::Display> Serialize for Observation<T, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Observation", 7)?;
        state.serialize_field("name", &self.name)?;
        // Milliseconds as a float so dashboards can plot durations directly
        state.serialize_field("duration_ms", &(self.duration.as_secs_f64() * 1000.0))?;
        state.serialize_field("result", &self.result)?;
        state.serialize_field("cleaned_result", &self.cleaned_result)?;
        state.serialize_field(
            "failure",
            &self.failure.as_ref().map(ToString::to_string),
        )?;
        state.serialize_field("matched", &self.matched)?;
        state.serialize_field("ignored", &self.ignored)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_observation() {
        let obs: Observation<i32, String> =
            Observation::succeeded("Control", Duration::from_millis(3), 42, None);
        assert_eq!(obs.name(), "Control");
        assert_eq!(obs.result(), Some(&42));
        assert!(obs.failure().is_none());
        assert!(obs.cleaned_result().is_none());
        assert!(!obs.matched());
        assert!(!obs.ignored());
    }

    #[test]
    fn test_failed_observation() {
        let obs: Observation<i32, String> = Observation::failed(
            "Trial 0",
            Duration::ZERO,
            Failure::Error("boom".to_string()),
        );
        assert!(obs.is_failure());
        assert!(obs.result().is_none());
        assert_eq!(obs.into_result(), Err(Failure::Error("boom".to_string())));
    }

    #[test]
    fn test_failure_from_panic_payload() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        let failure: Failure<()> = Failure::from_panic(payload.as_ref());
        assert_eq!(failure, Failure::Panic("static message".to_string()));

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        let failure: Failure<()> = Failure::from_panic(payload.as_ref());
        assert_eq!(failure, Failure::Panic("owned message".to_string()));

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        let failure: Failure<()> = Failure::from_panic(payload.as_ref());
        assert!(failure.is_panic());
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(Failure::Error("bad input").to_string(), "bad input");
        assert_eq!(
            Failure::<&str>::Panic("oops".to_string()).to_string(),
            "panicked: oops"
        );
    }

    #[test]
    fn test_observation_serialization() {
        let obs: Observation<&str, String> = Observation::succeeded(
            "Trial 0",
            Duration::from_micros(1500),
            "value",
            Some(serde_json::json!(5)),
        );
        let json = serde_json::to_value(&obs).expect("serialization failed");

        assert_eq!(json["name"], "Trial 0");
        assert_eq!(json["result"], "value");
        assert_eq!(json["cleaned_result"], 5);
        assert!(json["failure"].is_null());
        assert!((json["duration_ms"].as_f64().unwrap() - 1.5).abs() < 1e-9);
    }
}

//! Results - what a publisher receives after each experiment run

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::observation::Observation;

/// Caller-supplied tags attached to every published run.
pub type Context = HashMap<String, Value>;

/// Results of one experiment run.
///
/// Trial observations are kept in configuration order, independent of the
/// order in which the participants actually executed.
#[derive(Debug, Clone, PartialEq)]
pub struct Results<T, E> {
    name: String,
    started_at: DateTime<Utc>,
    context: Context,
    control: Observation<T, E>,
    trials: Vec<Observation<T, E>>,
}

impl<T, E> Results<T, E> {
    pub(crate) fn new(
        name: impl Into<String>,
        started_at: DateTime<Utc>,
        context: Context,
        control: Observation<T, E>,
        trials: Vec<Observation<T, E>>,
    ) -> Self {
        Self {
            name: name.into(),
            started_at,
            context,
            control,
            trials,
        }
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the timestamp taken just before the participants started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get the context supplied for this run.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Get the control observation.
    #[must_use]
    pub const fn control(&self) -> &Observation<T, E> {
        &self.control
    }

    /// Get the trial observations in configuration order.
    #[must_use]
    pub fn trials(&self) -> &[Observation<T, E>] {
        &self.trials
    }

    /// Find a trial observation by name.
    #[must_use]
    pub fn trial(&self, name: &str) -> Option<&Observation<T, E>> {
        self.trials.iter().find(|t| t.name() == name)
    }

    /// True when every trial that was not ignored matched the control.
    ///
    /// Vacuously true when there are no trials or all of them were ignored.
    #[must_use]
    pub fn matched(&self) -> bool {
        self.trials
            .iter()
            .filter(|t| !t.ignored())
            .all(Observation::matched)
    }

    /// True when any trial was ignored.
    #[must_use]
    pub fn ignored(&self) -> bool {
        self.trials.iter().any(Observation::ignored)
    }

    /// True when any trial is unmatched, whether or not it was ignored.
    #[must_use]
    pub fn has_mismatches(&self) -> bool {
        self.trials.iter().any(|t| !t.matched())
    }

    pub(crate) fn into_control(self) -> Observation<T, E> {
        self.control
    }
}

impl<T: Serialize, E: fmt::Display> Serialize for Results<T, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Results", 7)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("started_at", &self.started_at)?;
        state.serialize_field("context", &self.context)?;
        state.serialize_field("matched", &self.matched())?;
        state.serialize_field("ignored", &self.ignored())?;
        state.serialize_field("control", &self.control)?;
        state.serialize_field("trials", &self.trials)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn observation(name: &str, value: i32) -> Observation<i32, String> {
        Observation::succeeded(name, Duration::ZERO, value, None)
    }

    fn build(trials: Vec<Observation<i32, String>>) -> Results<i32, String> {
        Results::new(
            "test",
            Utc::now(),
            Context::new(),
            observation("Control", 1),
            trials,
        )
    }

    #[test]
    fn test_no_trials_is_vacuously_matched() {
        let results = build(Vec::new());
        assert!(results.matched());
        assert!(!results.ignored());
        assert!(!results.has_mismatches());
    }

    #[test]
    fn test_matched_requires_all_non_ignored_trials() {
        let mut a = observation("Trial 0", 1);
        a.mark_matched(true);
        let mut b = observation("Trial 1", 2);
        b.mark_matched(false);

        let results = build(vec![a.clone(), b]);
        assert!(!results.matched());
        assert!(results.has_mismatches());

        let mut c = observation("Trial 1", 2);
        c.mark_ignored();
        let results = build(vec![a, c]);
        assert!(results.matched());
        assert!(results.ignored());
        // Ignored trials still count as unmatched
        assert!(results.has_mismatches());
    }

    #[test]
    fn test_trial_lookup_by_name() {
        let results = build(vec![observation("fast path", 1), observation("slow path", 1)]);
        assert_eq!(results.trial("slow path").map(Observation::name), Some("slow path"));
        assert!(results.trial("missing").is_none());
    }

    #[test]
    fn test_results_serialization() {
        let mut context = Context::new();
        context.insert("host".to_string(), serde_json::json!("web-01"));
        let results = Results::new(
            "serialize",
            Utc::now(),
            context,
            observation("Control", 1),
            vec![observation("Trial 0", 1)],
        );

        let json = serde_json::to_value(&results).expect("serialization failed");
        assert_eq!(json["name"], "serialize");
        assert_eq!(json["context"]["host"], "web-01");
        assert_eq!(json["control"]["result"], 1);
        assert_eq!(json["trials"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["matched"], false);
    }
}

//! Experiment Config - builder for one experiment definition

use std::fmt;

use serde_json::Value;

use crate::publish::{NoopPublisher, Publisher};
use crate::results::{Context, Results};
use crate::trial::{Cleaner, Comparator, Trial, CONTROL_NAME};

/// Name used until [`ExperimentConfig::called`] sets one.
pub const DEFAULT_NAME: &str = "Unnamed Experiment";

pub(crate) type Predicate = Box<dyn Fn() -> bool + Send + Sync>;
pub(crate) type ContextSupplier = Box<dyn Fn() -> Context + Send + Sync>;

/// Experiment Config holds the control, its trials and every rule used to
/// compare them.
///
/// Builder methods consume and return the config, so a definition reads as one
/// chain ending in [`run`](Self::run). Once built the config is immutable and
/// can be run any number of times, including from several threads at once.
///
/// ## Defaults
///
/// | Setting | Default |
/// |---------|---------|
/// | name | `"Unnamed Experiment"` |
/// | enabled | always |
/// | comparator | `PartialEq` |
/// | ignore predicates | none |
/// | cleaner | none |
/// | context | empty map |
/// | parallel | off |
/// | error on mismatch | off |
/// | publisher | [`NoopPublisher`] |
pub struct ExperimentConfig<T, E> {
    pub(crate) name: String,
    pub(crate) control: Trial<T, E>,
    pub(crate) trials: Vec<Trial<T, E>>,
    pub(crate) enabled: Predicate,
    pub(crate) comparator: Comparator<T>,
    pub(crate) ignores: Vec<Comparator<T>>,
    pub(crate) cleaner: Option<Cleaner<T>>,
    pub(crate) context: ContextSupplier,
    pub(crate) parallel: bool,
    pub(crate) error_on_mismatch: bool,
    pub(crate) publisher: Box<dyn Publisher<T, E>>,
    pub(crate) use_trial: Option<Predicate>,
}

impl<T, E> ExperimentConfig<T, E>
where
    T: 'static,
    E: 'static,
{
    /// Create a config around the control code path.
    ///
    /// The comparator defaults to `PartialEq`; use
    /// [`compare_with`](Self::compare_with) to replace it.
    pub fn new<F>(control: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        T: PartialEq,
    {
        Self::with_comparator(control, |control: &T, trial: &T| control == trial)
    }

    /// Create a config around the control code path with a custom comparator.
    ///
    /// Useful when `T` does not implement `PartialEq`.
    pub fn with_comparator<F, C>(control: F, comparator: C) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        C: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            name: DEFAULT_NAME.to_string(),
            control: Trial::new(CONTROL_NAME, control),
            trials: Vec::new(),
            enabled: Box::new(|| true),
            comparator: Box::new(comparator),
            ignores: Vec::new(),
            cleaner: None,
            context: Box::new(Context::new),
            parallel: false,
            error_on_mismatch: false,
            publisher: Box::new(NoopPublisher),
            use_trial: None,
        }
    }

    /// Add a trial named `"Trial {n}"`, `n` being the number of trials so far.
    #[must_use]
    pub fn trial<F>(self, trial: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let name = format!("Trial {}", self.trials.len());
        self.named_trial(name, trial)
    }

    /// Add a trial with an explicit name.
    #[must_use]
    pub fn named_trial<F>(mut self, name: impl Into<String>, trial: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.trials.push(Trial::new(name, trial));
        self
    }

    /// Set the predicate deciding, once per run, whether trials execute at all.
    #[must_use]
    pub fn enabled<F>(mut self, enabled: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.enabled = Box::new(enabled);
        self
    }

    /// Replace the comparator. Called as `comparator(control, trial)`.
    #[must_use]
    pub fn compare_with<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.comparator = Box::new(comparator);
        self
    }

    /// Add an ignore predicate. Called as `ignore(control, trial)`.
    ///
    /// Predicates accumulate; the first returning `true` marks the trial
    /// ignored and skips the comparator.
    #[must_use]
    pub fn ignore<F>(mut self, ignore: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.ignores.push(Box::new(ignore));
        self
    }

    /// Set the supplier of context attached to every published run.
    #[must_use]
    pub fn context<F>(mut self, context: F) -> Self
    where
        F: Fn() -> Context + Send + Sync + 'static,
    {
        self.context = Box::new(context);
        self
    }

    /// Set the cleaner projecting each produced value into its reported form.
    ///
    /// Cleaned values are for publishers only; comparison always uses raw values.
    #[must_use]
    pub fn clean<F>(mut self, cleaner: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.cleaner = Some(Box::new(cleaner));
        self
    }

    /// Run the control and trials on one thread each.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Return [`Error::Mismatch`](crate::Error::Mismatch) after publishing when
    /// any trial did not match.
    #[must_use]
    pub const fn error_on_mismatch(mut self, error_on_mismatch: bool) -> Self {
        self.error_on_mismatch = error_on_mismatch;
        self
    }

    /// Set the experiment name.
    #[must_use]
    pub fn called(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the publisher receiving the results of every enabled run.
    #[must_use]
    pub fn publish<P>(mut self, publisher: P) -> Self
    where
        P: Publisher<T, E> + 'static,
    {
        self.publisher = Box::new(publisher);
        self
    }

    /// Set an inline callback as the publisher.
    #[must_use]
    pub fn publish_with<F>(self, callback: F) -> Self
    where
        F: Fn(&Results<T, E>) + Send + Sync + 'static,
    {
        self.publish(callback)
    }

    /// Return the single trial's result instead of running the experiment.
    ///
    /// When the predicate returns `true` and exactly one trial is configured,
    /// [`run`](Self::run) calls only that trial and hands back its outcome:
    /// nothing is observed, compared or published. With any other number of
    /// trials the predicate is never consulted.
    #[must_use]
    pub fn use_trial_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.use_trial = Some(Box::new(predicate));
        self
    }
}

impl<T, E> ExperimentConfig<T, E> {
    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of configured trials.
    #[must_use]
    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    /// Get the trial names in configuration order.
    #[must_use]
    pub fn trial_names(&self) -> Vec<&str> {
        self.trials.iter().map(Trial::name).collect()
    }

    /// Whether participants run on one thread each.
    #[must_use]
    pub const fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Whether a mismatch is returned as an error.
    #[must_use]
    pub const fn errors_on_mismatch(&self) -> bool {
        self.error_on_mismatch
    }
}

impl<T, E> fmt::Debug for ExperimentConfig<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentConfig")
            .field("name", &self.name)
            .field("trials", &self.trial_names())
            .field("ignores", &self.ignores.len())
            .field("cleaner", &self.cleaner.is_some())
            .field("parallel", &self.parallel)
            .field("error_on_mismatch", &self.error_on_mismatch)
            .finish_non_exhaustive()
    }
}

//! Experiment engine
//!
//! An experiment runs a trusted control code path next to one or more trial
//! code paths, compares what they produced and publishes the comparison. The
//! caller always gets the control's outcome back.
//!
//! ## Run Overview
//!
//! ```text
//! run() ──> enabled? ──no──> control only
//!              │
//!             yes
//!              │
//!   shuffle [control, trial 0, trial 1, ...]
//!              │
//!   execute (sequential | one thread each)
//!              │
//!   evaluate each trial against the control
//!              │
//!   publish Results ──> mismatch error? ──> control outcome
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use experimentalist::experiment::Experiment;
//!
//! let total = Experiment::on(|| Ok::<_, String>((1..=10).sum::<u32>()))
//!     .trial(|| Ok(10 * 11 / 2))
//!     .called("sum")
//!     .run()?;
//!
//! assert_eq!(total, 55);
//! # Ok::<(), experimentalist::Error<u32, String>>(())
//! ```

mod config;
mod runner;
mod schedule;

pub use config::{ExperimentConfig, DEFAULT_NAME};

/// Entry point for defining experiments.
pub struct Experiment {
    _private: (),
}

impl Experiment {
    /// Start an experiment around the control code path.
    ///
    /// Shorthand for [`ExperimentConfig::new`].
    pub fn on<T, E, F>(control: F) -> ExperimentConfig<T, E>
    where
        T: PartialEq + 'static,
        E: 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        ExperimentConfig::new(control)
    }
}

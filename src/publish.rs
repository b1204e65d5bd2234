//! Publishers - where the results of each experiment run go
//!
//! The engine hands every enabled run's [`Results`] to exactly one
//! [`Publisher`], synchronously, on the thread that called `run`. Any closure
//! taking `&Results` is a publisher.

use std::fmt;

use serde::Serialize;

use crate::results::Results;

/// Receives the results of every enabled experiment run.
pub trait Publisher<T, E>: Send + Sync {
    /// Publish one run's results.
    ///
    /// Runs on the calling thread before `run` returns, so slow publishers
    /// add directly to the caller's latency.
    fn publish(&self, results: &Results<T, E>);
}

impl<T, E, F> Publisher<T, E> for F
where
    F: Fn(&Results<T, E>) + Send + Sync,
{
    fn publish(&self, results: &Results<T, E>) {
        self(results);
    }
}

/// Publisher that discards results.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl<T, E> Publisher<T, E> for NoopPublisher {
    fn publish(&self, _results: &Results<T, E>) {}
}

/// Publisher emitting one `tracing` event per run.
///
/// Matched runs are logged at `INFO`, mismatched runs at `WARN`. The full
/// results travel as a JSON string field so log shippers can index them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl<T, E> Publisher<T, E> for TracingPublisher
where
    T: Serialize,
    E: fmt::Display,
{
    fn publish(&self, results: &Results<T, E>) {
        let payload = match serde_json::to_string(results) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(
                    target: "experimentalist::publish",
                    experiment = %results.name(),
                    error = %err,
                    "failed to serialize experiment results"
                );
                return;
            }
        };

        let control_ms = results.control().duration().as_secs_f64() * 1000.0;
        if results.matched() {
            tracing::info!(
                target: "experimentalist::publish",
                experiment = %results.name(),
                matched = true,
                ignored = results.ignored(),
                control_ms,
                results = %payload,
                "experiment matched"
            );
        } else {
            tracing::warn!(
                target: "experimentalist::publish",
                experiment = %results.name(),
                matched = false,
                ignored = results.ignored(),
                control_ms,
                results = %payload,
                "experiment mismatched"
            );
        }
    }
}

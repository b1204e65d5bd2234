//! # Experimentalist: Safe Refactoring of Critical Code Paths
//!
//! **Version**: 0.1.0
//!
//! Experimentalist runs an existing ("control") implementation and one or more
//! candidate ("trial") implementations of the same operation, compares their
//! outputs, and publishes the comparison. The caller always receives the
//! control's value or error, exactly as if the experiment were not there.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: Every disagreement between control and trial is surfaced to
//!   the publisher; optionally it stops the line with a mismatch error
//! - **Poka-Yoke safety**: Trial errors and panics are captured, never returned
//! - **Genchi Genbutsu**: Compare against real production inputs, with per-path
//!   wall-clock timings
//! - **Heijunka**: Randomized execution order keeps warm caches from favoring
//!   one path
//!
//! ## Example Usage
//!
//! ```rust
//! use experimentalist::{Experiment, Results};
//!
//! fn legacy_discount(total: u32) -> Result<u32, String> {
//!     Ok(if total > 100 { total / 10 } else { 0 })
//! }
//!
//! fn new_discount(total: u32) -> Result<u32, String> {
//!     Ok(if total <= 100 { 0 } else { total / 10 })
//! }
//!
//! let discount = Experiment::on(|| legacy_discount(250))
//!     .trial(|| new_discount(250))
//!     .called("discount")
//!     .publish_with(|results: &Results<u32, String>| {
//!         assert!(results.matched());
//!     })
//!     .run()?;
//!
//! assert_eq!(discount, 25);
//! # Ok::<(), experimentalist::Error<u32, String>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod experiment;
pub mod observation;
pub mod publish;
pub mod results;
pub mod trial;

pub use error::{Error, MismatchError, Result};
pub use experiment::{Experiment, ExperimentConfig};
pub use observation::{Failure, Observation};
pub use publish::{NoopPublisher, Publisher, TracingPublisher};
pub use results::{Context, Results};
pub use trial::Trial;

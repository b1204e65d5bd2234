//! Randomized fork/join execution of units of work
//!
//! Units are shuffled before they start so neither the control nor a trial
//! systematically benefits from running first (warm caches, lazily initialized
//! connections, lock contention). Outcomes come back in the order the units
//! were given, whatever order they ran in.

use std::panic;
use std::thread;

use rand::seq::SliceRandom;

/// A unit of work borrowed from the running experiment.
pub type Unit<'a, R> = Box<dyn FnOnce() -> R + Send + 'a>;

/// How the shuffled units are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One after another on the calling thread.
    Sequential,
    /// One scoped thread per unit, all joined before returning.
    Parallel,
}

/// Shuffle `units`, execute them, and return their outcomes in input order.
///
/// A panic escaping a unit on a worker thread is resumed on the caller once
/// every other unit has been joined.
pub fn run_shuffled<'a, R: Send>(units: Vec<Unit<'a, R>>, mode: Mode) -> Vec<R> {
    let mut order: Vec<(usize, Unit<'a, R>)> = units.into_iter().enumerate().collect();
    order.shuffle(&mut rand::thread_rng());

    let finished = match mode {
        Mode::Sequential => order
            .into_iter()
            .map(|(index, unit)| (index, unit()))
            .collect::<Vec<_>>(),
        Mode::Parallel => run_parallel(order),
    };

    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(finished.len()).collect();
    for (index, outcome) in finished {
        slots[index] = Some(outcome);
    }
    slots.into_iter().flatten().collect()
}

fn run_parallel<'a, R: Send>(order: Vec<(usize, Unit<'a, R>)>) -> Vec<(usize, R)> {
    thread::scope(|scope| {
        let handles: Vec<_> = order
            .into_iter()
            .map(|(index, unit)| (index, scope.spawn(unit)))
            .collect();

        let mut finished = Vec::with_capacity(handles.len());
        let mut escaped = None;
        for (index, handle) in handles {
            match handle.join() {
                Ok(outcome) => finished.push((index, outcome)),
                Err(payload) => {
                    escaped.get_or_insert(payload);
                }
            }
        }
        if let Some(payload) = escaped {
            panic::resume_unwind(payload);
        }
        finished
    })
}

//! Repeating refresh timers.
//!
//! DESIGN
//! ======
//! Each scheduled task gets its own timer loop on the runtime. Every tick
//! spawns the task's work as a separate fire-and-forget task, so a slow
//! tick never delays the next one and a failing (or panicking) tick never
//! stops the timer. Ordering of overlapping completions is the store's
//! problem, resolved by sequence numbers.
//!
//! Cancelling aborts only the timer loop. Work already in flight runs to
//! completion and still lands in the store.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Opaque handle returned by [`Scheduler::schedule`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskHandle {
    id: u64,
    name: &'static str,
}

impl TaskHandle {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Owns every timer it starts; dropping it cancels them all.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    timers: BTreeMap<u64, (&'static str, JoinHandle<()>)>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` now and then every `every`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F, Fut, E>(&mut self, name: &'static str, every: Duration, task: F) -> TaskHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.next_id += 1;
        let id = self.next_id;
        info!(task = name, every_secs = every.as_secs_f64(), "scheduling refresh");

        let timer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let tick = task();
                tokio::spawn(async move {
                    if let Err(e) = tick.await {
                        warn!(task = name, error = %e, "tick failed; timer continues");
                    }
                });
            }
        });

        self.timers.insert(id, (name, timer));
        TaskHandle { id, name }
    }

    /// Stop future ticks for `handle`. Returns `false` if it was already cancelled.
    pub fn cancel(&mut self, handle: &TaskHandle) -> bool {
        match self.timers.remove(&handle.id) {
            Some((name, timer)) => {
                timer.abort();
                info!(task = name, "refresh cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, (_, timer)) in std::mem::take(&mut self.timers) {
            timer.abort();
        }
    }

    #[must_use]
    pub fn is_active(&self, handle: &TaskHandle) -> bool {
        self.timers.contains_key(&handle.id)
    }

    /// Number of live timers.
    #[must_use]
    pub fn active(&self) -> usize {
        self.timers.len()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

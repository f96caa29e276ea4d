//! Long-running operations with progress ticks and cooperative cancellation.
//!
//! The caller decides how to present progress (spinner, log line, nothing);
//! this module only reports elapsed time at a fixed cadence.

use crate::error::{EngineResult, QueryError};
use ragdrop_core::StopSignal;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Snapshot handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub ticks: u64,
    pub elapsed: Duration,
}

/// Runs a future while emitting progress ticks until it completes or the
/// stop signal fires.
#[derive(Debug, Clone)]
pub struct Operation {
    tick: Duration,
    stop: StopSignal,
}

impl Operation {
    pub fn new() -> Self {
        Self {
            tick: Duration::from_millis(100),
            stop: StopSignal::never(),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Drive `operation` to completion, calling `on_tick` once per tick.
    ///
    /// Returns [`QueryError::Cancelled`] if a stop is requested first; the
    /// operation is dropped at that point.
    pub async fn run<F, T, P>(&self, operation: F, mut on_tick: P) -> EngineResult<T>
    where
        F: Future<Output = EngineResult<T>>,
        P: FnMut(Progress),
    {
        tokio::pin!(operation);

        let started = Instant::now();
        let mut interval = tokio::time::interval_at(started + self.tick, self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = self.stop.stopped() => return Err(QueryError::Cancelled),
                result = &mut operation => return result,
                _ = interval.tick() => {
                    ticks += 1;
                    on_tick(Progress {
                        ticks,
                        elapsed: started.elapsed(),
                    });
                }
            }
        }
    }
}

impl Default for Operation {
    fn default() -> Self {
        Self::new()
    }
}

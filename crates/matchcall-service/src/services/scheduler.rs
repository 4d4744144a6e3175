//! Timer scheduling on the tokio runtime
//!
//! Every timer the lifecycle owns is a spawned task behind a [`TimerHandle`].
//! Dropping or cancelling the handle aborts the task. Deadlines are fixed
//! when the timer is scheduled, not when the task is first polled.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

use super::error::{ServiceError, ServiceResult};

/// Whether a periodic timer keeps running after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerControl {
    Continue,
    Stop,
}

/// Spawns one-shot and periodic timers onto a runtime
#[derive(Debug, Clone)]
pub struct Scheduler {
    handle: Handle,
}

impl Scheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler bound to the runtime of the calling context
    pub fn try_current() -> ServiceResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| ServiceError::internal(format!("no tokio runtime: {e}")))
    }

    /// Run `task` once after `delay`
    pub fn after<F>(&self, delay: Duration, task: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + delay;
        let join = self.handle.spawn(async move {
            sleep_until(deadline).await;
            task();
        });
        TimerHandle {
            abort: join.abort_handle(),
        }
    }

    /// Run `task` every `period`, first tick one period from now
    ///
    /// Ticks land on absolute deadlines so slow ticks do not accumulate drift.
    /// The task receives the instant it ran at.
    pub fn every<F>(&self, period: Duration, mut task: F) -> TimerHandle
    where
        F: FnMut(Instant) -> TimerControl + Send + 'static,
    {
        let start = Instant::now() + period;
        let join = self.handle.spawn(async move {
            let mut ticks = interval_at(start, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                if task(Instant::now()) == TimerControl::Stop {
                    break;
                }
            }
        });
        TimerHandle {
            abort: join.abort_handle(),
        }
    }
}

/// Owning handle to a scheduled timer; aborts it on drop
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

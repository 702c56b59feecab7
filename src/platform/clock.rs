//! Deterministic scheduler for headless runs and tests
//!
//! Time only moves when the caller asks for the next due trigger, so a whole
//! session can be replayed frame by frame without a browser.

use super::{CancelToken, Scheduler, Trigger};
use crate::consts::FRAME_INTERVAL_MS;
use crate::sim::EntityKind;

/// Cancels its task when dropped
#[derive(Debug)]
pub struct TaskGuard {
    token: CancelToken,
}

impl TaskGuard {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug)]
struct Scheduled {
    trigger: Trigger,
    period_ms: f64,
    next_due_ms: f64,
    /// Scheduling order, breaks ties between tasks due at the same instant
    seq: u64,
    token: CancelToken,
}

/// Virtual time source implementing [`Scheduler`]
#[derive(Debug)]
pub struct VirtualClock {
    now_ms: f64,
    frame_interval_ms: f64,
    tasks: Vec<Scheduled>,
    next_seq: u64,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    /// Clock with a 60 Hz frame loop
    pub fn new() -> Self {
        Self::with_frame_interval(FRAME_INTERVAL_MS)
    }

    pub fn with_frame_interval(frame_interval_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            frame_interval_ms,
            tasks: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Tasks whose guards are still alive
    pub fn active_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }

    fn schedule(&mut self, trigger: Trigger, period_ms: f64) -> TaskGuard {
        let token = CancelToken::new();
        self.tasks.push(Scheduled {
            trigger,
            period_ms,
            next_due_ms: self.now_ms + period_ms,
            seq: self.next_seq,
            token: token.clone(),
        });
        self.next_seq += 1;
        TaskGuard { token }
    }

    /// Pop the earliest trigger due at or before `until_ms`, moving the clock
    /// to its due time. When nothing is due the clock jumps to `until_ms`.
    ///
    /// Cancellation is checked on every call, so a task dropped while
    /// handling one trigger never fires again.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<Trigger> {
        self.tasks.retain(|t| !t.token.is_cancelled());

        let next = self
            .tasks
            .iter_mut()
            .filter(|t| t.next_due_ms <= until_ms)
            .min_by(|a, b| {
                a.next_due_ms
                    .total_cmp(&b.next_due_ms)
                    .then(a.seq.cmp(&b.seq))
            });

        match next {
            Some(task) => {
                self.now_ms = task.next_due_ms;
                task.next_due_ms += task.period_ms;
                Some(task.trigger)
            }
            None => {
                self.now_ms = self.now_ms.max(until_ms);
                None
            }
        }
    }
}

impl Scheduler for VirtualClock {
    type Task = TaskGuard;

    fn frame_loop(&mut self) -> TaskGuard {
        let period = self.frame_interval_ms;
        self.schedule(Trigger::Frame, period)
    }

    fn every(&mut self, period_ms: u32, kind: EntityKind) -> TaskGuard {
        self.schedule(Trigger::Spawn(kind), period_ms as f64)
    }
}

//! Platform abstraction layer
//!
//! A running game needs three scheduled tasks: the per-frame update and one
//! spawn timer per entity kind. A [`Scheduler`] hands out a guard for each;
//! dropping the guard cancels the task. On the web the scheduler wraps
//! `requestAnimationFrame` and `setInterval`, natively it is a
//! [`clock::VirtualClock`].

use std::cell::Cell;
use std::rc::Rc;

use crate::sim::EntityKind;
use crate::tuning::Tuning;

pub mod clock;
#[cfg(target_arch = "wasm32")]
pub mod web;

/// What a scheduled task asks the game to do when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Frame,
    Spawn(EntityKind),
}

/// Shared flag every task callback checks before doing work
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Source of cancellable tasks. `Task` cancels its schedule when dropped.
pub trait Scheduler {
    type Task;

    /// Fire `Trigger::Frame` once per display refresh
    fn frame_loop(&mut self) -> Self::Task;

    /// Fire `Trigger::Spawn(kind)` every `period_ms`, first after one period
    fn every(&mut self, period_ms: u32, kind: EntityKind) -> Self::Task;
}

/// The three tasks of a running session, acquired and released together
pub struct SessionTasks<T> {
    _frame: T,
    _packet_timer: T,
    _virus_timer: T,
}

impl<T> SessionTasks<T> {
    pub fn acquire<S: Scheduler<Task = T>>(scheduler: &mut S, tuning: &Tuning) -> Self {
        Self {
            _frame: scheduler.frame_loop(),
            _packet_timer: scheduler.every(tuning.packet_spawn_interval_ms, EntityKind::Packet),
            _virus_timer: scheduler.every(tuning.virus_spawn_interval_ms, EntityKind::Virus),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}

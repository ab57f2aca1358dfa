//! Repeat-while-held for two-direction buttons
//!
//! Used for tempo down/up and for rewind/forward. A press applies one step
//! right away and arms a tick one period later; every tick applies another
//! step and re-arms until both directions are released. The period is fixed,
//! so ticks land on multiples of it after the first press.

use crate::scheduler::{ScheduledTask, Scheduler, TaskHandle, TaskKind};
use crate::view::ViewId;
use std::time::Duration;
use tracing::trace;

/// Step direction of a held button pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Decrease,
    Increase,
}

impl Direction {
    pub fn is_increase(self) -> bool {
        self == Direction::Increase
    }
}

/// Armed/disarmed repeat timer for a pair of held buttons
#[derive(Debug)]
pub struct HoldRepeat {
    owner: ViewId,
    kind: TaskKind,
    period: Duration,
    increase_held: bool,
    decrease_held: bool,
    armed: Option<TaskHandle>,
    generation: u64,
}

impl HoldRepeat {
    pub fn new(owner: ViewId, kind: TaskKind, period: Duration) -> Self {
        Self {
            owner,
            kind,
            period,
            increase_held: false,
            decrease_held: false,
            armed: None,
            generation: 0,
        }
    }

    /// Change the period; takes effect on the next arming
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Increase => self.increase_held,
            Direction::Decrease => self.decrease_held,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Button down; returns the step to apply now
    pub fn press(&mut self, direction: Direction, scheduler: &dyn Scheduler) -> Direction {
        match direction {
            Direction::Increase => self.increase_held = true,
            Direction::Decrease => self.decrease_held = true,
        }
        if self.armed.is_none() {
            self.arm(scheduler);
        }
        self.current_direction()
    }

    /// Button up; the timer is cancelled once both directions are released
    pub fn release(&mut self, direction: Direction) {
        match direction {
            Direction::Increase => self.increase_held = false,
            Direction::Decrease => self.decrease_held = false,
        }
        if !self.increase_held && !self.decrease_held {
            self.disarm();
        }
    }

    /// A scheduled tick arrived; returns the step to apply, if any
    ///
    /// Ticks from an earlier arming are ignored. With nothing held the timer
    /// disarms instead of rescheduling.
    pub fn tick(&mut self, task: &ScheduledTask, scheduler: &dyn Scheduler) -> Option<Direction> {
        if task.kind != self.kind || task.generation != self.generation || self.armed.is_none() {
            trace!("Stale {:?} tick #{} ignored", task.kind, task.generation);
            return None;
        }
        self.armed = None;

        if !self.increase_held && !self.decrease_held {
            return None;
        }
        self.arm(scheduler);
        Some(self.current_direction())
    }

    /// Drop held state and cancel any pending tick
    pub fn reset(&mut self) {
        self.increase_held = false;
        self.decrease_held = false;
        self.disarm();
    }

    fn current_direction(&self) -> Direction {
        if self.increase_held {
            Direction::Increase
        } else {
            Direction::Decrease
        }
    }

    fn arm(&mut self, scheduler: &dyn Scheduler) {
        self.generation += 1;
        let task = ScheduledTask {
            owner: self.owner,
            kind: self.kind,
            generation: self.generation,
        };
        self.armed = Some(scheduler.schedule(self.period, task));
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.armed.take() {
            handle.cancel();
        }
    }
}

//! Transport buttons shared by the views
//!
//! Button index → command:
//! - 0: rewind (repeats while held)
//! - 1: fast forward (repeats while held)
//! - 2: stop
//! - 3: play
//! - 4: toggle loop
//! - 5: record

use crate::daw::Transport;
use crate::grid::ButtonEvent;
use crate::repeat::{Direction, HoldRepeat};
use crate::scheduler::{ScheduledTask, Scheduler, TaskKind};
use crate::view::ViewId;
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
pub struct TransportControl {
    wind: HoldRepeat,
}

impl TransportControl {
    pub fn new(owner: ViewId, repeat_period: Duration) -> Self {
        Self {
            wind: HoldRepeat::new(owner, TaskKind::WindRepeat, repeat_period),
        }
    }

    pub fn set_repeat_period(&mut self, period: Duration) {
        self.wind.set_period(period);
    }

    /// Handle a transport button edge
    pub fn execute(
        &mut self,
        index: usize,
        event: ButtonEvent,
        transport: &dyn Transport,
        scheduler: &dyn Scheduler,
    ) {
        match (index, event) {
            (0 | 1, ButtonEvent::Down) => {
                let direction = if index == 0 {
                    Direction::Decrease
                } else {
                    Direction::Increase
                };
                let step = self.wind.press(direction, scheduler);
                wind(transport, step);
            },
            (0, ButtonEvent::Up) => self.wind.release(Direction::Decrease),
            (1, ButtonEvent::Up) => self.wind.release(Direction::Increase),
            (2, ButtonEvent::Down) => transport.stop(),
            (3, ButtonEvent::Down) => transport.play(),
            (4, ButtonEvent::Down) => transport.toggle_loop(),
            (5, ButtonEvent::Down) => transport.record(),
            _ => debug!("Transport button {} {:?} ignored", index, event),
        }
    }

    /// Repeat tick for a held rewind/forward button
    pub fn on_tick(&mut self, task: &ScheduledTask, transport: &dyn Transport, scheduler: &dyn Scheduler) {
        if let Some(step) = self.wind.tick(task, scheduler) {
            wind(transport, step);
        }
    }

    /// Release held buttons and cancel the repeat
    pub fn reset(&mut self) {
        self.wind.reset();
    }
}

fn wind(transport: &dyn Transport, direction: Direction) {
    match direction {
        Direction::Decrease => transport.rewind(),
        Direction::Increase => transport.fast_forward(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daw::SimulatedDaw;
    use crate::scheduler::ManualScheduler;

    #[test]
    fn test_discrete_commands_act_on_down() {
        let daw = SimulatedDaw::demo();
        let scheduler = ManualScheduler::new();
        let mut control = TransportControl::new(ViewId::Control, Duration::from_millis(200));

        control.execute(3, ButtonEvent::Down, &daw, &scheduler);
        control.execute(3, ButtonEvent::Up, &daw, &scheduler);
        control.execute(4, ButtonEvent::Down, &daw, &scheduler);
        control.execute(5, ButtonEvent::Down, &daw, &scheduler);
        control.execute(2, ButtonEvent::Down, &daw, &scheduler);
        control.execute(6, ButtonEvent::Down, &daw, &scheduler);

        assert_eq!(
            daw.actions(),
            vec![
                "play playing=true".to_string(),
                "toggle_loop looping=true".to_string(),
                "record recording=true".to_string(),
                "stop".to_string(),
            ]
        );
    }

    #[test]
    fn test_fast_forward_repeats_while_held() {
        let daw = SimulatedDaw::demo();
        let scheduler = ManualScheduler::new();
        let mut control = TransportControl::new(ViewId::Control, Duration::from_millis(200));

        control.execute(1, ButtonEvent::Down, &daw, &scheduler);
        while let Some(task) = scheduler.pop_due(Duration::from_millis(600)) {
            control.on_tick(&task, &daw, &scheduler);
        }
        control.execute(1, ButtonEvent::Up, &daw, &scheduler);

        assert_eq!(daw.count_actions("fast_forward"), 4);
        assert_eq!(scheduler.pending(), 0);
    }
}

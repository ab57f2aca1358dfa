//! Play view: pads play notes
//!
//! Grid notes always go to the note output. Rows 4 and 5 keep the transport,
//! P1 scrolls the track bank and row 1 picks the view while View Select is
//! showing.

use super::control::leds;
use super::{LedContext, LedState, SurfaceContext, View, ViewId};
use crate::grid::{ButtonEvent, ButtonId, ButtonRow};
use crate::mode::ModeId;
use crate::scheduler::{ScheduledTask, TaskKind};
use crate::transport::TransportControl;
use std::time::Duration;
use tracing::trace;

pub struct PlayView {
    transport: TransportControl,
}

impl PlayView {
    pub fn new(repeat_period: Duration) -> Self {
        Self {
            transport: TransportControl::new(ViewId::Play, repeat_period),
        }
    }
}

impl View for PlayView {
    fn id(&self) -> ViewId {
        ViewId::Play
    }

    fn on_deactivate(&mut self) {
        self.transport.reset();
    }

    fn on_button_row(&mut self, row: ButtonRow, index: usize, event: ButtonEvent, ctx: &mut SurfaceContext<'_>) {
        match row {
            ButtonRow::Row1 => {
                if !event.is_down() || ctx.modes.active_or_temp_mode_id() != ModeId::ViewSelect {
                    return;
                }
                if index == 0 {
                    ctx.request_view(ViewId::Control);
                }
                ctx.modes.restore_mode();
            },
            ButtonRow::Row4 | ButtonRow::Row5 => {
                self.transport
                    .execute(index, event, ctx.model.transport.as_ref(), ctx.scheduler);
            },
            _ => trace!("Play view ignores {:?} button {}", row, index),
        }
    }

    fn on_p1(&mut self, up: bool, event: ButtonEvent, ctx: &mut SurfaceContext<'_>) {
        if event.is_down() {
            ctx.model.tracks.scroll_page(up);
        }
    }

    fn on_grid_note(&mut self, note: u8, velocity: u8, ctx: &mut SurfaceContext<'_>) {
        ctx.model.notes.send_note(note, velocity);
    }

    fn on_scheduled(&mut self, task: &ScheduledTask, ctx: &mut SurfaceContext<'_>) {
        if task.kind == TaskKind::WindRepeat {
            self.transport
                .on_tick(task, ctx.model.transport.as_ref(), ctx.scheduler);
        }
    }

    fn button_led(&self, button: ButtonId, ctx: &LedContext<'_>) -> LedState {
        let mode = ctx.modes.active_or_temp_mode_id();
        match button {
            ButtonId::Row { row: ButtonRow::Row1, index } if mode == ModeId::ViewSelect => {
                match index {
                    0 => LedState::On,
                    // Current view
                    1 => LedState::Hilite,
                    _ => LedState::Off,
                }
            },
            ButtonId::Row { row: ButtonRow::Row4, index } => {
                leds::transport(index as usize, ctx.model.transport.as_ref())
            },
            ButtonId::RowSelect(number) => leds::row_select(number, mode),
            _ => LedState::Off,
        }
    }

    fn set_repeat_period(&mut self, period: Duration) {
        self.transport.set_repeat_period(period);
    }
}

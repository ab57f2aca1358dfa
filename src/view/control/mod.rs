//! Control view: the surface as a DAW remote
//!
//! Button rows:
//! - Row 1: editing functions, or new clip lengths in Fixed mode
//! - Row 2: track & device toggles, or the Frame/Browser overlay
//! - Row 3: track selection
//! - Row 4: transport plus tempo down/up (repeat while held)
//! - Row 5: transport
//!
//! Every row branches on the active-or-temporary mode, so overlays intercept
//! their rows before the default mapping is considered.

pub mod leds;

use super::{select_row, LedContext, LedState, SurfaceContext, View, ViewId};
use crate::grid::{ButtonEvent, ButtonId, ButtonRow, ROW_BUTTONS};
use crate::mode::ModeId;
use crate::repeat::{Direction, HoldRepeat};
use crate::scheduler::{ScheduledTask, TaskKind};
use crate::transport::TransportControl;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Shown when the clip slot scan finds no empty slot
pub const NO_EMPTY_SLOT_MESSAGE: &str =
    "In the current selected grid view there is no empty slot. Please scroll down.";

/// First drum pad note when the pads select modes
const DRUM_PAD_BASE_NOTE: u8 = 36;

/// Row-select button for a drum pad used as mode selector
///
/// Pads 0-3 select rows 1-4, every higher pad selects row 6.
pub fn drum_pad_row_select(note: u8) -> Option<u8> {
    let index = note.checked_sub(DRUM_PAD_BASE_NOTE)?;
    let remapped = if index > 3 { 5 } else { index };
    Some(remapped + 1)
}

/// First slot without content, scanning the ring of slots from `start`
///
/// `has_content` is indexed by slot; missing entries count as empty.
pub fn find_empty_slot(has_content: &[bool], start: usize) -> Option<usize> {
    (0..ROW_BUTTONS)
        .map(|i| (start + i) % ROW_BUTTONS)
        .find(|&slot| !has_content.get(slot).copied().unwrap_or(false))
}

pub struct ControlView {
    tempo: HoldRepeat,
    transport: TransportControl,
}

impl ControlView {
    pub fn new(repeat_period: Duration) -> Self {
        Self {
            tempo: HoldRepeat::new(ViewId::Control, TaskKind::TempoRepeat, repeat_period),
            transport: TransportControl::new(ViewId::Control, repeat_period),
        }
    }

    fn on_row1(&mut self, index: usize, ctx: &mut SurfaceContext<'_>) {
        let mut mode = ctx.modes.active_or_temp_mode_id();
        if mode == ModeId::ViewSelect {
            if index == 1 {
                ctx.request_view(ViewId::Play);
                if ctx.modes.previous_mode_id() == Some(ModeId::Volume) {
                    ctx.modes.restore_mode();
                } else {
                    ctx.set_mode(ModeId::Session);
                }
            } else {
                ctx.modes.restore_mode();
            }
            return;
        }

        if mode != ModeId::Functions && mode != ModeId::Fixed {
            ctx.set_mode(ModeId::Functions);
            mode = ModeId::Functions;
        }

        if mode == ModeId::Fixed {
            info!("📏 New clip length: {}", index);
            ctx.settings.new_clip_length = index;
            return;
        }

        let model = ctx.model;
        match index {
            0 => model.application.undo(),
            1 => model.application.redo(),
            2 => model.application.delete_selection(),
            3 => model.application.duplicate(),
            4 => self.create_clip(ctx),
            5 => model.device.toggle_window_open(),
            6 => model.transport.toggle_metronome(),
            7 => model.transport.tap_tempo(),
            _ => {},
        }
    }

    /// New note clip in the first empty slot of the selected track
    fn create_clip(&self, ctx: &mut SurfaceContext<'_>) {
        let tracks = &ctx.model.tracks;
        let Some(track) = tracks.selected_track() else {
            debug!("New clip: no track selected");
            return;
        };
        let slots = tracks.slots(track.index);
        let start = slots.iter().find(|s| s.selected).map(|s| s.index).unwrap_or(0);
        let mut has_content = [false; ROW_BUTTONS];
        for slot in slots.iter().filter(|s| s.index < ROW_BUTTONS) {
            has_content[slot.index] = slot.has_content;
        }

        match find_empty_slot(&has_content, start) {
            Some(slot) => {
                let beats = ctx
                    .settings
                    .new_clip_length_in_beats(ctx.model.transport.quarters_per_measure());
                info!("🎼 New clip on track {} slot {} ({} beats)", track.index, slot, beats);
                tracks.create_note_clip(track.index, slot, beats);
            },
            None => ctx.display.notify(NO_EMPTY_SLOT_MESSAGE),
        }
    }

    fn on_row2(&mut self, index: usize, event: ButtonEvent, ctx: &mut SurfaceContext<'_>) {
        if !event.is_down() {
            return;
        }

        let mut mode = ctx.modes.active_or_temp_mode_id();
        if !matches!(mode, ModeId::TrackDetails | ModeId::Frame | ModeId::Browser) {
            ctx.set_mode(ModeId::TrackDetails);
            mode = ModeId::TrackDetails;
        }

        if matches!(mode, ModeId::Frame | ModeId::Browser) {
            ctx.forward_to_mode(mode, ButtonRow::Row2, index, event);
            return;
        }

        let model = ctx.model;
        match index {
            0..=2 => {
                let Some(track) = model.tracks.selected_track() else {
                    return;
                };
                match index {
                    0 => model.tracks.toggle_mute(track.index),
                    1 => model.tracks.toggle_solo(track.index),
                    _ => model.tracks.toggle_rec_arm(track.index),
                }
            },
            3 => model.transport.toggle_write_arranger_automation(),
            4 => {
                model.browser.replace_device();
                ctx.modes.set_temporary_mode(ModeId::Browser);
            },
            5 => model.device.toggle_enabled(),
            6 => model.device.select_previous(),
            7 => model.device.select_next(),
            _ => {},
        }
    }

    fn on_row4(&mut self, index: usize, event: ButtonEvent, ctx: &mut SurfaceContext<'_>) {
        let direction = match index {
            0..=5 => {
                self.transport
                    .execute(index, event, ctx.model.transport.as_ref(), ctx.scheduler);
                return;
            },
            6 => Direction::Decrease,
            7 => Direction::Increase,
            _ => return,
        };

        match event {
            ButtonEvent::Down => {
                let step = self.tempo.press(direction, ctx.scheduler);
                ctx.model.transport.change_tempo(step.is_increase());
            },
            ButtonEvent::Up => self.tempo.release(direction),
        }
    }
}

impl View for ControlView {
    fn id(&self) -> ViewId {
        ViewId::Control
    }

    fn on_deactivate(&mut self) {
        self.tempo.reset();
        self.transport.reset();
    }

    fn on_button_row(&mut self, row: ButtonRow, index: usize, event: ButtonEvent, ctx: &mut SurfaceContext<'_>) {
        match row {
            ButtonRow::Row1 => {
                if event.is_down() {
                    self.on_row1(index, ctx);
                }
            },
            ButtonRow::Row2 => self.on_row2(index, event, ctx),
            ButtonRow::Row3 => {
                if event.is_down() && !ctx.model.tracks.is_master_selected() {
                    ctx.model.tracks.select_track(index);
                }
            },
            ButtonRow::Row4 => self.on_row4(index, event, ctx),
            ButtonRow::Row5 => {
                self.transport
                    .execute(index, event, ctx.model.transport.as_ref(), ctx.scheduler);
            },
        }
    }

    fn on_p1(&mut self, up: bool, event: ButtonEvent, ctx: &mut SurfaceContext<'_>) {
        if !event.is_down() {
            return;
        }
        match ctx.modes.active_or_temp_mode_id() {
            ModeId::Functions | ModeId::Fixed => self.on_row_select(1, ctx),
            ModeId::Volume => ctx.model.tracks.scroll_page(up),
            ModeId::Track | ModeId::Master => self.on_row_select(4, ctx),
            ModeId::TrackDetails | ModeId::Frame => self.on_row_select(3, ctx),
            _ => {
                let device = ctx.model.device.as_ref();
                if let Some(mode) = ctx.modes.device_params_mut() {
                    if up {
                        mode.next_page(device);
                    } else {
                        mode.previous_page(device);
                    }
                }
            },
        }
    }

    fn on_grid_note(&mut self, note: u8, velocity: u8, ctx: &mut SurfaceContext<'_>) {
        if !ctx.settings.drumpads_as_mode_selection {
            ctx.model.notes.send_note(note, velocity);
            return;
        }
        if velocity == 0 {
            return;
        }
        match drum_pad_row_select(note) {
            Some(number) => {
                debug!("Drum pad {} → row select {}", note, number);
                self.on_row_select(number, ctx);
            },
            None => trace!("Drum pad {} below mode selection range", note),
        }
    }

    fn on_scheduled(&mut self, task: &ScheduledTask, ctx: &mut SurfaceContext<'_>) {
        let transport = ctx.model.transport.as_ref();
        match task.kind {
            TaskKind::TempoRepeat => {
                if let Some(step) = self.tempo.tick(task, ctx.scheduler) {
                    transport.change_tempo(step.is_increase());
                }
            },
            TaskKind::WindRepeat => self.transport.on_tick(task, transport, ctx.scheduler),
        }
    }

    fn button_led(&self, button: ButtonId, ctx: &LedContext<'_>) -> LedState {
        leds::resolve(button, ctx)
    }

    fn set_repeat_period(&mut self, period: Duration) {
        self.tempo.set_period(period);
        self.transport.set_repeat_period(period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_drum_pad_remap() {
        assert_eq!(drum_pad_row_select(35), None);
        assert_eq!(drum_pad_row_select(36), Some(1));
        assert_eq!(drum_pad_row_select(39), Some(4));
        // Pad 4 selects row 6, not row 5
        assert_eq!(drum_pad_row_select(40), Some(6));
        assert_eq!(drum_pad_row_select(51), Some(6));
    }

    #[test]
    fn test_find_empty_slot_wraps() {
        let full = [true; 8];
        assert_eq!(find_empty_slot(&full, 3), None);

        let mut slots = [true; 8];
        slots[1] = false;
        assert_eq!(find_empty_slot(&slots, 3), Some(1));
        assert_eq!(find_empty_slot(&slots, 1), Some(1));

        assert_eq!(find_empty_slot(&[true, true], 0), Some(2));
    }

    proptest! {
        #[test]
        fn prop_scan_finds_first_empty_in_ring_order(
            slots in proptest::array::uniform8(any::<bool>()),
            start in 0usize..8,
        ) {
            let expected = (0..8).map(|i| (start + i) % 8).find(|&s| !slots[s]);
            prop_assert_eq!(find_empty_slot(&slots, start), expected);
            if let Some(slot) = expected {
                prop_assert!(!slots[slot]);
                for i in 0..((slot + 8 - start) % 8) {
                    prop_assert!(slots[(start + i) % 8]);
                }
            }
        }

        #[test]
        fn prop_drum_pad_remap(index in 0u8..=91) {
            let number = drum_pad_row_select(DRUM_PAD_BASE_NOTE + index).unwrap();
            if index <= 3 {
                prop_assert_eq!(number, index + 1);
            } else {
                prop_assert_eq!(number, 6);
            }
        }
    }
}

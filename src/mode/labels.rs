//! Modes that label the button rows
//!
//! Most button-driven modes only show what the row buttons below the display
//! do right now. The selected track mode additionally puts volume and pan of
//! the selected track on the first two knobs.

use super::{shorten_and_fix_ascii, KnobTouchState, Mode, ModeContext, ModeId};
use crate::display::TextDisplay;

const FUNCTION_LABELS: [&str; 8] = ["Undo", "Redo", "Delete", "Double", "New", "Window", "Metro", "Tap"];

const CLIP_LENGTH_LABELS: [&str; 8] = [
    "1 Beat", "2 Beats", "1 Bar", "2 Bars", "4 Bars", "8 Bars", "16 Bars", "32 Bars",
];

const TRACK_DETAIL_LABELS: [&str; 8] = [
    "Mute", "Solo", "Arm", "Write", "Browse", "Enable", "<Device", "Device>",
];

const VIEW_LABELS: [&str; 2] = ["Control", "Play"];

/// What a label mode shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelContent {
    /// Row 1 editing functions
    Functions,
    /// Row 1 new clip lengths, current one marked
    ClipLength,
    /// Row 2 track and device toggles
    TrackDetails,
    /// Parameters of the selected track
    SelectedTrack,
    Master,
    /// Track names with their filled clip slots
    Session,
    ViewSelect,
}

pub struct LabelMode {
    id: ModeId,
    content: LabelContent,
    touch: KnobTouchState,
}

fn on_off(on: bool) -> &'static str {
    if on {
        "On"
    } else {
        "Off"
    }
}

impl LabelMode {
    pub fn new(id: ModeId, content: LabelContent, knobs: usize) -> Self {
        Self {
            id,
            content,
            touch: KnobTouchState::new(knobs),
        }
    }

    pub fn content(&self) -> LabelContent {
        self.content
    }

    /// Top and bottom text of one display column
    fn column_text(&self, column: usize, ctx: &ModeContext<'_>) -> (String, String) {
        let model = ctx.model;
        let label = |labels: &[&str]| labels.get(column).copied().unwrap_or("").to_string();

        match self.content {
            LabelContent::Functions => {
                let state = match column {
                    5 => on_off(model.device.is_window_open()),
                    6 => on_off(model.transport.is_metronome_on()),
                    _ => "",
                };
                (label(&FUNCTION_LABELS), state.to_string())
            },
            LabelContent::ClipLength => {
                let mut text = label(&CLIP_LENGTH_LABELS);
                if column == ctx.settings.new_clip_length {
                    text.insert(0, '>');
                }
                (text, String::new())
            },
            LabelContent::TrackDetails => {
                let track = model.tracks.selected_track();
                let state = match column {
                    0 => track.as_ref().map(|t| on_off(t.mute)).unwrap_or(""),
                    1 => track.as_ref().map(|t| on_off(t.solo)).unwrap_or(""),
                    2 => track.as_ref().map(|t| on_off(t.rec_arm)).unwrap_or(""),
                    3 => on_off(model.transport.is_writing_arranger_automation()),
                    5 => on_off(model.device.is_enabled()),
                    _ => "",
                };
                (label(&TRACK_DETAIL_LABELS), state.to_string())
            },
            LabelContent::SelectedTrack => {
                let Some(track) = model.tracks.selected_track() else {
                    let text = if column == 0 { "No track" } else { "" };
                    return (text.to_string(), String::new());
                };
                match column {
                    0 => (shorten_and_fix_ascii(&track.name, 8), format!("Track {}", track.index + 1)),
                    1 => ("Volume".to_string(), track.volume_text),
                    2 => ("Pan".to_string(), track.pan_text),
                    3 => ("Mute".to_string(), on_off(track.mute).to_string()),
                    4 => ("Solo".to_string(), on_off(track.solo).to_string()),
                    5 => ("Arm".to_string(), on_off(track.rec_arm).to_string()),
                    _ => (String::new(), String::new()),
                }
            },
            LabelContent::Master => {
                if column == 0 {
                    ("Master".to_string(), format!("{:.1}", model.transport.tempo()))
                } else {
                    (String::new(), String::new())
                }
            },
            LabelContent::Session => {
                let track = model.tracks.track(column);
                if !track.exists {
                    return (String::new(), String::new());
                }
                let filled = model
                    .tracks
                    .slots(column)
                    .iter()
                    .filter(|slot| slot.has_content)
                    .count();
                (shorten_and_fix_ascii(&track.name, 6), format!("{} clp", filled))
            },
            LabelContent::ViewSelect => (label(&VIEW_LABELS), String::new()),
        }
    }
}

impl Mode for LabelMode {
    fn id(&self) -> ModeId {
        self.id
    }

    fn touch_state(&self) -> &KnobTouchState {
        &self.touch
    }

    fn touch_state_mut(&mut self) -> &mut KnobTouchState {
        &mut self.touch
    }

    fn on_knob_value(&mut self, index: usize, delta: i32, ctx: &ModeContext<'_>) {
        if self.content != LabelContent::SelectedTrack || !self.accepts_turn(index, ctx.grid) {
            return;
        }
        let tracks = &ctx.model.tracks;
        let Some(track) = tracks.selected_track() else {
            return;
        };
        match index {
            0 => tracks.change_volume(track.index, delta),
            1 => tracks.change_pan(track.index, delta),
            _ => {},
        }
    }

    fn update_display(&self, ctx: &ModeContext<'_>, display: &mut dyn TextDisplay) {
        for column in 0..ctx.grid.display_columns() {
            let (top, bottom) = self.column_text(column, ctx);
            display.set_cell(0, column, &top);
            display.set_cell(1, column, &bottom);
        }
        display.all_done();
    }
}

//! Mixer modes: one track parameter on each knob
//!
//! The pan mode shows the track names on the first display row (selected
//! track marked with `>`) and the pan position on the second one.

use super::{shorten_and_fix_ascii, KnobTouchState, Mode, ModeContext, ModeId};
use crate::daw::TrackState;
use crate::display::TextDisplay;
use tracing::debug;

/// Characters of a track name or value shown per cell
const LABEL_WIDTH: usize = 6;

/// Track parameter controlled by the knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackParameter {
    Volume,
    Pan,
}

pub struct TrackParameterMode {
    parameter: TrackParameter,
    touch: KnobTouchState,
}

impl TrackParameterMode {
    pub fn new(parameter: TrackParameter, knobs: usize) -> Self {
        Self {
            parameter,
            touch: KnobTouchState::new(knobs),
        }
    }

    pub fn parameter(&self) -> TrackParameter {
        self.parameter
    }

    fn value_text<'t>(&self, track: &'t TrackState) -> &'t str {
        match self.parameter {
            TrackParameter::Volume => &track.volume_text,
            TrackParameter::Pan => &track.pan_text,
        }
    }
}

impl Mode for TrackParameterMode {
    fn id(&self) -> ModeId {
        match self.parameter {
            TrackParameter::Volume => ModeId::Volume,
            TrackParameter::Pan => ModeId::Pan,
        }
    }

    fn touch_state(&self) -> &KnobTouchState {
        &self.touch
    }

    fn touch_state_mut(&mut self) -> &mut KnobTouchState {
        &mut self.touch
    }

    fn on_knob_value(&mut self, index: usize, delta: i32, ctx: &ModeContext<'_>) {
        if !self.accepts_turn(index, ctx.grid) {
            return;
        }
        let tracks = &ctx.model.tracks;
        if !tracks.track(index).exists {
            return;
        }
        debug!("{:?} knob {} by {}", self.parameter, index, delta);
        match self.parameter {
            TrackParameter::Volume => tracks.change_volume(index, delta),
            TrackParameter::Pan => tracks.change_pan(index, delta),
        }
    }

    fn update_display(&self, ctx: &ModeContext<'_>, display: &mut dyn TextDisplay) {
        let tracks = &ctx.model.tracks;
        for i in 0..ctx.grid.display_columns().min(tracks.page_size()) {
            let track = tracks.track(i);
            let mut name = shorten_and_fix_ascii(&track.name, LABEL_WIDTH);
            if track.selected {
                name.insert(0, '>');
            }
            let value: String = self.value_text(&track).chars().take(LABEL_WIDTH).collect();
            display.set_cell(0, i, &name);
            display.set_cell(1, i, &value);
        }
        display.all_done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, SurfaceSettings};
    use crate::daw::{DawModel, SimulatedDaw};
    use crate::display::CellBuffer;
    use crate::grid::ControlGrid;
    use std::sync::Arc;

    fn make_test_setup(touch_sensitive: bool) -> (Arc<SimulatedDaw>, DawModel, ControlGrid) {
        let daw = Arc::new(SimulatedDaw::demo());
        let model = DawModel::from_shared(daw.clone());
        let grid = ControlGrid::new(&GridConfig {
            touch_sensitive,
            ..GridConfig::default()
        });
        (daw, model, grid)
    }

    #[test]
    fn test_pan_display() {
        let (_daw, model, grid) = make_test_setup(true);
        let settings = SurfaceSettings::default();
        let ctx = ModeContext {
            model: &model,
            grid: &grid,
            settings: &settings,
        };
        let mode = TrackParameterMode::new(TrackParameter::Pan, grid.knob_count());
        let mut display = CellBuffer::new(&grid);

        mode.update_display(&ctx, &mut display);

        assert_eq!(display.flush_count(), 1);
        // Track 0 is selected in the demo session
        assert_eq!(display.cell(0, 0), Some(">Drums"));
        assert_eq!(display.cell(0, 1), Some("Bass"));
        assert_eq!(display.cell(1, 1), Some("L50"));
        assert_eq!(display.cell(0, 3), Some("LdSynt"));
        assert_eq!(display.cell(1, 3), Some("R60"));
    }

    #[test]
    fn test_display_is_idempotent() {
        let (_daw, model, grid) = make_test_setup(true);
        let settings = SurfaceSettings::default();
        let ctx = ModeContext {
            model: &model,
            grid: &grid,
            settings: &settings,
        };
        let mode = TrackParameterMode::new(TrackParameter::Volume, grid.knob_count());
        let mut display = CellBuffer::new(&grid);

        mode.update_display(&ctx, &mut display);
        let first = display.lines();
        mode.update_display(&ctx, &mut display);

        assert_eq!(display.lines(), first);
        assert_eq!(display.flush_count(), 2);
    }

    #[test]
    fn test_out_of_range_touch_is_ignored() {
        let mut mode = TrackParameterMode::new(TrackParameter::Pan, 8);

        mode.on_knob_touch(8, true);
        mode.on_knob_touch(42, true);

        assert!(mode.touch_state().as_slice().iter().all(|t| !t));
    }

    #[test]
    fn test_turn_requires_touch_when_touch_sensitive() {
        let (daw, model, grid) = make_test_setup(true);
        let settings = SurfaceSettings::default();
        let ctx = ModeContext {
            model: &model,
            grid: &grid,
            settings: &settings,
        };
        let mut mode = TrackParameterMode::new(TrackParameter::Pan, grid.knob_count());

        mode.on_knob_value(1, 5, &ctx);
        assert_eq!(daw.count_actions("change_pan"), 0);

        mode.on_knob_touch(1, true);
        mode.on_knob_value(1, 5, &ctx);
        assert_eq!(daw.count_actions("change_pan"), 1);

        mode.on_deactivate();
        mode.on_knob_value(1, 5, &ctx);
        assert_eq!(daw.count_actions("change_pan"), 1);
    }

    #[test]
    fn test_turn_without_touch_sensing() {
        let (daw, model, grid) = make_test_setup(false);
        let settings = SurfaceSettings::default();
        let ctx = ModeContext {
            model: &model,
            grid: &grid,
            settings: &settings,
        };
        let mut mode = TrackParameterMode::new(TrackParameter::Volume, grid.knob_count());

        mode.on_knob_value(0, -3, &ctx);
        mode.on_knob_value(8, -3, &ctx);

        assert_eq!(daw.count_actions("change_volume"), 1);
    }
}

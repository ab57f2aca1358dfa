//! Layouts & panels overlay
//!
//! Row 2 buttons apply the window layout or toggle the panel shown above
//! them on the display.

use super::{KnobTouchState, Mode, ModeContext, ModeId, ModeRequest};
use crate::daw::FrameCommand;
use crate::display::TextDisplay;
use crate::grid::{ButtonEvent, ButtonRow};
use tracing::info;

pub struct FrameMode {
    touch: KnobTouchState,
}

impl FrameMode {
    pub fn new(knobs: usize) -> Self {
        Self {
            touch: KnobTouchState::new(knobs),
        }
    }
}

impl Mode for FrameMode {
    fn id(&self) -> ModeId {
        ModeId::Frame
    }

    fn touch_state(&self) -> &KnobTouchState {
        &self.touch
    }

    fn touch_state_mut(&mut self) -> &mut KnobTouchState {
        &mut self.touch
    }

    fn on_button(
        &mut self,
        row: ButtonRow,
        index: usize,
        event: ButtonEvent,
        ctx: &ModeContext<'_>,
    ) -> Option<ModeRequest> {
        if row != ButtonRow::Row2 || !event.is_down() {
            return None;
        }
        if let Some(&command) = FrameCommand::ALL.get(index) {
            info!("🪟 Frame: {}", command.label());
            ctx.model.application.apply_frame(command);
        }
        None
    }

    fn update_display(&self, ctx: &ModeContext<'_>, display: &mut dyn TextDisplay) {
        for column in 0..ctx.grid.display_columns() {
            let label = FrameCommand::ALL.get(column).map(|c| c.label()).unwrap_or("");
            display.set_cell(0, column, label);
            display.set_cell(1, column, "");
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

    #[test]
    fn test_row2_applies_frame_commands() {
        let daw = Arc::new(SimulatedDaw::demo());
        let model = DawModel::from_shared(daw.clone());
        let grid = ControlGrid::new(&GridConfig::default());
        let settings = SurfaceSettings::default();
        let ctx = ModeContext {
            model: &model,
            grid: &grid,
            settings: &settings,
        };
        let mut mode = FrameMode::new(8);

        assert_eq!(mode.on_button(ButtonRow::Row2, 1, ButtonEvent::Down, &ctx), None);
        mode.on_button(ButtonRow::Row2, 1, ButtonEvent::Up, &ctx);
        mode.on_button(ButtonRow::Row2, 9, ButtonEvent::Down, &ctx);

        assert_eq!(daw.actions(), vec!["frame MixLayout".to_string()]);

        let mut display = CellBuffer::new(&grid);
        mode.update_display(&ctx, &mut display);
        assert_eq!(display.cell(0, 0), Some("Arrange"));
        assert_eq!(display.cell(0, 7), Some("Inspect"));
    }
}

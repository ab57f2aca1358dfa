//! Device parameter mode
//!
//! Knobs edit the parameters of the selected page of the cursor device.
//! Pages are switched with `next_page` / `previous_page`.

use super::{shorten_and_fix_ascii, KnobTouchState, Mode, ModeContext, ModeId};
use crate::daw::CursorDevice;
use crate::display::TextDisplay;
use tracing::debug;

pub struct DeviceParamsMode {
    touch: KnobTouchState,
}

impl DeviceParamsMode {
    pub fn new(knobs: usize) -> Self {
        Self {
            touch: KnobTouchState::new(knobs),
        }
    }

    /// Select the next parameter page (stops at the last page)
    pub fn next_page(&mut self, device: &dyn CursorDevice) {
        if !device.exists() {
            return;
        }
        let page = device.selected_page();
        if page + 1 < device.page_count() {
            debug!("Device page {} → {}", page, page + 1);
            device.select_page(page + 1);
        }
    }

    /// Select the previous parameter page (stops at the first page)
    pub fn previous_page(&mut self, device: &dyn CursorDevice) {
        if !device.exists() {
            return;
        }
        let page = device.selected_page();
        if page > 0 {
            debug!("Device page {} → {}", page, page - 1);
            device.select_page(page - 1);
        }
    }
}

impl Mode for DeviceParamsMode {
    fn id(&self) -> ModeId {
        ModeId::DeviceParams
    }

    fn touch_state(&self) -> &KnobTouchState {
        &self.touch
    }

    fn touch_state_mut(&mut self) -> &mut KnobTouchState {
        &mut self.touch
    }

    fn on_knob_value(&mut self, index: usize, delta: i32, ctx: &ModeContext<'_>) {
        if !self.accepts_turn(index, ctx.grid) || !ctx.model.device.exists() {
            return;
        }
        ctx.model.device.change_parameter(index, delta);
    }

    fn update_display(&self, ctx: &ModeContext<'_>, display: &mut dyn TextDisplay) {
        let device = &ctx.model.device;
        let columns = ctx.grid.display_columns();
        if !device.exists() {
            display.set_cell(0, 0, "No");
            display.set_cell(0, 1, "device");
            for i in 2..columns {
                display.set_cell(0, i, "");
            }
            for i in 0..columns {
                display.set_cell(1, i, "");
            }
            display.all_done();
            return;
        }

        let width = ctx.grid.cell(0, 0).map(|c| c.capacity).unwrap_or(0);
        for i in 0..columns {
            let parameter = device.parameter(i);
            display.set_cell(0, i, &shorten_and_fix_ascii(&parameter.name, width));
            display.set_cell(1, i, &parameter.value_text);
        }
        display.all_done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, SurfaceSettings};
    use crate::daw::simulated::DawState;
    use crate::daw::{DawModel, SimulatedDaw};
    use crate::display::CellBuffer;
    use crate::grid::ControlGrid;
    use std::sync::Arc;

    #[test]
    fn test_pages_are_clamped() {
        let daw = SimulatedDaw::demo();
        let mut mode = DeviceParamsMode::new(8);

        mode.previous_page(&daw);
        assert_eq!(daw.selected_page(), 0);

        for _ in 0..5 {
            mode.next_page(&daw);
        }
        assert_eq!(daw.selected_page(), 2);
        assert_eq!(daw.count_actions("select_parameter_page"), 2);

        mode.previous_page(&daw);
        assert_eq!(daw.selected_page(), 1);
    }

    #[test]
    fn test_display_without_device() {
        let daw = Arc::new(SimulatedDaw::new(DawState::default()));
        let model = DawModel::from_shared(daw);
        let grid = ControlGrid::new(&GridConfig::default());
        let settings = SurfaceSettings::default();
        let ctx = ModeContext {
            model: &model,
            grid: &grid,
            settings: &settings,
        };
        let mut display = CellBuffer::new(&grid);

        DeviceParamsMode::new(8).update_display(&ctx, &mut display);

        assert_eq!(display.cell(0, 1), Some("device"));
        assert_eq!(display.flush_count(), 1);
    }

    #[test]
    fn test_display_shows_selected_page() {
        let daw = Arc::new(SimulatedDaw::demo());
        daw.select_page(1);
        let model = DawModel::from_shared(daw);
        let grid = ControlGrid::new(&GridConfig::default());
        let settings = SurfaceSettings::default();
        let ctx = ModeContext {
            model: &model,
            grid: &grid,
            settings: &settings,
        };
        let mut display = CellBuffer::new(&grid);

        DeviceParamsMode::new(8).update_display(&ctx, &mut display);

        assert_eq!(display.cell(0, 0), Some("P9"));
        assert_eq!(display.cell(1, 0), Some("50%"));
    }
}

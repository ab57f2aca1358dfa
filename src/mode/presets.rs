//! Device browser overlay
//!
//! Shown as a temporary mode while the browser replaces the cursor device.
//! Row 2 buttons:
//! - 0: cancel browsing
//! - 1: previous result (previous filter item while a column is selected)
//! - 2-6: toggle selection of filter column 0-4
//! - 7: commit the selected result
//!
//! Knob turns step through the results, or through the items of the
//! selected filter column.

use super::{shorten_and_fix_ascii, KnobTouchState, Mode, ModeContext, ModeId, ModeRequest};
use crate::display::TextDisplay;
use crate::grid::{ButtonEvent, ButtonRow};
use tracing::{debug, info};

/// Filter columns reachable from the row buttons
const SELECTABLE_COLUMNS: usize = 5;

/// What the previous/next controls step through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Browse results
    #[default]
    Off,
    /// Browse the items of a filter column
    FilterColumn(usize),
}

pub struct DevicePresetsMode {
    touch: KnobTouchState,
    selection: SelectionMode,
}

impl DevicePresetsMode {
    pub fn new(knobs: usize) -> Self {
        Self {
            touch: KnobTouchState::new(knobs),
            selection: SelectionMode::Off,
        }
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection
    }

    fn step(&self, forward: bool, ctx: &ModeContext<'_>) {
        let browser = &ctx.model.browser;
        match (self.selection, forward) {
            (SelectionMode::Off, true) => browser.select_next_result(),
            (SelectionMode::Off, false) => browser.select_previous_result(),
            (SelectionMode::FilterColumn(column), forward) => {
                browser.select_filter_item(column, forward)
            },
        }
    }

    fn toggle_column(&mut self, column: usize, ctx: &ModeContext<'_>) {
        if column >= ctx.model.browser.filter_column_count() {
            return;
        }
        self.selection = if self.selection == SelectionMode::FilterColumn(column) {
            SelectionMode::Off
        } else {
            SelectionMode::FilterColumn(column)
        };
        debug!("Browser selection mode: {:?}", self.selection);
    }
}

impl Mode for DevicePresetsMode {
    fn id(&self) -> ModeId {
        ModeId::Browser
    }

    fn touch_state(&self) -> &KnobTouchState {
        &self.touch
    }

    fn touch_state_mut(&mut self) -> &mut KnobTouchState {
        &mut self.touch
    }

    fn on_deactivate(&mut self) {
        self.touch.release_all();
        self.selection = SelectionMode::Off;
    }

    fn on_knob_value(&mut self, index: usize, delta: i32, ctx: &ModeContext<'_>) {
        if delta == 0 || !self.accepts_turn(index, ctx.grid) {
            return;
        }
        self.step(delta > 0, ctx);
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
        match index {
            0 => {
                info!("🔎 Browser cancelled");
                ctx.model.browser.close(false);
                Some(ModeRequest::Dismiss)
            },
            1 => {
                self.step(false, ctx);
                None
            },
            2..=6 => {
                self.toggle_column(index - 2, ctx);
                None
            },
            7 => {
                info!("🔎 Browser commit: {}", ctx.model.browser.selected_result());
                ctx.model.browser.close(true);
                Some(ModeRequest::Dismiss)
            },
            _ => None,
        }
    }

    fn update_display(&self, ctx: &ModeContext<'_>, display: &mut dyn TextDisplay) {
        let browser = &ctx.model.browser;
        let width = ctx.grid.cell(0, 0).map(|c| c.capacity).unwrap_or(0);

        display.set_cell(0, 0, "Cancel");
        display.set_cell(1, 0, "");
        display.set_cell(0, 1, "<");
        display.set_cell(1, 1, &shorten_and_fix_ascii(&browser.selected_result(), width));
        for column in 0..SELECTABLE_COLUMNS {
            let mut name = shorten_and_fix_ascii(&browser.filter_column_name(column), width);
            if self.selection == SelectionMode::FilterColumn(column) {
                name.insert(0, '>');
            }
            display.set_cell(0, column + 2, &name);
            display.set_cell(
                1,
                column + 2,
                &shorten_and_fix_ascii(&browser.filter_item(column), width),
            );
        }
        display.set_cell(0, 7, "Commit");
        display.set_cell(1, 7, "");
        display.all_done();
    }
}

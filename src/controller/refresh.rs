//! Refresh tick: repaint display and LEDs from current state

use super::SurfaceController;
use crate::display::TextDisplay;
use crate::grid::ButtonId;
use crate::mode::{ModeContext, ModeId};
use crate::view::{LedContext, LedState, ViewId};
use std::collections::BTreeMap;
use tracing::trace;

/// Result of one refresh tick
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshFrame {
    /// Mode that painted the display
    pub mode: ModeId,
    pub view: ViewId,
    /// LED state of every grid button
    pub leds: BTreeMap<ButtonId, LedState>,
}

impl RefreshFrame {
    pub fn led(&self, id: ButtonId) -> LedState {
        self.leds.get(&id).copied().unwrap_or_default()
    }

    /// Buttons whose LED is not off, in grid order
    pub fn lit(&self) -> Vec<(ButtonId, LedState)> {
        self.leds
            .iter()
            .filter(|(_, state)| **state != LedState::Off)
            .map(|(id, state)| (*id, *state))
            .collect()
    }
}

impl<D: TextDisplay> SurfaceController<D> {
    /// Repaint the display with the routed mode and resolve every LED
    ///
    /// Reads state only; calling it twice without input in between gives the
    /// same frame.
    pub fn refresh(&mut self) -> RefreshFrame {
        let mode_ctx = ModeContext {
            model: &self.model,
            grid: &self.grid,
            settings: &self.settings,
        };
        if let Some(mode) = self.modes.active_or_temp_mode() {
            mode.update_display(&mode_ctx, &mut self.display);
        }

        let led_ctx = LedContext {
            model: &self.model,
            modes: &self.modes,
            settings: &self.settings,
        };
        let view = self.views.active();
        let leds = self
            .grid
            .buttons()
            .iter()
            .map(|slot| {
                let state = view
                    .map(|v| v.button_led(slot.id, &led_ctx))
                    .unwrap_or_default();
                (slot.id, state)
            })
            .collect();

        let frame = RefreshFrame {
            mode: self.modes.active_or_temp_mode_id(),
            view: self.views.active_view_id(),
            leds,
        };
        trace!("Refresh: {} LEDs lit", frame.lit().len());
        frame
    }
}

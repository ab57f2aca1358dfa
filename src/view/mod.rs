//! Views: swappable behaviors bound to the buttons and pads
//!
//! A view receives the five button rows, the row-select strip, the P1
//! rocker, grid notes and its own scheduled ticks. It also answers the LED
//! state of every button on each refresh.
//!
//! View switches requested from inside a handler are deferred through
//! `SurfaceContext::request_view` and applied by the controller once the
//! handler returns.

pub mod control;
pub mod play;

pub use control::ControlView;
pub use play::PlayView;

use crate::config::SurfaceSettings;
use crate::daw::DawModel;
use crate::display::TextDisplay;
use crate::grid::{ButtonEvent, ButtonId, ButtonRow, ControlGrid};
use crate::mode::{ModeContext, ModeId, ModeManager};
use crate::scheduler::{ScheduledTask, Scheduler};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Identifier of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    Control,
    Play,
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewId::Control => write!(f, "Control"),
            ViewId::Play => write!(f, "Play"),
        }
    }
}

/// Button LED state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedState {
    #[default]
    Off,
    On,
    Hilite,
}

impl LedState {
    pub fn from_bool(on: bool) -> Self {
        if on {
            LedState::On
        } else {
            LedState::Off
        }
    }
}

/// Everything a view handler may read or change
pub struct SurfaceContext<'a> {
    pub model: &'a DawModel,
    pub grid: &'a ControlGrid,
    pub settings: &'a mut SurfaceSettings,
    pub modes: &'a mut ModeManager,
    pub display: &'a mut dyn TextDisplay,
    pub scheduler: &'a dyn Scheduler,
    view_request: Option<ViewId>,
}

impl<'a> SurfaceContext<'a> {
    pub fn new(
        model: &'a DawModel,
        grid: &'a ControlGrid,
        settings: &'a mut SurfaceSettings,
        modes: &'a mut ModeManager,
        display: &'a mut dyn TextDisplay,
        scheduler: &'a dyn Scheduler,
    ) -> Self {
        Self {
            model,
            grid,
            settings,
            modes,
            display,
            scheduler,
            view_request: None,
        }
    }

    /// Ask for a view switch once the current handler returns
    pub fn request_view(&mut self, id: ViewId) {
        self.view_request = Some(id);
    }

    pub fn take_view_request(&mut self) -> Option<ViewId> {
        self.view_request.take()
    }

    /// Activate a mode, closing an open browser overlay first
    pub fn set_mode(&mut self, id: ModeId) {
        if id != ModeId::Browser {
            self.dismiss_browser();
        }
        self.modes.set_active_mode(id);
    }

    /// Drop the browser overlay without committing
    pub fn dismiss_browser(&mut self) {
        if self.modes.temporary_mode_id() != Some(ModeId::Browser) {
            return;
        }
        if self.model.browser.is_active() {
            self.model.browser.close(false);
        }
        self.modes.clear_temporary_mode();
    }

    /// Route a row button to the overlay mode under it
    pub fn forward_to_mode(&mut self, id: ModeId, row: ButtonRow, index: usize, event: ButtonEvent) {
        let mode_ctx = ModeContext {
            model: self.model,
            grid: self.grid,
            settings: &*self.settings,
        };
        let request = self
            .modes
            .mode_mut(id)
            .and_then(|mode| mode.as_mode_mut().on_button(row, index, event, &mode_ctx));
        if let Some(request) = request {
            debug!("{} requested {:?}", id, request);
            self.modes.apply(request);
        }
    }
}

/// Read-only state for LED resolution
pub struct LedContext<'a> {
    pub model: &'a DawModel,
    pub modes: &'a ModeManager,
    pub settings: &'a SurfaceSettings,
}

/// Behavior bound to the button and pad portion of the grid
pub trait View: Send {
    fn id(&self) -> ViewId;

    fn on_activate(&mut self) {}

    /// Called when the view loses routing; held buttons are released
    fn on_deactivate(&mut self) {}

    /// Button `index` of one of the five rows
    fn on_button_row(&mut self, row: ButtonRow, index: usize, event: ButtonEvent, ctx: &mut SurfaceContext<'_>);

    /// Row-select button `number` (1-7) pressed
    fn on_row_select(&mut self, number: u8, ctx: &mut SurfaceContext<'_>) {
        select_row(number, ctx);
    }

    /// P1 rocker
    fn on_p1(&mut self, up: bool, event: ButtonEvent, ctx: &mut SurfaceContext<'_>);

    fn on_grid_note(&mut self, note: u8, velocity: u8, ctx: &mut SurfaceContext<'_>);

    /// A task this view scheduled came due
    fn on_scheduled(&mut self, _task: &ScheduledTask, _ctx: &mut SurfaceContext<'_>) {}

    fn button_led(&self, button: ButtonId, ctx: &LedContext<'_>) -> LedState;

    /// Period of repeat-while-held buttons
    fn set_repeat_period(&mut self, _period: Duration) {}

    /// Route a button edge to the matching handler
    fn on_button(&mut self, button: ButtonId, event: ButtonEvent, ctx: &mut SurfaceContext<'_>) {
        match button {
            ButtonId::Row { row, index } => self.on_button_row(row, index as usize, event, ctx),
            ButtonId::RowSelect(number) => {
                if event.is_down() {
                    self.on_row_select(number, ctx);
                }
            },
            ButtonId::P1Up => self.on_p1(true, event, ctx),
            ButtonId::P1Down => self.on_p1(false, event, ctx),
        }
    }
}

/// Row-select behavior shared by all views
///
/// - 1: Functions, or Fixed when Functions is showing
/// - 2: device parameters
/// - 3: Track Details, or Frame when Track Details is showing
/// - 4: Track, or Master when the master track is selected
/// - 6: Volume
/// - 7: view selection
pub fn select_row(number: u8, ctx: &mut SurfaceContext<'_>) {
    let current = ctx.modes.active_or_temp_mode_id();
    match number {
        1 => {
            let select_fixed = current == ModeId::Functions;
            ctx.set_mode(if select_fixed { ModeId::Fixed } else { ModeId::Functions });
            ctx.model
                .host
                .show_notification(if select_fixed { "Fixed Length" } else { "Functions" });
        },
        2 => ctx.set_mode(ModeId::DeviceParams),
        3 => {
            let select_frame = current == ModeId::TrackDetails;
            ctx.set_mode(if select_frame { ModeId::Frame } else { ModeId::TrackDetails });
            ctx.model.host.show_notification(if select_frame {
                "Layouts & Panels"
            } else {
                "Track & Device"
            });
        },
        4 => {
            let id = if ctx.model.tracks.is_master_selected() {
                ModeId::Master
            } else {
                ModeId::Track
            };
            ctx.set_mode(id);
        },
        6 => ctx.set_mode(ModeId::Volume),
        7 => ctx.set_mode(ModeId::ViewSelect),
        _ => debug!("Row select {} has no function", number),
    }
}

/// Registered views and the active one
pub struct ViewManager {
    views: HashMap<ViewId, Box<dyn View>>,
    active: ViewId,
}

impl ViewManager {
    pub fn new(active: ViewId) -> Self {
        Self {
            views: HashMap::new(),
            active,
        }
    }

    pub fn register(&mut self, view: Box<dyn View>) {
        self.views.insert(view.id(), view);
    }

    pub fn active_view_id(&self) -> ViewId {
        self.active
    }

    pub fn active(&self) -> Option<&dyn View> {
        self.views.get(&self.active).map(|v| v.as_ref())
    }

    pub fn active_mut(&mut self) -> Option<&mut (dyn View + 'static)> {
        self.views.get_mut(&self.active).map(|v| v.as_mut())
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut (dyn View + 'static)> {
        self.views.get_mut(&id).map(|v| v.as_mut())
    }

    /// Switch views; no-op when `id` is already active
    pub fn set_active_view(&mut self, id: ViewId) {
        if id == self.active {
            return;
        }
        if !self.views.contains_key(&id) {
            warn!("⚠️  View {} is not registered", id);
            return;
        }
        if let Some(view) = self.views.get_mut(&self.active) {
            view.on_deactivate();
        }
        self.active = id;
        if let Some(view) = self.views.get_mut(&id) {
            view.on_activate();
        }
        info!("🧭 View: {}", id);
    }

    /// Update the repeat period of every view
    pub fn set_repeat_period(&mut self, period: Duration) {
        for view in self.views.values_mut() {
            view.set_repeat_period(period);
        }
    }
}

/// Control and Play views, Control active
pub fn default_views(repeat_period: Duration) -> ViewManager {
    let mut views = ViewManager::new(ViewId::Control);
    views.register(Box::new(ControlView::new(repeat_period)));
    views.register(Box::new(PlayView::new(repeat_period)));
    views
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_switch() {
        let mut views = default_views(Duration::from_millis(200));
        assert_eq!(views.active_view_id(), ViewId::Control);

        views.set_active_view(ViewId::Play);
        assert_eq!(views.active_view_id(), ViewId::Play);
        assert_eq!(views.active().map(|v| v.id()), Some(ViewId::Play));
    }

    #[test]
    fn test_unregistered_view_is_ignored() {
        let mut views = ViewManager::new(ViewId::Control);

        views.set_active_view(ViewId::Play);

        assert_eq!(views.active_view_id(), ViewId::Control);
        assert!(views.active().is_none());
    }

    #[test]
    fn test_led_state_json() {
        assert_eq!(serde_json::to_string(&LedState::Hilite).unwrap(), "\"hilite\"");
        assert_eq!(LedState::default(), LedState::Off);
        assert_eq!(LedState::from_bool(true), LedState::On);
    }
}

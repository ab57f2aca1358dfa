//! Surface controller - routes hardware events to modes and views
//!
//! One controller instance owns all surface state for one device:
//! - The shared control grid and the DAW collaborators
//! - Mode manager (knobs, display) and view manager (buttons, pads)
//! - Runtime settings and the display driver
//!
//! Events are handled one at a time, in arrival order. Scheduled ticks come
//! back through the same entry points, so their ordering with button events
//! is deterministic.

mod input;
mod refresh;

pub use refresh::RefreshFrame;


use crate::config::{SurfaceConfig, SurfaceSettings};
use crate::daw::DawModel;
use crate::display::{CellBuffer, TextDisplay};
use crate::grid::{ButtonEvent, ButtonId, ControlGrid};
use crate::mode::{default_modes, ModeId, ModeManager};
use crate::platform::Platform;
use crate::scheduler::{ScheduledTask, Scheduler};
use crate::view::{default_views, ViewId, ViewManager};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Input delivered to the controller's event loop
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Button { id: ButtonId, event: ButtonEvent },
    KnobTouch { index: usize, touched: bool },
    KnobTurn { index: usize, delta: i32 },
    GridNote { note: u8, velocity: u8 },
    Scheduled(ScheduledTask),
    /// Repaint LEDs and display
    Refresh,
    /// New runtime settings from a configuration reload
    Reload(SurfaceSettings),
}

/// Snapshot of the routing state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerStatus {
    pub mode: ModeId,
    pub active_mode: ModeId,
    pub previous_mode: Option<ModeId>,
    pub temporary_mode: Option<ModeId>,
    pub view: ViewId,
    pub platform: Platform,
    pub settings: SurfaceSettings,
}

/// Mode/view dispatch core for one surface
pub struct SurfaceController<D: TextDisplay = CellBuffer> {
    pub(crate) grid: Arc<ControlGrid>,
    pub(crate) model: DawModel,
    pub(crate) settings: SurfaceSettings,
    pub(crate) modes: ModeManager,
    pub(crate) views: ViewManager,
    pub(crate) display: D,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) platform: Platform,
}

impl SurfaceController<CellBuffer> {
    /// Controller painting into an in-memory cell buffer
    pub fn with_cell_buffer(config: &SurfaceConfig, model: DawModel, scheduler: Arc<dyn Scheduler>) -> Self {
        let grid = Arc::new(ControlGrid::new(&config.grid));
        let display = CellBuffer::new(&grid);
        Self::with_grid(grid, config, model, display, scheduler)
    }
}

impl<D: TextDisplay> SurfaceController<D> {
    pub fn new(config: &SurfaceConfig, model: DawModel, display: D, scheduler: Arc<dyn Scheduler>) -> Self {
        let grid = Arc::new(ControlGrid::new(&config.grid));
        Self::with_grid(grid, config, model, display, scheduler)
    }

    /// Build on an existing grid (shared with the display driver)
    pub fn with_grid(
        grid: Arc<ControlGrid>,
        config: &SurfaceConfig,
        model: DawModel,
        display: D,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let platform = config.platform.unwrap_or_else(Platform::detect);
        let repeat_period = Duration::from_millis(config.settings.repeat_ms);
        let modes = default_modes(&grid, config.initial_mode);
        let views = default_views(repeat_period);

        info!(
            "🎛️  Surface ready: {} knobs, {}x{} display, platform {}, mode {}",
            grid.knob_count(),
            grid.display_rows(),
            grid.display_columns(),
            platform,
            modes.active_mode_id()
        );

        Self {
            grid,
            model,
            settings: config.settings.clone(),
            modes,
            views,
            display,
            scheduler,
            platform,
        }
    }

    pub fn grid(&self) -> &Arc<ControlGrid> {
        &self.grid
    }

    pub fn model(&self) -> &DawModel {
        &self.model
    }

    pub fn settings(&self) -> &SurfaceSettings {
        &self.settings
    }

    pub fn modes(&self) -> &ModeManager {
        &self.modes
    }

    pub fn views(&self) -> &ViewManager {
        &self.views
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Mode that currently receives knobs and paints the display
    pub fn mode_id(&self) -> ModeId {
        self.modes.active_or_temp_mode_id()
    }

    pub fn view_id(&self) -> ViewId {
        self.views.active_view_id()
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            mode: self.modes.active_or_temp_mode_id(),
            active_mode: self.modes.active_mode_id(),
            previous_mode: self.modes.previous_mode_id(),
            temporary_mode: self.modes.temporary_mode_id(),
            view: self.views.active_view_id(),
            platform: self.platform,
            settings: self.settings.clone(),
        }
    }

    /// Replace the runtime settings (configuration hot reload)
    pub fn apply_settings(&mut self, settings: SurfaceSettings) {
        if settings == self.settings {
            return;
        }
        info!(
            "🔄 Settings updated: clip length {}, drum pads as mode selection {}, repeat {} ms",
            settings.new_clip_length, settings.drumpads_as_mode_selection, settings.repeat_ms
        );
        self.views
            .set_repeat_period(Duration::from_millis(settings.repeat_ms));
        self.settings = settings;
    }

    /// Handle one event; a refresh returns the repainted frame
    pub fn handle(&mut self, event: SurfaceEvent) -> Option<RefreshFrame> {
        match event {
            SurfaceEvent::Button { id, event } => self.on_button(id, event),
            SurfaceEvent::KnobTouch { index, touched } => self.on_knob_touch(index, touched),
            SurfaceEvent::KnobTurn { index, delta } => self.on_knob_value(index, delta),
            SurfaceEvent::GridNote { note, velocity } => self.on_grid_note(note, velocity),
            SurfaceEvent::Scheduled(task) => self.on_scheduled(task),
            SurfaceEvent::Refresh => return Some(self.refresh()),
            SurfaceEvent::Reload(settings) => self.apply_settings(settings),
        }
        None
    }
}

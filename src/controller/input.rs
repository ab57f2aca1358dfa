//! Hardware input routing
//!
//! Knob events go to the active-or-temporary mode, everything else to the
//! active view (scheduled ticks to the view that armed them).

use super::SurfaceController;
use crate::display::TextDisplay;
use crate::grid::{ButtonEvent, ButtonId};
use crate::mode::ModeContext;
use crate::scheduler::ScheduledTask;
use crate::view::{SurfaceContext, View, ViewId};
use tracing::{debug, trace, warn};

impl<D: TextDisplay> SurfaceController<D> {
    /// Button edge from the grid
    pub fn on_button(&mut self, id: ButtonId, event: ButtonEvent) {
        if !self.grid.contains(id) {
            warn!("Button {} is not part of the grid", id);
            return;
        }
        debug!("Button {} {:?} (mode {})", id, event, self.modes.active_or_temp_mode_id());
        self.dispatch_view(None, |view, ctx| view.on_button(id, event, ctx));
    }

    /// Knob touched or released
    pub fn on_knob_touch(&mut self, index: usize, touched: bool) {
        if let Some(mode) = self.modes.active_or_temp_mode_mut() {
            mode.on_knob_touch(index, touched);
        }
    }

    /// Knob turned by `delta` steps
    pub fn on_knob_value(&mut self, index: usize, delta: i32) {
        let ctx = ModeContext {
            model: &self.model,
            grid: &self.grid,
            settings: &self.settings,
        };
        match self.modes.active_or_temp_mode_mut() {
            Some(mode) => mode.on_knob_value(index, delta, &ctx),
            None => trace!("No mode for knob {}", index),
        }
    }

    /// Note from the pad grid
    pub fn on_grid_note(&mut self, note: u8, velocity: u8) {
        self.dispatch_view(None, |view, ctx| view.on_grid_note(note, velocity, ctx));
    }

    /// A scheduled task came due; delivered to the view that armed it
    pub fn on_scheduled(&mut self, task: ScheduledTask) {
        trace!("Tick {:?} for {}", task.kind, task.owner);
        self.dispatch_view(Some(task.owner), |view, ctx| view.on_scheduled(&task, ctx));
    }

    /// Run `f` on a view (the active one by default), then apply any view
    /// switch it requested
    fn dispatch_view(&mut self, target: Option<ViewId>, f: impl FnOnce(&mut dyn View, &mut SurfaceContext<'_>)) {
        let Self {
            grid,
            model,
            settings,
            modes,
            views,
            display,
            scheduler,
            ..
        } = self;

        let target = target.unwrap_or_else(|| views.active_view_id());
        let Some(view) = views.get_mut(target) else {
            warn!("⚠️  View {} is not registered", target);
            return;
        };

        let mut ctx = SurfaceContext::new(model, grid, settings, modes, display, scheduler.as_ref());
        f(view, &mut ctx);

        if let Some(requested) = ctx.take_view_request() {
            views.set_active_view(requested);
        }
    }
}

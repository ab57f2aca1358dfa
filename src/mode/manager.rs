//! Mode manager
//!
//! Holds the active mode, one level of history and an optional temporary
//! overlay. Routing always goes through `active_or_temp_mode_id` so an
//! overlay transparently intercepts knobs, display and overlay rows.

use super::{DeviceParamsMode, DevicePresetsMode, Mode, ModeId, ModeRequest, ModeSlot};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub struct ModeManager {
    modes: HashMap<ModeId, ModeSlot>,
    active: ModeId,
    previous: Option<ModeId>,
    temporary: Option<ModeId>,
}

impl ModeManager {
    pub fn new(initial: ModeId) -> Self {
        Self {
            modes: HashMap::new(),
            active: initial,
            previous: None,
            temporary: None,
        }
    }

    /// Install a mode under `id`, replacing an earlier registration
    pub fn register(&mut self, id: ModeId, mode: ModeSlot) {
        self.modes.insert(id, mode);
    }

    pub fn is_registered(&self, id: ModeId) -> bool {
        self.modes.contains_key(&id)
    }

    pub fn active_mode_id(&self) -> ModeId {
        self.active
    }

    pub fn previous_mode_id(&self) -> Option<ModeId> {
        self.previous
    }

    pub fn temporary_mode_id(&self) -> Option<ModeId> {
        self.temporary
    }

    /// The overlay if one is set, otherwise the active mode
    pub fn active_or_temp_mode_id(&self) -> ModeId {
        self.temporary.unwrap_or(self.active)
    }

    pub fn is_active_or_temp(&self, id: ModeId) -> bool {
        self.active_or_temp_mode_id() == id
    }

    pub fn mode(&self, id: ModeId) -> Option<&ModeSlot> {
        self.modes.get(&id)
    }

    pub fn mode_mut(&mut self, id: ModeId) -> Option<&mut ModeSlot> {
        self.modes.get_mut(&id)
    }

    pub fn active_or_temp_mode(&self) -> Option<&dyn Mode> {
        self.mode(self.active_or_temp_mode_id()).map(ModeSlot::as_mode)
    }

    pub fn active_or_temp_mode_mut(&mut self) -> Option<&mut dyn Mode> {
        let id = self.active_or_temp_mode_id();
        self.mode_mut(id).map(ModeSlot::as_mode_mut)
    }

    pub fn device_params_mut(&mut self) -> Option<&mut DeviceParamsMode> {
        match self.modes.get_mut(&ModeId::DeviceParams) {
            Some(ModeSlot::DeviceParams(mode)) => Some(mode),
            _ => None,
        }
    }

    pub fn presets(&self) -> Option<&DevicePresetsMode> {
        match self.modes.get(&ModeId::Browser) {
            Some(ModeSlot::Presets(mode)) => Some(mode),
            _ => None,
        }
    }

    /// Activate `id`
    ///
    /// No-op when `id` is already the active mode. Otherwise the outgoing
    /// modes (overlay and active) are deactivated, the active one becomes the
    /// previous mode and the overlay is dropped.
    pub fn set_active_mode(&mut self, id: ModeId) {
        if id == self.active {
            return;
        }
        if !self.is_registered(id) {
            warn!("⚠️  Mode {} is not registered", id);
            return;
        }

        if let Some(temporary) = self.temporary.take() {
            self.deactivate(temporary);
        }
        self.deactivate(self.active);
        self.previous = Some(self.active);
        self.active = id;
        self.activate(id);
        info!("🎚️  Mode: {}", id);
    }

    /// Swap the previous mode back in; does nothing without history
    pub fn restore_mode(&mut self) {
        let Some(previous) = self.previous.take() else {
            debug!("No previous mode to restore");
            return;
        };

        if let Some(temporary) = self.temporary.take() {
            self.deactivate(temporary);
        }
        self.deactivate(self.active);
        self.active = previous;
        self.activate(previous);
        info!("🎚️  Mode restored: {}", previous);
    }

    /// Overlay `id` on top of the active mode without touching the history
    pub fn set_temporary_mode(&mut self, id: ModeId) {
        if self.temporary == Some(id) {
            return;
        }
        if !self.is_registered(id) {
            warn!("⚠️  Mode {} is not registered", id);
            return;
        }
        if let Some(temporary) = self.temporary.take() {
            self.deactivate(temporary);
        }
        self.temporary = Some(id);
        self.activate(id);
        info!("🎚️  Temporary mode: {}", id);
    }

    pub fn clear_temporary_mode(&mut self) {
        if let Some(temporary) = self.temporary.take() {
            self.deactivate(temporary);
            info!("🎚️  Temporary mode {} cleared", temporary);
        }
    }

    /// Carry out a request returned by a mode handler
    pub fn apply(&mut self, request: ModeRequest) {
        match request {
            ModeRequest::Restore => self.restore_mode(),
            ModeRequest::Dismiss => self.clear_temporary_mode(),
            ModeRequest::Activate(id) => self.set_active_mode(id),
        }
    }

    fn activate(&mut self, id: ModeId) {
        if let Some(mode) = self.modes.get_mut(&id) {
            mode.as_mode_mut().on_activate();
        }
    }

    fn deactivate(&mut self, id: ModeId) {
        if let Some(mode) = self.modes.get_mut(&id) {
            mode.as_mode_mut().on_deactivate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::grid::ControlGrid;
    use crate::mode::default_modes;

    fn make_test_manager() -> ModeManager {
        default_modes(&ControlGrid::new(&GridConfig::default()), ModeId::Volume)
    }

    #[test]
    fn test_set_active_records_previous() {
        let mut modes = make_test_manager();

        modes.set_active_mode(ModeId::Functions);

        assert_eq!(modes.active_mode_id(), ModeId::Functions);
        assert_eq!(modes.previous_mode_id(), Some(ModeId::Volume));
    }

    #[test]
    fn test_set_same_mode_is_noop() {
        let mut modes = make_test_manager();
        modes.set_active_mode(ModeId::Functions);

        modes.set_active_mode(ModeId::Functions);

        assert_eq!(modes.previous_mode_id(), Some(ModeId::Volume));
    }

    #[test]
    fn test_restore_is_idempotent() {
        let mut modes = make_test_manager();
        modes.set_active_mode(ModeId::Pan);
        modes.set_active_mode(ModeId::Functions);

        modes.restore_mode();
        assert_eq!(modes.active_mode_id(), ModeId::Pan);

        modes.restore_mode();
        assert_eq!(modes.active_mode_id(), ModeId::Pan);
        assert_eq!(modes.previous_mode_id(), None);
    }

    #[test]
    fn test_restore_without_history() {
        let mut modes = make_test_manager();

        modes.restore_mode();

        assert_eq!(modes.active_mode_id(), ModeId::Volume);
    }

    #[test]
    fn test_temporary_takes_precedence() {
        let mut modes = make_test_manager();
        modes.set_active_mode(ModeId::TrackDetails);

        modes.set_temporary_mode(ModeId::Browser);

        assert_eq!(modes.active_or_temp_mode_id(), ModeId::Browser);
        assert_eq!(modes.active_mode_id(), ModeId::TrackDetails);
        assert_eq!(modes.previous_mode_id(), Some(ModeId::Volume));

        modes.clear_temporary_mode();
        assert_eq!(modes.active_or_temp_mode_id(), ModeId::TrackDetails);
    }

    #[test]
    fn test_set_active_drops_overlay() {
        let mut modes = make_test_manager();
        modes.set_temporary_mode(ModeId::Browser);

        modes.set_active_mode(ModeId::DeviceParams);

        assert_eq!(modes.temporary_mode_id(), None);
        assert_eq!(modes.active_or_temp_mode_id(), ModeId::DeviceParams);
    }

    #[test]
    fn test_deactivate_releases_touches() {
        let mut modes = make_test_manager();
        if let Some(mode) = modes.active_or_temp_mode_mut() {
            mode.on_knob_touch(3, true);
        }

        modes.set_active_mode(ModeId::Pan);

        let volume = modes.mode(ModeId::Volume).unwrap().as_mode();
        assert!(!volume.touch_state().is_touched(3));
    }

    #[test]
    fn test_unregistered_mode_is_ignored() {
        let mut modes = ModeManager::new(ModeId::Volume);

        modes.set_active_mode(ModeId::Pan);
        modes.set_temporary_mode(ModeId::Browser);

        assert_eq!(modes.active_or_temp_mode_id(), ModeId::Volume);
        assert!(modes.presets().is_none());
    }

    #[test]
    fn test_apply_requests() {
        let mut modes = make_test_manager();
        modes.apply(ModeRequest::Activate(ModeId::Frame));
        modes.set_temporary_mode(ModeId::Browser);

        modes.apply(ModeRequest::Dismiss);
        assert_eq!(modes.active_or_temp_mode_id(), ModeId::Frame);

        modes.apply(ModeRequest::Restore);
        assert_eq!(modes.active_or_temp_mode_id(), ModeId::Volume);
    }
}

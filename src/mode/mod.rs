//! Modes: swappable behaviors bound to the knobs and the display
//!
//! Every mode owns its knob touch state and paints the display from DAW
//! snapshots. The closed set of modes is stored as a tagged `ModeSlot` so
//! callers that need a concrete mode (device pages, browser selection) match
//! on it instead of downcasting.

pub mod device;
pub mod frame;
pub mod labels;
pub mod manager;
pub mod presets;
pub mod track;

pub use device::DeviceParamsMode;
pub use frame::FrameMode;
pub use labels::{LabelContent, LabelMode};
pub use manager::ModeManager;
pub use presets::{DevicePresetsMode, SelectionMode};
pub use track::{TrackParameter, TrackParameterMode};

use crate::config::SurfaceSettings;
use crate::daw::DawModel;
use crate::display::TextDisplay;
use crate::grid::{ButtonEvent, ButtonRow, ControlGrid};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a mode
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ModeId {
    #[default]
    Volume,
    Pan,
    Track,
    Master,
    TrackDetails,
    Frame,
    Browser,
    DeviceParams,
    Functions,
    Fixed,
    Session,
    ViewSelect,
}

impl ModeId {
    pub const ALL: [ModeId; 12] = [
        ModeId::Volume,
        ModeId::Pan,
        ModeId::Track,
        ModeId::Master,
        ModeId::TrackDetails,
        ModeId::Frame,
        ModeId::Browser,
        ModeId::DeviceParams,
        ModeId::Functions,
        ModeId::Fixed,
        ModeId::Session,
        ModeId::ViewSelect,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModeId::Volume => "Volume",
            ModeId::Pan => "Pan",
            ModeId::Track => "Track",
            ModeId::Master => "Master",
            ModeId::TrackDetails => "Track Details",
            ModeId::Frame => "Frame",
            ModeId::Browser => "Browser",
            ModeId::DeviceParams => "Device Parameters",
            ModeId::Functions => "Functions",
            ModeId::Fixed => "Fixed Length",
            ModeId::Session => "Session",
            ModeId::ViewSelect => "View Select",
        }
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Touch flag per physical knob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnobTouchState {
    touched: Vec<bool>,
}

impl KnobTouchState {
    /// Sized to the number of physical knobs
    pub fn new(knobs: usize) -> Self {
        Self {
            touched: vec![false; knobs],
        }
    }

    /// Record a touch; returns false when the knob does not exist
    pub fn set(&mut self, index: usize, touched: bool) -> bool {
        match self.touched.get_mut(index) {
            Some(flag) => {
                *flag = touched;
                true
            },
            None => false,
        }
    }

    pub fn is_touched(&self, index: usize) -> bool {
        self.touched.get(index).copied().unwrap_or(false)
    }

    pub fn release_all(&mut self) {
        self.touched.iter_mut().for_each(|flag| *flag = false);
    }

    pub fn len(&self) -> usize {
        self.touched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.touched
    }
}

/// Read-only state handed to mode callbacks
pub struct ModeContext<'a> {
    pub model: &'a DawModel,
    pub grid: &'a ControlGrid,
    pub settings: &'a SurfaceSettings,
}

/// Mode change asked for by a mode's button handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeRequest {
    /// Go back to the previous mode
    Restore,
    /// Drop the temporary overlay
    Dismiss,
    Activate(ModeId),
}

/// Behavior bound to the knob and display portion of the grid
pub trait Mode: Send {
    fn id(&self) -> ModeId;

    fn touch_state(&self) -> &KnobTouchState;

    fn touch_state_mut(&mut self) -> &mut KnobTouchState;

    fn on_activate(&mut self) {}

    /// Called when the mode loses routing; pending touches are released
    fn on_deactivate(&mut self) {
        self.touch_state_mut().release_all();
    }

    /// Record a knob touch; indices beyond the physical knobs are ignored
    fn on_knob_touch(&mut self, index: usize, touched: bool) {
        if !self.touch_state_mut().set(index, touched) {
            tracing::trace!("{}: touch on knob {} ignored", self.id(), index);
        }
    }

    /// Whether a turn of `index` should be applied
    ///
    /// Touch-sensitive grids only apply turns while the knob is touched.
    fn accepts_turn(&self, index: usize, grid: &ControlGrid) -> bool {
        let touch = self.touch_state();
        index < touch.len() && (!grid.is_touch_sensitive() || touch.is_touched(index))
    }

    /// Knob turn by `delta` steps
    fn on_knob_value(&mut self, _index: usize, _delta: i32, _ctx: &ModeContext<'_>) {}

    /// Row button routed to an overlay mode
    fn on_button(
        &mut self,
        _row: ButtonRow,
        _index: usize,
        _event: ButtonEvent,
        _ctx: &ModeContext<'_>,
    ) -> Option<ModeRequest> {
        None
    }

    /// Paint the display; ends with exactly one `all_done`
    fn update_display(&self, ctx: &ModeContext<'_>, display: &mut dyn TextDisplay);
}

/// A registered mode
pub enum ModeSlot {
    TrackParameter(TrackParameterMode),
    DeviceParams(DeviceParamsMode),
    Presets(DevicePresetsMode),
    Frame(FrameMode),
    Labels(LabelMode),
}

impl ModeSlot {
    pub fn as_mode(&self) -> &dyn Mode {
        match self {
            ModeSlot::TrackParameter(mode) => mode,
            ModeSlot::DeviceParams(mode) => mode,
            ModeSlot::Presets(mode) => mode,
            ModeSlot::Frame(mode) => mode,
            ModeSlot::Labels(mode) => mode,
        }
    }

    pub fn as_mode_mut(&mut self) -> &mut dyn Mode {
        match self {
            ModeSlot::TrackParameter(mode) => mode,
            ModeSlot::DeviceParams(mode) => mode,
            ModeSlot::Presets(mode) => mode,
            ModeSlot::Frame(mode) => mode,
            ModeSlot::Labels(mode) => mode,
        }
    }
}

/// Build a manager with every mode of the surface registered
pub fn default_modes(grid: &ControlGrid, initial: ModeId) -> ModeManager {
    let knobs = grid.knob_count();
    let mut manager = ModeManager::new(initial);
    for id in ModeId::ALL {
        let slot = match id {
            ModeId::Volume => {
                ModeSlot::TrackParameter(TrackParameterMode::new(TrackParameter::Volume, knobs))
            },
            ModeId::Pan => {
                ModeSlot::TrackParameter(TrackParameterMode::new(TrackParameter::Pan, knobs))
            },
            ModeId::DeviceParams => ModeSlot::DeviceParams(DeviceParamsMode::new(knobs)),
            ModeId::Browser => ModeSlot::Presets(DevicePresetsMode::new(knobs)),
            ModeId::Frame => ModeSlot::Frame(FrameMode::new(knobs)),
            ModeId::Track => ModeSlot::Labels(LabelMode::new(id, LabelContent::SelectedTrack, knobs)),
            ModeId::Master => ModeSlot::Labels(LabelMode::new(id, LabelContent::Master, knobs)),
            ModeId::TrackDetails => {
                ModeSlot::Labels(LabelMode::new(id, LabelContent::TrackDetails, knobs))
            },
            ModeId::Functions => ModeSlot::Labels(LabelMode::new(id, LabelContent::Functions, knobs)),
            ModeId::Fixed => ModeSlot::Labels(LabelMode::new(id, LabelContent::ClipLength, knobs)),
            ModeId::Session => ModeSlot::Labels(LabelMode::new(id, LabelContent::Session, knobs)),
            ModeId::ViewSelect => {
                ModeSlot::Labels(LabelMode::new(id, LabelContent::ViewSelect, knobs))
            },
        };
        manager.register(id, slot);
    }
    manager
}

/// Fit a name into `length` ASCII characters
///
/// Non-ASCII characters become `?`. Overlong names first lose spaces, then
/// lowercase vowels (both from the end, never the first character), and are
/// finally cut.
pub fn shorten_and_fix_ascii(text: &str, length: usize) -> String {
    let mut chars: Vec<char> = text
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect();

    for removable in [&[' '][..], &['a', 'e', 'i', 'o', 'u'][..]] {
        let mut i = chars.len();
        while chars.len() > length && i > 1 {
            i -= 1;
            if removable.contains(&chars[i]) {
                chars.remove(i);
            }
        }
    }

    chars.into_iter().take(length).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    #[test]
    fn test_shorten_and_fix_ascii() {
        assert_eq!(shorten_and_fix_ascii("Bass", 6), "Bass");
        assert_eq!(shorten_and_fix_ascii("Lead Synth", 6), "LdSynt");
        assert_eq!(shorten_and_fix_ascii("Drums 2", 6), "Drums2");
        assert_eq!(shorten_and_fix_ascii("Ambience", 6), "Ambinc");
        assert_eq!(shorten_and_fix_ascii("Bäss", 6), "B?ss");
        assert_eq!(shorten_and_fix_ascii("", 6), "");
    }

    #[test]
    fn test_touch_state_bounds() {
        let mut touch = KnobTouchState::new(8);

        assert!(touch.set(7, true));
        assert!(!touch.set(8, true));
        assert!(touch.is_touched(7));
        assert!(!touch.is_touched(8));

        touch.release_all();
        assert!(!touch.is_touched(7));
    }

    #[test]
    fn test_default_modes_registers_all() {
        let grid = ControlGrid::new(&GridConfig::default());
        let manager = default_modes(&grid, ModeId::Pan);

        assert_eq!(manager.active_mode_id(), ModeId::Pan);
        for id in ModeId::ALL {
            let mode = manager.mode(id).unwrap().as_mode();
            assert_eq!(mode.id(), id);
            assert_eq!(mode.touch_state().len(), 8);
        }
    }

    #[test]
    fn test_mode_id_serde() {
        let id: ModeId = serde_yaml::from_str("track_details").unwrap();
        assert_eq!(id, ModeId::TrackDetails);
        assert_eq!(ModeId::default(), ModeId::Volume);
    }
}

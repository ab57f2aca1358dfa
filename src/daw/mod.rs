//! DAW collaborator interfaces
//!
//! The surface never owns DAW state. Modes and views read snapshots and issue
//! commands through these capability traits, which the host implements (or
//! which `SimulatedDaw` fakes for the console host and tests).
//!
//! Note: All methods take &self so the capabilities can be shared as
//! `Arc<dyn Trait>`. Implementations use interior mutability.

pub mod simulated;

pub use simulated::SimulatedDaw;

use std::sync::Arc;

/// Snapshot of one track of the current track bank page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackState {
    pub index: usize,
    /// False for empty bank positions
    pub exists: bool,
    pub name: String,
    pub volume: f64,
    pub volume_text: String,
    /// Pan position (0.0 = hard left, 0.5 = center, 1.0 = hard right)
    pub pan: f64,
    pub pan_text: String,
    pub mute: bool,
    pub solo: bool,
    pub rec_arm: bool,
    pub selected: bool,
}

/// Snapshot of one clip launcher slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotState {
    pub index: usize,
    pub has_content: bool,
    pub selected: bool,
}

/// Snapshot of one device parameter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterState {
    pub name: String,
    pub value: f64,
    pub value_text: String,
}

/// Window layouts and panels reachable from the frame overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameCommand {
    ArrangeLayout,
    MixLayout,
    EditLayout,
    NoteEditor,
    AutomationEditor,
    DevicePanel,
    MixerPanel,
    InspectorPanel,
}

impl FrameCommand {
    /// Commands in row-button order
    pub const ALL: [FrameCommand; 8] = [
        FrameCommand::ArrangeLayout,
        FrameCommand::MixLayout,
        FrameCommand::EditLayout,
        FrameCommand::NoteEditor,
        FrameCommand::AutomationEditor,
        FrameCommand::DevicePanel,
        FrameCommand::MixerPanel,
        FrameCommand::InspectorPanel,
    ];

    /// Short display label
    pub fn label(self) -> &'static str {
        match self {
            FrameCommand::ArrangeLayout => "Arrange",
            FrameCommand::MixLayout => "Mix",
            FrameCommand::EditLayout => "Edit",
            FrameCommand::NoteEditor => "NoteEd",
            FrameCommand::AutomationEditor => "Automat",
            FrameCommand::DevicePanel => "Device",
            FrameCommand::MixerPanel => "Mixer",
            FrameCommand::InspectorPanel => "Inspect",
        }
    }
}

/// Transport state and commands
pub trait Transport: Send + Sync {
    fn is_playing(&self) -> bool;
    fn is_loop(&self) -> bool;
    fn is_recording(&self) -> bool;
    fn is_metronome_on(&self) -> bool;
    fn is_writing_arranger_automation(&self) -> bool;
    fn tempo(&self) -> f64;
    fn quarters_per_measure(&self) -> u32;

    /// Toggle between play and pause
    fn play(&self);
    fn stop(&self);
    fn toggle_loop(&self);
    fn record(&self);
    fn rewind(&self);
    fn fast_forward(&self);
    fn toggle_metronome(&self);
    fn tap_tempo(&self);
    /// Change the tempo by one step
    fn change_tempo(&self, increase: bool);
    fn toggle_write_arranger_automation(&self);
}

/// The current page of the track bank plus the master track
pub trait TrackBank: Send + Sync {
    /// Number of tracks on one bank page
    fn page_size(&self) -> usize;
    /// Track at a bank position (`exists == false` when empty)
    fn track(&self, index: usize) -> TrackState;
    fn selected_track(&self) -> Option<TrackState>;
    fn select_track(&self, index: usize);
    fn is_master_selected(&self) -> bool;
    fn toggle_mute(&self, index: usize);
    fn toggle_solo(&self, index: usize);
    fn toggle_rec_arm(&self, index: usize);
    fn change_volume(&self, index: usize, delta: i32);
    fn change_pan(&self, index: usize, delta: i32);
    /// Scroll the bank by one page
    fn scroll_page(&self, forward: bool);
    /// Clip launcher slots of a track (the visible page)
    fn slots(&self, track: usize) -> Vec<SlotState>;
    fn create_note_clip(&self, track: usize, slot: usize, length_in_beats: u32);
}

/// The device under the cursor of the selected track
pub trait CursorDevice: Send + Sync {
    fn exists(&self) -> bool;
    fn name(&self) -> String;
    fn is_enabled(&self) -> bool;
    fn is_window_open(&self) -> bool;
    fn can_select_previous(&self) -> bool;
    fn can_select_next(&self) -> bool;
    fn toggle_enabled(&self);
    fn toggle_window_open(&self);
    fn select_previous(&self);
    fn select_next(&self);
    fn page_count(&self) -> usize;
    fn selected_page(&self) -> usize;
    fn select_page(&self, page: usize);
    /// Parameter of the selected page
    fn parameter(&self, index: usize) -> ParameterState;
    fn change_parameter(&self, index: usize, delta: i32);
}

/// Device and preset browser
pub trait Browser: Send + Sync {
    fn is_active(&self) -> bool;
    /// Open the browser to replace the cursor device
    fn replace_device(&self);
    /// Close the browser, committing the selected result or discarding it
    fn close(&self, commit: bool);
    fn select_previous_result(&self);
    fn select_next_result(&self);
    fn selected_result(&self) -> String;
    fn filter_column_count(&self) -> usize;
    fn filter_column_name(&self, column: usize) -> String;
    fn filter_item(&self, column: usize) -> String;
    fn select_filter_item(&self, column: usize, forward: bool);
}

/// Application-wide editing commands
pub trait Application: Send + Sync {
    fn undo(&self);
    fn redo(&self);
    fn delete_selection(&self);
    fn duplicate(&self);
    fn apply_frame(&self, command: FrameCommand);
}

/// Host notification popups
pub trait Host: Send + Sync {
    fn show_notification(&self, message: &str);
}

/// Note output for pads that are not used as buttons
pub trait NoteOutput: Send + Sync {
    fn send_note(&self, note: u8, velocity: u8);
}

/// Bundle of all DAW capabilities a surface needs
#[derive(Clone)]
pub struct DawModel {
    pub transport: Arc<dyn Transport>,
    pub tracks: Arc<dyn TrackBank>,
    pub device: Arc<dyn CursorDevice>,
    pub browser: Arc<dyn Browser>,
    pub application: Arc<dyn Application>,
    pub host: Arc<dyn Host>,
    pub notes: Arc<dyn NoteOutput>,
}

impl DawModel {
    /// Build a model where one object provides every capability
    pub fn from_shared<D>(daw: Arc<D>) -> Self
    where
        D: Transport + TrackBank + CursorDevice + Browser + Application + Host + NoteOutput + 'static,
    {
        Self {
            transport: daw.clone(),
            tracks: daw.clone(),
            device: daw.clone(),
            browser: daw.clone(),
            application: daw.clone(),
            host: daw.clone(),
            notes: daw,
        }
    }
}

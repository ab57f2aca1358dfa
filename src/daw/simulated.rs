//! Simulated DAW - in-memory model that logs every command
//!
//! This is useful for:
//! - Driving the surface from the console host without a real DAW
//! - Asserting on issued commands in tests
//! - Developing mode and view logic without hardware

use super::{
    Application, Browser, CursorDevice, FrameCommand, Host, NoteOutput, ParameterState,
    SlotState, TrackBank, TrackState, Transport,
};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Slots per track in the clip launcher page
pub const SLOTS_PER_TRACK: usize = 8;

/// Parameters per device page
pub const PARAMETERS_PER_PAGE: usize = 8;

const BROWSER_COLUMNS: [&str; 6] = ["Collect", "Location", "Type", "Category", "Tags", "Creator"];

/// Mutable state of one simulated track
#[derive(Debug, Clone, Default)]
pub struct TrackData {
    pub name: String,
    pub volume: f64,
    pub pan: f64,
    pub mute: bool,
    pub solo: bool,
    pub rec_arm: bool,
    pub slots: [bool; SLOTS_PER_TRACK],
    pub selected_slot: Option<usize>,
}

impl TrackData {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            volume: 0.8,
            pan: 0.5,
            ..Default::default()
        }
    }
}

/// Mutable state of the simulated cursor device
#[derive(Debug, Clone)]
pub struct DeviceData {
    pub name: String,
    pub enabled: bool,
    pub window_open: bool,
    /// Position in the device chain
    pub position: usize,
    pub chain_length: usize,
    pub selected_page: usize,
    /// Parameter values, `PARAMETERS_PER_PAGE` per page
    pub values: Vec<f64>,
}

/// Mutable state of the simulated browser
#[derive(Debug, Clone, Default)]
pub struct BrowserData {
    pub active: bool,
    pub results: Vec<String>,
    pub selected_result: usize,
    pub filter_items: [usize; BROWSER_COLUMNS.len()],
}

/// Full simulated DAW state
#[derive(Debug, Clone)]
pub struct DawState {
    pub playing: bool,
    pub looping: bool,
    pub recording: bool,
    pub metronome: bool,
    pub automation_write: bool,
    pub tempo: f64,
    pub quarters_per_measure: u32,
    pub position: f64,
    /// Track bank page (positions beyond `tracks.len()` are empty)
    pub tracks: Vec<TrackData>,
    pub selected_track: Option<usize>,
    pub master_selected: bool,
    pub bank_offset: usize,
    pub device: Option<DeviceData>,
    pub browser: BrowserData,
}

impl Default for DawState {
    fn default() -> Self {
        Self {
            playing: false,
            looping: false,
            recording: false,
            metronome: false,
            automation_write: false,
            tempo: 120.0,
            quarters_per_measure: 4,
            position: 0.0,
            tracks: Vec::new(),
            selected_track: None,
            master_selected: false,
            bank_offset: 0,
            device: None,
            browser: BrowserData::default(),
        }
    }
}

/// In-memory DAW implementing every collaborator trait
///
/// Every command is logged and appended to an action journal that tests can
/// inspect with `actions()`.
pub struct SimulatedDaw {
    state: Mutex<DawState>,
    actions: Mutex<Vec<String>>,
    notifications: Mutex<Vec<String>>,
    notes: Mutex<Vec<(u8, u8)>>,
}

impl SimulatedDaw {
    pub fn new(state: DawState) -> Self {
        Self {
            state: Mutex::new(state),
            actions: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
            notes: Mutex::new(Vec::new()),
        }
    }

    /// A small session with eight tracks and a three-page device
    pub fn demo() -> Self {
        let names = ["Drums", "Bass", "Keys", "Lead Synth", "Pad", "Vocals", "Guitar", "FX Return"];
        let mut tracks: Vec<TrackData> = names.iter().map(|n| TrackData::named(n)).collect();
        tracks[0].slots = [true, true, false, false, false, false, false, false];
        tracks[1].pan = 0.25;
        tracks[3].pan = 0.8;

        Self::new(DawState {
            tracks,
            selected_track: Some(0),
            device: Some(DeviceData {
                name: "Polysynth".to_string(),
                enabled: true,
                window_open: false,
                position: 0,
                chain_length: 2,
                selected_page: 0,
                values: vec![0.5; PARAMETERS_PER_PAGE * 3],
            }),
            browser: BrowserData {
                results: vec!["Warm Pad".into(), "Glass Keys".into(), "Sub Bass".into()],
                ..Default::default()
            },
            ..Default::default()
        })
    }

    /// Inspect or mutate the state directly
    pub fn with_state<R>(&self, f: impl FnOnce(&mut DawState) -> R) -> R {
        f(&mut self.state.lock())
    }

    /// Journal of all commands issued so far
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().clone()
    }

    /// Number of journal entries starting with `prefix`
    pub fn count_actions(&self, prefix: &str) -> usize {
        self.actions.lock().iter().filter(|a| a.starts_with(prefix)).count()
    }

    pub fn clear_actions(&self) {
        self.actions.lock().clear();
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().clone()
    }

    pub fn sent_notes(&self) -> Vec<(u8, u8)> {
        self.notes.lock().clone()
    }

    fn log_action(&self, action: String) {
        info!(
            "🎛️  [{}] DAW ← {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            action
        );
        self.actions.lock().push(action);
    }

    fn track_mut<R>(&self, index: usize, f: impl FnOnce(&mut TrackData) -> R) -> Option<R> {
        let mut state = self.state.lock();
        state.tracks.get_mut(index).map(f)
    }

    fn device_mut<R>(&self, f: impl FnOnce(&mut DeviceData) -> R) -> Option<R> {
        self.state.lock().device.as_mut().map(f)
    }
}

fn pan_text(pan: f64) -> String {
    let offset = ((pan - 0.5) * 200.0).round() as i32;
    match offset {
        0 => "C".to_string(),
        o if o < 0 => format!("L{}", -o),
        o => format!("R{}", o),
    }
}

fn percent_text(value: f64) -> String {
    format!("{}%", (value * 100.0).round() as i32)
}

fn nudge(value: f64, delta: i32) -> f64 {
    (value + delta as f64 / 128.0).clamp(0.0, 1.0)
}

impl Transport for SimulatedDaw {
    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn is_loop(&self) -> bool {
        self.state.lock().looping
    }

    fn is_recording(&self) -> bool {
        self.state.lock().recording
    }

    fn is_metronome_on(&self) -> bool {
        self.state.lock().metronome
    }

    fn is_writing_arranger_automation(&self) -> bool {
        self.state.lock().automation_write
    }

    fn tempo(&self) -> f64 {
        self.state.lock().tempo
    }

    fn quarters_per_measure(&self) -> u32 {
        self.state.lock().quarters_per_measure
    }

    fn play(&self) {
        let playing = {
            let mut state = self.state.lock();
            state.playing = !state.playing;
            state.playing
        };
        self.log_action(format!("play playing={}", playing));
    }

    fn stop(&self) {
        {
            let mut state = self.state.lock();
            state.playing = false;
            state.recording = false;
        }
        self.log_action("stop".to_string());
    }

    fn toggle_loop(&self) {
        let looping = {
            let mut state = self.state.lock();
            state.looping = !state.looping;
            state.looping
        };
        self.log_action(format!("toggle_loop looping={}", looping));
    }

    fn record(&self) {
        let recording = {
            let mut state = self.state.lock();
            state.recording = !state.recording;
            state.recording
        };
        self.log_action(format!("record recording={}", recording));
    }

    fn rewind(&self) {
        let position = {
            let mut state = self.state.lock();
            state.position = (state.position - 1.0).max(0.0);
            state.position
        };
        self.log_action(format!("rewind position={}", position));
    }

    fn fast_forward(&self) {
        let position = {
            let mut state = self.state.lock();
            state.position += 1.0;
            state.position
        };
        self.log_action(format!("fast_forward position={}", position));
    }

    fn toggle_metronome(&self) {
        let on = {
            let mut state = self.state.lock();
            state.metronome = !state.metronome;
            state.metronome
        };
        self.log_action(format!("toggle_metronome on={}", on));
    }

    fn tap_tempo(&self) {
        self.log_action("tap_tempo".to_string());
    }

    fn change_tempo(&self, increase: bool) {
        let tempo = {
            let mut state = self.state.lock();
            let step = if increase { 1.0 } else { -1.0 };
            state.tempo = (state.tempo + step).clamp(20.0, 666.0);
            state.tempo
        };
        self.log_action(format!("change_tempo increase={} tempo={}", increase, tempo));
    }

    fn toggle_write_arranger_automation(&self) {
        let on = {
            let mut state = self.state.lock();
            state.automation_write = !state.automation_write;
            state.automation_write
        };
        self.log_action(format!("toggle_automation_write on={}", on));
    }
}

impl TrackBank for SimulatedDaw {
    fn page_size(&self) -> usize {
        8
    }

    fn track(&self, index: usize) -> TrackState {
        let state = self.state.lock();
        match state.tracks.get(index) {
            Some(t) => TrackState {
                index,
                exists: true,
                name: t.name.clone(),
                volume: t.volume,
                volume_text: percent_text(t.volume),
                pan: t.pan,
                pan_text: pan_text(t.pan),
                mute: t.mute,
                solo: t.solo,
                rec_arm: t.rec_arm,
                selected: state.selected_track == Some(index),
            },
            None => TrackState {
                index,
                ..Default::default()
            },
        }
    }

    fn selected_track(&self) -> Option<TrackState> {
        let selected = self.state.lock().selected_track?;
        Some(self.track(selected))
    }

    fn select_track(&self, index: usize) {
        {
            let mut state = self.state.lock();
            if index >= state.tracks.len() {
                debug!("Select ignored, no track at {}", index);
                return;
            }
            state.selected_track = Some(index);
            state.master_selected = false;
        }
        self.log_action(format!("select_track {}", index));
    }

    fn is_master_selected(&self) -> bool {
        self.state.lock().master_selected
    }

    fn toggle_mute(&self, index: usize) {
        if let Some(on) = self.track_mut(index, |t| {
            t.mute = !t.mute;
            t.mute
        }) {
            self.log_action(format!("toggle_mute {} on={}", index, on));
        }
    }

    fn toggle_solo(&self, index: usize) {
        if let Some(on) = self.track_mut(index, |t| {
            t.solo = !t.solo;
            t.solo
        }) {
            self.log_action(format!("toggle_solo {} on={}", index, on));
        }
    }

    fn toggle_rec_arm(&self, index: usize) {
        if let Some(on) = self.track_mut(index, |t| {
            t.rec_arm = !t.rec_arm;
            t.rec_arm
        }) {
            self.log_action(format!("toggle_rec_arm {} on={}", index, on));
        }
    }

    fn change_volume(&self, index: usize, delta: i32) {
        if let Some(volume) = self.track_mut(index, |t| {
            t.volume = nudge(t.volume, delta);
            t.volume
        }) {
            self.log_action(format!("change_volume {} volume={:.3}", index, volume));
        }
    }

    fn change_pan(&self, index: usize, delta: i32) {
        if let Some(pan) = self.track_mut(index, |t| {
            t.pan = nudge(t.pan, delta);
            t.pan
        }) {
            self.log_action(format!("change_pan {} pan={:.3}", index, pan));
        }
    }

    fn scroll_page(&self, forward: bool) {
        let offset = {
            let mut state = self.state.lock();
            state.bank_offset = if forward {
                state.bank_offset + 8
            } else {
                state.bank_offset.saturating_sub(8)
            };
            state.bank_offset
        };
        self.log_action(format!("scroll_page offset={}", offset));
    }

    fn slots(&self, track: usize) -> Vec<SlotState> {
        let state = self.state.lock();
        match state.tracks.get(track) {
            Some(t) => t
                .slots
                .iter()
                .enumerate()
                .map(|(index, &has_content)| SlotState {
                    index,
                    has_content,
                    selected: t.selected_slot == Some(index),
                })
                .collect(),
            None => Vec::new(),
        }
    }

    fn create_note_clip(&self, track: usize, slot: usize, length_in_beats: u32) {
        let created = self.track_mut(track, |t| match t.slots.get_mut(slot) {
            Some(content) => {
                *content = true;
                t.selected_slot = Some(slot);
                true
            },
            None => false,
        });
        if created == Some(true) {
            self.log_action(format!(
                "create_note_clip track={} slot={} beats={}",
                track, slot, length_in_beats
            ));
        }
    }
}

impl CursorDevice for SimulatedDaw {
    fn exists(&self) -> bool {
        self.state.lock().device.is_some()
    }

    fn name(&self) -> String {
        self.state
            .lock()
            .device
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_default()
    }

    fn is_enabled(&self) -> bool {
        self.state.lock().device.as_ref().map(|d| d.enabled).unwrap_or(false)
    }

    fn is_window_open(&self) -> bool {
        self.state
            .lock()
            .device
            .as_ref()
            .map(|d| d.window_open)
            .unwrap_or(false)
    }

    fn can_select_previous(&self) -> bool {
        self.state
            .lock()
            .device
            .as_ref()
            .map(|d| d.position > 0)
            .unwrap_or(false)
    }

    fn can_select_next(&self) -> bool {
        self.state
            .lock()
            .device
            .as_ref()
            .map(|d| d.position + 1 < d.chain_length)
            .unwrap_or(false)
    }

    fn toggle_enabled(&self) {
        if let Some(on) = self.device_mut(|d| {
            d.enabled = !d.enabled;
            d.enabled
        }) {
            self.log_action(format!("toggle_device_enabled on={}", on));
        }
    }

    fn toggle_window_open(&self) {
        if let Some(open) = self.device_mut(|d| {
            d.window_open = !d.window_open;
            d.window_open
        }) {
            self.log_action(format!("toggle_device_window open={}", open));
        }
    }

    fn select_previous(&self) {
        if let Some(position) = self.device_mut(|d| {
            d.position = d.position.saturating_sub(1);
            d.position
        }) {
            self.log_action(format!("select_previous_device position={}", position));
        }
    }

    fn select_next(&self) {
        if let Some(position) = self.device_mut(|d| {
            if d.position + 1 < d.chain_length {
                d.position += 1;
            }
            d.position
        }) {
            self.log_action(format!("select_next_device position={}", position));
        }
    }

    fn page_count(&self) -> usize {
        self.state
            .lock()
            .device
            .as_ref()
            .map(|d| d.values.len() / PARAMETERS_PER_PAGE)
            .unwrap_or(0)
    }

    fn selected_page(&self) -> usize {
        self.state
            .lock()
            .device
            .as_ref()
            .map(|d| d.selected_page)
            .unwrap_or(0)
    }

    fn select_page(&self, page: usize) {
        if self.device_mut(|d| d.selected_page = page).is_some() {
            self.log_action(format!("select_parameter_page {}", page));
        }
    }

    fn parameter(&self, index: usize) -> ParameterState {
        let state = self.state.lock();
        let Some(device) = state.device.as_ref() else {
            return ParameterState::default();
        };
        match device.values.get(device.selected_page * PARAMETERS_PER_PAGE + index) {
            Some(&value) if index < PARAMETERS_PER_PAGE => ParameterState {
                name: format!("P{}", device.selected_page * PARAMETERS_PER_PAGE + index + 1),
                value,
                value_text: percent_text(value),
            },
            _ => ParameterState::default(),
        }
    }

    fn change_parameter(&self, index: usize, delta: i32) {
        let changed = self.device_mut(|d| {
            let slot = d.selected_page * PARAMETERS_PER_PAGE + index;
            match d.values.get_mut(slot) {
                Some(v) if index < PARAMETERS_PER_PAGE => {
                    *v = nudge(*v, delta);
                    Some(*v)
                },
                _ => None,
            }
        });
        if let Some(Some(value)) = changed {
            self.log_action(format!("change_parameter {} value={:.3}", index, value));
        }
    }
}

impl Browser for SimulatedDaw {
    fn is_active(&self) -> bool {
        self.state.lock().browser.active
    }

    fn replace_device(&self) {
        self.state.lock().browser.active = true;
        self.log_action("browser_replace_device".to_string());
    }

    fn close(&self, commit: bool) {
        self.state.lock().browser.active = false;
        self.log_action(format!("browser_close commit={}", commit));
    }

    fn select_previous_result(&self) {
        let index = {
            let mut state = self.state.lock();
            state.browser.selected_result = state.browser.selected_result.saturating_sub(1);
            state.browser.selected_result
        };
        self.log_action(format!("browser_previous_result {}", index));
    }

    fn select_next_result(&self) {
        let index = {
            let mut state = self.state.lock();
            let browser = &mut state.browser;
            if browser.selected_result + 1 < browser.results.len() {
                browser.selected_result += 1;
            }
            browser.selected_result
        };
        self.log_action(format!("browser_next_result {}", index));
    }

    fn selected_result(&self) -> String {
        let state = self.state.lock();
        state
            .browser
            .results
            .get(state.browser.selected_result)
            .cloned()
            .unwrap_or_default()
    }

    fn filter_column_count(&self) -> usize {
        BROWSER_COLUMNS.len()
    }

    fn filter_column_name(&self, column: usize) -> String {
        BROWSER_COLUMNS.get(column).map(|s| s.to_string()).unwrap_or_default()
    }

    fn filter_item(&self, column: usize) -> String {
        let state = self.state.lock();
        match state.browser.filter_items.get(column) {
            Some(0) => "Any".to_string(),
            Some(item) => format!("Item {}", item),
            None => String::new(),
        }
    }

    fn select_filter_item(&self, column: usize, forward: bool) {
        let item = {
            let mut state = self.state.lock();
            state.browser.filter_items.get_mut(column).map(|item| {
                *item = if forward { *item + 1 } else { item.saturating_sub(1) };
                *item
            })
        };
        if let Some(item) = item {
            self.log_action(format!("browser_filter column={} item={}", column, item));
        }
    }
}

impl Application for SimulatedDaw {
    fn undo(&self) {
        self.log_action("undo".to_string());
    }

    fn redo(&self) {
        self.log_action("redo".to_string());
    }

    fn delete_selection(&self) {
        self.log_action("delete_selection".to_string());
    }

    fn duplicate(&self) {
        self.log_action("duplicate".to_string());
    }

    fn apply_frame(&self, command: FrameCommand) {
        self.log_action(format!("frame {:?}", command));
    }
}

impl Host for SimulatedDaw {
    fn show_notification(&self, message: &str) {
        info!("💬 {}", message);
        self.notifications.lock().push(message.to_string());
    }
}

impl NoteOutput for SimulatedDaw {
    fn send_note(&self, note: u8, velocity: u8) {
        debug!("Note out: {} vel={}", note, velocity);
        self.notes.lock().push((note, velocity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_snapshot() {
        let daw = SimulatedDaw::demo();

        let bass = daw.track(1);
        assert!(bass.exists);
        assert_eq!(bass.name, "Bass");
        assert_eq!(bass.pan_text, "L50");
        assert!(!bass.selected);

        assert!(daw.track(0).selected);
        assert_eq!(daw.track(2).pan_text, "C");
        assert!(!daw.track(12).exists);
    }

    #[test]
    fn test_commands_are_journaled() {
        let daw = SimulatedDaw::demo();

        daw.toggle_mute(2);
        Transport::play(&daw);
        daw.change_tempo(true);

        assert!(daw.track(2).mute);
        assert!(daw.is_playing());
        assert_eq!(daw.tempo(), 121.0);
        assert_eq!(
            daw.actions(),
            vec![
                "toggle_mute 2 on=true".to_string(),
                "play playing=true".to_string(),
                "change_tempo increase=true tempo=121".to_string(),
            ]
        );
    }

    #[test]
    fn test_create_note_clip_fills_slot() {
        let daw = SimulatedDaw::demo();

        daw.create_note_clip(0, 2, 4);

        let slots = daw.slots(0);
        assert!(slots[2].has_content);
        assert!(slots[2].selected);
        assert_eq!(daw.count_actions("create_note_clip"), 1);
    }

    #[test]
    fn test_device_pages() {
        let daw = SimulatedDaw::demo();

        assert_eq!(daw.page_count(), 3);
        daw.select_page(2);
        daw.change_parameter(0, 64);

        assert_eq!(daw.parameter(0).name, "P17");
        assert_eq!(daw.parameter(0).value, 1.0);
        assert_eq!(daw.parameter(8), ParameterState::default());
    }

    #[test]
    fn test_missing_device_is_inert() {
        let daw = SimulatedDaw::new(DawState::default());

        daw.toggle_enabled();
        daw.select_next();

        assert!(!CursorDevice::exists(&daw));
        assert!(daw.actions().is_empty());
    }
}

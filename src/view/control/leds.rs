//! LED states of the control view
//!
//! Pure projection of mode and DAW state; evaluated for every button on each
//! refresh and never cached. Row checks run first, anything they do not
//! cover is off. Overlay modes replace a row's mapping instead of blending
//! with it.

use crate::daw::Transport;
use crate::grid::{ButtonId, ButtonRow};
use crate::mode::{ModeId, SelectionMode};
use crate::view::{LedContext, LedState};

/// LED state of `button` in the control view
pub fn resolve(button: ButtonId, ctx: &LedContext<'_>) -> LedState {
    let mode = ctx.modes.active_or_temp_mode_id();
    match button {
        ButtonId::Row { row, index } => {
            let index = index as usize;
            match row {
                ButtonRow::Row1 => row1(index, mode, ctx),
                ButtonRow::Row2 => row2(index, mode, ctx),
                ButtonRow::Row3 => LedState::from_bool(ctx.model.tracks.track(index).selected),
                ButtonRow::Row4 => transport(index, ctx.model.transport.as_ref()),
                ButtonRow::Row5 => LedState::Off,
            }
        },
        ButtonId::RowSelect(number) => row_select(number, mode),
        ButtonId::P1Up | ButtonId::P1Down => LedState::Off,
    }
}

/// Row 1: functions toggles or the selected new clip length
fn row1(index: usize, mode: ModeId, ctx: &LedContext<'_>) -> LedState {
    if mode == ModeId::ViewSelect {
        return LedState::Off;
    }
    let functions = mode == ModeId::Functions;
    let length_selected = !functions && ctx.settings.new_clip_length == index;
    let toggle_on = functions
        && match index {
            5 => ctx.model.device.is_window_open(),
            6 => ctx.model.transport.is_metronome_on(),
            _ => false,
        };
    LedState::from_bool(length_selected || toggle_on)
}

/// Row 2: browser controls, or track and device toggles
fn row2(index: usize, mode: ModeId, ctx: &LedContext<'_>) -> LedState {
    if mode == ModeId::Browser {
        let selection = ctx
            .modes
            .presets()
            .map(|p| p.selection_mode())
            .unwrap_or_default();
        return match index {
            0 | 1 | 7 => LedState::On,
            2..=6 => LedState::from_bool(selection == SelectionMode::Off),
            _ => LedState::Off,
        };
    }

    let no_overlay = mode != ModeId::Frame;
    let device = &ctx.model.device;
    let track = ctx.model.tracks.selected_track();
    let on = match index {
        0 => no_overlay && track.as_ref().is_some_and(|t| t.mute),
        1 => no_overlay && track.as_ref().is_some_and(|t| t.solo),
        2 => no_overlay && track.as_ref().is_some_and(|t| t.rec_arm),
        3 => ctx.model.transport.is_writing_arranger_automation(),
        5 => device.is_enabled(),
        6 => no_overlay && device.can_select_previous(),
        7 => no_overlay && device.can_select_next(),
        _ => false,
    };
    LedState::from_bool(on)
}

/// Transport row LEDs (stop, play, loop, record on buttons 2-5)
pub fn transport(index: usize, transport: &dyn Transport) -> LedState {
    let on = match index {
        2 => !transport.is_playing(),
        3 => transport.is_playing(),
        4 => transport.is_loop(),
        5 => transport.is_recording(),
        _ => false,
    };
    LedState::from_bool(on)
}

/// Row-select LEDs show which mode group is active
pub fn row_select(number: u8, mode: ModeId) -> LedState {
    let on = match number {
        1 => matches!(mode, ModeId::Functions | ModeId::Fixed),
        2 => mode == ModeId::DeviceParams,
        3 => matches!(mode, ModeId::TrackDetails | ModeId::Frame | ModeId::Browser),
        4 => matches!(mode, ModeId::Track | ModeId::Master),
        6 => mode == ModeId::Volume,
        _ => false,
    };
    LedState::from_bool(on)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, SurfaceSettings};
    use crate::daw::{Browser, CursorDevice, DawModel, SimulatedDaw, TrackBank};
    use crate::grid::ControlGrid;
    use crate::mode::{default_modes, ModeManager};
    use std::sync::Arc;

    struct Fixture {
        daw: Arc<SimulatedDaw>,
        model: DawModel,
        modes: ModeManager,
        settings: SurfaceSettings,
    }

    impl Fixture {
        fn new() -> Self {
            let daw = Arc::new(SimulatedDaw::demo());
            let model = DawModel::from_shared(daw.clone());
            let modes = default_modes(&ControlGrid::new(&GridConfig::default()), ModeId::Volume);
            Self {
                daw,
                model,
                modes,
                settings: SurfaceSettings::default(),
            }
        }

        fn led(&self, button: ButtonId) -> LedState {
            let ctx = LedContext {
                model: &self.model,
                modes: &self.modes,
                settings: &self.settings,
            };
            resolve(button, &ctx)
        }
    }

    fn row(row: ButtonRow, index: usize) -> ButtonId {
        ButtonId::row(row, index)
    }

    #[test]
    fn test_row1_clip_length_and_functions() {
        let mut fx = Fixture::new();
        fx.settings.new_clip_length = 3;

        assert_eq!(fx.led(row(ButtonRow::Row1, 3)), LedState::On);
        assert_eq!(fx.led(row(ButtonRow::Row1, 2)), LedState::Off);

        fx.modes.set_active_mode(ModeId::Functions);
        fx.daw.toggle_window_open();
        assert_eq!(fx.led(row(ButtonRow::Row1, 3)), LedState::Off);
        assert_eq!(fx.led(row(ButtonRow::Row1, 5)), LedState::On);
        assert_eq!(fx.led(row(ButtonRow::Row1, 6)), LedState::Off);

        fx.modes.set_active_mode(ModeId::ViewSelect);
        assert_eq!(fx.led(row(ButtonRow::Row1, 3)), LedState::Off);
    }

    #[test]
    fn test_row2_track_toggles_and_frame_overlay() {
        let mut fx = Fixture::new();
        fx.daw.toggle_mute(0);

        assert_eq!(fx.led(row(ButtonRow::Row2, 0)), LedState::On);
        assert_eq!(fx.led(row(ButtonRow::Row2, 5)), LedState::On);
        assert_eq!(fx.led(row(ButtonRow::Row2, 7)), LedState::On);
        assert_eq!(fx.led(row(ButtonRow::Row2, 6)), LedState::Off);

        fx.modes.set_active_mode(ModeId::Frame);
        assert_eq!(fx.led(row(ButtonRow::Row2, 0)), LedState::Off);
        assert_eq!(fx.led(row(ButtonRow::Row2, 7)), LedState::Off);
        assert_eq!(fx.led(row(ButtonRow::Row2, 5)), LedState::On);
    }

    #[test]
    fn test_row2_browser_mapping_is_exclusive() {
        let mut fx = Fixture::new();
        fx.daw.toggle_mute(0);
        fx.daw.replace_device();
        fx.modes.set_active_mode(ModeId::TrackDetails);
        fx.modes.set_temporary_mode(ModeId::Browser);

        for index in 0..8 {
            assert_eq!(fx.led(row(ButtonRow::Row2, index)), LedState::On, "index {}", index);
        }
        assert_eq!(fx.led(ButtonId::RowSelect(3)), LedState::On);
    }

    #[test]
    fn test_row3_and_transport() {
        let fx = Fixture::new();
        fx.daw.select_track(2);
        Transport::play(fx.daw.as_ref());

        assert_eq!(fx.led(row(ButtonRow::Row3, 2)), LedState::On);
        assert_eq!(fx.led(row(ButtonRow::Row3, 0)), LedState::Off);
        assert_eq!(fx.led(row(ButtonRow::Row4, 2)), LedState::Off);
        assert_eq!(fx.led(row(ButtonRow::Row4, 3)), LedState::On);
        assert_eq!(fx.led(row(ButtonRow::Row4, 4)), LedState::Off);
    }

    #[test]
    fn test_row_select() {
        let mut fx = Fixture::new();
        assert_eq!(fx.led(ButtonId::RowSelect(6)), LedState::On);

        fx.modes.set_active_mode(ModeId::Fixed);
        assert_eq!(fx.led(ButtonId::RowSelect(1)), LedState::On);
        assert_eq!(fx.led(ButtonId::RowSelect(6)), LedState::Off);
        assert_eq!(fx.led(ButtonId::RowSelect(7)), LedState::Off);
    }

    #[test]
    fn test_uncovered_buttons_are_off() {
        let fx = Fixture::new();
        Transport::play(fx.daw.as_ref());
        Transport::toggle_loop(fx.daw.as_ref());

        for index in 0..8 {
            assert_eq!(fx.led(row(ButtonRow::Row5, index)), LedState::Off);
        }
        assert_eq!(fx.led(row(ButtonRow::Row4, 0)), LedState::Off);
        assert_eq!(fx.led(row(ButtonRow::Row4, 7)), LedState::Off);
        assert_eq!(fx.led(ButtonId::RowSelect(5)), LedState::Off);
        assert_eq!(fx.led(ButtonId::P1Up), LedState::Off);
        assert!(CursorDevice::exists(fx.daw.as_ref()));
    }
}

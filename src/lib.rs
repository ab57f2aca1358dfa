//! Surface Modes - mode/view dispatch core for DAW control surfaces
//!
//! A surface is a fixed grid of buttons, touch knobs, a text display and
//! drum pads. Modes own the knobs and the display, views own the buttons
//! and pads. The controller routes every hardware event to the right one
//! and repaints LEDs and display on each refresh tick.

pub mod cli;
pub mod config;
pub mod controller;
pub mod daw;
pub mod display;
pub mod grid;
pub mod mode;
pub mod platform;
pub mod repeat;
pub mod scheduler;
pub mod transport;
pub mod view;

pub use controller::{RefreshFrame, SurfaceController, SurfaceEvent};

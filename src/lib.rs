//! gridmock - virtual grid-device simulator
//!
//! Stands in for the hardware behind a grid control surface: a state machine
//! that turns the surface's button/pad events into LED updates, the sysex
//! codec that puts those updates on the wire, and the MIDI glue around them.

pub mod codec;
pub mod color;
pub mod device;
pub mod layout;
pub mod midi;
pub mod surface;

pub use codec::{DecodeError, SurfaceEvent};
pub use color::Rgb;
pub use device::{DeviceContext, DeviceState, IlluminationUpdate};
pub use layout::{ControlId, Role};

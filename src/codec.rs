//! Wire codec for the surface protocol
//!
//! Inbound: classify parsed MIDI into the events the device reacts to.
//! Outbound: pack illumination updates into the surface's RGB LED sysex.

use thiserror::Error;

use crate::color::{Rgb, CHANNEL_MAX};
use crate::layout::ControlId;
use crate::midi::MidiMessage;

/// Vendor sysex header the surface expects in front of every LED frame.
pub const SYSEX_HEADER: [u8; 5] = [0x00, 0x20, 0x29, 0x02, 0x10];

/// LED lighting modes defined by the surface protocol.
pub const LED_MODE_STATIC: u8 = 0x0A;
pub const LED_MODE_FLASH: u8 = 0x23;
pub const LED_MODE_PULSE: u8 = 0x28;
/// Explicit RGB, three channel bytes per LED. The only mode we emit.
pub const LED_MODE_RGB: u8 = 0x0B;

/// One inbound event, as the device understands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Button or pad pressed.
    Press { control: ControlId, intensity: u8 },

    /// Button or pad released.
    Release { control: ControlId },

    /// Continuous controller moved. Logged, no device reaction.
    ControlChange { control: ControlId, value: u8 },

    /// Vendor frame from the surface, full payload preserved for logging.
    RawFrame { payload: Vec<u8> },
}

/// Inbound messages the codec could not turn into a [`SurfaceEvent`].
///
/// Never fatal: the loop logs the failure and moves to the next message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Bytes did not parse as any message in the surface dialect.
    #[error("malformed MIDI bytes: {0:02X?}")]
    Malformed(Vec<u8>),

    /// Parsed fine but carries nothing the device reacts to.
    #[error("no device meaning for {0}")]
    Ignored(MidiMessage),
}

/// Interpret one raw transport message.
pub fn decode(raw: &[u8]) -> Result<SurfaceEvent, DecodeError> {
    let message =
        MidiMessage::parse(raw).ok_or_else(|| DecodeError::Malformed(raw.to_vec()))?;
    classify(message)
}

/// Classify an already-parsed MIDI message.
pub fn classify(message: MidiMessage) -> Result<SurfaceEvent, DecodeError> {
    match message {
        MidiMessage::NoteOn { note, velocity, .. } if velocity > 0 => Ok(SurfaceEvent::Press {
            control: note,
            intensity: velocity,
        }),
        // Velocity-0 note-ons are normalized to NoteOff at parse time, but
        // accept them here too for messages built by hand.
        MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => {
            Ok(SurfaceEvent::Release { control: note })
        }
        MidiMessage::ControlChange { cc, value, .. } => Ok(SurfaceEvent::ControlChange {
            control: cc,
            value,
        }),
        MidiMessage::SysEx { data } => Ok(SurfaceEvent::RawFrame { payload: data }),
        other => Err(DecodeError::Ignored(other)),
    }
}

/// Build one RGB LED frame: F0, vendor header, mode byte, then four bytes
/// per update (id, r, g, b) in input order, F7. Returns `None` for an empty
/// update list so no-op updates send nothing.
pub fn encode_led_frame(updates: &[(ControlId, Rgb)]) -> Option<Vec<u8>> {
    if updates.is_empty() {
        return None;
    }

    let mut data = Vec::with_capacity(SYSEX_HEADER.len() + 1 + updates.len() * 4);
    data.extend_from_slice(&SYSEX_HEADER);
    data.push(LED_MODE_RGB);

    for &(control, color) in updates {
        // Ids are 7-bit on the wire; channels are clamped to the device's
        // 6-bit depth even for hand-built colors.
        data.extend_from_slice(&[
            control & 0x7F,
            color.r.min(CHANNEL_MAX),
            color.g.min(CHANNEL_MAX),
            color.b.min(CHANNEL_MAX),
        ]);
    }

    Some(MidiMessage::SysEx { data }.encode())
}

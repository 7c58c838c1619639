//! MIDI message types and byte-level parsing
//!
//! The transport hands us raw bytes; everything above this layer works on
//! parsed messages.

use std::fmt;

/// MIDI messages the surface exchanges with the simulated device.
///
/// Grid surfaces speak a small dialect: note on/off for buttons and pads,
/// polyphonic pressure for pad aftertouch, control change for encoders, and
/// sysex for vendor frames. Anything else fails to parse and is dropped at
/// the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },

    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Polyphonic Key Pressure: channel (0-15), note (0-127), pressure (0-127)
    PolyPressure { channel: u8, note: u8, pressure: u8 },

    /// Control Change: channel (0-15), cc (0-127), value (0-127)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// System Exclusive: payload bytes between F0 and F7
    SysEx { data: Vec<u8> },
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes.
    ///
    /// A Note On with velocity 0 is normalized to Note Off here, per the
    /// MIDI spec. Returns `None` for truncated input and for message types
    /// outside the surface dialect.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;

        // Running status never occurs on the surfaces we talk to.
        if status < 0x80 {
            return None;
        }

        if status == 0xF0 {
            // Sysex payload runs to the F7 terminator; without one the
            // message is truncated.
            let end = rest.iter().position(|&b| b == 0xF7)?;
            return Some(MidiMessage::SysEx {
                data: rest[..end].to_vec(),
            });
        }

        if status >= 0xF0 {
            // Other system messages (clock, active sensing, ...) carry
            // nothing the device acts on.
            return None;
        }

        let channel = status & 0x0F;
        match status & 0xF0 {
            0x80 => {
                if rest.len() < 2 {
                    return None;
                }
                Some(MidiMessage::NoteOff {
                    channel,
                    note: rest[0] & 0x7F,
                    velocity: rest[1] & 0x7F,
                })
            }
            0x90 => {
                if rest.len() < 2 {
                    return None;
                }
                let note = rest[0] & 0x7F;
                let velocity = rest[1] & 0x7F;
                if velocity == 0 {
                    Some(MidiMessage::NoteOff {
                        channel,
                        note,
                        velocity: 0,
                    })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note,
                        velocity,
                    })
                }
            }
            0xA0 => {
                if rest.len() < 2 {
                    return None;
                }
                Some(MidiMessage::PolyPressure {
                    channel,
                    note: rest[0] & 0x7F,
                    pressure: rest[1] & 0x7F,
                })
            }
            0xB0 => {
                if rest.len() < 2 {
                    return None;
                }
                Some(MidiMessage::ControlChange {
                    channel,
                    cc: rest[0] & 0x7F,
                    value: rest[1] & 0x7F,
                })
            }
            _ => None,
        }
    }

    /// Encode the message to MIDI bytes.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => {
                vec![0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => {
                vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::PolyPressure {
                channel,
                note,
                pressure,
            } => {
                vec![0xA0 | (channel & 0x0F), note & 0x7F, pressure & 0x7F]
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                vec![0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F]
            }
            MidiMessage::SysEx { ref data } => {
                let mut result = Vec::with_capacity(data.len() + 2);
                result.push(0xF0);
                result.extend_from_slice(data);
                result.push(0xF7);
                result
            }
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => {
                write!(f, "NoteOff ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => {
                write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::PolyPressure {
                channel,
                note,
                pressure,
            } => {
                write!(f, "PolyPressure ch:{} n:{} p:{}", channel + 1, note, pressure)
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, cc, value)
            }
            MidiMessage::SysEx { ref data } => {
                write!(f, "SysEx {} bytes", data.len())
            }
        }
    }
}

/// Format MIDI bytes as a hex string for debugging.
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

//! Control surface transport
//!
//! MIDI I/O against the connected control surface: port discovery and
//! auto-detection, connection handling, the inbound event channel, and raw
//! frame sends. Everything here is glue; the device logic lives in
//! [`crate::device`].

use anyhow::{Context, Result};
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::midi::{format_hex, MidiMessage};

/// One inbound message from the surface.
#[derive(Debug, Clone)]
pub struct SurfaceMessage {
    pub timestamp: Instant,
    pub message: MidiMessage,
    pub raw: Vec<u8>,
}

/// MIDI link to the control surface.
///
/// The input callback runs on the midir thread and forwards parsed messages
/// over a bounded channel; the processing loop owns the receiver. Sends go
/// out synchronously on the output connection.
pub struct SurfaceLink {
    input_conn: Option<MidiInputConnection<()>>,
    output_conn: Option<MidiOutputConnection>,
    event_tx: mpsc::Sender<SurfaceMessage>,
    event_rx: Option<mpsc::Receiver<SurfaceMessage>>,
}

impl SurfaceLink {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel(1000);

        Self {
            input_conn: None,
            output_conn: None,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Connect to the surface's input and output ports by name pattern.
    ///
    /// Failure here is fatal to the run; the caller reports it and exits
    /// without entering the event loop.
    pub fn connect(&mut self, input_pattern: &str, output_pattern: &str) -> Result<()> {
        self.disconnect();

        info!(
            "Connecting to surface - input: '{}', output: '{}'",
            input_pattern, output_pattern
        );

        let midi_in = MidiInput::new("gridmock-input").context("Failed to create MIDI input")?;

        let (in_port, in_name) = find_input_port(&midi_in, input_pattern)
            .ok_or_else(|| anyhow::anyhow!("Input port '{}' not found", input_pattern))?;

        info!("Connecting to input port: {}", in_name);

        let event_tx = self.event_tx.clone();
        let input_conn = midi_in
            .connect(
                &in_port,
                "gridmock",
                move |_timestamp, data, _| {
                    let timestamp = Instant::now();

                    if let Some(message) = MidiMessage::parse(data) {
                        let msg = SurfaceMessage {
                            timestamp,
                            message,
                            raw: data.to_vec(),
                        };
                        // Callback runs on the midir thread; never block it.
                        let _ = event_tx.try_send(msg);
                    } else {
                        debug!("Dropping unparseable MIDI: {}", format_hex(data));
                    }
                },
                (),
            )
            .map_err(|e| anyhow::anyhow!("Failed to connect to input port: {e}"))?;

        self.input_conn = Some(input_conn);

        let midi_out = MidiOutput::new("gridmock-output").context("Failed to create MIDI output")?;

        let (out_port, out_name) = find_output_port(&midi_out, output_pattern)
            .ok_or_else(|| anyhow::anyhow!("Output port '{}' not found", output_pattern))?;

        info!("Connecting to output port: {}", out_name);

        let output_conn = midi_out
            .connect(&out_port, "gridmock")
            .map_err(|e| anyhow::anyhow!("Failed to connect to output port: {e}"))?;

        self.output_conn = Some(output_conn);

        info!("Surface connected");
        Ok(())
    }

    /// Drop both connections.
    pub fn disconnect(&mut self) {
        let had_conn = self.input_conn.take().is_some() | self.output_conn.take().is_some();
        if had_conn {
            info!("Surface disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.input_conn.is_some() && self.output_conn.is_some()
    }

    /// Send one raw frame to the surface.
    pub fn send_frame(&mut self, data: &[u8]) -> Result<()> {
        let conn = self
            .output_conn
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Not connected to output port"))?;

        conn.send(data).context("Failed to send MIDI frame")?;

        debug!("Sent: {}", format_hex(data));
        Ok(())
    }

    /// Take the event receiver (for the processing loop to consume).
    pub fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<SurfaceMessage>> {
        self.event_rx.take()
    }
}

impl Default for SurfaceLink {
    fn default() -> Self {
        Self::new()
    }
}

/// Find an input port by case-insensitive substring match.
fn find_input_port(midi_in: &MidiInput, pattern: &str) -> Option<(midir::MidiInputPort, String)> {
    for port in midi_in.ports() {
        if let Ok(name) = midi_in.port_name(&port) {
            if name.to_lowercase().contains(&pattern.to_lowercase()) {
                debug!("Found port '{}' matching pattern '{}'", name, pattern);
                return Some((port, name));
            }
        }
    }
    None
}

/// Find an output port by case-insensitive substring match.
fn find_output_port(
    midi_out: &MidiOutput,
    pattern: &str,
) -> Option<(midir::MidiOutputPort, String)> {
    for port in midi_out.ports() {
        if let Ok(name) = midi_out.port_name(&port) {
            if name.to_lowercase().contains(&pattern.to_lowercase()) {
                debug!("Found port '{}' matching pattern '{}'", name, pattern);
                return Some((port, name));
            }
        }
    }
    None
}

/// Port discovery utilities
pub mod discovery {
    use super::*;
    use colored::Colorize;

    /// Name patterns the control surface's ports usually carry.
    const SURFACE_PATTERNS: [&str; 2] = ["Move", "Ableton"];

    /// Information about a MIDI port
    #[derive(Debug, Clone)]
    pub struct PortInfo {
        pub index: usize,
        pub name: String,
        pub is_virtual: bool,
    }

    fn is_virtual_port(name: &str) -> bool {
        name.contains("Virtual") || name.contains("loopMIDI") || name.contains("IAC")
    }

    /// Discover input ports
    pub fn input_ports() -> Result<Vec<PortInfo>> {
        let midi_in = MidiInput::new("gridmock-scan")?;

        let mut ports = Vec::new();
        for (index, port) in midi_in.ports().iter().enumerate() {
            if let Ok(name) = midi_in.port_name(port) {
                let is_virtual = is_virtual_port(&name);
                ports.push(PortInfo {
                    index,
                    name,
                    is_virtual,
                });
            }
        }

        Ok(ports)
    }

    /// Discover output ports
    pub fn output_ports() -> Result<Vec<PortInfo>> {
        let midi_out = MidiOutput::new("gridmock-scan")?;

        let mut ports = Vec::new();
        for (index, port) in midi_out.ports().iter().enumerate() {
            if let Ok(name) = midi_out.port_name(port) {
                let is_virtual = is_virtual_port(&name);
                ports.push(PortInfo {
                    index,
                    name,
                    is_virtual,
                });
            }
        }

        Ok(ports)
    }

    /// Auto-detect the surface's port pair by name.
    pub fn find_surface_ports() -> Option<(String, String)> {
        let inputs = input_ports().ok()?;
        let outputs = output_ports().ok()?;

        for pattern in SURFACE_PATTERNS {
            let input = inputs.iter().find(|p| p.name.contains(pattern));
            let output = outputs.iter().find(|p| p.name.contains(pattern));

            if let (Some(inp), Some(out)) = (input, output) {
                return Some((inp.name.clone(), out.name.clone()));
            }
        }

        None
    }

    /// Print discovered ports for the --list command.
    pub fn print_ports() {
        println!("\n{}", "=== MIDI Input Ports ===".bold());
        if let Ok(ports) = input_ports() {
            for port in &ports {
                let virtual_tag = if port.is_virtual {
                    " [VIRTUAL]".dimmed().to_string()
                } else {
                    String::new()
                };
                println!("  {}: {}{}", port.index, port.name, virtual_tag);
            }
        }

        println!("\n{}", "=== MIDI Output Ports ===".bold());
        if let Ok(ports) = output_ports() {
            for port in &ports {
                let virtual_tag = if port.is_virtual {
                    " [VIRTUAL]".dimmed().to_string()
                } else {
                    String::new()
                };
                println!("  {}: {}{}", port.index, port.name, virtual_tag);
            }
        }
        println!();
    }
}

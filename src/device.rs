//! Virtual device state machine
//!
//! Owns everything the surface can see: per-control illumination, the
//! selected track, and the shift modifier. Events go in, illumination
//! updates come out; the transport never touches this state directly.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::codec::SurfaceEvent;
use crate::color::{palette, Rgb};
use crate::layout::{self, ControlId, FunctionKey, Role};

/// Ordered list of (control, color) changes produced by one event.
/// Emission order is wire order; duplicates are applied in sequence.
pub type IlluminationUpdate = Vec<(ControlId, Rgb)>;

/// Selected track and modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceContext {
    /// Selected track, 0..7.
    pub track: u8,
    /// Shift currently held.
    pub shift_held: bool,
}

/// The simulated device.
///
/// Event-driven and flat: no timeouts, no multi-step protocol states. Runs
/// for the process lifetime.
pub struct DeviceState {
    leds: BTreeMap<ControlId, Rgb>,
    context: DeviceContext,
}

impl DeviceState {
    /// Boot state: dim grid, first track selected, dim navigation keys.
    pub fn new() -> Self {
        let mut leds = BTreeMap::new();

        for row in 1..=layout::GRID_ROWS {
            for col in 1..=layout::GRID_COLS {
                leds.insert(layout::pad_id(row, col), palette::DIM_WHITE);
            }
        }

        for index in 0..layout::TRACK_COUNT {
            let color = if index == 0 {
                palette::CYAN
            } else {
                palette::DIM_WHITE
            };
            leds.insert(layout::track_select_id(index), color);
        }

        for key in layout::NAV_KEYS {
            leds.insert(key, palette::DIM_BLUE);
        }

        Self {
            leds,
            context: DeviceContext {
                track: 0,
                shift_held: false,
            },
        }
    }

    pub fn context(&self) -> DeviceContext {
        self.context
    }

    /// Current color of a control, if the device lights it.
    pub fn color_of(&self, control: ControlId) -> Option<Rgb> {
        self.leds.get(&control).copied()
    }

    /// Complete illumination state in ascending control-id order. Pushed to
    /// the surface once at session start, before any event processing.
    pub fn snapshot(&self) -> IlluminationUpdate {
        self.leds
            .iter()
            .map(|(&control, &color)| (control, color))
            .collect()
    }

    /// Apply one surface event and return the illumination changes it
    /// caused. Safe to call with any event any number of times.
    pub fn apply(&mut self, event: &SurfaceEvent) -> IlluminationUpdate {
        match event {
            SurfaceEvent::Press { control, intensity } => self.on_press(*control, *intensity),
            SurfaceEvent::Release { control } => self.on_release(*control),
            SurfaceEvent::ControlChange { control, value } => {
                debug!("CC: cc={} val={}", control, value);
                Vec::new()
            }
            SurfaceEvent::RawFrame { payload } => {
                debug!("sysex from surface: {} bytes", payload.len());
                Vec::new()
            }
        }
    }

    fn on_press(&mut self, control: ControlId, intensity: u8) -> IlluminationUpdate {
        debug!("button on:  control={:3} intensity={:3}", control, intensity);

        match layout::role_of(control) {
            Some(Role::TrackSelect { index }) => self.select_track(index),
            Some(Role::Pad { .. }) => self.set_color(control, palette::WHITE),
            Some(Role::Nav(_)) => self.set_color(control, palette::BLUE),
            Some(Role::Function(FunctionKey::Shift)) => {
                self.context.shift_held = true;
                self.set_color(control, palette::ORANGE)
            }
            // Option/Edit presses and unmapped ids change nothing visible.
            _ => Vec::new(),
        }
    }

    fn on_release(&mut self, control: ControlId) -> IlluminationUpdate {
        debug!("button off: control={:3}", control);

        match layout::role_of(control) {
            Some(Role::Pad { .. }) => self.set_color(control, palette::DIM_WHITE),
            Some(Role::Nav(_)) => self.set_color(control, palette::DIM_BLUE),
            Some(Role::Function(FunctionKey::Shift)) => {
                self.context.shift_held = false;
                self.set_color(control, palette::DIM_WHITE)
            }
            // Track selection is press-only; everything else is ignored.
            _ => Vec::new(),
        }
    }

    /// Select a track and repaint the whole selector row, in ascending id
    /// order. The full row goes out even when reselecting the active track.
    fn select_track(&mut self, index: u8) -> IlluminationUpdate {
        self.context.track = index;
        info!("track selected: {}", index + 1);

        let mut updates = Vec::with_capacity(layout::TRACK_COUNT as usize);
        for i in 0..layout::TRACK_COUNT {
            let color = if i == index {
                palette::CYAN
            } else {
                palette::DIM_WHITE
            };
            let control = layout::track_select_id(i);
            self.leds.insert(control, color);
            updates.push((control, color));
        }
        updates
    }

    fn set_color(&mut self, control: ControlId, color: Rgb) -> IlluminationUpdate {
        self.leds.insert(control, color);
        vec![(control, color)]
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

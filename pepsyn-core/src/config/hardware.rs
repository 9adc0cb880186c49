//! Device configuration
//!
//! Describes the fluidic hardware: selector size, tubing dead volumes,
//! pump stroke and valve polarity.

use heapless::Vec;

use crate::traits::Line;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest accepted dead volume of one tubing segment (µl)
pub const MAX_SEGMENT_UL: u32 = 10_000;

/// Dead volumes of the three tubing segments (µl)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TubingConfig {
    /// Reservoir to stream selector
    pub reservoir_to_selector_ul: u32,
    /// Stream selector to pump
    pub selector_to_pump_ul: u32,
    /// Pump to resin
    pub pump_to_reactor_ul: u32,
}

impl TubingConfig {
    /// Every segment within [`MAX_SEGMENT_UL`]
    pub const fn is_valid(&self) -> bool {
        self.reservoir_to_selector_ul <= MAX_SEGMENT_UL
            && self.selector_to_pump_ul <= MAX_SEGMENT_UL
            && self.pump_to_reactor_ul <= MAX_SEGMENT_UL
    }

    /// Volume to draw a reservoir all the way to the pump
    pub const fn inlet_ul(&self) -> u32 {
        self.reservoir_to_selector_ul + self.selector_to_pump_ul
    }
}

impl Default for TubingConfig {
    fn default() -> Self {
        // 15, 11 and 20 inches of 0.03" ID tubing at 11.6 µl/in
        Self {
            reservoir_to_selector_ul: 174,
            selector_to_pump_ul: 128,
            pump_to_reactor_ul: 232,
        }
    }
}

/// Device-level configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConfig {
    /// Stream selector positions
    pub total_ports: u8,
    pub tubing: TubingConfig,
    /// Volume delivered per pump stroke (µl)
    pub pump_stroke_ul: u16,
    /// Scale used when a synthesis does not set one
    pub default_scale: u8,
    /// Selector UART baud rate
    pub valve_baud: u32,
    /// Lines whose valve opens on a low output
    pub inverted_lines: Vec<Line, 5>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            total_ports: 24,
            tubing: TubingConfig::default(),
            pump_stroke_ul: 20,
            default_scale: 1,
            valve_baud: 9600,
            inverted_lines: Vec::new(),
        }
    }
}

impl DeviceConfig {
    pub fn is_inverted(&self, line: Line) -> bool {
        self.inverted_lines.contains(&line)
    }
}

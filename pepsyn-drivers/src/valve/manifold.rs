//! Five-line solenoid valve manifold
//!
//! One output per [`Line`]. Boards driving a line through an active-low
//! relay or MOSFET mark it inverted.

use embedded_hal::digital::OutputPin;
use pepsyn_core::traits::Line;

use crate::error::HardwareError;

const LINES: usize = Line::ALL.len();

pub struct ValveManifold<P> {
    /// Outputs indexed by [`Line::index`]
    pins: [P; LINES],
    inverted: [bool; LINES],
    open: [bool; LINES],
}

impl<P: OutputPin> ValveManifold<P> {
    /// Create a manifold with every line closed
    ///
    /// `pins` are ordered nitrogen, vent, reagent, waste, prime.
    pub fn new(pins: [P; LINES], inverted: [bool; LINES]) -> Result<Self, HardwareError> {
        let mut manifold = Self {
            pins,
            inverted,
            open: [false; LINES],
        };
        manifold.close_all()?;
        Ok(manifold)
    }

    /// Open or close `line`
    pub fn set(&mut self, line: Line, open: bool) -> Result<(), HardwareError> {
        let i = line.index();
        // Normal: open -> high; inverted: open -> low
        let result = if open != self.inverted[i] {
            self.pins[i].set_high()
        } else {
            self.pins[i].set_low()
        };
        result.map_err(|_| HardwareError::Pin)?;
        self.open[i] = open;
        Ok(())
    }

    pub fn is_open(&self, line: Line) -> bool {
        self.open[line.index()]
    }

    pub fn close_all(&mut self) -> Result<(), HardwareError> {
        for line in Line::ALL {
            self.set(line, false)?;
        }
        Ok(())
    }
}

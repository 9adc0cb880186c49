//! Fluidic hardware trait

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Solenoid valve lines of the manifold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Line {
    /// Inert gas into the reactor
    Nitrogen,
    /// Reactor vent
    Vent,
    /// Pump outlet to the reactor
    Reagent,
    /// Reactor drain
    Waste,
    /// Pump outlet to the priming waste
    Prime,
}

impl Line {
    pub const ALL: [Line; 5] = [
        Line::Nitrogen,
        Line::Vent,
        Line::Reagent,
        Line::Waste,
        Line::Prime,
    ];

    /// Position in [`Line::ALL`]
    pub const fn index(self) -> usize {
        match self {
            Line::Nitrogen => 0,
            Line::Vent => 1,
            Line::Reagent => 2,
            Line::Waste => 3,
            Line::Prime => 4,
        }
    }
}

/// Capability interface to the synthesizer fluidics
///
/// Every call blocks until the physical action is complete. Any error is
/// fatal to the run: the executor never retries.
pub trait HardwareAdapter {
    type Error;

    /// Move the stream selector to `port` (1 = home)
    fn select_port(&mut self, port: u8) -> Result<(), Self::Error>;

    /// Open or close a manifold line
    fn set_line(&mut self, line: Line, on: bool) -> Result<(), Self::Error>;

    /// Pump `volume_ul` microliters in whole strokes
    fn dispense(&mut self, volume_ul: u32) -> Result<(), Self::Error>;

    /// Block for `seconds`
    fn wait(&mut self, seconds: u32) -> Result<(), Self::Error>;
}

impl<T: HardwareAdapter + ?Sized> HardwareAdapter for &mut T {
    type Error = T::Error;

    fn select_port(&mut self, port: u8) -> Result<(), Self::Error> {
        (**self).select_port(port)
    }

    fn set_line(&mut self, line: Line, on: bool) -> Result<(), Self::Error> {
        (**self).set_line(line, on)
    }

    fn dispense(&mut self, volume_ul: u32) -> Result<(), Self::Error> {
        (**self).dispense(volume_ul)
    }

    fn wait(&mut self, seconds: u32) -> Result<(), Self::Error> {
        (**self).wait(seconds)
    }
}

//! Solenoid micro-pump
//!
//! Each energize/release cycle moves one fixed stroke volume. Volumes are
//! rounded up to whole strokes.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::HardwareError;

/// Coil energized per stroke
pub const STROKE_ON_MS: u32 = 250;
/// Coil released between strokes
pub const STROKE_OFF_MS: u32 = 250;

pub struct SolenoidPump<P> {
    pin: P,
    stroke_ul: u32,
}

impl<P: OutputPin> SolenoidPump<P> {
    /// Create a pump with the coil released
    pub fn new(mut pin: P, stroke_ul: u32) -> Result<Self, HardwareError> {
        if stroke_ul == 0 {
            return Err(HardwareError::InvalidStroke);
        }
        pin.set_low().map_err(|_| HardwareError::Pin)?;
        Ok(Self { pin, stroke_ul })
    }

    pub fn stroke_ul(&self) -> u32 {
        self.stroke_ul
    }

    #[cfg(test)]
    pub(crate) fn pin(&self) -> &P {
        &self.pin
    }

    /// Strokes needed for `volume_ul`
    pub fn strokes(&self, volume_ul: u32) -> u32 {
        volume_ul.div_ceil(self.stroke_ul)
    }

    /// Pump `volume_ul`, returning the number of strokes made
    pub fn dispense<D: DelayNs>(
        &mut self,
        volume_ul: u32,
        delay: &mut D,
    ) -> Result<u32, HardwareError> {
        let strokes = self.strokes(volume_ul);
        for _ in 0..strokes {
            self.pin.set_high().map_err(|_| HardwareError::Pin)?;
            delay.delay_ms(STROKE_ON_MS);
            self.pin.set_low().map_err(|_| HardwareError::Pin)?;
            delay.delay_ms(STROKE_OFF_MS);
        }
        Ok(strokes)
    }
}

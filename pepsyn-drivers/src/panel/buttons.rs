//! Two-button operator panel
//!
//! Confirm and decline buttons to ground with pull-ups, so a pressed
//! button reads low. Every call blocks until the operator answers; there
//! is no timeout.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use pepsyn_core::traits::{Operator, Prompt, Question};

/// Interval between button reads
pub const POLL_MS: u32 = 10;
/// A press must still read low after this long
pub const DEBOUNCE_MS: u32 = 30;

pub struct PanelOperator<I, D> {
    confirm: I,
    decline: I,
    delay: D,
}

impl<I: InputPin, D: DelayNs> PanelOperator<I, D> {
    pub fn new(confirm: I, decline: I, delay: D) -> Self {
        Self {
            confirm,
            decline,
            delay,
        }
    }

    /// Read errors count as released
    fn pressed(pin: &mut I) -> bool {
        pin.is_low().unwrap_or(false)
    }

    /// Debounced press followed by release
    fn clicked(pin: &mut I, delay: &mut D) -> bool {
        if !Self::pressed(pin) {
            return false;
        }
        delay.delay_ms(DEBOUNCE_MS);
        if !Self::pressed(pin) {
            return false;
        }
        while Self::pressed(pin) {
            delay.delay_ms(POLL_MS);
        }
        true
    }

    fn wait_confirm(&mut self) {
        while !Self::clicked(&mut self.confirm, &mut self.delay) {
            self.delay.delay_ms(POLL_MS);
        }
    }

    fn wait_answer(&mut self) -> bool {
        loop {
            if Self::clicked(&mut self.confirm, &mut self.delay) {
                return true;
            }
            if Self::clicked(&mut self.decline, &mut self.delay) {
                return false;
            }
            self.delay.delay_ms(POLL_MS);
        }
    }
}

impl<I: InputPin, D: DelayNs> Operator for PanelOperator<I, D> {
    fn acknowledge(&mut self, _prompt: Prompt) {
        self.wait_confirm();
    }

    fn decide(&mut self, _question: Question) -> bool {
        self.wait_answer()
    }
}

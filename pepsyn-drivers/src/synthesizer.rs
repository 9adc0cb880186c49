//! Synthesizer hardware adapter
//!
//! Composes the selector, valve manifold and pump into the
//! [`HardwareAdapter`] the executor drives.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_io::Write;
use pepsyn_core::traits::{HardwareAdapter, Line};

use crate::error::HardwareError;
use crate::pump::SolenoidPump;
use crate::selector::ViciSelector;
use crate::valve::ValveManifold;

pub struct Synthesizer<U, P, D> {
    selector: ViciSelector<U>,
    valves: ValveManifold<P>,
    pump: SolenoidPump<P>,
    delay: D,
}

impl<U, P, D> Synthesizer<U, P, D>
where
    U: Write,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(
        selector: ViciSelector<U>,
        valves: ValveManifold<P>,
        pump: SolenoidPump<P>,
        delay: D,
    ) -> Self {
        Self {
            selector,
            valves,
            pump,
            delay,
        }
    }

    pub fn selector(&self) -> &ViciSelector<U> {
        &self.selector
    }

    pub fn valves(&self) -> &ValveManifold<P> {
        &self.valves
    }
}

impl<U, P, D> HardwareAdapter for Synthesizer<U, P, D>
where
    U: Write,
    P: OutputPin,
    D: DelayNs,
{
    type Error = HardwareError;

    fn select_port(&mut self, port: u8) -> Result<(), HardwareError> {
        self.selector.select(port)
    }

    fn set_line(&mut self, line: Line, on: bool) -> Result<(), HardwareError> {
        self.valves.set(line, on)
    }

    fn dispense(&mut self, volume_ul: u32) -> Result<(), HardwareError> {
        self.pump.dispense(volume_ul, &mut self.delay).map(|_| ())
    }

    fn wait(&mut self, seconds: u32) -> Result<(), HardwareError> {
        for _ in 0..seconds {
            self.delay.delay_ms(1000);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct MockUart {
        sent: heapless::Vec<u8, 64>,
    }

    impl embedded_io::ErrorType for MockUart {
        type Error = Infallible;
    }

    impl Write for MockUart {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            let n = buf.len().min(self.sent.capacity() - self.sent.len());
            let _ = self.sent.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    struct MockPin {
        high: bool,
        toggles: u32,
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.toggles += 1;
            Ok(())
        }
    }

    struct MockDelay {
        elapsed_ms: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.elapsed_ms += (ns / 1_000_000) as u64;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.elapsed_ms += ms as u64;
        }
    }

    fn pin() -> MockPin {
        MockPin {
            high: false,
            toggles: 0,
        }
    }

    fn synthesizer() -> Synthesizer<MockUart, MockPin, MockDelay> {
        let selector = ViciSelector::new(
            MockUart {
                sent: heapless::Vec::new(),
            },
            24,
        );
        let valves = ValveManifold::new(core::array::from_fn(|_| pin()), [false; 5]).unwrap();
        let pump = SolenoidPump::new(pin(), 20).unwrap();
        Synthesizer::new(selector, valves, pump, MockDelay { elapsed_ms: 0 })
    }

    #[test]
    fn test_adapter_routes_calls() {
        let mut synth = synthesizer();
        synth.select_port(9).unwrap();
        synth.set_line(Line::Reagent, true).unwrap();
        synth.dispense(40).unwrap();

        assert_eq!(synth.selector().current(), Some(9));
        assert!(synth.valves().is_open(Line::Reagent));
        assert_eq!(synth.pump.pin().toggles, 2);
        assert!(!synth.pump.pin().high);
        assert_eq!(synth.delay.elapsed_ms, 1000);
    }

    #[test]
    fn test_wait_in_whole_seconds() {
        let mut synth = synthesizer();
        synth.wait(30).unwrap();
        assert_eq!(synth.delay.elapsed_ms, 30_000);
    }

    #[test]
    fn test_invalid_port_surfaces() {
        let mut synth = synthesizer();
        assert_eq!(synth.select_port(25), Err(HardwareError::InvalidPort(25)));
    }
}

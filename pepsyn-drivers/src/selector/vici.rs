//! VICI multiposition stream selector
//!
//! The actuator takes ASCII commands over a TX-only serial link, each
//! terminated by a carriage return:
//!
//! - `HM` - move to position 1 (home)
//! - `GO<n>` - move to position `n`
//!
//! The actuator reports nothing back, so the driver tracks the last
//! commanded position itself.

use core::fmt::Write as _;

use embedded_io::Write;
use heapless::String;
use pepsyn_core::ports::HOME_PORT;

use crate::error::HardwareError;

/// Longest command: `GO` + two digits + CR
const MAX_COMMAND_LEN: usize = 8;

pub struct ViciSelector<U> {
    uart: U,
    positions: u8,
    current: Option<u8>,
}

impl<U: Write> ViciSelector<U> {
    /// Create a selector with `positions` installed ports
    pub fn new(uart: U, positions: u8) -> Self {
        Self {
            uart,
            positions,
            current: None,
        }
    }

    pub fn positions(&self) -> u8 {
        self.positions
    }

    /// Last commanded position, if any
    pub fn current(&self) -> Option<u8> {
        self.current
    }

    /// Move to `port`
    pub fn select(&mut self, port: u8) -> Result<(), HardwareError> {
        if port == 0 || port > self.positions {
            return Err(HardwareError::InvalidPort(port));
        }

        let command = Self::command(port)?;
        self.uart
            .write_all(command.as_bytes())
            .map_err(|_| HardwareError::Uart)?;
        self.uart.flush().map_err(|_| HardwareError::Uart)?;

        self.current = Some(port);
        Ok(())
    }

    fn command(port: u8) -> Result<String<MAX_COMMAND_LEN>, HardwareError> {
        let mut command = String::new();
        if port == HOME_PORT {
            command
                .push_str("HM\r")
                .map_err(|_| HardwareError::InvalidPort(port))?;
        } else {
            write!(command, "GO{}\r", port).map_err(|_| HardwareError::InvalidPort(port))?;
        }
        Ok(command)
    }

    /// Release the serial port
    pub fn release(self) -> U {
        self.uart
    }
}

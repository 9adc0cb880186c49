//! Driver error types

/// Hardware adapter failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareError {
    /// Serial write to the selector failed
    Uart,
    /// GPIO write failed
    Pin,
    /// Selector position outside the installed range
    InvalidPort(u8),
    /// Pump stroke volume of zero
    InvalidStroke,
}

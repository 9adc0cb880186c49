//! Error types
//!
//! Plan construction fails with [`PlanError`] before any hardware is touched.
//! Execution fails with [`RunError`], which carries the adapter's own error.

use crate::symbols::Symbol;

/// Errors in the peptide sequence string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    /// Sequence contains no symbols
    Empty,
    /// Sequence is longer than the compiler can hold
    TooLong,
    /// Symbol not present in the symbol table (1-based position in the input)
    UnknownSymbol { position: u16, symbol: Symbol },
    /// Splitting on port exhaustion would need more parts than supported
    TooManyParts,
}

/// Errors in machine or synthesis configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialized configuration could not be decoded
    InvalidData,
    /// Configuration buffer too small to encode into
    BufferTooSmall,
    /// Configuration version is not supported
    UnsupportedVersion(u8),
    /// Selector must expose the seven fixed ports plus at least one reagent port
    TooFewPorts(u8),
    /// Selector has more ports than the port table can hold
    TooManyPorts(u8),
    /// Synthesis scale must be at least 1
    InvalidScale,
    /// Pump stroke volume must be non-zero
    InvalidStroke,
    /// A tubing dead volume exceeds the accepted maximum
    InvalidTubing,
    /// Start residue must be at least 1 and leave one residue to synthesize
    InvalidStartResidue(u16),
    /// Manual mapping uses a port outside the reagent range
    PortOutOfRange { symbol: Symbol, port: u8 },
    /// Manual mapping assigns one port to two symbols
    DuplicatePort(u8),
    /// Manual mapping has no entry for a symbol that needs a port
    MissingPortMapping(Symbol),
}

/// Errors while turning a configuration into a synthesis plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanError {
    Sequence(SequenceError),
    Config(ConfigError),
}

impl From<SequenceError> for PlanError {
    fn from(e: SequenceError) -> Self {
        PlanError::Sequence(e)
    }
}

impl From<ConfigError> for PlanError {
    fn from(e: ConfigError) -> Self {
        PlanError::Config(e)
    }
}

/// Errors while generating an action routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Routine does not fit the action buffer
    TooManyActions,
}

/// Errors during plan execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunError<E> {
    /// Hardware adapter reported a failure; the run is aborted
    Hardware(E),
    /// Routine generation failed
    Protocol(ProtocolError),
    /// Operation not valid in the current run state
    InvalidState,
    /// Resume cursor does not address a step of the plan
    InvalidCursor,
}

impl<E> From<ProtocolError> for RunError<E> {
    fn from(e: ProtocolError) -> Self {
        RunError::Protocol(e)
    }
}

//! Stream-selector valve drivers

pub mod vici;

pub use vici::ViciSelector;

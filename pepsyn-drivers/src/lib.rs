//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pepsyn-core for the synthesizer hardware:
//!
//! - Stream-selector valve (VICI multiposition, serial ASCII)
//! - Solenoid micro-pump (fixed volume per stroke)
//! - Solenoid valve manifold (nitrogen, vent, reagent, waste, prime)
//! - Two-button operator panel
//! - `Synthesizer`, which composes the above into a `HardwareAdapter`

#![no_std]
#![deny(unsafe_code)]

pub mod error;
pub mod panel;
pub mod pump;
pub mod selector;
pub mod synthesizer;
pub mod valve;

pub use error::HardwareError;
pub use synthesizer::Synthesizer;

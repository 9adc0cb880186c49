//! Board-agnostic core logic for the PepSy peptide synthesizer
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Symbol table for the one-character sequence encoding
//! - Port allocation and sequence splitting on port exhaustion
//! - Reagent volume accounting
//! - Sequence compiler (symbol string to step plan)
//! - Timed action routines for every step kind
//! - Step executor and run state machine
//! - Hardware and operator abstraction traits
//! - Configuration type definitions and report rendering

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod ports;
pub mod protocol;
pub mod report;
pub mod sequence;
pub mod state;
pub mod symbols;
pub mod traits;
pub mod volume;

pub use compiler::{CouplingKind, DeprotectionKind, Step, SynthesisPlan};
pub use error::{ConfigError, PlanError, RunError, SequenceError};
pub use executor::Executor;
pub use symbols::{Symbol, SymbolTable};

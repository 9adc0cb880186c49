//! Stream-selector port management
//!
//! Ports 1 to 7 carry the fixed solvents and activators; every distinct
//! building block or control reagent of a sequence gets its own port from
//! 8 upwards. When a sequence needs more ports than the selector has, it is
//! split into parts that are synthesized one after another.

mod allocator;
mod split;

pub use allocator::{allocate, available_slots, Allocation, PortAssignment, PortMapping, PortMode};
pub use split::{split_sequence, SplitPart, MAX_PARTS};

/// Home position; selector rests here between dispenses
pub const HOME_PORT: u8 = 1;
/// DMF wash solvent
pub const DMF_PORT: u8 = 2;
/// DCM wash solvent
pub const DCM_PORT: u8 = 3;
/// Piperidine (Fmoc deprotection)
pub const PIPERIDINE_PORT: u8 = 4;
pub const DIPEA_PORT: u8 = 5;
pub const HOBT_PORT: u8 = 6;
pub const HBTU_PORT: u8 = 7;

/// Ports reserved for solvents and activators
pub const RESERVED_PORTS: u8 = 7;
/// First port available to sequence reagents
pub const FIRST_REAGENT_PORT: u8 = RESERVED_PORTS + 1;
/// Maximum selector positions supported
pub const MAX_PORTS: usize = 32;

//! Pump drivers

pub mod solenoid;

pub use solenoid::{SolenoidPump, STROKE_OFF_MS, STROKE_ON_MS};

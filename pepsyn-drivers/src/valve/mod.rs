//! Solenoid valve drivers

pub mod manifold;

pub use manifold::ValveManifold;

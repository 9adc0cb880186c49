//! Operator panel drivers

pub mod buttons;

pub use buttons::{PanelOperator, DEBOUNCE_MS, POLL_MS};

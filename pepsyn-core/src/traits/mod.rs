//! Abstraction traits
//!
//! The core never touches hardware or a terminal directly. The firmware
//! provides implementations of these traits; tests use recording mocks.

mod hardware;
mod operator;

pub use hardware::{HardwareAdapter, Line};
pub use operator::{Operator, Prompt, Question};

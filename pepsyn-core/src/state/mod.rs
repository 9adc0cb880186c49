//! Run state machine

mod events;
mod machine;

pub use events::Event;
pub use machine::{Cursor, FaultKind, RunState};

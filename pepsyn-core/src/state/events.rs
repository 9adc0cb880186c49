//! Run events

use super::machine::{Cursor, FaultKind};

/// Events that drive run state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Begin a fresh run
    Start,
    /// Begin a run that re-enters the plan at a step
    ResumeAt(Cursor),
    /// Current phase finished or was skipped
    PhaseFinished,
    /// Hardware or protocol failure
    Fault(FaultKind),
}

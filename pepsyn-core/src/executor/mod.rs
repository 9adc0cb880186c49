//! Step execution engine
//!
//! Walks a compiled [`SynthesisPlan`](crate::SynthesisPlan) one phase at a
//! time, expanding each phase into its routine and driving the hardware.
//! Progress is reported as [`JournalEntry`] values through the operator.

mod runner;

pub use runner::Executor;

use crate::compiler::CouplingKind;
use crate::state::{Cursor, FaultKind, RunState};
use crate::symbols::Symbol;

/// Run journal record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JournalEntry {
    RunStarted { steps: u16, parts: u8 },
    Resumed(Cursor),
    PhaseStarted(RunState),
    PhaseSkipped(RunState),
    PhaseCompleted(RunState),
    PartStarted { part: u8 },
    StepStarted {
        index: u16,
        symbol: Symbol,
        port: u8,
        coupling: CouplingKind,
    },
    DeprotectionStarted { index: u16 },
    Faulted(FaultKind),
    Finished,
}

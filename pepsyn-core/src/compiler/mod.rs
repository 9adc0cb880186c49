//! Sequence compiler
//!
//! Turns a symbol string and its port assignment into an ordered list of
//! [`Step`] records in synthesis order.

mod plan;
mod step;

pub use plan::{PlanPart, SynthesisPlan};
pub use step::{CouplingKind, DeprotectionKind, Step};

use heapless::Vec;

use crate::error::{ConfigError, PlanError, SequenceError};
use crate::ports::{PortAssignment, HOME_PORT};
use crate::sequence::MAX_SEQUENCE_LEN;
use crate::symbols::{Symbol, SymbolTable};

/// Compile one sequence part
///
/// `symbols` are in stored order; steps come out reversed, resin-proximal
/// first, numbered from `first_index`. `after_trigger` carries the trigger
/// state of the preceding part, `false` for the first one.
pub fn compile(
    symbols: &[Symbol],
    assignment: &PortAssignment,
    first_index: u16,
    mut after_trigger: bool,
) -> Result<Vec<Step, MAX_SEQUENCE_LEN>, PlanError> {
    let table = SymbolTable::new();
    let mut steps = Vec::new();

    for (n, &symbol) in symbols.iter().rev().enumerate() {
        let position = symbols.len() - n;
        let info = table
            .lookup(symbol)
            .ok_or(SequenceError::UnknownSymbol {
                position: position as u16,
                symbol,
            })?;

        let port = if info.needs_port() {
            assignment
                .get(symbol)
                .ok_or(ConfigError::MissingPortMapping(symbol))?
        } else {
            HOME_PORT
        };

        let mut coupling = info.coupling;
        if coupling == CouplingKind::Single && after_trigger {
            coupling = CouplingKind::Double;
        }
        if coupling != CouplingKind::Pause {
            after_trigger = info.triggers_double_coupling();
        }

        steps
            .push(Step {
                index: first_index.saturating_add(n as u16),
                symbol,
                port,
                coupling,
                deprotection: info.deprotection,
            })
            .map_err(|_| SequenceError::TooLong)?;
    }

    Ok(steps)
}

/// Whether the last non-pause step of `steps` promotes the next coupling
pub fn ends_on_trigger(steps: &[Step]) -> bool {
    let table = SymbolTable::new();
    steps
        .iter()
        .rev()
        .find(|s| s.coupling != CouplingKind::Pause)
        .and_then(|s| table.lookup(s.symbol))
        .map_or(false, |info| info.triggers_double_coupling())
}

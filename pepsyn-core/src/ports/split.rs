//! Sequence splitting on port exhaustion
//!
//! The resin-proximal end is synthesized first, so the first part is the
//! longest suffix of the stored sequence whose reagents fit on the selector.
//! The remaining prefix is split the same way until nothing is left.

use heapless::Vec;

use crate::error::{ConfigError, PlanError, SequenceError};
use crate::sequence::MAX_DISTINCT_SYMBOLS;
use crate::symbols::{Symbol, SymbolTable};

/// Maximum parts a sequence may be split into
pub const MAX_PARTS: usize = 4;

/// Half-open range `start..end` of stored-order positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SplitPart {
    pub start: usize,
    pub end: usize,
}

impl SplitPart {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, symbols: &'a [Symbol]) -> &'a [Symbol] {
        &symbols[self.start..self.end]
    }
}

/// Split `symbols` into parts of at most `available` distinct port-consuming symbols
///
/// Parts are returned in synthesis order.
pub fn split_sequence(
    symbols: &[Symbol],
    available: usize,
) -> Result<Vec<SplitPart, MAX_PARTS>, PlanError> {
    if available == 0 {
        return Err(ConfigError::TooFewPorts(0).into());
    }

    let table = SymbolTable::new();
    let mut parts = Vec::new();
    let mut end = symbols.len();

    while end > 0 {
        let mut distinct: Vec<Symbol, MAX_DISTINCT_SYMBOLS> = Vec::new();
        let mut start = end;

        while start > 0 {
            let symbol = symbols[start - 1];
            let needs_port = table.lookup(symbol).is_some_and(|info| info.needs_port());
            if needs_port && !distinct.contains(&symbol) {
                if distinct.len() == available {
                    break;
                }
                let _ = distinct.push(symbol);
            }
            start -= 1;
        }

        parts
            .push(SplitPart { start, end })
            .map_err(|_| SequenceError::TooManyParts)?;
        end = start;
    }

    Ok(parts)
}

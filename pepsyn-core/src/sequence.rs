//! Peptide sequence
//!
//! Sequences are stored the way they are written: N-terminal residue first,
//! resin-attached residue last. Synthesis runs in the reverse direction.

use heapless::Vec;

use crate::error::{ConfigError, SequenceError};
use crate::symbols::{Symbol, SymbolTable};

/// Maximum symbols in one sequence
pub const MAX_SEQUENCE_LEN: usize = 128;

/// Upper bound on distinct symbols (size of the alphabet)
pub const MAX_DISTINCT_SYMBOLS: usize = 64;

/// Validated sequence in stored order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sequence {
    symbols: Vec<Symbol, MAX_SEQUENCE_LEN>,
}

impl Sequence {
    /// Parse a sequence string, rejecting characters outside the alphabet
    pub fn parse(text: &str) -> Result<Self, SequenceError> {
        let table = SymbolTable::new();
        let mut symbols = Vec::new();

        for (i, c) in text.chars().enumerate() {
            let symbol = Symbol::new(c);
            if !table.contains(symbol) {
                return Err(SequenceError::UnknownSymbol {
                    position: (i + 1) as u16,
                    symbol,
                });
            }
            symbols.push(symbol).map_err(|_| SequenceError::TooLong)?;
        }

        if symbols.is_empty() {
            return Err(SequenceError::Empty);
        }

        Ok(Self { symbols })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in stored order
    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Symbols in synthesis order (resin-proximal first)
    pub fn execution_order(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.iter().rev().copied()
    }

    /// Drop residues already on the resin
    ///
    /// `start_residue = k` removes the last `k - 1` stored symbols.
    pub fn starting_at(&self, start_residue: u16) -> Result<Self, ConfigError> {
        let skip = start_residue as usize;
        if skip == 0 || skip > self.symbols.len() {
            return Err(ConfigError::InvalidStartResidue(start_residue));
        }
        let keep = self.symbols.len() - (skip - 1);
        let mut symbols = Vec::new();
        // keep <= len, cannot overflow
        let _ = symbols.extend_from_slice(&self.symbols[..keep]);
        Ok(Self { symbols })
    }
}

/// Distinct symbols that need a selector port, in first-appearance order
pub fn distinct_reagents(symbols: &[Symbol]) -> Vec<Symbol, MAX_DISTINCT_SYMBOLS> {
    let table = SymbolTable::new();
    let mut distinct: Vec<Symbol, MAX_DISTINCT_SYMBOLS> = Vec::new();

    for &symbol in symbols {
        let needs_port = table.lookup(symbol).is_some_and(|info| info.needs_port());
        if needs_port && !distinct.contains(&symbol) {
            // Alphabet is smaller than the capacity
            let _ = distinct.push(symbol);
        }
    }

    distinct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let seq = Sequence::parse("GAP").unwrap();
        assert_eq!(seq.len(), 3);
        let order: std::vec::Vec<char> = seq.execution_order().map(|s| s.as_char()).collect();
        assert_eq!(order, ['P', 'A', 'G']);
    }

    #[test]
    fn test_parse_unknown_symbol() {
        let err = Sequence::parse("GA?P").unwrap_err();
        assert_eq!(
            err,
            SequenceError::UnknownSymbol {
                position: 3,
                symbol: Symbol::new('?')
            }
        );
    }

    #[test]
    fn test_parse_rejects_whitespace() {
        assert!(matches!(
            Sequence::parse("GA P"),
            Err(SequenceError::UnknownSymbol { position: 3, .. })
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Sequence::parse(""), Err(SequenceError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let text: std::string::String = "A".repeat(MAX_SEQUENCE_LEN + 1);
        assert_eq!(Sequence::parse(&text), Err(SequenceError::TooLong));
    }

    #[test]
    fn test_starting_at_drops_resin_bound_residues() {
        let seq = Sequence::parse("GAPK").unwrap();
        let rest = seq.starting_at(3).unwrap();
        assert_eq!(rest.as_slice(), Sequence::parse("GA").unwrap().as_slice());
        assert_eq!(seq.starting_at(1).unwrap(), seq);
    }

    #[test]
    fn test_starting_at_out_of_range() {
        let seq = Sequence::parse("GA").unwrap();
        assert_eq!(seq.starting_at(0), Err(ConfigError::InvalidStartResidue(0)));
        assert_eq!(seq.starting_at(3), Err(ConfigError::InvalidStartResidue(3)));
        assert!(seq.starting_at(2).is_ok());
    }

    #[test]
    fn test_distinct_reagents_first_appearance() {
        let seq = Sequence::parse("GA*G#@AK").unwrap();
        let distinct = distinct_reagents(seq.as_slice());
        let chars: std::vec::Vec<char> = distinct.iter().map(|s| s.as_char()).collect();
        assert_eq!(chars, ['G', 'A', '@', 'K']);
    }
}

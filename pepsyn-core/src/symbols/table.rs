//! Symbol table
//!
//! Static mapping from sequence characters to their chemical semantics.
//! Classification is resolved once here into closed enums; nothing
//! downstream compares characters.

use super::Symbol;
use crate::compiler::{CouplingKind, DeprotectionKind};

/// Molar masses (g/mol) of the Fmoc-protected building blocks
const MOLAR_MASSES: [(char, f32); 28] = [
    ('A', 329.36),
    ('C', 585.72),
    ('D', 411.45),
    ('E', 425.48),
    ('F', 387.44),
    ('G', 297.31),
    ('H', 619.72),
    ('I', 353.42),
    ('K', 468.2),
    ('L', 353.42),
    ('M', 371.45),
    ('N', 596.68),
    ('P', 337.38),
    ('Q', 610.71),
    ('R', 648.78),
    ('S', 383.44),
    ('T', 379.48),
    ('V', 339.39),
    ('W', 526.59),
    ('Y', 459.54),
    // beta-Ala, GABA, Ava, Ahx, Aoc
    ('3', 311.3),
    ('4', 325.4),
    ('5', 339.4),
    ('6', 353.3),
    ('8', 381.5),
    // PEG2, PEG3
    ('X', 385.42),
    ('B', 429.47),
    // tris-tBu-DOTA
    ('Z', 572.74),
];

/// Broad class of a sequence symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SymbolCategory {
    /// Standard L amino acid
    Residue,
    /// D amino acid (lowercase letter)
    DResidue,
    /// N-methyl amino acid
    NMethylResidue,
    /// Linker or non-standard Fmoc building block
    Linker,
    /// Chelator or other building block without Fmoc protection
    Chelator,
    /// Residue solution added to the reactor by the operator
    ManualResidue,
    Pause,
    IvDde,
    Oxidation,
    EndCapping,
}

/// Everything the compiler needs to know about one symbol
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SymbolInfo {
    pub symbol: Symbol,
    pub category: SymbolCategory,
    /// Molar mass in g/mol, if known
    pub molar_mass: Option<f32>,
    /// Coupling classification before the double-coupling rule is applied
    pub coupling: CouplingKind,
    pub deprotection: DeprotectionKind,
}

impl SymbolInfo {
    /// Control symbols drive an operation rather than add a residue
    pub fn is_control(&self) -> bool {
        matches!(
            self.category,
            SymbolCategory::Pause
                | SymbolCategory::IvDde
                | SymbolCategory::Oxidation
                | SymbolCategory::EndCapping
        )
    }

    /// Whether the symbol draws from a reagent reservoir on the selector
    pub fn needs_port(&self) -> bool {
        !matches!(
            self.category,
            SymbolCategory::Pause | SymbolCategory::ManualResidue
        )
    }

    /// Whether the residue after this one in execution order must be double coupled
    pub fn triggers_double_coupling(&self) -> bool {
        matches!(self.symbol.as_char(), 'P' | 'p')
            || self.category == SymbolCategory::NMethylResidue
    }
}

/// Lookup table for the sequence alphabet
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolTable;

impl SymbolTable {
    pub const fn new() -> Self {
        Self
    }

    /// Resolve a symbol, or `None` if it is not part of the alphabet
    pub fn lookup(&self, symbol: Symbol) -> Option<SymbolInfo> {
        use SymbolCategory::*;

        let c = symbol.as_char();
        let category = match c {
            'A' | 'C' | 'D' | 'E' | 'F' | 'G' | 'H' | 'I' | 'K' | 'L' | 'M' | 'N' | 'P' | 'Q'
            | 'R' | 'S' | 'T' | 'V' | 'W' | 'Y' => Residue,
            'a' | 'c' | 'd' | 'e' | 'f' | 'g' | 'h' | 'i' | 'k' | 'l' | 'm' | 'n' | 'p' | 'q'
            | 'r' | 's' | 't' | 'v' | 'w' | 'y' => DResidue,
            '<' | '>' | '-' | '+' | '=' => NMethylResidue,
            '3' | '4' | '5' | '6' | '8' | 'X' | 'B' | 'J' | '1' | '2' | '7' | '9' => Linker,
            'Z' | 'U' | 'O' => Chelator,
            '#' => ManualResidue,
            '*' => Pause,
            '!' => IvDde,
            '@' => Oxidation,
            '$' => EndCapping,
            _ => return None,
        };

        let coupling = match category {
            Residue | DResidue | NMethylResidue | Linker | Chelator => CouplingKind::Single,
            ManualResidue => CouplingKind::Manual,
            Pause => CouplingKind::Pause,
            IvDde => CouplingKind::IvDdeDeprotection,
            Oxidation => CouplingKind::Oxidation,
            EndCapping => CouplingKind::EndCapping,
        };

        let deprotection = match category {
            Residue | DResidue | NMethylResidue | Linker | ManualResidue => DeprotectionKind::Fmoc,
            Chelator | Pause | IvDde | Oxidation | EndCapping => DeprotectionKind::None,
        };

        let molar_mass = match category {
            Residue | DResidue | Linker | Chelator => {
                let upper = c.to_ascii_uppercase();
                MOLAR_MASSES
                    .iter()
                    .find(|(s, _)| *s == upper)
                    .map(|(_, mass)| *mass)
            }
            _ => None,
        };

        Some(SymbolInfo {
            symbol,
            category,
            molar_mass,
            coupling,
            deprotection,
        })
    }

    /// Molar mass and control flag of a symbol
    ///
    /// `None` if the symbol is not part of the alphabet.
    pub fn classify(&self, symbol: Symbol) -> Option<(Option<f32>, bool)> {
        self.lookup(symbol)
            .map(|info| (info.molar_mass, info.is_control()))
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.lookup(symbol).is_some()
    }
}

//! Sequence symbols
//!
//! Every building block, chemical operation and control action of a
//! synthesis is written as a single character.

mod table;

pub use table::{SymbolCategory, SymbolInfo, SymbolTable};

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single sequence character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Symbol(char);

impl Symbol {
    /// Pause: wait for the operator
    pub const PAUSE: Symbol = Symbol('*');
    /// ivDde protecting group removal
    pub const IVDDE: Symbol = Symbol('!');
    /// Disulfide bond formation
    pub const OXIDATION: Symbol = Symbol('@');
    /// Acetic anhydride capping
    pub const END_CAPPING: Symbol = Symbol('$');
    /// Residue added to the reactor by hand
    pub const MANUAL: Symbol = Symbol('#');

    pub const fn new(c: char) -> Self {
        Self(c)
    }

    pub const fn as_char(self) -> char {
        self.0
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Self(c)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

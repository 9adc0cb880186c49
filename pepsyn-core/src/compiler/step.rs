//! Step records

use crate::symbols::Symbol;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a step adds its building block or runs its operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CouplingKind {
    Single,
    /// Full coupling cycle run twice
    Double,
    /// Operator adds the residue solution, machine adds activators
    Manual,
    Pause,
    Oxidation,
    EndCapping,
    IvDdeDeprotection,
    /// Nothing is coupled
    None,
}

impl CouplingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouplingKind::Single => "single",
            CouplingKind::Double => "double",
            CouplingKind::Manual => "manual",
            CouplingKind::Pause => "pause",
            CouplingKind::Oxidation => "oxidation",
            CouplingKind::EndCapping => "endcapping",
            CouplingKind::IvDdeDeprotection => "ivDde",
            CouplingKind::None => "none",
        }
    }

    /// Number of amino-acid/activator additions this step performs
    pub fn couplings(&self) -> u32 {
        match self {
            CouplingKind::Single | CouplingKind::Manual => 1,
            CouplingKind::Double => 2,
            _ => 0,
        }
    }
}

/// Protecting group removed after the step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeprotectionKind {
    Fmoc,
    None,
}

impl DeprotectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeprotectionKind::Fmoc => "fmoc",
            DeprotectionKind::None => "none",
        }
    }
}

/// One compiled synthesis step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Step {
    /// Residue number counted from the resin (1-based)
    pub index: u16,
    pub symbol: Symbol,
    /// Selector port; `HOME_PORT` for steps that dispense nothing from a reservoir
    pub port: u8,
    pub coupling: CouplingKind,
    pub deprotection: DeprotectionKind,
}

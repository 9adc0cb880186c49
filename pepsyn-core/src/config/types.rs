//! Synthesis configuration types

use heapless::{String, Vec};

use crate::ports::{PortMapping, PortMode, MAX_PORTS};
use crate::sequence::MAX_SEQUENCE_LEN;
use crate::traits::{Operator, Question};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum length of a synthesis label
pub const MAX_LABEL_LEN: usize = 32;

/// Yes/no flag that may be left to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decision {
    Yes,
    No,
    /// Not set explicitly; ask when the phase is reached
    #[default]
    Ask,
}

impl Decision {
    /// Parse a flag: `y`/`yes` and `n`/`no` in any case, anything else asks
    pub fn from_flag(flag: &str) -> Self {
        let flag = flag.trim();
        if flag.eq_ignore_ascii_case("y") || flag.eq_ignore_ascii_case("yes") {
            Decision::Yes
        } else if flag.eq_ignore_ascii_case("n") || flag.eq_ignore_ascii_case("no") {
            Decision::No
        } else {
            Decision::Ask
        }
    }

    pub fn as_flag(&self) -> &'static str {
        match self {
            Decision::Yes => "y",
            Decision::No => "n",
            Decision::Ask => "ask",
        }
    }

    /// Resolve to a boolean, asking the operator if needed
    pub fn resolve<O: Operator + ?Sized>(self, question: Question, operator: &mut O) -> bool {
        match self {
            Decision::Yes => true,
            Decision::No => false,
            Decision::Ask => operator.decide(question),
        }
    }
}

#[cfg(feature = "serde")]
impl Serialize for Decision {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_flag())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Decision {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagVisitor;

        impl serde::de::Visitor<'_> for FlagVisitor {
            type Value = Decision;

            fn expecting(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                f.write_str("a yes/no flag")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Decision, E> {
                Ok(Decision::from_flag(v))
            }

            fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Decision, E> {
                Ok(if v { Decision::Yes } else { Decision::No })
            }
        }

        deserializer.deserialize_str(FlagVisitor)
    }
}

/// Optional phases around the residue steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunFlags {
    pub priming: Decision,
    pub swelling: Decision,
    pub initial_deprotection: Decision,
    pub final_washing: Decision,
    /// Clean the reagent lines after the run
    pub line_cleaning: Decision,
}

/// One synthesis run
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SynthesisConfig {
    pub label: String<MAX_LABEL_LEN>,
    /// Sequence in stored order, resin-attached residue last
    pub sequence: String<MAX_SEQUENCE_LEN>,
    /// Scale factor; device default when unset
    pub scale: Option<u8>,
    /// Residue number to start at; earlier residues are already on the resin
    pub start_residue: u16,
    pub port_mode: PortMode,
    /// Symbol-to-port table for manual mode
    pub positions: Vec<PortMapping, MAX_PORTS>,
    pub flags: RunFlags,
    /// Print the plan and wait for confirmation before touching hardware
    pub review_before_run: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            sequence: String::new(),
            scale: None,
            start_residue: 1,
            port_mode: PortMode::Auto,
            positions: Vec::new(),
            flags: RunFlags::default(),
            review_before_run: true,
        }
    }
}

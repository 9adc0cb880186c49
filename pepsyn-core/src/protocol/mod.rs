//! Fluidic protocol
//!
//! Every step kind expands into a fixed, ordered list of hardware actions.
//! Routines are generated as data so they can be inspected, timed and
//! tested before any of them reaches the hardware.

mod routines;

pub use routines::{
    double_coupling, drying, end_capping, final_washing, fmoc_deprotection, initialization,
    ivdde_deprotection, line_cleaning, manual_coupling, oxidation, pause, priming,
    single_coupling, step_routine, swelling,
};

use heapless::Vec;

use crate::compiler::{DeprotectionKind, SynthesisPlan};
use crate::config::TubingConfig;
use crate::error::ProtocolError;
use crate::ports::MAX_PORTS;
use crate::traits::{Line, Prompt};

/// Maximum actions in one routine
pub const MAX_ROUTINE_ACTIONS: usize = 256;

/// Reaction, drain and wash timings (seconds)
pub mod timing {
    /// Coupling reaction hold
    pub const COUPLING_S: u32 = 3600;
    /// First deprotection round
    pub const DEPROTECTION_FIRST_S: u32 = 600;
    /// Second deprotection round
    pub const DEPROTECTION_SECOND_S: u32 = 1200;
    /// Each oxidation round
    pub const OXIDATION_S: u32 = 3600;
    pub const END_CAPPING_S: u32 = 1800;
    pub const SWELLING_S: u32 = 900;
    pub const DRYING_S: u32 = 1800;
    /// Drain after a reaction
    pub const DRAIN_S: u32 = 30;
    /// Drain after a wash
    pub const WASH_DRAIN_S: u32 = 60;
    /// Drain after a pause
    pub const PAUSE_DRAIN_S: u32 = 15;
    /// Gas purge of the reactor inlet
    pub const PURGE_S: u32 = 10;
    /// Settle after returning the selector home
    pub const SETTLE_S: u32 = 1;
    /// Wash cycles after each stage
    pub const WASH_CYCLES: u32 = 5;
}

/// One hardware-level operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    SelectPort(u8),
    SetLine(Line, bool),
    /// Pump microliters
    Dispense(u32),
    /// Hold for seconds
    Wait(u32),
    /// Block until the operator confirms
    Acknowledge(Prompt),
}

/// Ordered action list for one phase or step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routine {
    actions: Vec<Action, MAX_ROUTINE_ACTIONS>,
}

impl Routine {
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Total scheduled hold time (seconds)
    pub fn hold_seconds(&self) -> u32 {
        self.actions
            .iter()
            .map(|a| match a {
                Action::Wait(s) => *s,
                _ => 0,
            })
            .sum()
    }

    /// Total pumped volume (µl)
    pub fn dispensed_ul(&self) -> u32 {
        self.actions
            .iter()
            .map(|a| match a {
                Action::Dispense(v) => *v,
                _ => 0,
            })
            .sum()
    }
}

/// Tubing and scale shared by every routine of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fluidics {
    pub tubing: TubingConfig,
    pub scale: u32,
}

impl Fluidics {
    pub fn from_plan(plan: &SynthesisPlan) -> Self {
        Self {
            tubing: plan.tubing,
            scale: plan.scale,
        }
    }
}

/// Scheduled hold time of a full run with every optional phase performed
///
/// Excludes pump and operator time.
pub fn estimate_hold_seconds(plan: &SynthesisPlan) -> Result<u32, ProtocolError> {
    let f = Fluidics::from_plan(plan);
    let deprotection = fmoc_deprotection(&f)?.hold_seconds();

    let mut total = initialization()?.hold_seconds()
        + priming(&f)?.hold_seconds()
        + swelling(&f)?.hold_seconds()
        + deprotection;

    for (i, part) in plan.parts().iter().enumerate() {
        for step in &part.steps {
            total += step_routine(step, &f)?.hold_seconds();
            if step.deprotection == DeprotectionKind::Fmoc {
                total += deprotection;
            }
        }
        if i + 1 < plan.parts().len() {
            let ports: Vec<u8, MAX_PORTS> = part.assignment.ports().collect();
            total += line_cleaning(&f, &ports)?.hold_seconds();
        }
    }

    Ok(total + final_washing(&f)?.hold_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeviceConfig, SynthesisConfig};
    use heapless::String;

    #[test]
    fn test_estimate_single_residue() {
        let mut sequence = String::new();
        let _ = sequence.push_str("G");
        let synthesis = SynthesisConfig {
            sequence,
            ..Default::default()
        };
        let plan = SynthesisPlan::build(&DeviceConfig::default(), &synthesis).unwrap();
        let f = Fluidics::from_plan(&plan);

        let deprotection = fmoc_deprotection(&f).unwrap().hold_seconds();
        let coupling = single_coupling(&f, 8).unwrap().hold_seconds();
        let expected = priming(&f).unwrap().hold_seconds()
            + swelling(&f).unwrap().hold_seconds()
            + 2 * deprotection
            + coupling
            + final_washing(&f).unwrap().hold_seconds();
        assert_eq!(estimate_hold_seconds(&plan).unwrap(), expected);
        assert!(expected > timing::COUPLING_S + timing::DRYING_S);
    }
}

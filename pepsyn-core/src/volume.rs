//! Reagent volume accounting
//!
//! Volumes are tracked in whole microliters. Mass and diluent figures are
//! report-only approximations: solutions are assumed to be 0.33 M with a
//! density of 1.

use heapless::{FnvIndexMap, Vec};

use crate::compiler::{CouplingKind, DeprotectionKind, Step};
use crate::config::TubingConfig;
use crate::ports::{PortAssignment, MAX_PORTS};
use crate::symbols::{Symbol, SymbolTable};

/// Target concentration of building block solutions (mol/l)
pub const TARGET_CONCENTRATION_M: f32 = 0.33;

/// Per-use amino acid volume at scale 1 (µl)
pub const COUPLING_VOLUME_UL: u32 = 500;
/// Hydrazine volume at scale 1 (µl)
pub const IVDDE_VOLUME_UL: u32 = 2000;
/// Thallium salt volume at scale 1 (µl)
pub const OXIDATION_VOLUME_UL: u32 = 4000;
/// Acetic anhydride volume at scale 1 (µl)
pub const END_CAPPING_VOLUME_UL: u32 = 1000;
/// Activator (DIPEA, HOBt) volume at scale 1 (µl)
pub const ACTIVATOR_VOLUME_UL: u32 = 260;
/// Piperidine volume per deprotection at scale 1 (µl)
pub const PIPERIDINE_VOLUME_UL: u32 = 2000;

/// What a reservoir is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReagentUse {
    /// Building block coupled to the chain
    Coupling,
    IvDde,
    Oxidation,
    EndCapping,
}

impl ReagentUse {
    /// Reservoir use for a step, `None` for steps that draw from no reservoir
    pub fn for_coupling(kind: CouplingKind) -> Option<Self> {
        match kind {
            CouplingKind::Single | CouplingKind::Double => Some(ReagentUse::Coupling),
            CouplingKind::IvDdeDeprotection => Some(ReagentUse::IvDde),
            CouplingKind::Oxidation => Some(ReagentUse::Oxidation),
            CouplingKind::EndCapping => Some(ReagentUse::EndCapping),
            CouplingKind::Manual | CouplingKind::Pause | CouplingKind::None => None,
        }
    }
}

/// Usage of one reservoir across a sequence part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Usage {
    pub reagent: ReagentUse,
    /// Number of additions; double couplings count twice
    pub uses: u16,
}

pub type UsageTable = FnvIndexMap<Symbol, Usage, MAX_PORTS>;

/// Count reservoir uses per symbol
pub fn tally(steps: &[Step]) -> UsageTable {
    let mut usage = UsageTable::new();
    for step in steps {
        let Some(reagent) = ReagentUse::for_coupling(step.coupling) else {
            continue;
        };
        let add = if step.coupling == CouplingKind::Double { 2 } else { 1 };
        if let Some(entry) = usage.get_mut(&step.symbol) {
            entry.uses += add;
        } else {
            // At most one entry per assigned port
            let _ = usage.insert(step.symbol, Usage { reagent, uses: add });
        }
    }
    usage
}

/// Solution volume to prepare for one reservoir (µl)
///
/// Coupling volumes scale with usage; control reagents are a fixed amount.
pub fn reagent_volume_ul(usage: Usage, tubing: &TubingConfig, scale: u32) -> u32 {
    let line = tubing.inlet_ul();
    match usage.reagent {
        ReagentUse::Coupling => (line + COUPLING_VOLUME_UL * scale) * usage.uses as u32,
        ReagentUse::IvDde => line + IVDDE_VOLUME_UL * scale,
        ReagentUse::Oxidation => line + OXIDATION_VOLUME_UL * scale,
        ReagentUse::EndCapping => line + END_CAPPING_VOLUME_UL * scale,
    }
}

/// One row of the reservoir preparation table
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportLine {
    pub symbol: Symbol,
    pub uses: u16,
    pub port: u8,
    pub volume_ul: u32,
    /// Building block to weigh in (mg); zero when the molar mass is unknown
    pub mass_mg: f32,
    /// Solvent to add (µl)
    pub diluent_ul: f32,
}

impl ReportLine {
    pub fn volume_ml(&self) -> f32 {
        self.volume_ul as f32 / 1000.0
    }
}

/// Build the reservoir preparation table in port assignment order
pub fn compute_volumes(
    assignment: &PortAssignment,
    usage: &UsageTable,
    tubing: &TubingConfig,
    scale: u32,
) -> Vec<ReportLine, MAX_PORTS> {
    let table = SymbolTable::new();
    let mut lines = Vec::new();

    for (symbol, port) in assignment.iter() {
        let Some(&use_) = usage.get(&symbol) else {
            continue;
        };
        let volume_ul = reagent_volume_ul(use_, tubing, scale);
        let volume_ml = volume_ul as f32 / 1000.0;
        let molar_mass = table
            .lookup(symbol)
            .and_then(|info| info.molar_mass)
            .unwrap_or(0.0);
        let mass_mg = volume_ml * molar_mass * TARGET_CONCENTRATION_M;

        // Capacity matches the assignment
        let _ = lines.push(ReportLine {
            symbol,
            uses: use_.uses,
            port,
            volume_ul,
            mass_mg,
            diluent_ul: volume_ml * 1000.0 - mass_mg,
        });
    }

    lines
}

/// Bulk solvent and activator volumes for one sequence part (µl)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BulkVolumes {
    pub dmf_ul: u32,
    pub dcm_ul: u32,
    pub hbtu_ul: u32,
    pub hobt_ul: u32,
    pub dipea_ul: u32,
    pub piperidine_ul: u32,
}

/// Reserve for priming plus spare, per bulk reagent
const BULK_RESERVE_UL: u32 = 2_500;
/// DMF reserve for priming, swelling and spare
const DMF_RESERVE_UL: u32 = 16_500;
/// DCM for priming, swelling, final washing and spare
const DCM_TOTAL_UL: u32 = 21_500;
/// DMF per wash cycle
const WASH_VOLUME_UL: u32 = 2_000;
const WASHES_PER_STAGE: u32 = 5;

pub fn bulk_volumes(steps: &[Step], tubing: &TubingConfig, scale: u32) -> BulkVolumes {
    let mut couplings = 0;
    let mut deprotections = 0;
    let mut washes = 0;

    for step in steps {
        couplings += step.coupling.couplings();
        if step.coupling != CouplingKind::Pause {
            washes += WASHES_PER_STAGE;
        }
        if step.deprotection == DeprotectionKind::Fmoc {
            deprotections += 1;
            washes += WASHES_PER_STAGE;
        }
    }

    let len2 = tubing.selector_to_pump_ul;
    let len3 = tubing.pump_to_reactor_ul;
    let activator = BULK_RESERVE_UL + (len2 + ACTIVATOR_VOLUME_UL * scale) * couplings;

    BulkVolumes {
        dmf_ul: DMF_RESERVE_UL + WASH_VOLUME_UL * washes,
        dcm_ul: DCM_TOTAL_UL,
        hbtu_ul: BULK_RESERVE_UL + (len2 + COUPLING_VOLUME_UL * scale) * couplings,
        hobt_ul: activator,
        dipea_ul: activator,
        piperidine_ul: BULK_RESERVE_UL
            + (len2 + len3 + PIPERIDINE_VOLUME_UL * scale) * deprotections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::ports::{allocate, Allocation, PortMode};
    use crate::sequence::distinct_reagents;

    fn tubing() -> TubingConfig {
        TubingConfig {
            reservoir_to_selector_ul: 174,
            selector_to_pump_ul: 128,
            pump_to_reactor_ul: 0,
        }
    }

    fn plan(s: &str) -> (PortAssignment, std::vec::Vec<Step>) {
        let symbols: std::vec::Vec<Symbol> = s.chars().map(Symbol::new).collect();
        let Allocation::Assigned(a) =
            allocate(&distinct_reagents(&symbols), PortMode::Auto, 24, &[]).unwrap()
        else {
            panic!("overflow");
        };
        let steps = compile(&symbols, &a, 1, false).unwrap().to_vec();
        (a, steps)
    }

    #[test]
    fn test_single_use_volume() {
        let usage = Usage {
            reagent: ReagentUse::Coupling,
            uses: 1,
        };
        let ul = reagent_volume_ul(usage, &tubing(), 1);
        assert_eq!(ul, 802);
        let line = ReportLine {
            symbol: Symbol::new('G'),
            uses: 1,
            port: 8,
            volume_ul: ul,
            mass_mg: 0.0,
            diluent_ul: 0.0,
        };
        assert!((line.volume_ml() - 0.802).abs() < 1e-6);
    }

    #[test]
    fn test_control_volumes_fixed() {
        let t = tubing();
        let v = |reagent, uses| reagent_volume_ul(Usage { reagent, uses }, &t, 2);
        assert_eq!(v(ReagentUse::IvDde, 3), 302 + 4000);
        assert_eq!(v(ReagentUse::Oxidation, 1), 302 + 8000);
        assert_eq!(v(ReagentUse::EndCapping, 5), 302 + 2000);
        assert_eq!(v(ReagentUse::Coupling, 3), (302 + 1000) * 3);
    }

    #[test]
    fn test_tally_counts_double_twice() {
        let (_, steps) = plan("GAP");
        let usage = tally(&steps);
        assert_eq!(usage.get(&Symbol::new('A')).unwrap().uses, 2);
        assert_eq!(usage.get(&Symbol::new('G')).unwrap().uses, 1);
        assert_eq!(usage.get(&Symbol::new('P')).unwrap().uses, 1);
    }

    #[test]
    fn test_tally_skips_pause_and_manual() {
        let (_, steps) = plan("G*#");
        let usage = tally(&steps);
        assert_eq!(usage.len(), 1);
    }

    #[test]
    fn test_compute_volumes_mass_and_diluent() {
        let (a, steps) = plan("G@");
        let lines = compute_volumes(&a, &tally(&steps), &tubing(), 1);
        assert_eq!(lines.len(), 2);

        let g = &lines[0];
        assert_eq!(g.symbol, Symbol::new('G'));
        assert_eq!(g.port, 8);
        assert_eq!(g.volume_ul, 802);
        let expected_mass = 0.802 * 297.31 * 0.33;
        assert!((g.mass_mg - expected_mass).abs() < 1e-2);
        assert!((g.diluent_ul - (802.0 - expected_mass)).abs() < 1e-2);

        let ox = &lines[1];
        assert_eq!(ox.volume_ul, 302 + 4000);
        assert_eq!(ox.mass_mg, 0.0);
        assert!((ox.diluent_ul - 4302.0).abs() < 1e-2);
    }

    #[test]
    fn test_bulk_volumes() {
        // Execution order: P (single, fmoc), A (double, fmoc), G (single, fmoc)
        let (_, steps) = plan("GAP");
        let t = TubingConfig {
            reservoir_to_selector_ul: 174,
            selector_to_pump_ul: 128,
            pump_to_reactor_ul: 232,
        };
        let bulk = bulk_volumes(&steps, &t, 1);
        assert_eq!(bulk.dmf_ul, 16_500 + 2_000 * 30);
        assert_eq!(bulk.dcm_ul, 21_500);
        assert_eq!(bulk.hbtu_ul, 2_500 + (128 + 500) * 4);
        assert_eq!(bulk.hobt_ul, 2_500 + (128 + 260) * 4);
        assert_eq!(bulk.dipea_ul, bulk.hobt_ul);
        assert_eq!(bulk.piperidine_ul, 2_500 + (128 + 232 + 2_000) * 3);
    }
}

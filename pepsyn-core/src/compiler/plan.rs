//! Synthesis plan
//!
//! Built once from configuration, then consumed read-only by the executor.

use heapless::Vec;

use super::{compile, ends_on_trigger, CouplingKind, Step};
use crate::config::{DeviceConfig, RunFlags, SynthesisConfig, TubingConfig};
use crate::error::{ConfigError, PlanError};
use crate::ports::{
    allocate, split_sequence, Allocation, PortAssignment, SplitPart,
    FIRST_REAGENT_PORT, MAX_PARTS, MAX_PORTS,
};
use crate::sequence::{distinct_reagents, Sequence, MAX_SEQUENCE_LEN};
use crate::state::Cursor;
use crate::symbols::Symbol;
use crate::volume::{bulk_volumes, compute_volumes, tally, BulkVolumes, ReportLine};

/// One independently ported section of the sequence
#[derive(Debug, Clone)]
pub struct PlanPart {
    /// Symbols of this part in stored order
    pub symbols: Vec<Symbol, MAX_SEQUENCE_LEN>,
    pub assignment: PortAssignment,
    /// Steps in synthesis order
    pub steps: Vec<Step, MAX_SEQUENCE_LEN>,
    /// Reservoir preparation table
    pub reagents: Vec<ReportLine, MAX_PORTS>,
    pub bulk: BulkVolumes,
}

/// Compiled synthesis
#[derive(Debug, Clone)]
pub struct SynthesisPlan {
    parts: Vec<PlanPart, MAX_PARTS>,
    pub flags: RunFlags,
    pub tubing: TubingConfig,
    pub scale: u32,
    /// Number of the first synthesized residue
    pub start_residue: u16,
    pub review_before_run: bool,
}

impl SynthesisPlan {
    /// Validate configuration and compile the sequence
    ///
    /// Nothing here touches hardware; every configuration or sequence
    /// problem surfaces before a run can start.
    pub fn build(device: &DeviceConfig, synthesis: &SynthesisConfig) -> Result<Self, PlanError> {
        let total_ports = device.total_ports;
        if total_ports < FIRST_REAGENT_PORT {
            return Err(ConfigError::TooFewPorts(total_ports).into());
        }
        if total_ports as usize > MAX_PORTS {
            return Err(ConfigError::TooManyPorts(total_ports).into());
        }
        if device.pump_stroke_ul == 0 {
            return Err(ConfigError::InvalidStroke.into());
        }
        if !device.tubing.is_valid() {
            return Err(ConfigError::InvalidTubing.into());
        }
        let scale = synthesis.scale.unwrap_or(device.default_scale);
        if scale == 0 {
            return Err(ConfigError::InvalidScale.into());
        }

        let sequence = Sequence::parse(&synthesis.sequence)?.starting_at(synthesis.start_residue)?;
        let symbols = sequence.as_slice();

        let distinct = distinct_reagents(symbols);
        let mut ranges: Vec<SplitPart, MAX_PARTS> = Vec::new();
        match allocate(
            &distinct,
            synthesis.port_mode,
            total_ports,
            &synthesis.positions,
        )? {
            Allocation::Assigned(_) => {
                let _ = ranges.push(SplitPart {
                    start: 0,
                    end: symbols.len(),
                });
            }
            Allocation::Overflow { available, .. } => {
                ranges = split_sequence(symbols, available)?;
            }
        }

        let tubing = device.tubing;
        let scale = scale as u32;
        let mut parts = Vec::new();
        let mut first_index = synthesis.start_residue;
        let mut after_trigger = false;

        for range in &ranges {
            let part_symbols = range.slice(symbols);
            let assignment = match allocate(
                &distinct_reagents(part_symbols),
                synthesis.port_mode,
                total_ports,
                &synthesis.positions,
            )? {
                Allocation::Assigned(a) => a,
                Allocation::Overflow { .. } => {
                    return Err(ConfigError::TooFewPorts(total_ports).into())
                }
            };

            let steps = compile(part_symbols, &assignment, first_index, after_trigger)?;
            // A part of only pauses passes the trigger through
            if steps.iter().any(|s| s.coupling != CouplingKind::Pause) {
                after_trigger = ends_on_trigger(&steps);
            }
            let reagents = compute_volumes(&assignment, &tally(&steps), &tubing, scale);
            let bulk = bulk_volumes(&steps, &tubing, scale);

            let mut stored = Vec::new();
            let _ = stored.extend_from_slice(part_symbols);

            first_index = first_index.saturating_add(steps.len() as u16);
            let _ = parts.push(PlanPart {
                symbols: stored,
                assignment,
                steps,
                reagents,
                bulk,
            });
        }

        Ok(Self {
            parts,
            flags: synthesis.flags,
            tubing,
            scale,
            start_residue: synthesis.start_residue,
            review_before_run: synthesis.review_before_run,
        })
    }

    pub fn parts(&self) -> &[PlanPart] {
        &self.parts
    }

    pub fn is_split(&self) -> bool {
        self.parts.len() > 1
    }

    /// Step at `cursor`, if it exists
    pub fn step(&self, cursor: Cursor) -> Option<&Step> {
        self.parts
            .get(cursor.part as usize)
            .and_then(|p| p.steps.get(cursor.step as usize))
    }

    /// Number of steps in each part
    pub fn part_lengths(&self) -> Vec<u16, MAX_PARTS> {
        self.parts.iter().map(|p| p.steps.len() as u16).collect()
    }

    pub fn total_steps(&self) -> usize {
        self.parts.iter().map(|p| p.steps.len()).sum()
    }

    /// All steps in synthesis order
    pub fn steps(&self) -> impl Iterator<Item = &Step> + '_ {
        self.parts.iter().flat_map(|p| p.steps.iter())
    }
}

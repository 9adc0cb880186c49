//! Routine generators
//!
//! Selector positions 1 to 7 are fixed (home, DMF, DCM, piperidine, DIPEA,
//! HOBt, HBTU). The reagent line feeds the reactor; the prime line dumps the
//! pump output so a fresh reagent can displace what is left in the tubing.

use heapless::Vec;

use super::timing::*;
use super::{Action, Fluidics, Routine, MAX_ROUTINE_ACTIONS};
use crate::compiler::{CouplingKind, Step};
use crate::error::ProtocolError;
use crate::ports::{
    DCM_PORT, DIPEA_PORT, DMF_PORT, HBTU_PORT, HOBT_PORT, HOME_PORT, PIPERIDINE_PORT,
};
use crate::traits::{Line, Prompt};
use crate::volume::{
    ACTIVATOR_VOLUME_UL, COUPLING_VOLUME_UL, END_CAPPING_VOLUME_UL, IVDDE_VOLUME_UL,
    OXIDATION_VOLUME_UL, PIPERIDINE_VOLUME_UL,
};

/// DMF or DCM per wash cycle (µl)
const WASH_UL: u32 = 2000;
/// Solvent for priming the fixed ports and swelling (µl)
const SOLVENT_UL: u32 = 1000;
/// DMF cushion over the resin during a pause (µl)
const PAUSE_CUSHION_UL: u32 = 1000;
/// Extra DMF through each line during cleaning (µl)
const LINE_CLEAN_UL: u32 = 500;

struct Builder {
    actions: Vec<Action, MAX_ROUTINE_ACTIONS>,
    overflow: bool,
}

impl Builder {
    fn new() -> Self {
        Self {
            actions: Vec::new(),
            overflow: false,
        }
    }

    fn push(&mut self, action: Action) -> &mut Self {
        if self.actions.push(action).is_err() {
            self.overflow = true;
        }
        self
    }

    fn port(&mut self, port: u8) -> &mut Self {
        self.push(Action::SelectPort(port))
    }

    fn home(&mut self) -> &mut Self {
        self.port(HOME_PORT)
    }

    fn on(&mut self, line: Line) -> &mut Self {
        self.push(Action::SetLine(line, true))
    }

    fn off(&mut self, line: Line) -> &mut Self {
        self.push(Action::SetLine(line, false))
    }

    fn pump(&mut self, volume_ul: u32) -> &mut Self {
        self.push(Action::Dispense(volume_ul))
    }

    fn wait(&mut self, seconds: u32) -> &mut Self {
        self.push(Action::Wait(seconds))
    }

    fn ack(&mut self, prompt: Prompt) -> &mut Self {
        self.push(Action::Acknowledge(prompt))
    }

    /// Blow the reactor inlet clear into waste
    fn purge(&mut self) -> &mut Self {
        self.on(Line::Waste)
            .on(Line::Vent)
            .on(Line::Nitrogen)
            .wait(PURGE_S)
            .off(Line::Nitrogen)
            .off(Line::Vent)
            .off(Line::Waste)
    }

    /// Empty the reactor after a reaction held under nitrogen
    fn drain(&mut self) -> &mut Self {
        self.on(Line::Waste)
            .on(Line::Vent)
            .wait(DRAIN_S)
            .off(Line::Nitrogen)
            .off(Line::Waste)
            .off(Line::Vent)
    }

    /// Hold the reactor under nitrogen
    fn react(&mut self, seconds: u32) -> &mut Self {
        self.on(Line::Nitrogen).wait(seconds)
    }

    /// One solvent wash through the reactor
    fn wash(&mut self, solvent_port: u8) -> &mut Self {
        self.on(Line::Reagent)
            .port(solvent_port)
            .pump(WASH_UL)
            .home()
            .wait(SETTLE_S)
            .off(Line::Reagent)
            .on(Line::Nitrogen)
            .on(Line::Waste)
            .on(Line::Vent)
            .wait(WASH_DRAIN_S)
            .off(Line::Vent)
            .off(Line::Waste)
            .off(Line::Nitrogen)
    }

    fn washes(&mut self, solvent_port: u8) -> &mut Self {
        for _ in 0..WASH_CYCLES {
            self.wash(solvent_port);
        }
        self
    }

    /// Draw a reagent to the pump through the prime line, then into the reactor
    fn prime_from(&mut self, port: u8, prime_ul: u32, f: &Fluidics) -> &mut Self {
        self.port(port)
            .on(Line::Prime)
            .pump(prime_ul)
            .off(Line::Prime)
            .on(Line::Reagent)
            .pump(f.tubing.pump_to_reactor_ul)
            .off(Line::Reagent)
            .purge()
    }

    /// Swap the selector-to-pump segment over to `port` and dispense
    fn add_from(&mut self, port: u8, volume_ul: u32, f: &Fluidics) -> &mut Self {
        self.port(port)
            .on(Line::Prime)
            .off(Line::Reagent)
            .pump(f.tubing.selector_to_pump_ul)
            .off(Line::Prime)
            .on(Line::Reagent)
            .pump(volume_ul)
            .home()
    }

    /// Push the last reagent out of the tubing with DMF
    fn dmf_chase(&mut self, f: &Fluidics) -> &mut Self {
        self.add_from(DMF_PORT, f.tubing.pump_to_reactor_ul, f)
            .off(Line::Reagent)
    }

    /// Load the amino acid: full line prime, then the coupling volume
    fn load_residue(&mut self, port: u8, prime_ul: u32, f: &Fluidics) -> &mut Self {
        let volume = (COUPLING_VOLUME_UL * f.scale).saturating_sub(f.tubing.pump_to_reactor_ul);
        self.prime_from(port, prime_ul, f)
            .on(Line::Reagent)
            .pump(volume)
            .home()
            .wait(SETTLE_S)
    }

    /// DIPEA, HOBt and HBTU, then the DMF chase, reaction and drain
    fn activate_and_couple(&mut self, f: &Fluidics) -> &mut Self {
        let activator = ACTIVATOR_VOLUME_UL * f.scale;
        self.add_from(DIPEA_PORT, activator, f)
            .wait(SETTLE_S)
            .add_from(HOBT_PORT, activator, f)
            .wait(SETTLE_S)
            .add_from(HBTU_PORT, COUPLING_VOLUME_UL * f.scale, f)
            .off(Line::Reagent)
            .dmf_chase(f)
            .react(COUPLING_S)
            .drain()
    }

    /// Fill the reactor from the selector at `port` and hold under nitrogen
    fn treat(&mut self, port: u8, volume_ul: u32, hold_s: u32) -> &mut Self {
        self.on(Line::Reagent)
            .port(port)
            .pump(volume_ul)
            .home()
            .on(Line::Nitrogen)
            .off(Line::Reagent)
            .wait(hold_s)
            .drain()
    }

    /// DMF chase, purge and wash cycles closing every treatment
    fn rinse(&mut self, f: &Fluidics) -> &mut Self {
        self.dmf_chase(f).purge().washes(DMF_PORT)
    }

    fn finish(self) -> Result<Routine, ProtocolError> {
        if self.overflow {
            return Err(ProtocolError::TooManyActions);
        }
        Ok(Routine {
            actions: self.actions,
        })
    }
}

/// Force every line closed and the selector home
pub fn initialization() -> Result<Routine, ProtocolError> {
    let mut b = Builder::new();
    b.home();
    for line in Line::ALL {
        b.off(line);
    }
    b.finish()
}

/// Fill the activator and solvent inlets through the prime line
pub fn priming(f: &Fluidics) -> Result<Routine, ProtocolError> {
    let mut b = Builder::new();
    b.on(Line::Prime);
    for port in [PIPERIDINE_PORT, DIPEA_PORT, HOBT_PORT, HBTU_PORT] {
        b.port(port).pump(f.tubing.inlet_ul()).home().wait(SETTLE_S);
    }
    for port in [DMF_PORT, DCM_PORT] {
        b.port(port).pump(SOLVENT_UL).home().wait(SETTLE_S);
    }
    b.off(Line::Prime);
    b.finish()
}

/// Swell the resin in DCM and DMF
pub fn swelling(f: &Fluidics) -> Result<Routine, ProtocolError> {
    let len3 = f.tubing.pump_to_reactor_ul;
    let mut b = Builder::new();
    b.on(Line::Reagent)
        .port(DCM_PORT)
        .pump(SOLVENT_UL.saturating_sub(len3))
        .home()
        .wait(SETTLE_S)
        .port(DMF_PORT)
        .on(Line::Prime)
        .off(Line::Reagent)
        .pump(f.tubing.selector_to_pump_ul)
        .off(Line::Prime)
        .on(Line::Reagent)
        .pump(SOLVENT_UL + len3)
        .home()
        .off(Line::Reagent)
        .react(SWELLING_S)
        .drain()
        .wash(DMF_PORT);
    b.finish()
}

pub fn single_coupling(f: &Fluidics, port: u8) -> Result<Routine, ProtocolError> {
    let mut b = Builder::new();
    b.load_residue(port, f.tubing.inlet_ul(), f)
        .activate_and_couple(f)
        .washes(DMF_PORT);
    b.finish()
}

/// Two full coupling cycles; the second only re-primes from the selector
pub fn double_coupling(f: &Fluidics, port: u8) -> Result<Routine, ProtocolError> {
    let mut b = Builder::new();
    b.load_residue(port, f.tubing.inlet_ul(), f)
        .activate_and_couple(f)
        .load_residue(port, f.tubing.selector_to_pump_ul, f)
        .activate_and_couple(f)
        .washes(DMF_PORT);
    b.finish()
}

/// Operator adds the residue; activators are dispensed as usual
pub fn manual_coupling(f: &Fluidics, index: u16) -> Result<Routine, ProtocolError> {
    let mut b = Builder::new();
    b.ack(Prompt::AddResidue { index })
        .activate_and_couple(f)
        .washes(DMF_PORT);
    b.finish()
}

/// Two rounds of piperidine
pub fn fmoc_deprotection(f: &Fluidics) -> Result<Routine, ProtocolError> {
    let volume = PIPERIDINE_VOLUME_UL / 2 * f.scale;
    let mut b = Builder::new();
    b.port(PIPERIDINE_PORT)
        .wait(SETTLE_S)
        .on(Line::Prime)
        .pump(f.tubing.selector_to_pump_ul)
        .off(Line::Prime)
        .on(Line::Reagent)
        .pump(f.tubing.pump_to_reactor_ul)
        .off(Line::Reagent)
        .purge()
        .treat(PIPERIDINE_PORT, volume, DEPROTECTION_FIRST_S)
        .treat(PIPERIDINE_PORT, volume, DEPROTECTION_SECOND_S)
        .rinse(f);
    b.finish()
}

/// Two rounds of hydrazine from the reagent's own port
pub fn ivdde_deprotection(f: &Fluidics, port: u8) -> Result<Routine, ProtocolError> {
    let volume = IVDDE_VOLUME_UL / 2 * f.scale;
    let mut b = Builder::new();
    b.port(port)
        .wait(SETTLE_S)
        .prime_from(port, f.tubing.inlet_ul(), f)
        .treat(port, volume, DEPROTECTION_FIRST_S)
        .treat(port, volume, DEPROTECTION_SECOND_S)
        .rinse(f);
    b.finish()
}

/// Two rounds of on-resin oxidation
pub fn oxidation(f: &Fluidics, port: u8) -> Result<Routine, ProtocolError> {
    let volume = OXIDATION_VOLUME_UL / 2 * f.scale;
    let mut b = Builder::new();
    b.port(port)
        .wait(SETTLE_S)
        .prime_from(port, f.tubing.inlet_ul(), f)
        .treat(port, volume, OXIDATION_S)
        .treat(port, volume, OXIDATION_S)
        .rinse(f);
    b.finish()
}

/// Cap unreacted amines with acetic anhydride
pub fn end_capping(f: &Fluidics, port: u8) -> Result<Routine, ProtocolError> {
    let mut b = Builder::new();
    b.port(port)
        .wait(SETTLE_S)
        .prime_from(port, f.tubing.inlet_ul(), f)
        .treat(port, END_CAPPING_VOLUME_UL * f.scale, END_CAPPING_S)
        .rinse(f);
    b.finish()
}

/// Cover the resin with DMF and wait for the operator
pub fn pause(index: u16) -> Result<Routine, ProtocolError> {
    let mut b = Builder::new();
    b.on(Line::Reagent)
        .port(DMF_PORT)
        .pump(PAUSE_CUSHION_UL)
        .home()
        .off(Line::Reagent)
        .ack(Prompt::Pause { index })
        .on(Line::Nitrogen)
        .on(Line::Waste)
        .on(Line::Vent)
        .wait(PAUSE_DRAIN_S)
        .off(Line::Vent)
        .off(Line::Waste)
        .off(Line::Nitrogen);
    b.finish()
}

/// Dry the resin under nitrogen
pub fn drying() -> Result<Routine, ProtocolError> {
    let mut b = Builder::new();
    dry(&mut b);
    b.finish()
}

fn dry(b: &mut Builder) {
    b.on(Line::Nitrogen)
        .on(Line::Vent)
        .on(Line::Waste)
        .wait(DRYING_S)
        .off(Line::Nitrogen)
        .off(Line::Vent)
        .off(Line::Waste);
}

/// DCM washes followed by drying
pub fn final_washing(_f: &Fluidics) -> Result<Routine, ProtocolError> {
    let mut b = Builder::new();
    b.washes(DCM_PORT);
    dry(&mut b);
    b.finish()
}

/// Flush `ports` with DMF while every reagent line sits in DMF
pub fn line_cleaning(f: &Fluidics, ports: &[u8]) -> Result<Routine, ProtocolError> {
    let mut b = Builder::new();
    b.ack(Prompt::InsertLinesInDmf);
    for &port in ports {
        b.port(port)
            .on(Line::Prime)
            .pump(LINE_CLEAN_UL + f.tubing.inlet_ul())
            .off(Line::Prime);
    }
    b.home().ack(Prompt::RemoveLinesFromDmf);
    b.finish()
}

/// Coupling-stage routine for a compiled step
///
/// Fmoc deprotection is not included; it follows as its own routine.
pub fn step_routine(step: &Step, f: &Fluidics) -> Result<Routine, ProtocolError> {
    match step.coupling {
        CouplingKind::Single => single_coupling(f, step.port),
        CouplingKind::Double => double_coupling(f, step.port),
        CouplingKind::Manual => manual_coupling(f, step.index),
        CouplingKind::Pause => pause(step.index),
        CouplingKind::Oxidation => oxidation(f, step.port),
        CouplingKind::EndCapping => end_capping(f, step.port),
        CouplingKind::IvDdeDeprotection => ivdde_deprotection(f, step.port),
        CouplingKind::None => Builder::new().finish(),
    }
}

//! Plan executor
//!
//! Single thread of control: each phase runs to completion before the next
//! starts, and hardware actions within a phase are strictly ordered. A
//! hardware error aborts the run without retry.

use heapless::Vec;

use super::JournalEntry;
use crate::compiler::{DeprotectionKind, SynthesisPlan};
use crate::config::Decision;
use crate::error::{ProtocolError, RunError};
use crate::ports::{MAX_PARTS, MAX_PORTS};
use crate::protocol::{self, Action, Fluidics, Routine};
use crate::state::{Cursor, Event, FaultKind, RunState};
use crate::traits::{HardwareAdapter, Operator, Prompt, Question};

/// Drives a [`SynthesisPlan`] through a [`HardwareAdapter`]
pub struct Executor<'p, H, O> {
    plan: &'p SynthesisPlan,
    hardware: H,
    operator: O,
    fluidics: Fluidics,
    part_lengths: Vec<u16, MAX_PARTS>,
    state: RunState,
    /// Activator and solvent lines primed and not yet cleaned
    lines_primed: bool,
}

impl<'p, H, O> Executor<'p, H, O>
where
    H: HardwareAdapter,
    O: Operator,
{
    pub fn new(plan: &'p SynthesisPlan, hardware: H, operator: O) -> Self {
        Self {
            plan,
            hardware,
            operator,
            fluidics: Fluidics::from_plan(plan),
            part_lengths: plan.part_lengths(),
            state: RunState::Idle,
            lines_primed: false,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn lines_primed(&self) -> bool {
        self.lines_primed
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    /// Release the hardware and operator
    pub fn into_parts(self) -> (H, O) {
        (self.hardware, self.operator)
    }

    /// Begin a fresh run from initialization
    pub fn start(&mut self) -> Result<(), RunError<H::Error>> {
        if self.state != RunState::Idle {
            return Err(RunError::InvalidState);
        }
        self.review();
        self.operator.record(JournalEntry::RunStarted {
            steps: self.plan.total_steps() as u16,
            parts: self.plan.parts().len() as u8,
        });
        self.state = self.state.transition(Event::Start, &self.part_lengths);
        Ok(())
    }

    /// Begin a run at `cursor`
    ///
    /// Initialization still runs; priming, swelling and the initial
    /// deprotection are skipped.
    pub fn resume_at(&mut self, cursor: Cursor) -> Result<(), RunError<H::Error>> {
        if self.state != RunState::Idle {
            return Err(RunError::InvalidState);
        }
        if self.plan.step(cursor).is_none() {
            return Err(RunError::InvalidCursor);
        }
        self.review();
        self.operator.record(JournalEntry::Resumed(cursor));
        self.state = self
            .state
            .transition(Event::ResumeAt(cursor), &self.part_lengths);
        Ok(())
    }

    /// Execute the current phase and move to the next
    pub fn advance(&mut self) -> Result<RunState, RunError<H::Error>> {
        let state = self.state;
        match self.execute(state) {
            Ok(()) => {
                self.state = state.transition(Event::PhaseFinished, &self.part_lengths);
                if self.state == RunState::Done {
                    self.operator.record(JournalEntry::Finished);
                }
                Ok(self.state)
            }
            Err(RunError::InvalidState) => Err(RunError::InvalidState),
            Err(e) => {
                let kind = match e {
                    RunError::Hardware(_) => FaultKind::Hardware,
                    _ => FaultKind::Protocol,
                };
                self.state = state.transition(Event::Fault(kind), &self.part_lengths);
                self.operator.record(JournalEntry::Faulted(kind));
                Err(e)
            }
        }
    }

    /// Run to completion, starting a fresh run if idle
    pub fn run(&mut self) -> Result<(), RunError<H::Error>> {
        if self.state == RunState::Idle {
            self.start()?;
        }
        while !self.state.is_terminal() {
            self.advance()?;
        }
        match self.state {
            RunState::Done => Ok(()),
            _ => Err(RunError::InvalidState),
        }
    }

    fn review(&mut self) {
        if self.plan.review_before_run {
            self.operator.acknowledge(Prompt::ReviewPlan);
        }
    }

    fn execute(&mut self, state: RunState) -> Result<(), RunError<H::Error>> {
        let flags = self.plan.flags;
        match state {
            RunState::Idle | RunState::Done | RunState::Failed(_) => Err(RunError::InvalidState),
            RunState::Initializing { .. } => {
                let routine = protocol::initialization()?;
                self.phase(state, &routine)
            }
            RunState::Priming => {
                if self.optional(state, flags.priming, Question::Priming, protocol::priming)? {
                    self.lines_primed = true;
                }
                Ok(())
            }
            RunState::Swelling => self
                .optional(state, flags.swelling, Question::Swelling, protocol::swelling)
                .map(|_| ()),
            RunState::InitialDeprotection => self
                .optional(
                    state,
                    flags.initial_deprotection,
                    Question::InitialDeprotection,
                    protocol::fmoc_deprotection,
                )
                .map(|_| ()),
            RunState::Running(cursor) => self.step(cursor),
            RunState::LineCleaning { part } => {
                let routine = self.cleaning_routine(part)?;
                self.phase(state, &routine)?;
                self.lines_primed = false;
                Ok(())
            }
            RunState::FinalWashing => self
                .optional(
                    state,
                    flags.final_washing,
                    Question::FinalWashing,
                    protocol::final_washing,
                )
                .map(|_| ()),
            RunState::FinalLineCleaning => {
                if !flags
                    .line_cleaning
                    .resolve(Question::LineCleaning, &mut self.operator)
                {
                    self.operator.record(JournalEntry::PhaseSkipped(state));
                    return Ok(());
                }
                let last = self.plan.parts().len().saturating_sub(1) as u8;
                let routine = self.cleaning_routine(last)?;
                self.phase(state, &routine)?;
                self.lines_primed = false;
                Ok(())
            }
        }
    }

    /// Run or skip an optional phase; returns whether it ran
    fn optional<F>(
        &mut self,
        state: RunState,
        decision: Decision,
        question: Question,
        make: F,
    ) -> Result<bool, RunError<H::Error>>
    where
        F: FnOnce(&Fluidics) -> Result<Routine, ProtocolError>,
    {
        if !decision.resolve(question, &mut self.operator) {
            self.operator.record(JournalEntry::PhaseSkipped(state));
            return Ok(false);
        }
        let routine = make(&self.fluidics)?;
        self.phase(state, &routine)?;
        Ok(true)
    }

    fn phase(&mut self, state: RunState, routine: &Routine) -> Result<(), RunError<H::Error>> {
        self.operator.record(JournalEntry::PhaseStarted(state));
        self.perform(routine)?;
        self.operator.record(JournalEntry::PhaseCompleted(state));
        Ok(())
    }

    fn step(&mut self, cursor: Cursor) -> Result<(), RunError<H::Error>> {
        let plan = self.plan;
        let step = *plan.step(cursor).ok_or(RunError::InvalidCursor)?;

        if cursor.step == 0 && plan.is_split() {
            if cursor.part > 0 {
                self.operator
                    .acknowledge(Prompt::LoadReagents { part: cursor.part });
            }
            self.operator
                .record(JournalEntry::PartStarted { part: cursor.part });
        }

        self.operator.record(JournalEntry::StepStarted {
            index: step.index,
            symbol: step.symbol,
            port: step.port,
            coupling: step.coupling,
        });
        let routine = protocol::step_routine(&step, &self.fluidics)?;
        self.perform(&routine)?;

        if step.deprotection == DeprotectionKind::Fmoc {
            self.operator
                .record(JournalEntry::DeprotectionStarted { index: step.index });
            let routine = protocol::fmoc_deprotection(&self.fluidics)?;
            self.perform(&routine)?;
        }

        self.operator
            .record(JournalEntry::PhaseCompleted(RunState::Running(cursor)));
        Ok(())
    }

    fn cleaning_routine(&self, part: u8) -> Result<Routine, RunError<H::Error>> {
        let part = self
            .plan
            .parts()
            .get(part as usize)
            .ok_or(RunError::InvalidState)?;
        let ports: Vec<u8, MAX_PORTS> = part.assignment.ports().collect();
        Ok(protocol::line_cleaning(&self.fluidics, &ports)?)
    }

    fn perform(&mut self, routine: &Routine) -> Result<(), RunError<H::Error>> {
        for action in routine.actions() {
            match *action {
                Action::SelectPort(port) => self.hardware.select_port(port),
                Action::SetLine(line, on) => self.hardware.set_line(line, on),
                Action::Dispense(volume) => self.hardware.dispense(volume),
                Action::Wait(seconds) => self.hardware.wait(seconds),
                Action::Acknowledge(prompt) => {
                    self.operator.acknowledge(prompt);
                    Ok(())
                }
            }
            .map_err(RunError::Hardware)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CouplingKind;
    use crate::config::{DeviceConfig, RunFlags, SynthesisConfig};
    use crate::traits::Line;
    use heapless::String;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    type Trace = Rc<RefCell<std::vec::Vec<Action>>>;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockError;

    struct MockHardware {
        trace: Trace,
        calls: usize,
        fail_at: Option<usize>,
    }

    impl MockHardware {
        fn new(trace: &Trace) -> Self {
            Self {
                trace: trace.clone(),
                calls: 0,
                fail_at: None,
            }
        }

        fn record(&mut self, action: Action) -> Result<(), MockError> {
            if self.fail_at == Some(self.calls) {
                return Err(MockError);
            }
            self.calls += 1;
            self.trace.borrow_mut().push(action);
            Ok(())
        }
    }

    impl HardwareAdapter for MockHardware {
        type Error = MockError;

        fn select_port(&mut self, port: u8) -> Result<(), MockError> {
            self.record(Action::SelectPort(port))
        }

        fn set_line(&mut self, line: Line, on: bool) -> Result<(), MockError> {
            self.record(Action::SetLine(line, on))
        }

        fn dispense(&mut self, volume_ul: u32) -> Result<(), MockError> {
            self.record(Action::Dispense(volume_ul))
        }

        fn wait(&mut self, seconds: u32) -> Result<(), MockError> {
            self.record(Action::Wait(seconds))
        }
    }

    struct MockOperator {
        trace: Trace,
        answers: VecDeque<bool>,
        questions: std::vec::Vec<Question>,
        journal: std::vec::Vec<JournalEntry>,
    }

    impl MockOperator {
        fn new(trace: &Trace) -> Self {
            Self {
                trace: trace.clone(),
                answers: VecDeque::new(),
                questions: std::vec::Vec::new(),
                journal: std::vec::Vec::new(),
            }
        }
    }

    impl Operator for MockOperator {
        fn acknowledge(&mut self, prompt: Prompt) {
            self.trace.borrow_mut().push(Action::Acknowledge(prompt));
        }

        fn decide(&mut self, question: Question) -> bool {
            self.questions.push(question);
            self.answers.pop_front().unwrap_or(false)
        }

        fn record(&mut self, entry: JournalEntry) {
            self.journal.push(entry);
        }
    }

    fn all(decision: Decision) -> RunFlags {
        RunFlags {
            priming: decision,
            swelling: decision,
            initial_deprotection: decision,
            final_washing: decision,
            line_cleaning: decision,
        }
    }

    fn plan(seq: &str, flags: RunFlags) -> SynthesisPlan {
        let mut sequence = String::new();
        let _ = sequence.push_str(seq);
        let synthesis = SynthesisConfig {
            sequence,
            flags,
            review_before_run: false,
            ..Default::default()
        };
        SynthesisPlan::build(&DeviceConfig::default(), &synthesis).unwrap()
    }

    fn concat(routines: &[Routine]) -> std::vec::Vec<Action> {
        routines
            .iter()
            .flat_map(|r| r.actions().iter().copied())
            .collect()
    }

    #[test]
    fn test_gap_full_run_action_sequence() {
        let plan = plan("GAP", all(Decision::Yes));
        let trace = Trace::default();
        let mut exec = Executor::new(&plan, MockHardware::new(&trace), MockOperator::new(&trace));
        exec.run().unwrap();
        assert_eq!(exec.state(), RunState::Done);

        let f = Fluidics::from_plan(&plan);
        let fmoc = protocol::fmoc_deprotection(&f).unwrap();
        // Ports by first appearance: G 8, A 9, P 10
        let expected = concat(&[
            protocol::initialization().unwrap(),
            protocol::priming(&f).unwrap(),
            protocol::swelling(&f).unwrap(),
            fmoc.clone(),
            protocol::single_coupling(&f, 10).unwrap(),
            fmoc.clone(),
            protocol::double_coupling(&f, 9).unwrap(),
            fmoc.clone(),
            protocol::single_coupling(&f, 8).unwrap(),
            fmoc,
            protocol::final_washing(&f).unwrap(),
            protocol::line_cleaning(&f, &[8, 9, 10]).unwrap(),
        ]);
        assert_eq!(*trace.borrow(), expected);

        let (_, operator) = exec.into_parts();
        assert!(operator.questions.is_empty());
        assert_eq!(operator.journal.last(), Some(&JournalEntry::Finished));
        assert!(operator.journal.contains(&JournalEntry::StepStarted {
            index: 2,
            symbol: crate::Symbol::new('A'),
            port: 9,
            coupling: CouplingKind::Double,
        }));
    }

    #[test]
    fn test_no_flags_skip_optional_phases() {
        let plan = plan("G", all(Decision::No));
        let trace = Trace::default();
        let mut exec = Executor::new(&plan, MockHardware::new(&trace), MockOperator::new(&trace));
        exec.run().unwrap();

        let f = Fluidics::from_plan(&plan);
        let expected = concat(&[
            protocol::initialization().unwrap(),
            protocol::single_coupling(&f, 8).unwrap(),
            protocol::fmoc_deprotection(&f).unwrap(),
        ]);
        assert_eq!(*trace.borrow(), expected);
        assert!(!exec.lines_primed());

        let (_, operator) = exec.into_parts();
        assert!(operator.questions.is_empty());
        let skipped = operator
            .journal
            .iter()
            .filter(|e| matches!(e, JournalEntry::PhaseSkipped(_)))
            .count();
        assert_eq!(skipped, 5);
    }

    #[test]
    fn test_ask_flags_consult_operator() {
        let plan = plan("G", all(Decision::Ask));
        let trace = Trace::default();
        let mut operator = MockOperator::new(&trace);
        operator.answers = VecDeque::from([true, false, false, false, false]);
        let mut exec = Executor::new(&plan, MockHardware::new(&trace), operator);
        exec.run().unwrap();
        assert!(exec.lines_primed());

        let (_, operator) = exec.into_parts();
        assert_eq!(
            operator.questions,
            [
                Question::Priming,
                Question::Swelling,
                Question::InitialDeprotection,
                Question::FinalWashing,
                Question::LineCleaning,
            ]
        );
        assert!(operator
            .journal
            .contains(&JournalEntry::PhaseCompleted(RunState::Priming)));
        assert!(operator
            .journal
            .contains(&JournalEntry::PhaseSkipped(RunState::Swelling)));
    }

    #[test]
    fn test_pause_waits_for_operator() {
        let plan = plan("G*A", all(Decision::No));
        let trace = Trace::default();
        let mut exec = Executor::new(&plan, MockHardware::new(&trace), MockOperator::new(&trace));
        exec.run().unwrap();

        let trace = trace.borrow();
        let prompt = Action::Acknowledge(Prompt::Pause { index: 2 });
        let at = trace.iter().position(|a| *a == prompt).unwrap();
        // Cushion dispensed and selector home right before the prompt
        assert_eq!(trace[at - 1], Action::SetLine(Line::Reagent, false));
        assert_eq!(trace[at - 3], Action::Dispense(1000));
        // Drain starts only after the operator resumes
        assert_eq!(trace[at + 1], Action::SetLine(Line::Nitrogen, true));
        assert_eq!(trace.iter().filter(|a| **a == prompt).count(), 1);
    }

    #[test]
    fn test_split_plan_cleans_lines_between_parts() {
        let plan = plan("WACDEFGHIKLMNPQRST", all(Decision::No));
        assert!(plan.is_split());
        let trace = Trace::default();
        let mut exec = Executor::new(&plan, MockHardware::new(&trace), MockOperator::new(&trace));
        exec.run().unwrap();

        let acks: std::vec::Vec<Prompt> = trace
            .borrow()
            .iter()
            .filter_map(|a| match a {
                Action::Acknowledge(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(
            acks,
            [
                Prompt::InsertLinesInDmf,
                Prompt::RemoveLinesFromDmf,
                Prompt::LoadReagents { part: 1 },
            ]
        );

        let (_, operator) = exec.into_parts();
        let journal = operator.journal;
        let cleaning = journal
            .iter()
            .position(|e| *e == JournalEntry::PhaseStarted(RunState::LineCleaning { part: 0 }))
            .unwrap();
        let last_of_first = journal
            .iter()
            .position(|e| matches!(e, JournalEntry::StepStarted { index: 17, .. }))
            .unwrap();
        let second = journal
            .iter()
            .position(|e| *e == JournalEntry::PartStarted { part: 1 })
            .unwrap();
        assert!(last_of_first < cleaning && cleaning < second);
    }

    #[test]
    fn test_hardware_failure_aborts_run() {
        let plan = plan("GA", all(Decision::No));
        let trace = Trace::default();
        let mut hardware = MockHardware::new(&trace);
        hardware.fail_at = Some(10);
        let mut exec = Executor::new(&plan, hardware, MockOperator::new(&trace));

        assert_eq!(exec.run(), Err(RunError::Hardware(MockError)));
        assert_eq!(exec.state(), RunState::Failed(FaultKind::Hardware));
        assert_eq!(trace.borrow().len(), 10);

        // No retry, no further progress
        assert_eq!(exec.advance(), Err(RunError::InvalidState));
        assert_eq!(trace.borrow().len(), 10);

        let (_, operator) = exec.into_parts();
        assert_eq!(
            operator.journal.last(),
            Some(&JournalEntry::Faulted(FaultKind::Hardware))
        );
    }

    #[test]
    fn test_resume_at_skips_pre_synthesis() {
        let plan = plan("GAP", all(Decision::Yes));
        let trace = Trace::default();
        let mut exec = Executor::new(&plan, MockHardware::new(&trace), MockOperator::new(&trace));
        exec.resume_at(Cursor { part: 0, step: 2 }).unwrap();
        exec.run().unwrap();

        let f = Fluidics::from_plan(&plan);
        let expected = concat(&[
            protocol::initialization().unwrap(),
            protocol::single_coupling(&f, 8).unwrap(),
            protocol::fmoc_deprotection(&f).unwrap(),
            protocol::final_washing(&f).unwrap(),
            protocol::line_cleaning(&f, &[8, 9, 10]).unwrap(),
        ]);
        assert_eq!(*trace.borrow(), expected);
    }

    #[test]
    fn test_resume_rejects_bad_cursor() {
        let plan = plan("GA", all(Decision::No));
        let trace = Trace::default();
        let mut exec = Executor::new(&plan, MockHardware::new(&trace), MockOperator::new(&trace));
        assert_eq!(
            exec.resume_at(Cursor { part: 0, step: 2 }),
            Err(RunError::InvalidCursor)
        );
        assert_eq!(exec.state(), RunState::Idle);
    }

    #[test]
    fn test_start_twice_is_invalid() {
        let plan = plan("G", all(Decision::No));
        let trace = Trace::default();
        let mut exec = Executor::new(&plan, MockHardware::new(&trace), MockOperator::new(&trace));
        exec.start().unwrap();
        assert_eq!(exec.start(), Err(RunError::InvalidState));
        assert_eq!(exec.advance(), Ok(RunState::Priming));
    }

    #[test]
    fn test_review_prompt_before_hardware() {
        let mut plan = plan("G", all(Decision::No));
        plan.review_before_run = true;
        let trace = Trace::default();
        let mut exec = Executor::new(&plan, MockHardware::new(&trace), MockOperator::new(&trace));
        exec.run().unwrap();
        assert_eq!(
            trace.borrow().first(),
            Some(&Action::Acknowledge(Prompt::ReviewPlan))
        );
    }

    #[test]
    fn test_manual_residue_prompt() {
        let plan = plan("#G", all(Decision::No));
        let trace = Trace::default();
        let mut exec = Executor::new(&plan, MockHardware::new(&trace), MockOperator::new(&trace));
        exec.run().unwrap();
        assert!(trace
            .borrow()
            .contains(&Action::Acknowledge(Prompt::AddResidue { index: 2 })));
    }
}

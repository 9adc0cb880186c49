//! State machine definition
//!
//! A run walks a fixed phase order. Optional phases are always visited and
//! decide on entry whether to run or skip, so transitions depend only on
//! the current state, the event and the shape of the plan.

use super::events::Event;

/// Position of a step in a split plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub part: u8,
    pub step: u16,
}

impl Cursor {
    pub const START: Cursor = Cursor { part: 0, step: 0 };
}

/// Run states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Nothing started
    Idle,
    /// Forcing every line closed and the selector home
    Initializing { resume: Option<Cursor> },
    Priming,
    Swelling,
    InitialDeprotection,
    /// Executing the step at the cursor
    Running(Cursor),
    /// Flushing reagent lines before the next part reuses the ports
    LineCleaning { part: u8 },
    FinalWashing,
    FinalLineCleaning,
    /// Run complete
    Done,
    /// Run aborted; the fluidic state is unknown
    Failed(FaultKind),
}

/// Why a run was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Hardware adapter call failed
    Hardware,
    /// Routine could not be generated
    Protocol,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Idle | RunState::Done | RunState::Failed(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RunState::Failed(_))
    }

    /// Cursor of the current step, if running one
    pub fn cursor(&self) -> Option<Cursor> {
        match self {
            RunState::Running(c) => Some(*c),
            _ => None,
        }
    }

    /// Process an event and return the next state
    ///
    /// `part_lengths` holds the number of steps in each plan part.
    pub fn transition(self, event: Event, part_lengths: &[u16]) -> Self {
        use Event::*;
        use RunState::*;

        match (self, event) {
            (Idle, Start) => Initializing { resume: None },
            (Idle, ResumeAt(cursor)) => Initializing {
                resume: Some(cursor),
            },

            (Initializing { resume: Some(c) }, PhaseFinished) => Running(c),
            (Initializing { resume: None }, PhaseFinished) => Priming,
            (Priming, PhaseFinished) => Swelling,
            (Swelling, PhaseFinished) => InitialDeprotection,
            (InitialDeprotection, PhaseFinished) => Self::enter_part(0, part_lengths),

            (Running(c), PhaseFinished) => {
                let len = part_lengths.get(c.part as usize).copied().unwrap_or(0);
                if c.step + 1 < len {
                    Running(Cursor {
                        part: c.part,
                        step: c.step + 1,
                    })
                } else if (c.part as usize) + 1 < part_lengths.len() {
                    LineCleaning { part: c.part }
                } else {
                    FinalWashing
                }
            }
            (LineCleaning { part }, PhaseFinished) => Self::enter_part(part + 1, part_lengths),

            (FinalWashing, PhaseFinished) => FinalLineCleaning,
            (FinalLineCleaning, PhaseFinished) => Done,

            // Any active state can fail
            (state, Fault(kind)) if !state.is_terminal() => Failed(kind),

            // Invalid transitions - stay in current state
            (state, _) => state,
        }
    }

    /// First state of `part`, skipping empty parts
    fn enter_part(part: u8, part_lengths: &[u16]) -> Self {
        let mut part = part;
        while (part as usize) < part_lengths.len() {
            if part_lengths[part as usize] > 0 {
                return RunState::Running(Cursor { part, step: 0 });
            }
            part += 1;
        }
        RunState::FinalWashing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lengths: &[u16]) -> std::vec::Vec<RunState> {
        let mut state = RunState::Idle.transition(Event::Start, lengths);
        let mut visited = std::vec![state];
        while state != RunState::Done {
            state = state.transition(Event::PhaseFinished, lengths);
            visited.push(state);
        }
        visited
    }

    #[test]
    fn test_full_run_order() {
        let visited = run(&[2]);
        assert_eq!(
            visited,
            [
                RunState::Initializing { resume: None },
                RunState::Priming,
                RunState::Swelling,
                RunState::InitialDeprotection,
                RunState::Running(Cursor { part: 0, step: 0 }),
                RunState::Running(Cursor { part: 0, step: 1 }),
                RunState::FinalWashing,
                RunState::FinalLineCleaning,
                RunState::Done,
            ]
        );
    }

    #[test]
    fn test_line_cleaning_between_parts() {
        let visited = run(&[2, 1]);
        let cleaning = visited
            .iter()
            .position(|s| *s == RunState::LineCleaning { part: 0 })
            .unwrap();
        assert_eq!(
            visited[cleaning - 1],
            RunState::Running(Cursor { part: 0, step: 1 })
        );
        assert_eq!(
            visited[cleaning + 1],
            RunState::Running(Cursor { part: 1, step: 0 })
        );
        assert_eq!(
            visited
                .iter()
                .filter(|s| matches!(s, RunState::LineCleaning { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_resume_skips_pre_synthesis() {
        let lengths = [3, 2];
        let cursor = Cursor { part: 1, step: 1 };
        let state = RunState::Idle.transition(Event::ResumeAt(cursor), &lengths);
        assert_eq!(
            state,
            RunState::Initializing {
                resume: Some(cursor)
            }
        );
        let state = state.transition(Event::PhaseFinished, &lengths);
        assert_eq!(state, RunState::Running(cursor));
        let state = state.transition(Event::PhaseFinished, &lengths);
        assert_eq!(state, RunState::FinalWashing);
    }

    #[test]
    fn test_fault_from_active_state() {
        let state = RunState::Running(Cursor::START);
        assert_eq!(
            state.transition(Event::Fault(FaultKind::Hardware), &[1]),
            RunState::Failed(FaultKind::Hardware)
        );
        assert_eq!(
            RunState::Priming.transition(Event::Fault(FaultKind::Protocol), &[1]),
            RunState::Failed(FaultKind::Protocol)
        );
    }

    #[test]
    fn test_terminal_states_ignore_events() {
        let failed = RunState::Failed(FaultKind::Hardware);
        assert_eq!(failed.transition(Event::Start, &[1]), failed);
        assert_eq!(RunState::Done.transition(Event::PhaseFinished, &[1]), RunState::Done);
        assert_eq!(
            RunState::Idle.transition(Event::PhaseFinished, &[1]),
            RunState::Idle
        );
        assert_eq!(
            RunState::Idle.transition(Event::Fault(FaultKind::Hardware), &[1]),
            RunState::Idle
        );
    }

    #[test]
    fn test_empty_plan_goes_to_final_washing() {
        assert_eq!(
            RunState::InitialDeprotection.transition(Event::PhaseFinished, &[]),
            RunState::FinalWashing
        );
    }

    #[test]
    fn test_cursor_accessor() {
        assert_eq!(RunState::Running(Cursor::START).cursor(), Some(Cursor::START));
        assert_eq!(RunState::Swelling.cursor(), None);
        assert!(RunState::Failed(FaultKind::Hardware).is_error());
    }
}

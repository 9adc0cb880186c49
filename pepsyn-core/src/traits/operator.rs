//! Operator interaction trait

use crate::executor::JournalEntry;

/// Something the operator must do before the run continues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prompt {
    /// Check the plan, reservoir levels and nitrogen pressure
    ReviewPlan,
    /// Fill the reservoirs for the next sequence part
    LoadReagents { part: u8 },
    /// Pause step reached
    Pause { index: u16 },
    /// Add the residue solution to the reactor by hand
    AddResidue { index: u16 },
    /// Put every reagent line into DMF
    InsertLinesInDmf,
    /// Take the reagent lines out of DMF
    RemoveLinesFromDmf,
}

impl Prompt {
    pub fn message(&self) -> &'static str {
        match self {
            Prompt::ReviewPlan => "Check positions, nitrogen pressure (~2 psi) and reagent levels",
            Prompt::LoadReagents { .. } => "Place the solutions for the next part in the listed ports",
            Prompt::Pause { .. } => "Synthesis paused",
            Prompt::AddResidue { .. } => "Add the residue solution to the reactor",
            Prompt::InsertLinesInDmf => "Insert all reagent lines in DMF",
            Prompt::RemoveLinesFromDmf => "Remove the reagent lines from DMF",
        }
    }
}

/// Yes/no question for a phase whose flag is not set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Question {
    Priming,
    Swelling,
    InitialDeprotection,
    FinalWashing,
    LineCleaning,
}

impl Question {
    pub fn message(&self) -> &'static str {
        match self {
            Question::Priming => "Perform priming?",
            Question::Swelling => "Perform swelling?",
            Question::InitialDeprotection => "Perform initial Fmoc deprotection?",
            Question::FinalWashing => "Perform final washing?",
            Question::LineCleaning => "Clean the reagent lines?",
        }
    }
}

/// Human in the loop
///
/// Both interaction calls block for as long as the operator takes; there is
/// no timeout.
pub trait Operator {
    /// Wait until the operator confirms `prompt`
    fn acknowledge(&mut self, prompt: Prompt);

    /// Ask a yes/no question
    fn decide(&mut self, question: Question) -> bool;

    /// Run journal sink
    fn record(&mut self, _entry: JournalEntry) {}
}

impl<T: Operator + ?Sized> Operator for &mut T {
    fn acknowledge(&mut self, prompt: Prompt) {
        (**self).acknowledge(prompt)
    }

    fn decide(&mut self, question: Question) -> bool {
        (**self).decide(question)
    }

    fn record(&mut self, entry: JournalEntry) {
        (**self).record(entry)
    }
}

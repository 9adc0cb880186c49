//! defmt console
//!
//! The panel has no display, so prompts, questions and the run journal
//! are mirrored to the debug probe.

use core::fmt;

use defmt::*;
use heapless::String;
use pepsyn_core::executor::JournalEntry;
use pepsyn_core::traits::{Operator, Prompt, Question};

/// Longest report line forwarded in one defmt frame
const LINE_LEN: usize = 96;

/// Logs every interaction before handing it to the wrapped operator
pub struct LoggingOperator<O> {
    inner: O,
}

impl<O: Operator> LoggingOperator<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }
}

impl<O: Operator> Operator for LoggingOperator<O> {
    fn acknowledge(&mut self, prompt: Prompt) {
        match prompt {
            Prompt::LoadReagents { part } => {
                info!("{=str} (part {})", prompt.message(), part + 1)
            }
            Prompt::Pause { index } | Prompt::AddResidue { index } => {
                info!("{=str} (residue {})", prompt.message(), index)
            }
            _ => info!("{=str}", prompt.message()),
        }
        info!("Press confirm to continue");
        self.inner.acknowledge(prompt);
    }

    fn decide(&mut self, question: Question) -> bool {
        info!("{=str} confirm = yes, decline = no", question.message());
        let answer = self.inner.decide(question);
        info!("Answer: {}", if answer { "yes" } else { "no" });
        answer
    }

    fn record(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::Faulted(kind) => error!("Run aborted: {:?}", kind),
            JournalEntry::PhaseSkipped(state) => info!("Skipped {:?}", state),
            entry => info!("{:?}", entry),
        }
        self.inner.record(entry);
    }
}

/// Line-buffered `fmt::Write` sink emitting one log frame per line
#[derive(Default)]
pub struct DefmtWriter {
    line: String<LINE_LEN>,
}

impl DefmtWriter {
    pub fn new() -> Self {
        Self {
            line: String::new(),
        }
    }

    fn flush_line(&mut self) {
        info!("{=str}", self.line.as_str());
        self.line.clear();
    }
}

impl fmt::Write for DefmtWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if c == '\n' {
                self.flush_line();
            } else if self.line.push(c).is_err() {
                self.flush_line();
                // Fresh line always has room for one char
                let _ = self.line.push(c);
            }
        }
        Ok(())
    }
}

impl Drop for DefmtWriter {
    fn drop(&mut self) {
        if !self.line.is_empty() {
            self.flush_line();
        }
    }
}

//! Internal consistency faults of the tokenizer state machine
//!
//! Malformed BibTeX never produces a fault; it is represented by the token
//! stream itself. A fault means the scanner's own bookkeeping is broken and
//! the current buffer must be abandoned.

use crate::span::Position;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexFault {
    /// A mode was left while no saved mode existed below it
    #[error("mode stack underflow at {}:{}: cannot leave {} mode", .at.line, .at.column, .mode)]
    ModeStackUnderflow { mode: &'static str, at: Position },
}

impl LexFault {
    /// Where the scanner was when the fault was detected
    pub fn position(&self) -> Position {
        match self {
            LexFault::ModeStackUnderflow { at, .. } => *at,
        }
    }
}

//! Lexical modes and the stack that saves them

use std::fmt;

/// The lexical regime deciding which characters are significant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Between entries: only `@`, `%` comments and bare words matter
    Root,
    /// Inside `@type{...}`: punctuation, strings and text runs
    Entry,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Root => "root",
            Mode::Entry => "entry",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current mode plus the modes saved beneath it
///
/// Root sits at the bottom and can never be popped, so the stack is never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStack {
    current: Mode,
    saved: Vec<Mode>,
}

impl ModeStack {
    pub fn new() -> Self {
        Self {
            current: Mode::Root,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    /// Number of modes on the stack, counting the current one
    pub fn depth(&self) -> usize {
        self.saved.len() + 1
    }

    pub fn push(&mut self, mode: Mode) {
        self.saved.push(self.current);
        self.current = mode;
    }

    /// Restores the saved mode and returns the one left, or `None` when
    /// only Root remains.
    pub fn pop(&mut self) -> Option<Mode> {
        let previous = self.saved.pop()?;
        Some(std::mem::replace(&mut self.current, previous))
    }
}

impl Default for ModeStack {
    fn default() -> Self {
        Self::new()
    }
}

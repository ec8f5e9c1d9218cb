//! biblex-error - Positions, diagnostics and faults for biblex
//!
//! This crate provides the location types every token carries, the
//! diagnostics a consumer produces from a token stream, and the single
//! internal fault type the tokenizer can raise.
//!
//! # Example
//!
//! ```rust
//! use biblex_error::{Diagnostic, ErrorCode, SourceCache, DiagnosticRenderer};
//! use biblex_error::span::{Span, Position};
//!
//! let mut cache = SourceCache::new();
//! let file_id = cache.add("refs.bib", "@book{b, title = \"Open");
//!
//! let span = Span::point(Position::new(1, 23, 22, 22), file_id);
//!
//! let diagnostic = Diagnostic::error("unterminated quoted string")
//!     .with_code(ErrorCode::UNTERMINATED_QUOTED_STRING)
//!     .with_label(span, "input ends here");
//!
//! let renderer = DiagnosticRenderer::new(&cache);
//! println!("{}", renderer.render(&diagnostic));
//! ```

pub mod diagnostic;
pub mod fault;
pub mod span;

pub use diagnostic::{
    Diagnostic, DiagnosticRenderer, ErrorCode, Label, Level, SourceCache, SourceFile,
};
pub use fault::LexFault;
pub use span::{Position, Span};

/// Collection of diagnostics accumulated while scanning a buffer
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.level == Level::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.items.iter().filter(|d| d.level == Level::Warning).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

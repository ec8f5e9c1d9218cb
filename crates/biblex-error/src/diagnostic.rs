//! Diagnostic - rustc-style reports for BibTeX input problems
//!
//! A diagnostic carries:
//! - Error code (EL001, EL002, etc.)
//! - Precise location
//! - Source snippet with an underline
//! - Help text

use crate::span::Span;
use std::fmt::{self, Write};

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// The buffer is malformed
    Error,
    /// Suspicious input that was still tokenized
    Warning,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label pointing to a specific region of the buffer
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
    /// Whether this is the primary or secondary label
    pub primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            primary: false,
        }
    }
}

/// Structured error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    /// Category (L = Lexer)
    pub category: char,
    pub number: u16,
}

impl ErrorCode {
    pub const fn new(category: char, number: u16) -> Self {
        Self { category, number }
    }

    // Truncation: end of input reached while nested
    pub const UNTERMINATED_ENTRY: Self = Self::new('L', 1);
    pub const UNTERMINATED_BRACED_STRING: Self = Self::new('L', 2);
    pub const UNTERMINATED_QUOTED_STRING: Self = Self::new('L', 3);
    pub const TRUNCATED_TEXT: Self = Self::new('L', 4);

    // Noise inside an entry
    pub const IGNORED_CHAR: Self = Self::new('L', 5);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}{:03}", self.category, self.number)
    }
}

/// A complete diagnostic
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub code: Option<ErrorCode>,
    /// Main message
    pub message: String,
    pub labels: Vec<Label>,
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_level(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates a new error
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(Level::Error, message)
    }

    /// Creates a new warning
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(Level::Warning, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Adds a primary label
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Adds a secondary label
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    /// The primary label's span, if any
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.primary).map(|l| l.span)
    }
}

/// Stores source buffers for rendering diagnostics
#[derive(Debug, Default)]
pub struct SourceCache {
    files: Vec<SourceFile>,
}

#[derive(Debug)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    /// Byte offset of each line start (for fast lookup)
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0).chain(line_breaks(&source)).collect();

        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// Returns the text of a 1-indexed line without its terminator
    pub fn get_line(&self, line: u32) -> Option<&str> {
        let line_idx = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(line_idx)?;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .copied()
            .unwrap_or(self.source.len());

        Some(self.source[start..end].trim_end_matches(['\n', '\r']))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Offsets just past every line terminator: `\n`, `\r\n` and lone `\r`
fn line_breaks(source: &str) -> impl Iterator<Item = usize> + '_ {
    let bytes = source.as_bytes();
    bytes.iter().enumerate().filter_map(move |(i, &b)| match b {
        b'\n' => Some(i + 1),
        b'\r' if bytes.get(i + 1) != Some(&b'\n') => Some(i + 1),
        _ => None,
    })
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a buffer and returns its ID
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) -> u32 {
        let id = self.files.len() as u32;
        self.files.push(SourceFile::new(name, source));
        id
    }

    pub fn get(&self, id: u32) -> Option<&SourceFile> {
        self.files.get(id as usize)
    }
}

/// ANSI escapes used by the renderer; all empty when colors are off
#[derive(Debug, Clone, Copy)]
struct Palette {
    reset: &'static str,
    bold: &'static str,
    gutter: &'static str,
    error: &'static str,
    warning: &'static str,
    help: &'static str,
}

impl Palette {
    const ANSI: Self = Self {
        reset: "\x1b[0m",
        bold: "\x1b[1m",
        gutter: "\x1b[1;34m",
        error: "\x1b[1;31m",
        warning: "\x1b[1;33m",
        help: "\x1b[1;32m",
    };

    const PLAIN: Self = Self {
        reset: "",
        bold: "",
        gutter: "",
        error: "",
        warning: "",
        help: "",
    };

    fn level(&self, level: Level) -> &'static str {
        match level {
            Level::Error => self.error,
            Level::Warning => self.warning,
        }
    }
}

/// Renders diagnostics against the buffers in a [`SourceCache`]
pub struct DiagnosticRenderer<'a> {
    cache: &'a SourceCache,
    palette: Palette,
}

impl<'a> DiagnosticRenderer<'a> {
    /// Creates a renderer that emits ANSI colors
    pub fn new(cache: &'a SourceCache) -> Self {
        Self {
            cache,
            palette: Palette::ANSI,
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.palette = if use_colors { Palette::ANSI } else { Palette::PLAIN };
        self
    }

    /// Renders the diagnostic as a string
    ///
    /// ```text
    /// error[EL002]: unterminated braced string
    ///  --> refs.bib:2:13
    ///    |
    ///  2 |   title = {Open
    ///    |             ^ braced string starts here
    ///    = help: add the missing `}`
    /// ```
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_diagnostic(&mut out, diagnostic);
        out
    }

    fn write_diagnostic(&self, out: &mut String, diagnostic: &Diagnostic) -> fmt::Result {
        let p = self.palette;
        let level_color = p.level(diagnostic.level);

        write!(out, "{}{}", level_color, diagnostic.level)?;
        if let Some(code) = diagnostic.code {
            write!(out, "[{}]", code)?;
        }
        writeln!(out, "{}{}: {}{}", p.reset, p.bold, diagnostic.message, p.reset)?;

        for label in &diagnostic.labels {
            if let Some(file) = self.cache.get(label.span.file_id) {
                let color = if label.primary { level_color } else { p.gutter };
                self.write_label(out, file, label, color)?;
            }
        }

        for help in &diagnostic.help {
            writeln!(out, "   = {}help{}: {}", p.help, p.reset, help)?;
        }

        Ok(())
    }

    fn write_label(&self, out: &mut String, file: &SourceFile, label: &Label, color: &str) -> fmt::Result {
        let p = self.palette;
        let start = label.span.start;
        let gutter = " ".repeat(start.line.to_string().len());

        writeln!(out, " {}-->{} {}:{}:{}", p.gutter, p.reset, file.name, start.line, start.column)?;

        let Some(text) = file.get_line(start.line) else {
            // Position just past the last line terminator
            return writeln!(out, " {} {}|{} {}", gutter, p.gutter, p.reset, label.message);
        };

        let width = underline_width(label.span, text);
        let marker = if label.primary { "^" } else { "-" };
        let indent = " ".repeat(start.column.saturating_sub(1) as usize);

        writeln!(out, " {} {}|{}", gutter, p.gutter, p.reset)?;
        writeln!(out, " {}{} |{} {}", p.gutter, start.line, p.reset, text)?;
        writeln!(
            out,
            " {} {}|{} {}{}{}{} {}",
            gutter,
            p.gutter,
            p.reset,
            indent,
            color,
            marker.repeat(width),
            p.reset,
            label.message
        )
    }
}

/// Columns to underline: the span itself on one line, otherwise up to the
/// end of the first line. Never zero.
fn underline_width(span: Span, line: &str) -> usize {
    let width = if span.start.line == span.end.line {
        span.end.column.saturating_sub(span.start.column) as usize
    } else {
        let skipped = span.start.column.saturating_sub(1) as usize;
        line.chars().count().saturating_sub(skipped)
    };
    width.max(1)
}

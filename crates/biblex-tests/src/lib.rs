//! Integration tests for biblex
//!
//! Drives whole BibTeX buffers through the lexer and the consumer-side
//! checks, and cross-checks token positions against an independent
//! line/column computation.

use biblex_error::{Diagnostics, ErrorCode};
use biblex_lexer::{check, Lexer, Token, TokenKind, Truncation};
use std::path::Path;

/// A token detached from the buffer it was scanned from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
    /// Character index of the first character
    pub offset: usize,
    /// Byte index of the first character
    pub byte_offset: usize,
}

impl From<&Token<'_>> for OwnedToken {
    fn from(token: &Token<'_>) -> Self {
        Self {
            kind: token.kind,
            text: token.text.to_string(),
            line: token.line(),
            column: token.column(),
            offset: token.offset(),
            byte_offset: token.byte_offset(),
        }
    }
}

/// Result of scanning a buffer to the end
#[derive(Debug)]
pub struct ScanResult {
    pub tokens: Vec<OwnedToken>,
    pub diagnostics: Diagnostics,
    /// Whether the lexer was still inside an entry at the end
    pub nested: bool,
    pub truncation: Option<Truncation>,
}

impl ScanResult {
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }

    /// Entry type names, taken from the text token after each `@`
    pub fn entry_types(&self) -> Vec<&str> {
        self.tokens
            .windows(2)
            .filter(|pair| pair[0].kind == TokenKind::At && pair[1].kind == TokenKind::Text)
            .map(|pair| pair[1].text.as_str())
            .collect()
    }

    /// Texts of all tokens of one kind
    pub fn texts_of(&self, kind: TokenKind) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.text.as_str())
            .collect()
    }
}

/// Scans `source` and applies the truncation checks
pub fn scan(source: &str) -> ScanResult {
    let mut lexer = Lexer::new(source, 0);
    let tokens = lexer
        .tokenize()
        .unwrap_or_else(|fault| panic!("lexer fault: {}", fault));
    let diagnostics = check(&lexer, &tokens);

    ScanResult {
        tokens: tokens.iter().map(OwnedToken::from).collect(),
        diagnostics,
        nested: lexer.is_nested(),
        truncation: lexer.truncation(),
    }
}

/// Reads and scans a file
pub fn scan_file(path: impl AsRef<Path>) -> std::io::Result<ScanResult> {
    let source = std::fs::read_to_string(path)?;
    Ok(scan(&source))
}

/// Line and column of the character at index `offset`, computed without
/// the lexer
///
/// `\n`, `\r\n` and a lone `\r` each end a line.
pub fn position_at(source: &str, offset: usize) -> (u32, u32) {
    let mut line = 1;
    let mut column = 1;
    let mut previous = None;

    for ch in source.chars().take(offset) {
        match ch {
            '\n' if previous == Some('\r') => {}
            '\n' | '\r' => {
                line += 1;
                column = 1;
            }
            _ => column += 1,
        }
        previous = Some(ch);
    }

    (line, column)
}

/// Asserts that every token starts where [`position_at`] says it does and
/// that its character offset matches its byte offset
pub fn assert_positions_consistent(source: &str) {
    for token in scan(source).tokens {
        assert_eq!(
            source[..token.byte_offset].chars().count(),
            token.offset,
            "token {:?} {:?} at byte {}",
            token.kind,
            token.text,
            token.byte_offset
        );
        assert_eq!(
            position_at(source, token.offset),
            (token.line, token.column),
            "token {:?} {:?} at offset {}",
            token.kind,
            token.text,
            token.offset
        );
    }
}

/// Asserts that token texts are ordered, disjoint slices of `source` and
/// that the final `EndOfInput` reaches its end
pub fn assert_covers_source(source: &str) {
    let result = scan(source);
    let mut last_end = 0;

    for token in &result.tokens {
        assert!(
            token.byte_offset >= last_end,
            "token {:?} at byte {} overlaps the previous one ending at {}",
            token.kind,
            token.byte_offset,
            last_end
        );
        let end = token.byte_offset + token.text.len();
        assert_eq!(&source[token.byte_offset..end], token.text);
        last_end = end;
    }

    assert_eq!(last_end, source.len(), "the final EndOfInput must sit at the end");
}

/// Asserts that `source` scans without any diagnostic
pub fn assert_clean(source: &str) {
    let result = scan(source);
    if !result.diagnostics.is_empty() || result.nested {
        panic!(
            "Expected a clean scan, but got diagnostics:\n{:?}",
            result.diagnostics
        );
    }
}

/// Asserts that `source` is reported as truncated with `code`
pub fn assert_truncated(source: &str, code: ErrorCode) {
    let result = scan(source);
    if !result.nested {
        panic!("Expected {:?} to end inside an entry", source);
    }
    let codes: Vec<_> = result.diagnostics.iter().filter_map(|d| d.code).collect();
    if !codes.contains(&code) {
        panic!("Expected diagnostic {} for {:?}, got {:?}", code, source, codes);
    }
}

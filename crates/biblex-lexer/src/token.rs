//! Tokens for BibTeX sources
//!
//! Defines every token kind the lexer can produce and the token value
//! itself: a kind, the raw source slice it covers, and where it starts.

use biblex_error::span::{Position, Span};
use std::fmt;

/// All token kinds produced while scanning a BibTeX buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of the buffer. Also emitted when the buffer ends inside an
    /// entry, a braced string, a quoted string or a text run.
    EndOfInput,
    /// `@` - starts an entry
    At,
    /// Entry type keyword. Never produced by the lexer; a consumer retags
    /// the `Text` token after `@` with [`Token::into_entry_type`].
    EntryType,
    /// `{` opening an entry
    OpeningBrace,
    /// `}` closing an entry
    ClosingBrace,
    /// Entry type, citation key, field name or bare value
    Text,
    /// `,`
    Comma,
    /// `=`
    Equals,
    /// Contents of a `"..."` value, without the quotes
    QuotedString,
    /// Contents of a `{...}` value, without the outer braces
    BracedString,
    /// `#` - string concatenation
    Hash,
    /// A character inside an entry with no meaning to the lexer
    Ignore,
}

impl TokenKind {
    /// Single-character structural tokens
    pub fn is_punctuation(&self) -> bool {
        matches!(
            self,
            TokenKind::At
                | TokenKind::OpeningBrace
                | TokenKind::ClosingBrace
                | TokenKind::Comma
                | TokenKind::Equals
                | TokenKind::Hash
        )
    }

    /// Tokens whose text is a field value
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            TokenKind::Text | TokenKind::QuotedString | TokenKind::BracedString
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::EndOfInput => "EndOfInput",
            TokenKind::At => "At",
            TokenKind::EntryType => "EntryType",
            TokenKind::OpeningBrace => "OpeningBrace",
            TokenKind::ClosingBrace => "ClosingBrace",
            TokenKind::Text => "Text",
            TokenKind::Comma => "Comma",
            TokenKind::Equals => "Equals",
            TokenKind::QuotedString => "QuotedString",
            TokenKind::BracedString => "BracedString",
            TokenKind::Hash => "Hash",
            TokenKind::Ignore => "Ignore",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::EndOfInput => write!(f, "EOF"),
            TokenKind::At => write!(f, "@"),
            TokenKind::OpeningBrace => write!(f, "{{"),
            TokenKind::ClosingBrace => write!(f, "}}"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Equals => write!(f, "="),
            TokenKind::Hash => write!(f, "#"),
            TokenKind::EntryType => write!(f, "entry type"),
            TokenKind::Text => write!(f, "text"),
            TokenKind::QuotedString => write!(f, "quoted string"),
            TokenKind::BracedString => write!(f, "braced string"),
            TokenKind::Ignore => write!(f, "ignored character"),
        }
    }
}

/// A token with its raw text and location in the buffer
///
/// The text borrows the immutable source buffer, so a token is a frozen
/// snapshot that stays valid however far the lexer advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// Exact source slice, no escape interpretation
    pub text: &'src str,
    /// Location in the buffer; `span.start` is the first character
    pub span: Span,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, span: Span) -> Self {
        Self { kind, text, span }
    }

    /// Checks if the token is of a specific kind
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Checks if it is end of input
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }

    /// Line of the first character (1-indexed)
    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    /// Column of the first character (1-indexed)
    pub fn column(&self) -> u32 {
        self.span.start.column
    }

    /// Absolute character index of the first character
    pub fn offset(&self) -> usize {
        self.span.start.offset
    }

    /// Byte index of the first character in the UTF-8 buffer
    pub fn byte_offset(&self) -> usize {
        self.span.start.byte
    }

    pub fn start(&self) -> Position {
        self.span.start
    }

    /// Retags a `Text` token as the entry type keyword it stands for
    pub fn into_entry_type(self) -> Self {
        match self.kind {
            TokenKind::Text => Self {
                kind: TokenKind::EntryType,
                ..self
            },
            _ => self,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_value() || self.kind == TokenKind::EntryType {
            write!(f, "{} {:?} at {}:{}", self.kind, self.text, self.line(), self.column())
        } else {
            write!(f, "{} at {}:{}", self.kind, self.line(), self.column())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_token(text: &str) -> Token<'_> {
        let chars = text.chars().count();
        let start = Position::new(1, 2, 1, 1);
        let end = Position::new(1, 2 + chars as u32, 1 + chars, 1 + text.len());
        Token::new(TokenKind::Text, text, Span::new(start, end, 0))
    }

    #[test]
    fn test_accessors_report_start() {
        let token = text_token("article");
        assert_eq!(token.line(), 1);
        assert_eq!(token.column(), 2);
        assert_eq!(token.offset(), 1);
        assert_eq!(token.span.len(), 7);
    }

    #[test]
    fn test_offset_counts_characters_byte_offset_counts_bytes() {
        let start = Position::new(1, 8, 7, 8);
        let end = Position::new(1, 9, 8, 9);
        let comma = Token::new(TokenKind::Comma, ",", Span::new(start, end, 0));

        assert_eq!(comma.offset(), 7);
        assert_eq!(comma.byte_offset(), 8);
    }

    #[test]
    fn test_into_entry_type_only_retags_text() {
        let token = text_token("book").into_entry_type();
        assert_eq!(token.kind, TokenKind::EntryType);
        assert_eq!(token.text, "book");

        let comma = Token::new(TokenKind::Comma, ",", Span::default());
        assert_eq!(comma.into_entry_type().kind, TokenKind::Comma);
    }

    #[test]
    fn test_display() {
        assert_eq!(text_token("key").to_string(), "text \"key\" at 1:2");
        let brace = Token::new(TokenKind::OpeningBrace, "{", Span::point(Position::new(3, 9, 20, 20), 0));
        assert_eq!(brace.to_string(), "{ at 3:9");
    }

    #[test]
    fn test_kind_groups() {
        assert!(TokenKind::Hash.is_punctuation());
        assert!(!TokenKind::Ignore.is_punctuation());
        assert!(TokenKind::BracedString.is_value());
        assert!(!TokenKind::EndOfInput.is_value());
    }
}

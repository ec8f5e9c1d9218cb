//! Lexer for BibTeX sources
//!
//! Converts a fully loaded buffer into a pull-based stream of tokens. Two
//! modes govern scanning: Root between entries, where anything but `@`,
//! comments and bare words is dropped silently, and Entry inside
//! `@type{...}`, where every character ends up in some token.

use crate::mode::{Mode, ModeStack};
use crate::token::{Token, TokenKind};
use biblex_error::{
    span::{Position, Span},
    LexFault,
};
use std::iter::FusedIterator;
use tracing::{debug, trace};

/// Characters that end a text run
fn is_text_delimiter(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\n' | '\r' | ',' | '=' | '"' | '#' | '%' | '{' | '}' | '@'
    )
}

fn starts_root_text(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn starts_entry_text(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '('
}

/// What the lexer was scanning when the buffer ran out while nested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// Between tokens of an entry
    Entry,
    /// Inside a `{...}` value
    BracedString,
    /// Inside a `"..."` value
    QuotedString,
    /// Inside a text run within an entry
    Text,
}

/// The BibTeX lexer
///
/// One instance scans one buffer; it is driven by [`Lexer::next_token`]
/// until an `EndOfInput` token comes back. Further calls keep returning
/// `EndOfInput` until [`Lexer::reset`] rewinds to the start.
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    /// Buffer being scanned
    source: &'src str,
    /// Source file ID carried into every span
    file_id: u32,
    /// Next character to read. Only `bump` moves it.
    cursor: Position,
    /// Where the token being built began
    lexeme_start: Position,
    modes: ModeStack,
    /// `{`/`}` nesting since the current entry's `@`
    entry_brace_depth: u32,
    /// Position of the `@` that opened the current entry
    entry_start: Option<Position>,
    /// Set by the first `EndOfInput` emitted while nested
    truncation: Option<Truncation>,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer positioned at the start of `source`
    pub fn new(source: &'src str, file_id: u32) -> Self {
        Self {
            source,
            file_id,
            cursor: Position::start(),
            lexeme_start: Position::start(),
            modes: ModeStack::new(),
            entry_brace_depth: 0,
            entry_start: None,
            truncation: None,
        }
    }

    /// Rewinds to the start of the same buffer
    pub fn reset(&mut self) {
        debug!(file_id = self.file_id, len = self.source.len(), "lexer reset");
        *self = Self::new(self.source, self.file_id);
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn file_id(&self) -> u32 {
        self.file_id
    }

    /// Mode on top of the stack
    pub fn mode(&self) -> Mode {
        self.modes.current()
    }

    /// Number of modes on the stack; 1 means only Root
    pub fn mode_depth(&self) -> usize {
        self.modes.depth()
    }

    pub fn entry_brace_depth(&self) -> u32 {
        self.entry_brace_depth
    }

    /// True while inside an entry. An `EndOfInput` seen in this state
    /// means the buffer is truncated.
    pub fn is_nested(&self) -> bool {
        self.modes.depth() > 1
    }

    /// Position of the next unread character
    pub fn position(&self) -> Position {
        self.cursor
    }

    /// Position of the `@` that opened the entry being scanned
    pub fn entry_start(&self) -> Option<Position> {
        self.entry_start
    }

    /// What was being scanned when input ran out while nested
    pub fn truncation(&self) -> Option<Truncation> {
        self.truncation
    }

    /// Returns the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source[self.cursor.byte..].chars().next()
    }

    /// Returns the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source[self.cursor.byte..].chars().nth(1)
    }

    /// Advances past one character, or past `\r\n` as a single line break
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;

        match ch {
            '\n' => self.cursor.newline(1),
            '\r' if self.peek_next() == Some('\n') => self.cursor.newline(2),
            '\r' => self.cursor.newline(1),
            _ => self.cursor.advance(ch),
        }

        Some(ch)
    }

    /// Skips spaces, tabs and line breaks
    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\n' | '\r') = self.peek() {
            self.bump();
        }
    }

    /// Skips the rest of the physical line, terminator included
    fn skip_line(&mut self) {
        while let Some(ch) = self.bump() {
            if ch == '\n' || ch == '\r' {
                break;
            }
        }
    }

    fn start_lexeme(&mut self) {
        self.lexeme_start = self.cursor;
    }

    /// Builds a token from the lexeme start to the cursor
    fn make_token(&self, kind: TokenKind) -> Token<'src> {
        let source = self.source;
        let span = Span::new(self.lexeme_start, self.cursor, self.file_id);

        trace!(
            kind = kind.name(),
            line = span.start.line,
            column = span.start.column,
            "token"
        );

        Token::new(kind, &source[span.range()], span)
    }

    fn end_of_input(&mut self, truncation: Option<Truncation>) -> Token<'src> {
        if self.truncation.is_none() {
            self.truncation = truncation;
        }
        self.make_token(TokenKind::EndOfInput)
    }

    fn enter_entry(&mut self) {
        self.modes.push(Mode::Entry);
        self.entry_start = Some(self.cursor);
        trace!(line = self.cursor.line, column = self.cursor.column, "enter entry mode");
    }

    fn leave_entry(&mut self) -> Result<(), LexFault> {
        match self.modes.pop() {
            Some(left) => {
                trace!(left = %left, restored = %self.modes.current(), "leave mode");
                self.entry_start = None;
                Ok(())
            }
            None => Err(LexFault::ModeStackUnderflow {
                mode: self.modes.current().as_str(),
                at: self.cursor,
            }),
        }
    }

    /// Reads the next token
    pub fn next_token(&mut self) -> Result<Token<'src>, LexFault> {
        match self.modes.current() {
            Mode::Root => Ok(self.next_root_token()),
            Mode::Entry => self.next_entry_token(),
        }
    }

    fn next_root_token(&mut self) -> Token<'src> {
        loop {
            self.skip_whitespace();
            self.start_lexeme();

            let Some(ch) = self.peek() else {
                return self.end_of_input(None);
            };

            match ch {
                '@' => {
                    self.enter_entry();
                    self.bump();
                    return self.make_token(TokenKind::At);
                }
                '%' => self.skip_line(),
                ch if starts_root_text(ch) => return self.read_text(),
                // Anything else between entries is dropped
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn next_entry_token(&mut self) -> Result<Token<'src>, LexFault> {
        self.skip_whitespace();
        self.start_lexeme();

        let Some(ch) = self.peek() else {
            return Ok(self.end_of_input(Some(Truncation::Entry)));
        };

        let token = match ch {
            '{' => {
                self.entry_brace_depth += 1;
                self.bump();

                if self.entry_brace_depth == 1 {
                    self.make_token(TokenKind::OpeningBrace)
                } else {
                    self.read_braced_string()
                }
            }
            '}' => {
                self.bump();
                let token = self.make_token(TokenKind::ClosingBrace);

                if self.entry_brace_depth == 0 {
                    // `@type}`: no opening brace to match, stay in the entry
                    trace!(line = token.line(), column = token.column(), "unmatched closing brace");
                } else {
                    self.entry_brace_depth -= 1;
                    if self.entry_brace_depth == 0 {
                        self.leave_entry()?;
                    }
                }

                token
            }
            ',' => self.single(TokenKind::Comma),
            '=' => self.single(TokenKind::Equals),
            '#' => self.single(TokenKind::Hash),
            '"' => self.read_quoted_string(),
            ch if starts_entry_text(ch) => self.read_text(),
            _ => self.single(TokenKind::Ignore),
        };

        Ok(token)
    }

    /// Consumes one character and emits it as `kind`
    fn single(&mut self, kind: TokenKind) -> Token<'src> {
        self.bump();
        self.make_token(kind)
    }

    /// Reads the contents of a `{...}` value; its `{` is already consumed
    fn read_braced_string(&mut self) -> Token<'src> {
        self.start_lexeme();
        let mut local_depth = 0u32;

        loop {
            match self.peek() {
                None => return self.end_of_input(Some(Truncation::BracedString)),
                Some('}') if local_depth == 0 => {
                    let token = self.make_token(TokenKind::BracedString);
                    self.entry_brace_depth -= 1;
                    self.bump();
                    return token;
                }
                Some('}') => local_depth -= 1,
                Some('{') => local_depth += 1,
                Some(_) => {}
            }

            self.bump();
        }
    }

    /// Reads the contents of a `"..."` value. `\"` is not an escape.
    fn read_quoted_string(&mut self) -> Token<'src> {
        self.bump();
        self.start_lexeme();

        loop {
            match self.peek() {
                None => return self.end_of_input(Some(Truncation::QuotedString)),
                Some('"') => {
                    let token = self.make_token(TokenKind::QuotedString);
                    self.bump();
                    return token;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Reads a text run. The lexeme start is already set and the first
    /// character is known to qualify.
    fn read_text(&mut self) -> Token<'src> {
        self.bump();

        loop {
            match self.peek() {
                None => {
                    let truncation = match self.modes.current() {
                        Mode::Entry => Some(Truncation::Text),
                        Mode::Root => None,
                    };
                    return self.end_of_input(truncation);
                }
                Some(ch) if is_text_delimiter(ch) => return self.make_token(TokenKind::Text),
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Iterates up to and including the first `EndOfInput`
    pub fn tokens(&mut self) -> Tokens<'_, 'src> {
        Tokens {
            lexer: self,
            done: false,
        }
    }

    /// Scans the rest of the buffer
    pub fn tokenize(&mut self) -> Result<Vec<Token<'src>>, LexFault> {
        self.tokens().collect()
    }
}

/// Token iterator returned by [`Lexer::tokens`]
///
/// Ends after yielding `EndOfInput` or a fault.
#[derive(Debug)]
pub struct Tokens<'lx, 'src> {
    lexer: &'lx mut Lexer<'src>,
    done: bool,
}

impl<'src> Iterator for Tokens<'_, 'src> {
    type Item = Result<Token<'src>, LexFault>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.lexer.next_token();
        self.done = !matches!(&result, Ok(token) if !token.is_eof());
        Some(result)
    }
}

impl FusedIterator for Tokens<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lex(source: &str) -> Vec<(TokenKind, &str)> {
        Lexer::new(source, 0)
            .tokenize()
            .expect("no fault")
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn positions(source: &str) -> Vec<(TokenKind, u32, u32, usize)> {
        Lexer::new(source, 0)
            .tokenize()
            .expect("no fault")
            .into_iter()
            .map(|t| (t.kind, t.line(), t.column(), t.offset()))
            .collect()
    }

    #[test]
    fn test_article_entry() {
        let tokens = lex(r#"@article{key, author = {Jones}, title = "A Title"}"#);
        assert_eq!(
            tokens,
            vec![
                (TokenKind::At, "@"),
                (TokenKind::Text, "article"),
                (TokenKind::OpeningBrace, "{"),
                (TokenKind::Text, "key"),
                (TokenKind::Comma, ","),
                (TokenKind::Text, "author"),
                (TokenKind::Equals, "="),
                (TokenKind::BracedString, "Jones"),
                (TokenKind::Comma, ","),
                (TokenKind::Text, "title"),
                (TokenKind::Equals, "="),
                (TokenKind::QuotedString, "A Title"),
                (TokenKind::ClosingBrace, "}"),
                (TokenKind::EndOfInput, ""),
            ]
        );
    }

    #[test]
    fn test_comment_line_is_invisible() {
        let mut lexer = Lexer::new("% comment\n@book{b,}", 0);
        let first = lexer.next_token().unwrap();
        assert_eq!(first.kind, TokenKind::At);
        assert_eq!((first.line(), first.column(), first.offset()), (2, 1, 10));

        let kinds: Vec<_> = lex("% comment\r\n%another\r@book{b,}")
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::At,
                TokenKind::Text,
                TokenKind::OpeningBrace,
                TokenKind::Text,
                TokenKind::Comma,
                TokenKind::ClosingBrace,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_percent_inside_entry_is_ignored_not_comment() {
        let tokens = lex("@x{k, % not a comment\n}");
        assert_eq!(tokens[5], (TokenKind::Ignore, "%"));
        assert_eq!(tokens[6], (TokenKind::Text, "not"));
    }

    #[test]
    fn test_nested_braced_string() {
        let tokens = lex("@misc{x, note = {outer {inner} still outer}}");
        assert_eq!(tokens[7], (TokenKind::BracedString, "outer {inner} still outer"));
        assert_eq!(tokens[8], (TokenKind::ClosingBrace, "}"));
        assert_eq!(tokens[9], (TokenKind::EndOfInput, ""));
    }

    #[test]
    fn test_brace_depth_returns_to_root() {
        let mut lexer = Lexer::new("@misc{x, note = {a {b {c}} d}} @book{y}", 0);
        let tokens = lexer.tokenize().unwrap();

        let at_positions: Vec<_> = tokens
            .iter()
            .filter(|t| t.is(TokenKind::At))
            .map(|t| t.offset())
            .collect();
        assert_eq!(at_positions, vec![0, 31]);
        assert_eq!(lexer.mode(), Mode::Root);
        assert_eq!(lexer.entry_brace_depth(), 0);
        assert!(!lexer.is_nested());
    }

    #[test]
    fn test_unterminated_braced_string() {
        let mut lexer = Lexer::new("@misc{x, note = {unterminated", 0);
        let tokens = lexer.tokenize().unwrap();
        let last = tokens.last().unwrap();

        assert_eq!(last.kind, TokenKind::EndOfInput);
        assert_eq!(last.text, "unterminated");
        assert_eq!(lexer.mode(), Mode::Entry);
        assert_eq!(lexer.mode_depth(), 2);
        assert_eq!(lexer.entry_brace_depth(), 2);
        assert_eq!(lexer.truncation(), Some(Truncation::BracedString));
        assert_eq!(lexer.entry_start(), Some(Position::start()));
    }

    #[test]
    fn test_unterminated_entry_and_quote() {
        let mut lexer = Lexer::new("@book{b, title = \"Open", 0);
        lexer.tokenize().unwrap();
        assert_eq!(lexer.truncation(), Some(Truncation::QuotedString));

        let mut lexer = Lexer::new("@book{b, year = 2001,\n", 0);
        lexer.tokenize().unwrap();
        assert_eq!(lexer.truncation(), Some(Truncation::Entry));
        assert!(lexer.is_nested());
    }

    #[test]
    fn test_text_reaching_end_is_end_of_input() {
        let mut lexer = Lexer::new("@article", 0);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(
            tokens.iter().map(|t| (t.kind, t.text)).collect::<Vec<_>>(),
            vec![(TokenKind::At, "@"), (TokenKind::EndOfInput, "article")]
        );
        assert_eq!(lexer.truncation(), Some(Truncation::Text));

        // Trailing junk between entries is not a truncation
        let mut lexer = Lexer::new("@a{b}\ntrailing", 0);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens.last().map(|t| t.text), Some("trailing"));
        assert_eq!(lexer.truncation(), None);
        assert!(!lexer.is_nested());
    }

    #[test]
    fn test_quoted_string_has_no_escapes() {
        let mut lexer = Lexer::new(r#"@x{k, t = "a\"b"}"#, 0);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[7].kind, TokenKind::QuotedString);
        assert_eq!(tokens[7].text, "a\\");
        assert_eq!((tokens[8].kind, tokens[8].text), (TokenKind::Text, "b"));
        assert_eq!(lexer.truncation(), Some(Truncation::QuotedString));
    }

    #[test]
    fn test_quoted_string_spans_lines() {
        let tokens = positions("@x{k, t = \"a\n  b\"}");
        assert_eq!(tokens[7], (TokenKind::QuotedString, 1, 12, 11));
        assert_eq!(tokens[8], (TokenKind::ClosingBrace, 2, 5, 17));
    }

    #[test]
    fn test_root_noise_is_silent_entry_noise_is_ignore() {
        let tokens = lex("junk! 123 ~ @x{k, ; a=1}");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Text, "junk!"),
                (TokenKind::At, "@"),
                (TokenKind::Text, "x"),
                (TokenKind::OpeningBrace, "{"),
                (TokenKind::Text, "k"),
                (TokenKind::Comma, ","),
                (TokenKind::Ignore, ";"),
                (TokenKind::Text, "a"),
                (TokenKind::Equals, "="),
                (TokenKind::Text, "1"),
                (TokenKind::ClosingBrace, "}"),
                (TokenKind::EndOfInput, ""),
            ]
        );
    }

    #[test]
    fn test_concatenation_and_parenthesis_text() {
        let tokens = lex("@string{j = jan # \" 1\"} @x{(k)}");
        assert_eq!(tokens[5], (TokenKind::Text, "jan"));
        assert_eq!(tokens[6], (TokenKind::Hash, "#"));
        assert_eq!(tokens[7], (TokenKind::QuotedString, " 1"));
        assert_eq!(tokens[12], (TokenKind::Text, "(k)"));
    }

    #[test]
    fn test_closing_brace_before_opening_brace() {
        let mut lexer = Lexer::new("@}{k}", 0);
        let kinds: Vec<_> = lexer.tokenize().unwrap().into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::At,
                TokenKind::ClosingBrace,
                TokenKind::OpeningBrace,
                TokenKind::Text,
                TokenKind::ClosingBrace,
                TokenKind::EndOfInput,
            ]
        );
        assert_eq!(lexer.mode(), Mode::Root);

        let mut lexer = Lexer::new("@misc} {k}", 0);
        lexer.next_token().unwrap();
        assert_eq!(lexer.next_token().unwrap().text, "misc");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::ClosingBrace);
        assert_eq!(lexer.entry_brace_depth(), 0);
        assert_eq!(lexer.mode(), Mode::Entry);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::OpeningBrace);
        assert_eq!(lexer.entry_brace_depth(), 1);
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = positions("@a{k,\r\n  t = {x\ry},\n  u = 1}");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::At, 1, 1, 0),
                (TokenKind::Text, 1, 2, 1),
                (TokenKind::OpeningBrace, 1, 3, 2),
                (TokenKind::Text, 1, 4, 3),
                (TokenKind::Comma, 1, 5, 4),
                (TokenKind::Text, 2, 3, 9),
                (TokenKind::Equals, 2, 5, 11),
                (TokenKind::BracedString, 2, 8, 14),
                (TokenKind::Comma, 3, 3, 18),
                (TokenKind::Text, 4, 3, 22),
                (TokenKind::Equals, 4, 5, 24),
                (TokenKind::Text, 4, 7, 26),
                (TokenKind::ClosingBrace, 4, 8, 27),
                (TokenKind::EndOfInput, 4, 9, 28),
            ]
        );
    }

    #[test]
    fn test_columns_count_characters() {
        let mut lexer = Lexer::new("@misc{k, author = {Müller}, y = 1}", 0);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[7].text, "Müller");
        // "Müller" is 6 characters but 7 bytes
        assert_eq!((tokens[8].column(), tokens[8].offset()), (27, 26));
        assert_eq!(tokens[8].byte_offset(), 27);
    }

    #[test]
    fn test_offsets_are_character_indices() {
        let source = r#"@misc{k, author = {Müller}, y = 1}
@book{Ærø, t = "ß"}"#;
        let tokens = Lexer::new(source, 0).tokenize().unwrap();

        for token in &tokens {
            assert_eq!(token.offset(), source[..token.byte_offset()].chars().count(), "{}", token);
            assert_eq!(token.text, &source[token.span.range()]);
        }

        let last = tokens.last().unwrap();
        assert_eq!(last.offset(), source.chars().count());
        assert_eq!(last.byte_offset(), source.len());
    }

    #[test]
    fn test_end_of_input_is_sticky() {
        let mut lexer = Lexer::new("@x{k}", 0);
        lexer.tokenize().unwrap();

        for _ in 0..3 {
            let token = lexer.next_token().unwrap();
            assert!(token.is_eof());
            assert_eq!(token.offset(), 5);
        }
    }

    #[test]
    fn test_reset_rescans_identically() {
        let source = "@a{k, t = {x}}\n% c\n@b{j, u = \"y\" # z}";
        let mut lexer = Lexer::new(source, 0);
        let first = lexer.tokenize().unwrap();

        lexer.reset();
        assert_eq!(lexer.position(), Position::start());
        assert_eq!(lexer.mode(), Mode::Root);
        let second = lexer.tokenize().unwrap();

        let fresh = Lexer::new(source, 0).tokenize().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, fresh);
    }

    #[test]
    fn test_tokens_stop_after_end_of_input() {
        let mut lexer = Lexer::new("@x{k}", 0);
        let mut tokens = lexer.tokens();
        assert_eq!(tokens.by_ref().count(), 6);
        assert!(tokens.next().is_none());
    }

    #[test]
    fn test_token_texts_are_source_slices() {
        let source = "x @a{k, t = {x}, u = \"q\" # v}\t~ % c\n @b{z}";
        let tokens = Lexer::new(source, 0).tokenize().unwrap();

        let mut last_end = 0;
        for token in &tokens {
            assert!(token.byte_offset() >= last_end, "tokens overlap at {}", token);
            assert_eq!(token.text, &source[token.span.range()]);
            last_end = token.span.end.byte;
        }
        assert_eq!(last_end, source.len());
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert_eq!(lex(""), vec![(TokenKind::EndOfInput, "")]);
        assert_eq!(
            positions(" \n\t\r\n"),
            vec![(TokenKind::EndOfInput, 3, 1, 5)]
        );
    }
}

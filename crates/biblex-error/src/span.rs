//! Span - Source text location
//!
//! A `Position` is a single point in a BibTeX buffer; a `Span` is the
//! region a token covers. Both are plain `Copy` values so a token keeps a
//! frozen snapshot of where it came from.

/// A point in the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Line (1-indexed)
    pub line: u32,
    /// Column (1-indexed, counted in characters)
    pub column: u32,
    /// Absolute character index from the beginning of the buffer
    pub offset: usize,
    /// Byte index of the same point, for slicing the UTF-8 buffer
    pub byte: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize, byte: usize) -> Self {
        Self {
            line,
            column,
            offset,
            byte,
        }
    }

    /// The position of the first character of a buffer
    pub fn start() -> Self {
        Self::new(1, 1, 0, 0)
    }

    /// Moves past one character that is not a line terminator
    pub fn advance(&mut self, ch: char) {
        self.offset += 1;
        self.byte += ch.len_utf8();
        self.column += 1;
    }

    /// Moves past a line terminator of `len` characters (`\n`, `\r` or
    /// `\r\n`). Terminators are ASCII, so bytes and characters agree.
    pub fn newline(&mut self, len: usize) {
        self.offset += len;
        self.byte += len;
        self.line += 1;
        self.column = 1;
    }
}

/// A region in the source buffer (start to end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
    /// Source file ID (to support multiple buffers)
    pub file_id: u32,
}

impl Span {
    pub fn new(start: Position, end: Position, file_id: u32) -> Self {
        Self { start, end, file_id }
    }

    /// Creates an empty span at a single position
    pub fn point(pos: Position, file_id: u32) -> Self {
        Self::new(pos, pos, file_id)
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte range suitable for slicing the source buffer
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.byte..self.end.byte
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_span_len_and_range() {
        let span = Span::new(Position::start(), Position::new(1, 10, 9, 9), 0);
        assert_eq!(span.len(), 9);
        assert_eq!(span.range(), 0..9);
        assert!(Span::point(Position::start(), 0).is_empty());
    }

    #[test]
    fn test_position_advance_counts_chars_and_bytes() {
        let mut pos = Position::start();
        pos.advance('é');
        assert_eq!((pos.column, pos.offset, pos.byte), (2, 1, 2));

        pos.newline(2);
        assert_eq!(pos, Position::new(2, 1, 3, 4));
    }

    #[test]
    fn test_non_ascii_span_len_is_in_characters() {
        let mut end = Position::start();
        for ch in "Müller".chars() {
            end.advance(ch);
        }
        let span = Span::new(Position::start(), end, 0);

        assert_eq!(span.len(), 6);
        assert_eq!(span.range(), 0..7);
        assert_eq!(&"Müller"[span.range()], "Müller");
    }
}

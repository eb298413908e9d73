// Row/column accounting for error reporting
//
// Columns count bytes, not characters: a multi-byte UTF-8 sequence advances
// the column by its encoded length. Every physical line terminator advances
// the row, including terminators embedded in quoted or escaped content.
// A `\r\n` pair counts once.

use memchr::memchr2_iter;
use std::fmt;

/// Location of a byte in the input. Both coordinates start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: u64,
    pub column: u64,
}

impl Position {
    /// The position of the first byte of any input.
    pub const START: Position = Position { row: 1, column: 1 };

    pub fn new(row: u64, column: u64) -> Self {
        Position { row, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// Cumulative position of the next byte to be consumed.
#[derive(Debug, Clone)]
pub(crate) struct PositionTracker {
    row: u64,
    column: u64,
    /// Last consumed byte was `\r`, so a following `\n` does not start a new row
    after_cr: bool,
}

impl PositionTracker {
    pub fn new() -> Self {
        PositionTracker {
            row: 1,
            column: 1,
            after_cr: false,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }

    /// Account for a single consumed byte.
    #[inline]
    pub fn advance(&mut self, byte: u8) {
        match byte {
            b'\r' => {
                self.row += 1;
                self.column = 1;
                self.after_cr = true;
            }
            b'\n' => {
                if !self.after_cr {
                    self.row += 1;
                    self.column = 1;
                }
                self.after_cr = false;
            }
            _ => {
                self.column += 1;
                self.after_cr = false;
            }
        }
    }

    /// Account for `count` consumed bytes known to contain no line terminator.
    #[inline]
    pub fn advance_plain(&mut self, count: usize) {
        if count > 0 {
            self.column += count as u64;
            self.after_cr = false;
        }
    }

    /// Account for an arbitrary run of consumed bytes.
    pub fn advance_slice(&mut self, bytes: &[u8]) {
        let mut last = 0;
        for i in memchr2_iter(b'\r', b'\n', bytes) {
            self.advance_plain(i - last);
            self.advance(bytes[i]);
            last = i + 1;
        }
        self.advance_plain(bytes.len() - last);
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

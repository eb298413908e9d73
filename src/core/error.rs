// Error taxonomy
//
// Settings errors are raised before any byte is read and carry no position.
// Read errors are raised while tokenizing and always carry the position of
// the offending byte.

use super::position::Position;
use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Rejected reader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SettingsError {
    /// The delimiter is `\r` or `\n`.
    #[error("Bad field delimiter")]
    BadFieldDelimiter,

    /// The escape character is `\r`, `\n` or the delimiter.
    #[error("Bad escape character")]
    BadEscapeCharacter,

    /// The quote character is `\r`, `\n`, the delimiter, or combined with an escape character.
    #[error("Bad quote character")]
    BadQuoteCharacter,

    #[error("Too low source buffer size")]
    TooLowSourceBufferSize,

    #[error("Too low record buffer size")]
    TooLowRecordBufferSize,

    #[error("Too low maximum for fields in record")]
    TooLowMaxFields,
}

/// What went wrong while reading a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The record does not fit in the record buffer and expansion is disabled.
    TooBigRecord,
    /// The record has more fields than allowed and expansion is disabled.
    TooManyFields,
    /// A quote character where none may appear.
    UnexpectedCharacter,
    /// The underlying stream failed.
    UnreadableSource,
}

impl ErrorKind {
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::TooBigRecord => "Too big record",
            ErrorKind::TooManyFields => "Too many fields",
            ErrorKind::UnexpectedCharacter => "Unexpected character",
            ErrorKind::UnreadableSource => "Unreadable source",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A fatal error raised by [`Reader::read`](crate::Reader::read).
///
/// Displays as `"<row>:<column>: <description>"`. Once returned, the reader
/// keeps returning the same error.
#[derive(Debug, Clone, Error)]
#[error("{position}: {kind}")]
pub struct ReadError {
    kind: ErrorKind,
    position: Position,
    #[source]
    source: Option<Arc<io::Error>>,
}

impl ReadError {
    pub(crate) fn new(kind: ErrorKind, position: Position) -> Self {
        ReadError {
            kind,
            position,
            source: None,
        }
    }

    pub(crate) fn unreadable(position: Position, err: io::Error) -> Self {
        ReadError {
            kind: ErrorKind::UnreadableSource,
            position,
            source: Some(Arc::new(err)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// The I/O error behind an `UnreadableSource`, if any.
    pub fn io_error(&self) -> Option<&io::Error> {
        self.source.as_deref()
    }
}

impl PartialEq for ReadError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.position == other.position
    }
}

impl Eq for ReadError {}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Read(#[from] ReadError),

    /// Opening the source failed before any record was read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A convenience `Result` alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

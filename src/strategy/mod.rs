// Tokenizer strategies, one per quoting convention
//
// The reader picks a strategy once per record from the dialect and the
// strategy runs its own byte loop to the next record boundary. Strategies
// only ever stop at record boundaries, so every call starts a fresh record.
//
// Both strategies share the same contract:
// - bytes are taken from the source window chunk by chunk, refilling on demand
// - decoded bytes go to the record buffer
// - every consumed byte is reported to the position tracker
// - errors carry the position of the byte that caused them

pub mod escaped;
pub mod quoted;

use crate::core::error::{ErrorKind, ReadError};
use crate::core::position::PositionTracker;
use crate::core::record::{Overflow, RecordBuffer};
use crate::core::scanner::ByteClasses;
use crate::source::{FillError, SourceWindow};

/// How a record ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ending {
    /// A line terminator; `cr` is set when it was `\r`, which may still be
    /// followed by a `\n` belonging to the same terminator
    Terminator { cr: bool },
    EndOfInput,
}

/// Mutable parts of a reader lent to a strategy for one record.
pub(crate) struct Tokenizer<'t, 'a> {
    pub window: &'t mut SourceWindow<'a>,
    pub record: &'t mut RecordBuffer,
    pub tracker: &'t mut PositionTracker,
    pub classes: &'t ByteClasses,
}

pub(crate) fn overflow_error(overflow: Overflow, tracker: &PositionTracker) -> ReadError {
    let kind = match overflow {
        Overflow::Bytes => ErrorKind::TooBigRecord,
        Overflow::Fields => ErrorKind::TooManyFields,
    };
    ReadError::new(kind, tracker.position())
}

pub(crate) fn fill_error(err: FillError, tracker: &PositionTracker) -> ReadError {
    match err {
        FillError::Full => ReadError::new(ErrorKind::TooBigRecord, tracker.position()),
        FillError::Io(e) => ReadError::unreadable(tracker.position(), e),
    }
}

/// Refill the window, mapping failures to read errors at the current position.
pub(crate) fn fill(
    window: &mut SourceWindow<'_>,
    tracker: &PositionTracker,
) -> Result<usize, ReadError> {
    window.fill().map_err(|err| fill_error(err, tracker))
}

#[inline]
pub(crate) fn push(
    record: &mut RecordBuffer,
    tracker: &mut PositionTracker,
    byte: u8,
) -> Result<(), ReadError> {
    record
        .push_byte(byte)
        .map_err(|o| overflow_error(o, tracker))?;
    tracker.advance(byte);
    Ok(())
}

/// Copy a run of bytes into the open field. `plain` promises the run holds
/// no line terminators.
#[inline]
pub(crate) fn extend(
    record: &mut RecordBuffer,
    tracker: &mut PositionTracker,
    bytes: &[u8],
    plain: bool,
) -> Result<(), ReadError> {
    match record.extend(bytes) {
        Ok(()) => {
            if plain {
                tracker.advance_plain(bytes.len());
            } else {
                tracker.advance_slice(bytes);
            }
            Ok(())
        }
        Err(accepted) => {
            tracker.advance_slice(&bytes[..accepted]);
            Err(ReadError::new(ErrorKind::TooBigRecord, tracker.position()))
        }
    }
}

/// Close the open field at a delimiter and open the next one. The delimiter
/// itself is consumed only on success.
#[inline]
pub(crate) fn next_field(
    record: &mut RecordBuffer,
    tracker: &mut PositionTracker,
    delimiter: u8,
) -> Result<(), ReadError> {
    record.end_field().map_err(|o| overflow_error(o, tracker))?;
    record.open_field().map_err(|o| overflow_error(o, tracker))?;
    tracker.advance(delimiter);
    Ok(())
}

/// Close the last field of the record.
#[inline]
pub(crate) fn end_record(
    record: &mut RecordBuffer,
    tracker: &PositionTracker,
) -> Result<(), ReadError> {
    record.end_field().map_err(|o| overflow_error(o, tracker))
}

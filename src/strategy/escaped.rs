// Escape dialect (TSV style) and plain dialect
//
// The escape byte makes the next byte literal, whatever it is: delimiter,
// line terminator or the escape byte itself. Without an escape byte this is
// a plain split on delimiters and line terminators. An escape as the very
// last byte of the input is dropped.

use super::{end_record, extend, fill, next_field, push, Ending, Tokenizer};
use crate::core::error::ReadError;
use crate::core::scanner::Class;

pub(crate) fn read_record(tok: Tokenizer<'_, '_>) -> Result<Ending, ReadError> {
    let Tokenizer {
        window,
        record,
        tracker,
        classes,
    } = tok;

    let mut escaped = false;

    loop {
        let chunk = window.buffered();
        if chunk.is_empty() {
            if fill(window, tracker)? == 0 {
                end_record(record, tracker)?;
                return Ok(Ending::EndOfInput);
            }
            continue;
        }

        let mut i = 0;
        while i < chunk.len() {
            let byte = chunk[i];
            if escaped {
                push(record, tracker, byte)?;
                i += 1;
                escaped = false;
                continue;
            }

            let run = classes.plain_run(&chunk[i..]);
            if run > 0 {
                extend(record, tracker, &chunk[i..i + run], true)?;
                i += run;
                continue;
            }

            match classes.get(byte) {
                Class::Escape => {
                    tracker.advance_plain(1);
                    i += 1;
                    escaped = true;
                }
                Class::Delimiter => {
                    next_field(record, tracker, byte)?;
                    i += 1;
                }
                Class::Cr | Class::Lf => {
                    end_record(record, tracker)?;
                    tracker.advance(byte);
                    window.consume(i + 1);
                    return Ok(Ending::Terminator { cr: byte == b'\r' });
                }
                _ => {
                    push(record, tracker, byte)?;
                    i += 1;
                }
            }
        }

        let consumed = chunk.len();
        window.consume(consumed);
    }
}

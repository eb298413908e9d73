// Quote dialect (CSV style)
//
// A field that opens with the quote character runs until the quote recurs;
// delimiters and line terminators inside it are data and a doubled quote is
// one literal quote. Blanks before the opening quote are dropped and blanks
// after the closing quote are skipped. A quote anywhere else is an error.
//
// Input that ends inside a quoted span closes the span implicitly.

use super::{end_record, extend, fill, next_field, push, Ending, Tokenizer};
use crate::core::error::{ErrorKind, ReadError};
use crate::core::scanner::Class;
use memchr::memchr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Only blanks seen in the field so far
    FieldStart,
    Unquoted,
    Quoted,
    /// Just saw a quote inside a quoted span: either half of a doubled quote or the closing quote
    QuoteInQuoted,
    /// Blanks after a closing quote
    AfterQuoted,
}

pub(crate) fn read_record(tok: Tokenizer<'_, '_>, quote: u8) -> Result<Ending, ReadError> {
    let Tokenizer {
        window,
        record,
        tracker,
        classes,
    } = tok;

    let mut state = State::FieldStart;
    // A record holding one empty field collapses to no fields, unless that field was quoted
    let mut quoted = false;

    loop {
        let chunk = window.buffered();
        if chunk.is_empty() {
            if fill(window, tracker)? == 0 {
                end_record(record, tracker)?;
                if !quoted {
                    record.collapse_empty();
                }
                return Ok(Ending::EndOfInput);
            }
            continue;
        }

        let mut i = 0;
        while i < chunk.len() {
            let byte = chunk[i];
            let class = classes.get(byte);

            if state != State::Quoted && matches!(class, Class::Cr | Class::Lf) {
                end_record(record, tracker)?;
                tracker.advance(byte);
                if !quoted {
                    record.collapse_empty();
                }
                window.consume(i + 1);
                return Ok(Ending::Terminator { cr: byte == b'\r' });
            }

            match state {
                State::FieldStart => match class {
                    Class::Quote => {
                        record.truncate_field();
                        tracker.advance_plain(1);
                        i += 1;
                        quoted = true;
                        state = State::Quoted;
                    }
                    Class::Delimiter => {
                        next_field(record, tracker, byte)?;
                        i += 1;
                    }
                    Class::Blank => {
                        push(record, tracker, byte)?;
                        i += 1;
                    }
                    _ => {
                        push(record, tracker, byte)?;
                        i += 1;
                        state = State::Unquoted;
                    }
                },
                State::Unquoted => {
                    let run = classes.plain_run(&chunk[i..]);
                    if run > 0 {
                        extend(record, tracker, &chunk[i..i + run], true)?;
                        i += run;
                        continue;
                    }
                    match class {
                        Class::Quote => {
                            return Err(ReadError::new(
                                ErrorKind::UnexpectedCharacter,
                                tracker.position(),
                            ))
                        }
                        Class::Delimiter => {
                            next_field(record, tracker, byte)?;
                            i += 1;
                            state = State::FieldStart;
                        }
                        _ => {
                            push(record, tracker, byte)?;
                            i += 1;
                        }
                    }
                }
                State::Quoted => {
                    let rest = &chunk[i..];
                    match memchr(quote, rest) {
                        Some(0) => {
                            tracker.advance_plain(1);
                            i += 1;
                            state = State::QuoteInQuoted;
                        }
                        Some(n) => {
                            extend(record, tracker, &rest[..n], false)?;
                            i += n;
                        }
                        None => {
                            extend(record, tracker, rest, false)?;
                            i = chunk.len();
                        }
                    }
                }
                State::QuoteInQuoted => match class {
                    Class::Quote => {
                        push(record, tracker, byte)?;
                        i += 1;
                        state = State::Quoted;
                    }
                    Class::Delimiter => {
                        next_field(record, tracker, byte)?;
                        i += 1;
                        state = State::FieldStart;
                    }
                    Class::Blank => {
                        tracker.advance_plain(1);
                        i += 1;
                        state = State::AfterQuoted;
                    }
                    _ => {
                        return Err(ReadError::new(
                            ErrorKind::UnexpectedCharacter,
                            tracker.position(),
                        ))
                    }
                },
                State::AfterQuoted => match class {
                    Class::Delimiter => {
                        next_field(record, tracker, byte)?;
                        i += 1;
                        state = State::FieldStart;
                    }
                    Class::Blank => {
                        tracker.advance_plain(1);
                        i += 1;
                    }
                    _ => {
                        return Err(ReadError::new(
                            ErrorKind::UnexpectedCharacter,
                            tracker.position(),
                        ))
                    }
                },
            }
        }

        let consumed = chunk.len();
        window.consume(consumed);
    }
}

// Dialect and buffer limits
//
// A dialect is validated once and never changes for the lifetime of a reader.
// Exactly one quoting convention is active: quote (CSV style), escape
// (TSV style), or none.

use super::error::SettingsError;

pub const DEFAULT_SOURCE_WINDOW_SIZE: usize = 4 * 1024;
pub const DEFAULT_RECORD_BUFFER_SIZE: usize = 1024 * 1024;
pub const DEFAULT_MAX_FIELDS: usize = 1023;

pub const MIN_SOURCE_WINDOW_SIZE: usize = 1024;
pub const MIN_RECORD_BUFFER_SIZE: usize = 1024;
pub const MIN_MAX_FIELDS: usize = 1;

/// The active quoting convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quoting {
    /// Fields may be enclosed in this byte; a doubled quote is a literal quote.
    Quote(u8),
    /// This byte makes the following byte literal.
    Escape(u8),
    /// Neither; only the delimiter and line terminators are special.
    None,
}

/// Validated description of the input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    delimiter: u8,
    quoting: Quoting,
}

#[inline]
fn is_terminator(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

impl Dialect {
    /// Validate a delimiter and optional quote/escape characters.
    ///
    /// `Some(0)` is the same as `None`. Rules are checked in order and the
    /// first failure wins: delimiter, then escape, then quote. Supplying both
    /// a quote and an escape character is always `BadQuoteCharacter`.
    pub fn new(
        delimiter: u8,
        quote: Option<u8>,
        escape: Option<u8>,
    ) -> Result<Self, SettingsError> {
        let quote = quote.filter(|&q| q != 0);
        let escape = escape.filter(|&e| e != 0);

        if is_terminator(delimiter) {
            return Err(SettingsError::BadFieldDelimiter);
        }

        if let Some(escape) = escape {
            if is_terminator(escape) || escape == delimiter {
                return Err(SettingsError::BadEscapeCharacter);
            }
        }

        if let Some(quote) = quote {
            if is_terminator(quote) || quote == delimiter || escape == Some(quote) {
                return Err(SettingsError::BadQuoteCharacter);
            }
        }

        let quoting = match (quote, escape) {
            (Some(_), Some(_)) => return Err(SettingsError::BadQuoteCharacter),
            (Some(q), None) => Quoting::Quote(q),
            (None, Some(e)) => Quoting::Escape(e),
            (None, None) => Quoting::None,
        };

        Ok(Dialect {
            delimiter,
            quoting,
        })
    }

    /// Comma-separated values: `,` delimiter, `"` quote.
    pub fn csv() -> Self {
        Dialect {
            delimiter: b',',
            quoting: Quoting::Quote(b'"'),
        }
    }

    /// Tab-separated values: tab delimiter, no quoting.
    pub fn tsv() -> Self {
        Dialect {
            delimiter: b'\t',
            quoting: Quoting::None,
        }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn quoting(&self) -> Quoting {
        self.quoting
    }

    pub fn quote(&self) -> Option<u8> {
        match self.quoting {
            Quoting::Quote(q) => Some(q),
            _ => None,
        }
    }

    pub fn escape(&self) -> Option<u8> {
        match self.quoting {
            Quoting::Escape(e) => Some(e),
            _ => None,
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::csv()
    }
}

/// Buffer sizes and the growth policy.
///
/// With `expand` off, every size is a hard ceiling. With `expand` on, the
/// source window, record buffer and field table double whenever they fill up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limits {
    pub source_window_size: usize,
    pub record_buffer_size: usize,
    pub max_fields: usize,
    pub expand: bool,
}

impl Limits {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.source_window_size < MIN_SOURCE_WINDOW_SIZE {
            return Err(SettingsError::TooLowSourceBufferSize);
        }
        if self.record_buffer_size < MIN_RECORD_BUFFER_SIZE {
            return Err(SettingsError::TooLowRecordBufferSize);
        }
        if self.max_fields < MIN_MAX_FIELDS {
            return Err(SettingsError::TooLowMaxFields);
        }
        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            source_window_size: DEFAULT_SOURCE_WINDOW_SIZE,
            record_buffer_size: DEFAULT_RECORD_BUFFER_SIZE,
            max_fields: DEFAULT_MAX_FIELDS,
            expand: true,
        }
    }
}

/// Everything a reader needs besides its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Settings {
    pub dialect: Dialect,
    pub limits: Limits,
}

impl Settings {
    pub fn new(dialect: Dialect, limits: Limits) -> Self {
        Settings { dialect, limits }
    }

    pub fn csv() -> Self {
        Settings::new(Dialect::csv(), Limits::default())
    }

    pub fn tsv() -> Self {
        Settings::new(Dialect::tsv(), Limits::default())
    }

    /// The dialect is valid by construction; only the limits need checking.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.limits.validate()
    }
}

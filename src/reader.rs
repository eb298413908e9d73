// Reader: pulls one record per call out of a source
//
// Construction validates the settings before the source is touched, then
// wraps the source in a window. Each `read` starts a fresh record, hands the
// window, record buffer and tracker to the strategy chosen by the dialect,
// and returns a view over the assembled fields.
//
// After a fatal error the reader is spent: the same error comes back from
// every later call.

use crate::core::dialect::{Dialect, Limits, Quoting, Settings};
use crate::core::error::{ReadError, Result, SettingsError};
use crate::core::position::{Position, PositionTracker};
use crate::core::record::{Record, RecordBuffer};
use crate::core::scanner::ByteClasses;
use crate::source::{gzip, SourceWindow};
use crate::strategy::{escaped, fill, fill_error, quoted, Ending, Tokenizer};
use log::debug;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Record-at-a-time parser over a byte source.
pub struct Reader<'a> {
    window: SourceWindow<'a>,
    record: RecordBuffer,
    tracker: PositionTracker,
    classes: ByteClasses,
    settings: Settings,
    /// The last record ended on `\r`; a `\n` right after it belongs to the same terminator
    skip_lf: bool,
    done: bool,
    error: Option<ReadError>,
}

impl<'a> Reader<'a> {
    fn new(window: SourceWindow<'a>, settings: Settings) -> Self {
        debug!(
            "reader over {} source ({} byte window): delimiter {:?}, quoting {:?}, {:?}",
            window.kind(),
            window.capacity(),
            settings.dialect.delimiter() as char,
            settings.dialect.quoting(),
            settings.limits
        );
        Reader {
            window,
            record: RecordBuffer::new(&settings.limits),
            tracker: PositionTracker::new(),
            classes: ByteClasses::new(&settings.dialect),
            settings,
            skip_lf: false,
            done: false,
            error: None,
        }
    }

    /// Parse an in-memory buffer. The buffer is read in place.
    pub fn from_slice(data: &'a [u8], settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Reader::new(SourceWindow::memory(data), settings))
    }

    /// Parse a stream as-is, without gzip detection.
    pub fn from_reader<R: Read + 'a>(reader: R, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let window = SourceWindow::stream(Box::new(reader), &settings.limits);
        Ok(Reader::new(window, settings))
    }

    /// Parse a seekable stream, inflating it if it starts with the gzip magic.
    pub fn from_seekable<R: Read + Seek + 'a>(reader: R, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let reader = gzip::detect(reader)?;
        let window = SourceWindow::stream(reader, &settings.limits);
        Ok(Reader::new(window, settings))
    }

    /// Parse a gzip stream.
    pub fn from_gzip<R: Read + 'a>(reader: R, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let window = SourceWindow::stream(gzip::inflate(reader), &settings.limits);
        Ok(Reader::new(window, settings))
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` once the input is exhausted. The returned record
    /// borrows the reader and is gone after the next call.
    pub fn read(&mut self) -> std::result::Result<Option<Record<'_>>, ReadError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.done {
            return Ok(None);
        }

        match self.advance() {
            Ok(true) => Ok(Some(Record::new(&self.record))),
            Ok(false) => {
                self.done = true;
                Ok(None)
            }
            Err(err) => {
                debug!("reader stopped: {}", err);
                self.record.begin_record();
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Assemble the next record into the record buffer. Returns false at end of input.
    fn advance(&mut self) -> std::result::Result<bool, ReadError> {
        if self.skip_lf {
            self.skip_lf = false;
            let tracker = &self.tracker;
            let lf = matches!(
                self.window.peek(1).map_err(|e| fill_error(e, tracker))?,
                Some([b'\n'])
            );
            if lf {
                self.window.consume(1);
                self.tracker.advance(b'\n');
            }
        }

        if self.window.buffered().is_empty() && fill(&mut self.window, &self.tracker)? == 0 {
            return Ok(false);
        }

        self.record.begin_record();
        let tok = Tokenizer {
            window: &mut self.window,
            record: &mut self.record,
            tracker: &mut self.tracker,
            classes: &self.classes,
        };
        let ending = match self.settings.dialect.quoting() {
            Quoting::Quote(quote) => quoted::read_record(tok, quote)?,
            Quoting::Escape(_) | Quoting::None => escaped::read_record(tok)?,
        };

        match ending {
            Ending::Terminator { cr } => self.skip_lf = cr,
            Ending::EndOfInput => self.done = true,
        }
        Ok(true)
    }

    /// Position of the next byte to be read.
    pub fn position(&self) -> Position {
        self.tracker.position()
    }

    pub fn dialect(&self) -> &Dialect {
        &self.settings.dialect
    }

    /// Limits as configured; buffers may have grown past them under `expand`.
    pub fn limits(&self) -> &Limits {
        &self.settings.limits
    }

    /// Turn the reader into an iterator of owned records.
    pub fn into_records(self) -> IntoRecords<'a> {
        IntoRecords {
            reader: self,
            finished: false,
        }
    }
}

impl Reader<'static> {
    /// Open a file, inflating it if it is gzip.
    pub fn from_path<P: AsRef<Path>>(path: P, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let file = File::open(path.as_ref())?;
        debug!("opened {}", path.as_ref().display());
        Reader::from_seekable(file, settings)
    }
}

impl fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("source", &self.window.kind())
            .field("settings", &self.settings)
            .field("position", &self.tracker.position())
            .field("record_buffer_size", &self.record.limit())
            .field("max_fields", &self.record.max_fields())
            .field("done", &self.done)
            .field("error", &self.error)
            .finish()
    }
}

/// Owned iterator over the records of a [`Reader`].
///
/// Yields copies of each record. Stops after the end of input or after the
/// first error.
pub struct IntoRecords<'a> {
    reader: Reader<'a>,
    finished: bool,
}

impl<'a> IntoRecords<'a> {
    pub fn reader(&self) -> &Reader<'a> {
        &self.reader
    }
}

impl Iterator for IntoRecords<'_> {
    type Item = std::result::Result<Vec<Vec<u8>>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.reader.read() {
            Ok(Some(record)) => Some(Ok(record.to_vec())),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for IntoRecords<'_> {}

// ============================================================================
// Builder
// ============================================================================

/// Configures and opens a [`Reader`].
///
/// Defaults: `,` delimiter, `"` quote, no escape, expansion on, 4 KiB source
/// window, 1 MiB record buffer, 1023 fields.
#[derive(Debug, Clone)]
pub struct ReaderBuilder {
    delimiter: u8,
    quote: Option<u8>,
    escape: Option<u8>,
    limits: Limits,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        ReaderBuilder {
            delimiter: b',',
            quote: Some(b'"'),
            escape: None,
            limits: Limits::default(),
        }
    }
}

impl ReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing dialect and limits.
    pub fn with_settings(settings: Settings) -> Self {
        ReaderBuilder {
            delimiter: settings.dialect.delimiter(),
            quote: settings.dialect.quote(),
            escape: settings.dialect.escape(),
            limits: settings.limits,
        }
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// `None` or `Some(0)` disables quoting.
    pub fn quote(&mut self, quote: Option<u8>) -> &mut Self {
        self.quote = quote;
        self
    }

    /// `None` or `Some(0)` disables escaping. Setting an escape while a quote
    /// is set is rejected when the reader is opened.
    pub fn escape(&mut self, escape: Option<u8>) -> &mut Self {
        self.escape = escape;
        self
    }

    pub fn expand(&mut self, expand: bool) -> &mut Self {
        self.limits.expand = expand;
        self
    }

    pub fn source_window_size(&mut self, size: usize) -> &mut Self {
        self.limits.source_window_size = size;
        self
    }

    pub fn record_buffer_size(&mut self, size: usize) -> &mut Self {
        self.limits.record_buffer_size = size;
        self
    }

    pub fn max_fields(&mut self, max_fields: usize) -> &mut Self {
        self.limits.max_fields = max_fields;
        self
    }

    /// Validate the configuration. Dialect rules are checked before limits.
    pub fn settings(&self) -> std::result::Result<Settings, SettingsError> {
        let dialect = Dialect::new(self.delimiter, self.quote, self.escape)?;
        self.limits.validate()?;
        Ok(Settings::new(dialect, self.limits))
    }

    pub fn from_slice<'a>(&self, data: &'a [u8]) -> Result<Reader<'a>> {
        Reader::from_slice(data, self.settings()?)
    }

    pub fn from_reader<'a, R: Read + 'a>(&self, reader: R) -> Result<Reader<'a>> {
        Reader::from_reader(reader, self.settings()?)
    }

    pub fn from_seekable<'a, R: Read + Seek + 'a>(&self, reader: R) -> Result<Reader<'a>> {
        Reader::from_seekable(reader, self.settings()?)
    }

    pub fn from_gzip<'a, R: Read + 'a>(&self, reader: R) -> Result<Reader<'a>> {
        Reader::from_gzip(reader, self.settings()?)
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Reader<'static>> {
        Reader::from_path(path, self.settings()?)
    }
}

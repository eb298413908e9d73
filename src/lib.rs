// rustyfields - streaming delimited-text record reader
//
// Reads records of byte fields from CSV, TSV and similar delimited text,
// one record per call, with bounded memory.
//
// Dialects:
// - quote: fields may be enclosed in a quote character (CSV)
// - escape: an escape character makes the next byte literal (TSV variants)
// - plain: only the delimiter and line terminators are special
//
// Sources: in-memory slices, any `Read`, seekable streams with transparent
// gzip detection, explicit gzip streams, and files by path.

mod core;
mod reader;
mod source;
mod strategy;

pub use crate::core::dialect::{
    DEFAULT_MAX_FIELDS, DEFAULT_RECORD_BUFFER_SIZE, DEFAULT_SOURCE_WINDOW_SIZE, MIN_MAX_FIELDS,
    MIN_RECORD_BUFFER_SIZE, MIN_SOURCE_WINDOW_SIZE,
};
pub use crate::core::{
    Dialect, Error, ErrorKind, Fields, Limits, Position, Quoting, ReadError, Record, Result,
    Settings, SettingsError,
};
pub use crate::reader::{IntoRecords, Reader, ReaderBuilder};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

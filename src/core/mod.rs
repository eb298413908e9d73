// Core primitives shared by every tokenizer strategy

pub mod dialect;
pub mod error;
pub mod position;
pub mod record;
pub mod scanner;

pub use dialect::{Dialect, Limits, Quoting, Settings};
pub use error::{Error, ErrorKind, ReadError, Result, SettingsError};
pub use position::Position;
pub use record::{Fields, Record};

// Byte classification for the tokenizer.
//
// The dialect is folded into a 256-entry table once per reader, so the hot
// loops do one lookup per byte regardless of which characters are special.

use super::dialect::{Dialect, Quoting};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Class {
    Plain,
    /// Space or tab; only significant around quoted fields
    Blank,
    Delimiter,
    Quote,
    Escape,
    Cr,
    Lf,
}

pub(crate) struct ByteClasses {
    table: [Class; 256],
}

impl ByteClasses {
    pub fn new(dialect: &Dialect) -> Self {
        let mut table = [Class::Plain; 256];
        table[b' ' as usize] = Class::Blank;
        table[b'\t' as usize] = Class::Blank;
        table[b'\r' as usize] = Class::Cr;
        table[b'\n' as usize] = Class::Lf;
        match dialect.quoting() {
            Quoting::Quote(q) => table[q as usize] = Class::Quote,
            Quoting::Escape(e) => table[e as usize] = Class::Escape,
            Quoting::None => {}
        }
        // A blank delimiter keeps its delimiter meaning
        table[dialect.delimiter() as usize] = Class::Delimiter;
        ByteClasses { table }
    }

    #[inline]
    pub fn get(&self, byte: u8) -> Class {
        self.table[byte as usize]
    }

    /// Length of the leading run of bytes that are copied as-is.
    #[inline]
    pub fn plain_run(&self, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .position(|&b| !matches!(self.get(b), Class::Plain | Class::Blank))
            .unwrap_or(bytes.len())
    }
}

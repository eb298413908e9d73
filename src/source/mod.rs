// Source window: buffered view over the raw input
//
// In-memory input is its own window: nothing is copied and there is nothing
// to refill. Stream input is read in chunks into an owned buffer; unread
// bytes are compacted to the front before every refill, and the buffer only
// grows when a refill finds it completely full of unread bytes.

pub mod gzip;

use crate::core::dialect::Limits;
use log::{debug, trace};
use std::io::{self, Read};

/// Why a refill produced nothing.
#[derive(Debug)]
pub(crate) enum FillError {
    /// No free space left and expansion is disabled
    Full,
    Io(io::Error),
}

enum Input<'a> {
    Memory(&'a [u8]),
    Stream(Box<dyn Read + 'a>),
}

pub(crate) struct SourceWindow<'a> {
    input: Input<'a>,
    /// Owned storage for stream input; empty for memory input
    buf: Vec<u8>,
    read_pos: usize,
    fill_len: usize,
    expand: bool,
    /// The stream reported end of input; never read again
    eof: bool,
}

impl<'a> SourceWindow<'a> {
    pub fn memory(data: &'a [u8]) -> Self {
        SourceWindow {
            input: Input::Memory(data),
            buf: Vec::new(),
            read_pos: 0,
            fill_len: data.len(),
            expand: false,
            eof: true,
        }
    }

    pub fn stream(reader: Box<dyn Read + 'a>, limits: &Limits) -> Self {
        SourceWindow {
            input: Input::Stream(reader),
            buf: vec![0; limits.source_window_size],
            read_pos: 0,
            fill_len: 0,
            expand: limits.expand,
            eof: false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.input {
            Input::Memory(_) => "memory",
            Input::Stream(_) => "stream",
        }
    }

    /// Window capacity; for memory input, the input length.
    pub fn capacity(&self) -> usize {
        match self.input {
            Input::Memory(data) => data.len(),
            Input::Stream(_) => self.buf.len(),
        }
    }

    /// Bytes between the cursor and the end of the filled region.
    #[inline]
    pub fn buffered(&self) -> &[u8] {
        match &self.input {
            Input::Memory(data) => &data[self.read_pos..self.fill_len],
            Input::Stream(_) => &self.buf[self.read_pos..self.fill_len],
        }
    }

    #[inline]
    pub fn consume(&mut self, count: usize) {
        debug_assert!(self.read_pos + count <= self.fill_len);
        self.read_pos += count;
    }

    /// Read more bytes from the stream. Returns how many were added; zero
    /// means end of input.
    ///
    /// The reader only refills an empty window, since records stream into
    /// the record buffer chunk by chunk. Growth and `FillError::Full` are
    /// reached only by callers that refill with unread bytes still buffered.
    pub fn fill(&mut self) -> Result<usize, FillError> {
        let reader = match &mut self.input {
            Input::Stream(reader) if !self.eof => reader,
            _ => return Ok(0),
        };

        if self.read_pos > 0 {
            self.buf.copy_within(self.read_pos..self.fill_len, 0);
            self.fill_len -= self.read_pos;
            self.read_pos = 0;
        }

        if self.fill_len == self.buf.len() {
            if !self.expand {
                return Err(FillError::Full);
            }
            let capacity = self.buf.len() * 2;
            debug!("source window grows from {} to {} bytes", self.buf.len(), capacity);
            self.buf.resize(capacity, 0);
        }

        loop {
            match reader.read(&mut self.buf[self.fill_len..]) {
                Ok(0) => {
                    trace!("source reached end of input");
                    self.eof = true;
                    return Ok(0);
                }
                Ok(n) => {
                    self.fill_len += n;
                    trace!("source read {} bytes into window of {}", n, self.buf.len());
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(FillError::Io(e)),
            }
        }
    }

    /// Fill until at least `count` bytes are buffered or input ends.
    pub fn peek(&mut self, count: usize) -> Result<Option<&[u8]>, FillError> {
        while self.fill_len - self.read_pos < count {
            if self.fill()? == 0 {
                return Ok(None);
            }
        }
        Ok(Some(&self.buffered()[..count]))
    }
}

// Transparent gzip detection for seekable streams.
//
// The first two bytes are compared against the gzip magic and the stream is
// rewound before any parsing begins. Multi-member files are inflated in full.

use flate2::read::MultiGzDecoder;
use log::debug;
use std::io::{self, Read, Seek, SeekFrom};

pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Check whether `reader` starts with the gzip magic, leaving it where it was.
pub fn sniff<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let start = reader.stream_position()?;
    let mut magic = [0u8; 2];
    let mut filled = 0;
    while filled < magic.len() {
        match reader.read(&mut magic[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    reader.seek(SeekFrom::Start(start))?;
    Ok(filled == magic.len() && magic == GZIP_MAGIC)
}

/// Wrap `reader` in a gzip decoder.
pub fn inflate<'a, R: Read + 'a>(reader: R) -> Box<dyn Read + 'a> {
    Box::new(MultiGzDecoder::new(reader))
}

/// Wrap `reader` in a gzip decoder if it holds gzip data, otherwise pass it through.
pub fn detect<'a, R: Read + Seek + 'a>(mut reader: R) -> io::Result<Box<dyn Read + 'a>> {
    if sniff(&mut reader)? {
        debug!("gzip magic found, inflating source");
        Ok(inflate(reader))
    } else {
        Ok(Box::new(reader))
    }
}

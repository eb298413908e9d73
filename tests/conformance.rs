// Cross-source conformance tests
//
// Each scenario runs through every way of feeding bytes to a reader: an
// in-memory slice, a stream handing out small chunks, a stream handing out
// one byte at a time, an explicit gzip stream, and the seekable path with
// plain and gzip data. All of them must produce the same records, or the
// same error message with the same position. Failures name the source that
// diverges.

use flate2::write::GzEncoder;
use flate2::Compression;
use rustyfields::{Reader, ReaderBuilder};
use std::io::{self, Cursor, Read, Write};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Outcome = Result<Vec<Vec<String>>, String>;

/// Hands out at most `max` bytes per read call.
struct Chunked<R> {
    inner: R,
    max: usize,
}

impl<R: Read> Read for Chunked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.max);
        self.inner.read(&mut buf[..len])
    }
}

fn chunked(data: &[u8], max: usize) -> Chunked<Cursor<Vec<u8>>> {
    Chunked {
        inner: Cursor::new(data.to_vec()),
        max,
    }
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn drain(mut reader: Reader<'_>) -> Outcome {
    let mut records = Vec::new();
    loop {
        match reader.read() {
            Ok(Some(record)) => records.push(
                record
                    .iter()
                    .map(|f| String::from_utf8_lossy(f).to_string())
                    .collect(),
            ),
            Ok(None) => return Ok(records),
            Err(err) => return Err(err.to_string()),
        }
    }
}

/// Parse `input` through every source path.
fn all_sources(builder: &ReaderBuilder, input: &[u8]) -> Vec<(&'static str, Outcome)> {
    let packed = gzip(input);
    vec![
        ("slice", drain(builder.from_slice(input).unwrap())),
        ("chunked", drain(builder.from_reader(chunked(input, 7)).unwrap())),
        ("trickle", drain(builder.from_reader(chunked(input, 1)).unwrap())),
        ("gzip", drain(builder.from_gzip(Cursor::new(packed.clone())).unwrap())),
        ("seekable", drain(builder.from_seekable(Cursor::new(input.to_vec())).unwrap())),
        ("seekable_gzip", drain(builder.from_seekable(Cursor::new(packed)).unwrap())),
    ]
}

fn records(rows: Vec<Vec<&str>>) -> Outcome {
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(str::to_string).collect())
        .collect())
}

fn error(message: &str) -> Outcome {
    Err(message.to_string())
}

fn csv() -> ReaderBuilder {
    ReaderBuilder::new()
}

fn tsv() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.delimiter(b'\t').quote(None).escape(Some(b'\\'));
    builder
}

fn plain_tsv() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.delimiter(b'\t').quote(None);
    builder
}

fn limited(expand: bool) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .expand(expand)
        .source_window_size(1024)
        .record_buffer_size(1024)
        .max_fields(16);
    builder
}

// ---------------------------------------------------------------------------
// Conformance macro
// ---------------------------------------------------------------------------

/// Runs a scenario through all source paths and asserts they all produce
/// `expected`.
macro_rules! conformance {
    ($name:ident, builder: $builder:expr, input: $input:expr, expected: $expected:expr) => {
        #[test]
        fn $name() {
            let builder: ReaderBuilder = $builder;
            let owned = $input;
            let input: &[u8] = owned.as_ref();
            let expected: Outcome = $expected;
            for (source, outcome) in all_sources(&builder, input) {
                assert_eq!(outcome, expected, "FAILED: {}", source);
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Quote dialect
// ---------------------------------------------------------------------------

conformance!(
    csv_nul_is_data,
    builder: csv(),
    input: b"a\x00b\nc",
    expected: records(vec![vec!["a\u{0}b"], vec!["c"]])
);

conformance!(
    csv_lf,
    builder: csv(),
    input: b"a,b\nc\n",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    csv_cr,
    builder: csv(),
    input: b"a,b\rc\n",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    csv_crlf,
    builder: csv(),
    input: b"a,b\r\nc\r\n",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    csv_missing_newline_at_eof,
    builder: csv(),
    input: b"a,b\nc",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    csv_empty_source,
    builder: csv(),
    input: b"",
    expected: records(vec![])
);

conformance!(
    csv_empty_line,
    builder: csv(),
    input: b"\n",
    expected: records(vec![vec![]])
);

conformance!(
    csv_empty_record,
    builder: csv(),
    input: b"a,b\n\nc",
    expected: records(vec![vec!["a", "b"], vec![], vec!["c"]])
);

conformance!(
    csv_quoted_empty_field,
    builder: csv(),
    input: b"\"\"\n,\n",
    expected: records(vec![vec![""], vec!["", ""]])
);

conformance!(
    csv_blanks_preserved_in_unquoted,
    builder: csv(),
    input: b" a , b\t\n",
    expected: records(vec![vec![" a ", " b\t"]])
);

conformance!(
    csv_quoted,
    builder: csv(),
    input: b"\"a\",\"b\"\n\"c\"\n",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    csv_quoted_with_embedded_delimiter,
    builder: csv(),
    input: b"\"a,b\"\nc\n",
    expected: records(vec![vec!["a,b"], vec!["c"]])
);

conformance!(
    csv_quoted_with_embedded_lf,
    builder: csv(),
    input: b"\"a\nb\"\nc\n",
    expected: records(vec![vec!["a\nb"], vec!["c"]])
);

conformance!(
    csv_quoted_with_embedded_crlf,
    builder: csv(),
    input: b"\"a\r\nb\"\r\nc\r\n",
    expected: records(vec![vec!["a\r\nb"], vec!["c"]])
);

conformance!(
    csv_quoted_with_embedded_quote,
    builder: csv(),
    input: b"\"a\"\"b\"\nc\n",
    expected: records(vec![vec!["a\"b"], vec!["c"]])
);

conformance!(
    csv_quoted_with_preceding_whitespace,
    builder: csv(),
    input: b"  \"a\",  \"b\"\n  \"c\"\n",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    csv_quoted_with_subsequent_whitespace,
    builder: csv(),
    input: b"\"a\"  ,\"b\"  \n\"c\"  \n",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    csv_quoted_without_terminating_quote,
    builder: csv(),
    input: b"a,b\n\"c",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    csv_quoted_among_non_quoted,
    builder: csv(),
    input: b"a,\"b\",c",
    expected: records(vec![vec!["a", "b", "c"]])
);

conformance!(
    csv_tab_is_data,
    builder: csv(),
    input: b"a\tb\nc\n",
    expected: records(vec![vec!["a\tb"], vec!["c"]])
);

conformance!(
    csv_stray_quote,
    builder: csv(),
    input: b"a\"b,c",
    expected: error("1:2: Unexpected character")
);

conformance!(
    csv_quoted_with_preceding_garbage,
    builder: csv(),
    input: b"a\"b\",c",
    expected: error("1:2: Unexpected character")
);

conformance!(
    csv_quoted_with_subsequent_garbage,
    builder: csv(),
    input: b"\"a\"b,c",
    expected: error("1:4: Unexpected character")
);

conformance!(
    csv_garbage_after_trailing_blank,
    builder: csv(),
    input: b"x\n\"a\"  b",
    expected: error("2:6: Unexpected character")
);

conformance!(
    csv_error_after_embedded_newline,
    builder: csv(),
    input: b"\"a\nb\"x",
    expected: error("2:3: Unexpected character")
);

conformance!(
    csv_quote_after_multibyte_character,
    builder: csv(),
    input: "é\"".as_bytes(),
    expected: error("1:3: Unexpected character")
);

conformance!(
    csv_multibyte_fields,
    builder: csv(),
    input: "日本,\"ü,ß\"\n".as_bytes(),
    expected: records(vec![vec!["日本", "ü,ß"]])
);

// ---------------------------------------------------------------------------
// Escape dialect
// ---------------------------------------------------------------------------

conformance!(
    tsv_nul_is_data,
    builder: tsv(),
    input: b"a\x00b\nc",
    expected: records(vec![vec!["a\u{0}b"], vec!["c"]])
);

conformance!(
    tsv_lf,
    builder: tsv(),
    input: b"a\tb\nc\n",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    tsv_cr,
    builder: tsv(),
    input: b"a\tb\rc\n",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    tsv_crlf,
    builder: tsv(),
    input: b"a\tb\r\nc\n",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    tsv_missing_newline_at_eof,
    builder: tsv(),
    input: b"a\tb\nc",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    tsv_empty_source,
    builder: tsv(),
    input: b"",
    expected: records(vec![])
);

conformance!(
    tsv_empty_line,
    builder: tsv(),
    input: b"\n",
    expected: records(vec![vec![""]])
);

conformance!(
    tsv_empty_record,
    builder: tsv(),
    input: b"a\tb\n\nc",
    expected: records(vec![vec!["a", "b"], vec![""], vec!["c"]])
);

conformance!(
    tsv_escaped_delimiter,
    builder: tsv(),
    input: b"a\\\tb\nc",
    expected: records(vec![vec!["a\tb"], vec!["c"]])
);

conformance!(
    tsv_escaped_lf,
    builder: tsv(),
    input: b"a\tb\\\nc",
    expected: records(vec![vec!["a", "b\nc"]])
);

conformance!(
    tsv_escaped_escape,
    builder: tsv(),
    input: b"a\\\\\tb\n",
    expected: records(vec![vec!["a\\", "b"]])
);

conformance!(
    tsv_terminating_escape,
    builder: tsv(),
    input: b"a\tb\nc\\",
    expected: records(vec![vec!["a", "b"], vec!["c"]])
);

conformance!(
    tsv_comma_is_data,
    builder: tsv(),
    input: b"a,b\nc\n",
    expected: records(vec![vec!["a,b"], vec!["c"]])
);

conformance!(
    tsv_quote_is_data,
    builder: tsv(),
    input: b"\"a\"\t\"\n",
    expected: records(vec![vec!["\"a\"", "\""]])
);

// ---------------------------------------------------------------------------
// Plain dialect
// ---------------------------------------------------------------------------

conformance!(
    plain_split,
    builder: plain_tsv(),
    input: b"a\tb\\\tc\r\n\t\n",
    expected: records(vec![vec!["a", "b\\", "c"], vec!["", ""]])
);

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

conformance!(
    limits_full_buffer,
    builder: limited(false),
    input: &[b'a'; 1023],
    expected: records(vec![vec!["a".repeat(1023).as_str()]])
);

conformance!(
    limits_maximum_number_of_fields,
    builder: limited(false),
    input: "a,".repeat(15) + "a",
    expected: records(vec![vec!["a"; 16]])
);

conformance!(
    limits_too_big_record,
    builder: limited(false),
    input: &[b'a'; 1024],
    expected: error("1:1024: Too big record")
);

conformance!(
    limits_too_many_fields,
    builder: limited(false),
    input: "a,".repeat(16) + "a",
    expected: error("1:32: Too many fields")
);

conformance!(
    limits_buffer_expansion,
    builder: limited(true),
    input: &[b'a'; 1024],
    expected: records(vec![vec!["a".repeat(1024).as_str()]])
);

conformance!(
    limits_field_expansion,
    builder: limited(true),
    input: "a,".repeat(16) + "a",
    expected: records(vec![vec!["a"; 17]])
);

conformance!(
    limits_buffer_expansion_at_window_boundary,
    builder: limited(true),
    input: "a".repeat(1024) + ",a",
    expected: records(vec![vec!["a".repeat(1024).as_str(), "a"]])
);

// ---------------------------------------------------------------------------
// Corrupt gzip input
// ---------------------------------------------------------------------------

#[test]
fn gzip_bad_header_is_unreadable() {
    // Gzip magic followed by an unknown compression method
    let mut data = vec![0x1f, 0x8b, 0x07, 0, 0, 0, 0, 0, 0, 0xff];
    data.extend(b"a,b\n");

    let builder = csv();
    for (source, reader) in [
        ("seekable", builder.from_seekable(Cursor::new(data.clone())).unwrap()),
        ("gzip", builder.from_gzip(Cursor::new(data.clone())).unwrap()),
    ] {
        let mut reader = reader;
        let err = reader.read().unwrap_err();
        assert_eq!(err.to_string(), "1:1: Unreadable source", "FAILED: {}", source);
        assert_eq!(
            err.io_error().map(|e| e.kind()),
            Some(io::ErrorKind::InvalidInput),
            "FAILED: {}",
            source
        );
        assert_eq!(reader.read().unwrap_err(), err, "FAILED: {}", source);
    }
}

#[test]
fn gzip_truncated_trailer_is_unreadable() {
    // Drop the length half of the trailer; the body still inflates in full
    let mut data = gzip(b"a,b\nc,d\n");
    data.truncate(data.len() - 4);

    let results: Vec<_> = csv()
        .from_seekable(Cursor::new(data))
        .unwrap()
        .into_records()
        .collect();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &vec![b"a".to_vec(), b"b".to_vec()]);
    assert_eq!(results[1].as_ref().unwrap(), &vec![b"c".to_vec(), b"d".to_vec()]);
    let err = results[2].as_ref().unwrap_err();
    assert_eq!(err.to_string(), "3:1: Unreadable source");
    assert!(err.io_error().is_some());
}

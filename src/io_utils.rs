//! I/O utilities for reading delimited input and writing generated scripts.
//!
//! - **Readers** are built from a [`Dialect`]: the separator, quote and escape
//!   characters map onto `csv::ReaderBuilder`. Records are read as raw bytes
//!   and decoded with `encoding_rs`, defaulting to UTF-8.
//! - **Output** goes to a file or, with the `-` path, to stdout; text is
//!   transcoded on the way out when a non-UTF-8 encoding is requested.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::config::Dialect;

/// Delimiter used when the dialect has no separator, so every line is read
/// as a single field.
const NO_SEPARATOR: u8 = b'\0';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Physical rows of a delimited input.
///
/// `csv::Reader` skips empty lines, but a blank line is a row holding one
/// empty field. They are recovered from the gap in the reader's line count:
/// records end at `\n` only, the input gets a trailing `\n` so the last
/// record is terminated too, and every newline not inside a record or its
/// terminator belongs to a blank line.
pub struct RowReader<R> {
    inner: csv::Reader<io::Chain<R, &'static [u8]>>,
    record: csv::ByteRecord,
    pending_blanks: u64,
    buffered: bool,
    finished: bool,
}

impl<R: Read> RowReader<R> {
    /// Reads the next row into `row`; `false` once the input is exhausted.
    pub fn read_row(&mut self, row: &mut csv::ByteRecord) -> csv::Result<bool> {
        loop {
            if self.pending_blanks > 0 {
                self.pending_blanks -= 1;
                row.clear();
                row.push_field(b"");
                return Ok(true);
            }
            if self.buffered {
                self.buffered = false;
                copy_without_carriage_return(&self.record, row);
                return Ok(true);
            }
            if self.finished {
                return Ok(false);
            }

            let start = self.inner.position().line();
            let found = self.inner.read_byte_record(&mut self.record)?;
            let consumed = self.inner.position().line() - start;
            if found {
                let embedded = self.record.as_slice().iter().filter(|&&b| b == b'\n').count();
                self.pending_blanks = consumed.saturating_sub(embedded as u64 + 1);
                self.buffered = true;
            } else {
                // The appended newline ends the last line, blank or not.
                self.pending_blanks = consumed.saturating_sub(1);
                self.finished = true;
            }
        }
    }
}

/// CRLF input leaves a `\r` on the last field once `\n` ends the record.
fn copy_without_carriage_return(source: &csv::ByteRecord, target: &mut csv::ByteRecord) {
    target.clear();
    let last = source.len().saturating_sub(1);
    for (idx, field) in source.iter().enumerate() {
        if idx == last {
            target.push_field(field.strip_suffix(b"\r").unwrap_or(field));
        } else {
            target.push_field(field);
        }
    }
}

/// Every row is returned as data: no header handling and no shape checks,
/// both belong to the inferencer.
pub fn open_csv_reader<R>(reader: R, dialect: &Dialect) -> RowReader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .delimiter(dialect.separator.unwrap_or(NO_SEPARATOR))
        .terminator(csv::Terminator::Any(b'\n'))
        .double_quote(true)
        .escape(dialect.escape);
    match dialect.quote {
        Some(quote) => builder.quote(quote),
        None => builder.quoting(false),
    };
    RowReader {
        inner: builder.from_reader(reader.chain(&b"\n"[..])),
        record: csv::ByteRecord::new(),
        pending_blanks: 0,
        buffered: false,
        finished: false,
    }
}

pub fn open_csv_reader_from_path(path: &Path, dialect: &Dialect) -> Result<RowReader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, dialect))
}

/// Decodes every field, substituting U+FFFD for malformed sequences. The
/// flag reports whether any substitution happened.
pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> (Vec<String>, bool) {
    let mut had_errors = false;
    let fields = record
        .iter()
        .map(|field| {
            let (text, _, malformed) = encoding.decode(field);
            had_errors |= malformed;
            text.into_owned()
        })
        .collect();
    (fields, had_errors)
}

/// Destination for generated scripts.
pub struct ScriptWriter {
    inner: Box<dyn Write>,
    encoding: &'static Encoding,
}

impl ScriptWriter {
    pub fn create(path: &Path, encoding: &'static Encoding) -> Result<Self> {
        let inner: Box<dyn Write> = if is_dash(path) {
            Box::new(io::stdout().lock())
        } else {
            Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
            ))
        };
        Ok(Self { inner, encoding })
    }

    pub fn from_writer(inner: Box<dyn Write>, encoding: &'static Encoding) -> Self {
        Self { inner, encoding }
    }

    pub fn write_text(&mut self, text: &str) -> Result<()> {
        if self.encoding == UTF_8 {
            self.inner.write_all(text.as_bytes())?;
            return Ok(());
        }
        let (encoded, _, had_errors) = self.encoding.encode(text);
        if had_errors {
            return Err(anyhow!(
                "Failed to encode text using {}",
                self.encoding.name()
            ));
        }
        self.inner.write_all(encoded.as_ref())?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.inner.flush().context("Flushing output")
    }
}

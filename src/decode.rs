//! Page decoding: one CSV document in, a lazy sequence of records out.
//!
//! A page is decoded row by row. Rows that cannot become a [`Record`]
//! (wrong field count, non-numeric id, bad encoding) come out as
//! [`DecodeError`] items and decoding carries on with the next row. The only
//! page-fatal condition is a header that lacks one of
//! [`columns::REQUIRED`], because then no row could ever decode.
//!
//! A stray opening quote makes a CSV reader swallow every following line
//! into one field. When a row that spans several physical lines fails to
//! decode, each of those lines is decoded on its own instead, so one bad
//! row costs one row and the page keeps its true row count.
//!
//! ```rust
//! use bugdash::decode::decode_page;
//!
//! let body = "Bug ID,Fission Milestone,Product,Status\n7,M6,Core,NEW\n";
//! let mut page = decode_page(body.as_bytes()).unwrap();
//! let record = page.next().unwrap().unwrap();
//! assert_eq!(record.id, 7);
//! assert!(page.next().is_none());
//! assert_eq!(page.summary().decoded, 1);
//! ```

use crate::errors::{DecodeError, Error, Result};
use crate::model::{columns, Record};
use csv::ByteRecord;
use std::collections::VecDeque;
use std::io::{Cursor, Read};

type Row = std::result::Result<Record, DecodeError>;

/// Row counts for one page, available once the decoder is drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub decoded: usize,
    pub skipped: usize,
}

impl PageSummary {
    /// Data rows read from the page, decoded or not.
    ///
    /// This is what the upstream's per-response ceiling limits, so it is the
    /// number compared against the ceiling.
    pub fn rows(&self) -> usize {
        self.decoded + self.skipped
    }
}

/// Lazy decoder over one page.
pub struct PageDecoder {
    reader: Option<csv::Reader<Cursor<Vec<u8>>>>,
    headers: ByteRecord,
    row: ByteRecord,
    split: VecDeque<Row>,
    summary: PageSummary,
}

impl PageDecoder {
    pub fn summary(&self) -> PageSummary {
        self.summary
    }

    fn empty() -> Self {
        Self {
            reader: None,
            headers: ByteRecord::new(),
            row: ByteRecord::new(),
            split: VecDeque::new(),
            summary: PageSummary::default(),
        }
    }

    fn count(&mut self, row: Row) -> Row {
        match row {
            Ok(_) => self.summary.decoded += 1,
            Err(_) => self.summary.skipped += 1,
        }
        row
    }
}

impl Iterator for PageDecoder {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.split.pop_front() {
            return Some(self.count(row));
        }

        let reader = self.reader.as_mut()?;
        let start = reader.position().clone();
        let row = match reader.read_byte_record(&mut self.row) {
            Ok(false) => {
                self.reader = None;
                return None;
            }
            Ok(true) => self
                .row
                .deserialize::<Record>(Some(&self.headers))
                .map_err(|err| DecodeError::from_csv(&err)),
            Err(err) => Err(DecodeError::from_csv(&err)),
        };
        let end = reader.position().clone();

        if row.is_err() && end.line() > start.line() + 1 {
            let body = reader.get_ref().get_ref();
            let span = body
                .get(start.byte() as usize..end.byte() as usize)
                .unwrap_or_default();
            self.split = split_lines(span, start.line(), &self.headers);
            if let Some(first) = self.split.pop_front() {
                return Some(self.count(first));
            }
        }
        Some(self.count(row))
    }
}

/// Decode every non-blank physical line of `span` as a row of its own.
fn split_lines(span: &[u8], first_line: u64, headers: &ByteRecord) -> VecDeque<Row> {
    span.split(|b| *b == b'\n')
        .enumerate()
        .filter(|(_, line)| !line.iter().all(|b| *b == b'\r'))
        .map(|(offset, line)| decode_line(line, first_line + offset as u64, headers))
        .collect()
}

fn decode_line(line: &[u8], number: u64, headers: &ByteRecord) -> Row {
    let at = |message: String| DecodeError {
        line: Some(number),
        message,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(line);
    let mut row = ByteRecord::new();
    match reader.read_byte_record(&mut row) {
        Ok(true) if row.len() == headers.len() => row
            .deserialize::<Record>(Some(headers))
            .map_err(|err| at(err.to_string())),
        Ok(true) => Err(at(format!(
            "found record with {} fields, but the header has {} fields",
            row.len(),
            headers.len()
        ))),
        Ok(false) => Err(at("empty row".to_string())),
        Err(err) => Err(at(err.to_string())),
    }
}

/// Start decoding a page.
///
/// The body is buffered so rows broken by stray quotes can be re-read line
/// by line. An empty body is a valid page with no rows.
pub fn decode_page<R: Read>(mut input: R) -> Result<PageDecoder> {
    let mut body = Vec::new();
    input.read_to_end(&mut body)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(Cursor::new(body));

    let names = reader.headers()?.clone();
    if names.iter().all(str::is_empty) {
        return Ok(PageDecoder::empty());
    }

    let missing: Vec<String> = columns::REQUIRED
        .iter()
        .filter(|required| !names.iter().any(|h| h.trim() == **required))
        .map(|required| (*required).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingColumns { missing });
    }

    Ok(PageDecoder {
        headers: reader.byte_headers()?.clone(),
        reader: Some(reader),
        row: ByteRecord::new(),
        split: VecDeque::new(),
        summary: PageSummary::default(),
    })
}

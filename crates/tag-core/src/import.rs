//! Tabular import: delimited text → [`RecordSet`].
//!
//! Built on `winnow` 0.7. The first non-empty row is the header. Fields may
//! be quoted (`""` escapes a quote; separators and newlines are literal
//! inside quotes). Both LF and CRLF line endings are accepted. A row shorter
//! than the header omits its missing columns; a longer row rejects the
//! whole import.

use crate::error::ImportError;
use crate::records::{Record, RecordSet};
use winnow::combinator::{alt, cut_err, eof, preceded, repeat, separated, terminated};
use winnow::error::ErrMode;
use winnow::prelude::*;
use winnow::token::take_till;

/// Parses an uploaded file into records. Any error rejects the import; no
/// partial record set is ever returned.
pub trait TabularImporter {
    fn import(&self, input: &str) -> Result<RecordSet, ImportError>;
}

/// Comma-separated values (or any single-character separator).
#[derive(Debug, Clone, Copy)]
pub struct CsvImporter {
    pub separator: char,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self { separator: ',' }
    }
}

impl CsvImporter {
    pub fn tsv() -> Self {
        Self { separator: '\t' }
    }
}

impl TabularImporter for CsvImporter {
    fn import(&self, input: &str) -> Result<RecordSet, ImportError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut rows = parse_rows(input, self.separator)?.into_iter();

        let (_, headers) = rows.next().ok_or(ImportError::Empty)?;
        let mut records = Vec::new();
        for (line, fields) in rows {
            if fields.len() > headers.len() {
                return Err(ImportError::TooManyFields {
                    line,
                    expected: headers.len(),
                    found: fields.len(),
                });
            }
            let record: Record = headers.iter().cloned().zip(fields).collect();
            records.push(record);
        }
        if records.is_empty() {
            return Err(ImportError::NoRecords);
        }

        log::debug!("parsed {} record(s) with {} column(s)", records.len(), headers.len());
        Ok(RecordSet::new(headers, records))
    }
}

/// All non-empty rows, each tagged with its starting line number.
fn parse_rows(input: &str, sep: char) -> Result<Vec<(usize, Vec<String>)>, ImportError> {
    let mut rest = input;
    let mut rows = Vec::new();

    while !rest.is_empty() {
        let line = line_number(input, rest);
        let fields = parse_row(&mut rest, sep).map_err(|e| match e {
            ErrMode::Cut(_) => ImportError::UnterminatedQuote { line },
            _ => ImportError::Syntax {
                line,
                message: "unexpected text after a quoted field".to_string(),
            },
        })?;
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }
        rows.push((line, fields));
    }
    Ok(rows)
}

fn line_number(input: &str, rest: &str) -> usize {
    let consumed = input.len() - rest.len();
    input[..consumed].matches('\n').count() + 1
}

/// One row including its line terminator (or end of input).
fn parse_row(input: &mut &str, sep: char) -> ModalResult<Vec<String>> {
    terminated(
        separated(1.., |i: &mut &str| parse_field(i, sep), sep),
        alt(("\r\n", "\n", "\r", eof)),
    )
    .parse_next(input)
}

fn parse_field(input: &mut &str, sep: char) -> ModalResult<String> {
    if input.starts_with('"') {
        parse_quoted(input)
    } else {
        take_till(0.., |c: char| c == sep || c == '\r' || c == '\n')
            .map(str::to_string)
            .parse_next(input)
    }
}

/// `"..."` with `""` as an escaped quote. Running out of input before the
/// closing quote is a hard (cut) error.
fn parse_quoted(input: &mut &str) -> ModalResult<String> {
    preceded(
        '"',
        cut_err(terminated(
            repeat(0.., alt((take_till(1.., '"'), "\"\"".value("\"")))).fold(
                String::new,
                |mut acc: String, piece: &str| {
                    acc.push_str(piece);
                    acc
                },
            ),
            '"',
        )),
    )
    .parse_next(input)
}

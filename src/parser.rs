//! Delimited text tokenizer.
//!
//! Splits raw file content into a header row and data rows. A double quote
//! toggles quoted mode; while quoted, the delimiter is kept as part of the
//! field. There is no escaped-quote convention, so a literal `"` cannot appear
//! inside a field.
//!
//! Blank lines are removed before anything else, and the line numbers carried
//! by [`DataRow`] and reported for skipped rows count positions in the
//! filtered sequence (header = line 1), not physical file lines.

use log::{debug, warn};

use crate::error::{IngestError, IngestResult};

pub const DEFAULT_DELIMITER: u8 = b',';
const QUOTE: char = '"';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow {
    pub line: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ParsedFile {
    pub headers: Vec<String>,
    pub rows: Vec<DataRow>,
    pub skipped: Vec<IngestError>,
}

impl ParsedFile {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

pub fn parse_content(content: &str, delimiter: u8) -> IngestResult<ParsedFile> {
    let lines = content
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>();
    let Some((header_line, data_lines)) = lines.split_first() else {
        return Err(IngestError::EmptyInput);
    };

    let headers = parse_line(header_line, delimiter);
    debug!("Header row has {} field(s): {:?}", headers.len(), headers);

    let mut parsed = ParsedFile {
        headers,
        rows: Vec::with_capacity(data_lines.len()),
        skipped: Vec::new(),
    };
    for (offset, line) in data_lines.iter().enumerate() {
        let line_number = offset + 2;
        let fields = parse_line(line, delimiter);
        if fields.len() != parsed.headers.len() {
            warn!(
                "Line {line_number} has mismatched columns ({} vs {}). Skipping.",
                fields.len(),
                parsed.headers.len()
            );
            parsed.skipped.push(IngestError::RowShapeMismatch {
                line: line_number,
                expected: parsed.headers.len(),
                found: fields.len(),
            });
            continue;
        }
        parsed.rows.push(DataRow {
            line: line_number,
            fields,
        });
    }
    Ok(parsed)
}

pub fn parse_line(line: &str, delimiter: u8) -> Vec<String> {
    let delimiter = delimiter as char;
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == QUOTE {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

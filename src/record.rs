//! Rebuilds nested records from dot-qualified headers.
//!
//! `name.firstName,name.lastName,age` with `Rohit,Prasad,34` becomes
//! `{"name": {"firstName": "Rohit", "lastName": "Prasad"}, "age": 34}`.
//! Conflicting paths are resolved last-writer-wins: a scalar sitting where a
//! later header needs a mapping is replaced by a fresh mapping.

use log::debug;

use crate::{
    data::{Record, infer_value},
    parser::DataRow,
};

pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPath {
    pub column: usize,
    pub segments: Vec<String>,
}

impl HeaderPath {
    /// Splits a header into trimmed segments; `None` when nothing usable remains.
    pub fn parse(column: usize, header: &str) -> Option<Self> {
        let segments = header
            .trim()
            .split(PATH_SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        if segments.is_empty() {
            None
        } else {
            Some(Self { column, segments })
        }
    }

    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

/// A rebuilt record and the line it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub line: usize,
    pub record: Record,
}

/// Builds records for every data row of one file against a fixed header row.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    paths: Vec<HeaderPath>,
    width: usize,
}

impl RecordBuilder {
    pub fn new(headers: &[String]) -> Self {
        let paths = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, header)| {
                let path = HeaderPath::parse(idx, header);
                if path.is_none() {
                    debug!("Skipping empty header in column {}", idx + 1);
                }
                path
            })
            .collect();
        Self {
            paths,
            width: headers.len(),
        }
    }

    pub fn paths(&self) -> &[HeaderPath] {
        &self.paths
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Builds one record. Fields beyond the header width are ignored and
    /// missing trailing fields are treated as empty.
    pub fn build(&self, fields: &[String]) -> Record {
        let mut record = Record::new();
        for path in &self.paths {
            let raw = fields.get(path.column).map(String::as_str).unwrap_or("");
            let Some((leaf, parents)) = path.segments.split_last() else {
                continue;
            };
            let mut node = &mut record;
            for segment in parents {
                node = node.child_mut(segment);
            }
            node.insert(leaf, infer_value(raw));
        }
        record
    }

    pub fn build_row(&self, row: &DataRow) -> SourceRecord {
        SourceRecord {
            line: row.line,
            record: self.build(&row.fields),
        }
    }
}

//! Error taxonomy shared by the ingestion pipeline.
//!
//! Only [`IngestError::RowShapeMismatch`] is recoverable: the parser records it
//! against the offending line and keeps going. Every other variant aborts the
//! run, and anything raised while the persister holds its transaction rolls
//! the whole file back.

use thiserror::Error;

pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV file is empty")]
    EmptyInput,
    #[error("Line {line} has mismatched columns ({found} vs {expected} expected)")]
    RowShapeMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Missing mandatory field: {0}")]
    MissingField(String),
    #[error("Age must be a valid number: {0}")]
    InvalidAge(String),
    #[error("Line {line}: {error}")]
    InvalidRecord {
        line: usize,
        error: Box<IngestError>,
    },
    #[error("Database insertion error: {0}")]
    StoreWrite(String),
    #[error("No users found")]
    NoData,
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("Error reading CSV file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode input as {0}")]
    Decode(String),
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl IngestError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn invalid_age(detail: impl Into<String>) -> Self {
        Self::InvalidAge(detail.into())
    }

    pub fn invalid_option(detail: impl Into<String>) -> Self {
        Self::InvalidOption(detail.into())
    }

    pub fn at_line(line: usize, error: IngestError) -> Self {
        Self::InvalidRecord {
            line,
            error: Box::new(error),
        }
    }

    /// The underlying failure with any line wrapper removed.
    pub fn row_error(&self) -> &IngestError {
        match self {
            Self::InvalidRecord { error, .. } => error.row_error(),
            other => other,
        }
    }

    /// True for errors that abort a run rather than skipping a single row.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::RowShapeMismatch { .. })
    }
}

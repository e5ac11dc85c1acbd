//! End-to-end operations behind each command.
//!
//! Every function receives the store handle explicitly; nothing here holds
//! process-wide state.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use log::info;

use crate::{
    distribution::AgeDistribution,
    error::{IngestError, IngestResult},
    io_utils,
    parser::{self, DEFAULT_DELIMITER},
    record::RecordBuilder,
    store::{DEFAULT_BATCH_SIZE, StoredUser, UserStore},
};

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub delimiter: u8,
    pub batch_size: usize,
    pub encoding: &'static Encoding,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            batch_size: DEFAULT_BATCH_SIZE,
            encoding: UTF_8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub records_processed: usize,
    pub skipped_rows: usize,
    pub batch_sizes: Vec<usize>,
    /// `None` when the table is still empty after the run.
    pub age_distribution: Option<AgeDistribution>,
}

pub fn upload(
    store: &mut UserStore,
    input: &Path,
    options: &IngestOptions,
) -> IngestResult<UploadSummary> {
    info!("Reading CSV file from {input:?}");
    let content = io_utils::read_input(input, options.encoding)?;
    ingest_content(store, &content, options)
}

pub fn ingest_content(
    store: &mut UserStore,
    content: &str,
    options: &IngestOptions,
) -> IngestResult<UploadSummary> {
    let parsed = parser::parse_content(content, options.delimiter)?;
    let builder = RecordBuilder::new(&parsed.headers);
    let records = parsed
        .rows
        .iter()
        .map(|row| builder.build_row(row))
        .collect::<Vec<_>>();
    info!(
        "Parsed {} records ({} skipped)",
        records.len(),
        parsed.skipped_count()
    );

    let report = store.insert_records(&records, options.batch_size)?;
    let age_distribution = match age_distribution(store) {
        Ok(distribution) => Some(distribution),
        Err(IngestError::NoData) => None,
        Err(err) => return Err(err),
    };
    Ok(UploadSummary {
        records_processed: report.inserted,
        skipped_rows: parsed.skipped_count(),
        batch_sizes: report.batch_sizes,
        age_distribution,
    })
}

pub fn list_users(store: &UserStore) -> IngestResult<Vec<StoredUser>> {
    store.list_users()
}

pub fn age_distribution(store: &UserStore) -> IngestResult<AgeDistribution> {
    let ages = store.ages()?;
    if ages.is_empty() {
        info!("No users found in database");
    }
    AgeDistribution::from_ages(&ages)
}

pub fn clear_users(store: &mut UserStore) -> IngestResult<()> {
    store.clear()
}

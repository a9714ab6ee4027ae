// src/pipeline.rs

use crate::clean::{clean_gratuit, clean_location, clean_numeric, clean_temporal, clean_text};
use crate::error::PipelineError;
use crate::features::{add_commissioning_year, add_department_code, add_power_category};
use crate::load::{load_table, LoadOutcome};
use arrow::record_batch::RecordBatch;
use std::path::Path;
use tracing::info;

/// One pipeline step: a pure function from table to table.
pub type Stage = fn(&RecordBatch) -> Result<RecordBatch, PipelineError>;

/// The cleaning steps in execution order. Each step's output satisfies the
/// next step's column requirements; running them in any other order is a
/// contract violation reported as `MissingColumn`/`UnexpectedType`.
pub const STAGES: [(&str, Stage); 8] = [
    (crate::clean::location::STAGE, clean_location),
    (crate::clean::numeric::STAGE, clean_numeric),
    (crate::clean::text::STAGE, clean_text),
    (crate::clean::gratuit::STAGE, clean_gratuit),
    (crate::clean::temporal::STAGE, clean_temporal),
    (crate::features::power::STAGE, add_power_category),
    (crate::features::year::STAGE, add_commissioning_year),
    (crate::features::department::STAGE, add_department_code),
];

/// Run every stage over `raw` and return the cleaned, enriched table.
///
/// `raw` is left untouched; identical input always yields an identical table.
#[tracing::instrument(level = "info", skip(raw), fields(rows = raw.num_rows()))]
pub fn clean_data(raw: &RecordBatch) -> Result<RecordBatch, PipelineError> {
    let mut table = raw.clone();
    for (name, stage) in STAGES {
        let before = table.num_rows();
        table = stage(&table)?;
        info!(stage = name, before, after = table.num_rows(), "stage done");
    }
    info!(
        rows_in = raw.num_rows(),
        rows_out = table.num_rows(),
        "cleaning pipeline complete"
    );
    Ok(table)
}

/// Load `path` and clean it.
///
/// `Ok(None)` means the load produced no data (already logged); the caller
/// should stop there.
pub fn load_and_clean<P: AsRef<Path>>(
    path: P,
    delimiter: u8,
) -> Result<Option<RecordBatch>, PipelineError> {
    match load_table(path, delimiter) {
        LoadOutcome::Loaded(raw) => clean_data(&raw).map(Some),
        LoadOutcome::NoData(_) => Ok(None),
    }
}

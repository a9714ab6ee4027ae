// src/features/year.rs

use crate::error::PipelineError;
use crate::table::{columns, typed_column, upsert_column};
use arrow::{
    array::{Array, Date32Array, Int32Array},
    record_batch::RecordBatch,
};
use chrono::Datelike;
use std::sync::Arc;

pub const STAGE: &str = "commissioning_year";

/// Add `annee_mes`, the calendar year of `date_mise_en_service`. A null date
/// gives a null year.
pub fn add_commissioning_year(batch: &RecordBatch) -> Result<RecordBatch, PipelineError> {
    let dates = typed_column::<Date32Array>(batch, STAGE, columns::COMMISSIONING_DATE)?;
    let years: Int32Array = (0..dates.len())
        .map(|i| dates.value_as_date(i).filter(|_| dates.is_valid(i)).map(|d| d.year()))
        .collect();

    upsert_column(batch, STAGE, columns::COMMISSIONING_YEAR, Arc::new(years), true)
}

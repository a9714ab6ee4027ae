// src/clean/temporal.rs

use crate::clean::utils::{clean_str, coerce_utf8};
use crate::error::PipelineError;
use crate::table::{columns, replace_column, require_column};
use arrow::{
    array::{Array, ArrayRef, Date32Array},
    datatypes::{DataType, Date32Type},
    record_batch::RecordBatch,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::warn;

pub const STAGE: &str = "temporal";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y/%m/%d %H:%M:%S"];

/// Parse a commissioning date. Anything unrecognised gives `None`.
///
/// Date-times are accepted and truncated to their calendar date; an
/// explicit offset is ignored rather than converted.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Replace `date_mise_en_service` by a `Date32` column.
pub fn clean_temporal(batch: &RecordBatch) -> Result<RecordBatch, PipelineError> {
    let idx = require_column(batch, STAGE, columns::COMMISSIONING_DATE)?;
    let column = batch.column(idx);
    if column.data_type() == &DataType::Date32 {
        return Ok(batch.clone());
    }

    let raw = coerce_utf8(column, STAGE, columns::COMMISSIONING_DATE)?;
    let dates: Date32Array = raw
        .iter()
        .map(|opt| opt.and_then(parse_date).map(Date32Type::from_naive_date))
        .collect();

    let unparsed = dates.null_count() - raw.null_count();
    if unparsed > 0 {
        warn!(rows = unparsed, "commissioning dates not recognised, set to null");
    }

    replace_column(
        batch,
        STAGE,
        columns::COMMISSIONING_DATE,
        Arc::new(dates) as ArrayRef,
        true,
    )
}

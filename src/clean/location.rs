// src/clean/location.rs

use crate::clean::utils::coerce_float64;
use crate::error::PipelineError;
use crate::table::{columns, non_null_mask, rename_columns, replace_column, require_column, retain_rows};
use arrow::{array::ArrayRef, record_batch::RecordBatch};
use std::sync::Arc;
use tracing::debug;

pub const STAGE: &str = "location";

/// Rename the consolidated coordinates to `lat`/`lon`, coerce both to
/// `Float64` and drop every row that is not geolocatable. Every surviving
/// row has two finite coordinates.
pub fn clean_location(batch: &RecordBatch) -> Result<RecordBatch, PipelineError> {
    let renamed = rename_columns(
        batch,
        STAGE,
        &[
            (columns::SOURCE_LATITUDE, columns::LAT),
            (columns::SOURCE_LONGITUDE, columns::LON),
        ],
    )?;

    let coords = [columns::LAT, columns::LON];
    let present = non_null_mask(&renamed, STAGE, &coords)?;
    let mut table = retain_rows(&renamed, STAGE, &present)?;
    debug!(
        before = batch.num_rows(),
        after = table.num_rows(),
        "dropped rows without coordinates"
    );

    for name in coords {
        let idx = require_column(&table, STAGE, name)?;
        let values = coerce_float64(table.column(idx), STAGE, name)?;
        table = replace_column(&table, STAGE, name, Arc::new(values) as ArrayRef, true)?;
    }

    let numeric = non_null_mask(&table, STAGE, &coords)?;
    let mut table = retain_rows(&table, STAGE, &numeric)?;

    // no nulls remain, declare it in the schema
    for name in coords {
        let values = table.column(require_column(&table, STAGE, name)?).clone();
        table = replace_column(&table, STAGE, name, values, false)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::utf8_batch;
    use arrow::array::{Array, Float64Array};

    #[test]
    fn renames_coerces_and_drops() {
        let raw = utf8_batch(&[
            (
                columns::SOURCE_LATITUDE,
                vec![Some("48.8566"), None, Some("abc"), Some(" 43.3 "), Some("45.0")],
            ),
            (
                columns::SOURCE_LONGITUDE,
                vec![Some("2.3522"), Some("1.0"), Some("5.0"), Some("5.37"), Some("inf")],
            ),
            (
                columns::STATION_NAME,
                vec![Some("A"), Some("B"), Some("C"), Some("D"), Some("E")],
            ),
        ]);

        let out = clean_location(&raw).unwrap();
        assert_eq!(out.num_rows(), 2);
        assert!(out.schema().index_of(columns::SOURCE_LATITUDE).is_err());

        let lat = out
            .column_by_name(columns::LAT)
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        let lon = out
            .column_by_name(columns::LON)
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(lat.null_count(), 0);
        assert_eq!(lon.null_count(), 0);
        assert_eq!(lat.value(1), 43.3);
        assert!(lat.values().iter().chain(lon.values().iter()).all(|v| v.is_finite()));
        assert!(!out.schema().field_with_name(columns::LAT).unwrap().is_nullable());
    }

    #[test]
    fn missing_coordinates_fail_fast() {
        let raw = utf8_batch(&[(columns::STATION_NAME, vec![Some("A")])]);
        let err = clean_location(&raw).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { stage: STAGE, .. }));
    }
}

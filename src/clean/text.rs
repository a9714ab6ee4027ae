// src/clean/text.rs

use crate::clean::utils::coerce_utf8;
use crate::error::PipelineError;
use crate::table::{columns, replace_column, require_column};
use arrow::{array::StringArray, record_batch::RecordBatch};
use std::sync::Arc;

pub const STAGE: &str = "text";

/// Placeholder for a missing operator, upper-cased along with real names.
pub const UNKNOWN_OPERATOR: &str = "Unknown";

/// Trim and upper-case `nom_operateur`; missing or blank names become
/// `UNKNOWN`. The column is non-nullable afterwards.
pub fn clean_text(batch: &RecordBatch) -> Result<RecordBatch, PipelineError> {
    let idx = require_column(batch, STAGE, columns::OPERATOR)?;
    let raw = coerce_utf8(batch.column(idx), STAGE, columns::OPERATOR)?;

    let normalized: StringArray = raw
        .iter()
        .map(|opt| Some(normalize_operator(opt)))
        .collect();

    replace_column(batch, STAGE, columns::OPERATOR, Arc::new(normalized), false)
}

pub fn normalize_operator(raw: Option<&str>) -> String {
    let name = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(UNKNOWN_OPERATOR);
    name.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::utf8_batch;
    use arrow::array::Array;

    #[test]
    fn operator_names_group_case_insensitively() {
        let raw = utf8_batch(&[(
            columns::OPERATOR,
            vec![Some("  Izivia "), Some("IZIVIA"), Some("izivia"), None, Some("   "), Some("Électra")],
        )]);
        let out = clean_text(&raw).unwrap();
        let ops = out
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();

        assert_eq!(ops.null_count(), 0);
        assert_eq!(ops.value(0), "IZIVIA");
        assert_eq!(ops.value(1), "IZIVIA");
        assert_eq!(ops.value(2), "IZIVIA");
        assert_eq!(ops.value(3), "UNKNOWN");
        assert_eq!(ops.value(4), "UNKNOWN");
        assert_eq!(ops.value(5), "ÉLECTRA");
        for v in ops.iter().flatten() {
            assert_eq!(v, v.trim());
            assert_eq!(v, v.to_uppercase());
        }
    }
}

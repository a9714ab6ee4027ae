// src/features/department.rs

use crate::clean::utils::{clean_str, coerce_utf8};
use crate::error::PipelineError;
use crate::table::{columns, require_column, upsert_column};
use arrow::{array::StringArray, record_batch::RecordBatch};
use std::sync::Arc;

pub const STAGE: &str = "department_code";

const COMMUNE_CODE_WIDTH: usize = 5;
const CORSICA_MARKER: &str = "20";

/// Department of a commune code: the first two characters of the code
/// left-padded with zeros to five characters.
///
/// Corsica is split into `2A` and `2B`, which the padded numeric form loses.
/// For a `20` prefix the unpadded code is consulted instead; legacy numeric
/// `20xxx` codes fall back to the postal ranges (`200xx`/`201xx` are
/// Corse-du-Sud, everything else Haute-Corse). A `20` prefix therefore
/// always resolves to `2A` or `2B`.
pub fn department_code(raw: &str) -> Option<String> {
    let code = clean_str(raw).to_uppercase();
    if code.is_empty() {
        return None;
    }

    let padded = format!("{:0>width$}", code, width = COMMUNE_CODE_WIDTH);
    let dept: String = padded.chars().take(2).collect();
    if dept != CORSICA_MARKER {
        return Some(dept);
    }

    let original: String = code.chars().take(2).collect();
    if original == "2A" || original == "2B" {
        return Some(original);
    }
    match code.chars().nth(2) {
        Some('0') | Some('1') => Some("2A".to_string()),
        _ => Some("2B".to_string()),
    }
}

/// Add `code_departement` derived from `code_insee_commune`.
pub fn add_department_code(batch: &RecordBatch) -> Result<RecordBatch, PipelineError> {
    let idx = require_column(batch, STAGE, columns::COMMUNE_CODE)?;
    let communes = coerce_utf8(batch.column(idx), STAGE, columns::COMMUNE_CODE)?;

    let departments: StringArray = communes
        .iter()
        .map(|opt| opt.and_then(department_code))
        .collect();

    upsert_column(batch, STAGE, columns::DEPARTMENT_CODE, Arc::new(departments), true)
}

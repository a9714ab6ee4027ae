// src/table/mod.rs
//
// Column-level helpers over `RecordBatch`. Every stage of the pipeline is
// expressed in terms of these: look a column up (failing fast when it is
// absent), build a replacement array, swap it in, and filter rows.

pub mod columns;

use crate::error::PipelineError;
use arrow::{
    array::{Array, ArrayRef, BooleanArray},
    compute::filter_record_batch,
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

/// Position of `column` in `batch`, or `MissingColumn` tagged with `stage`.
pub fn require_column(
    batch: &RecordBatch,
    stage: &'static str,
    column: &str,
) -> Result<usize, PipelineError> {
    batch
        .schema()
        .index_of(column)
        .map_err(|_| PipelineError::MissingColumn {
            stage,
            column: column.to_string(),
        })
}

/// Borrow `column` downcast to the concrete array type `T`.
pub fn typed_column<'a, T: Array + 'static>(
    batch: &'a RecordBatch,
    stage: &'static str,
    column: &str,
) -> Result<&'a T, PipelineError> {
    let idx = require_column(batch, stage, column)?;
    let arr = batch.column(idx);
    arr.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| PipelineError::UnexpectedType {
            stage,
            column: column.to_string(),
            found: arr.data_type().clone(),
        })
}

/// Return a new batch where `column` is replaced by `values`.
///
/// The field keeps its name; its type and nullability follow `values`.
pub fn replace_column(
    batch: &RecordBatch,
    stage: &'static str,
    column: &str,
    values: ArrayRef,
    nullable: bool,
) -> Result<RecordBatch, PipelineError> {
    let idx = require_column(batch, stage, column)?;
    let schema = batch.schema();

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| {
            if i == idx {
                Field::new(column, values.data_type().clone(), nullable)
            } else {
                f.as_ref().clone()
            }
        })
        .collect();

    let mut cols = batch.columns().to_vec();
    cols[idx] = values;

    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols).map_err(PipelineError::arrow(stage))
}

/// Append `column`, or overwrite it if a column of that name already exists.
pub fn upsert_column(
    batch: &RecordBatch,
    stage: &'static str,
    column: &str,
    values: ArrayRef,
    nullable: bool,
) -> Result<RecordBatch, PipelineError> {
    if batch.schema().index_of(column).is_ok() {
        return replace_column(batch, stage, column, values, nullable);
    }

    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    fields.push(Field::new(column, values.data_type().clone(), nullable));

    let mut cols = batch.columns().to_vec();
    cols.push(values);

    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols).map_err(PipelineError::arrow(stage))
}

/// Rename columns according to `(from, to)` pairs. Pairs whose `from` is not
/// present are ignored.
pub fn rename_columns(
    batch: &RecordBatch,
    stage: &'static str,
    renames: &[(&str, &str)],
) -> Result<RecordBatch, PipelineError> {
    let schema = batch.schema();
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| {
            match renames.iter().find(|(from, _)| f.name().as_str() == *from) {
                Some((_, to)) => f.as_ref().clone().with_name(*to),
                None => f.as_ref().clone(),
            }
        })
        .collect();

    RecordBatch::try_new(Arc::new(Schema::new(fields)), batch.columns().to_vec())
        .map_err(PipelineError::arrow(stage))
}

/// Keep only the rows whose mask entry is `true`.
pub fn retain_rows(
    batch: &RecordBatch,
    stage: &'static str,
    mask: &BooleanArray,
) -> Result<RecordBatch, PipelineError> {
    filter_record_batch(batch, mask).map_err(PipelineError::arrow(stage))
}

/// Row mask that is `true` wherever every listed column is non-null.
pub fn non_null_mask(
    batch: &RecordBatch,
    stage: &'static str,
    columns: &[&str],
) -> Result<BooleanArray, PipelineError> {
    let arrays = columns
        .iter()
        .map(|c| require_column(batch, stage, c).map(|idx| batch.column(idx)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((0..batch.num_rows())
        .map(|row| Some(arrays.iter().all(|a| a.is_valid(row))))
        .collect())
}

#[cfg(test)]
pub(crate) mod test_support {
    use arrow::{
        array::{ArrayRef, StringArray},
        datatypes::{DataType, Field, Schema},
        record_batch::RecordBatch,
    };
    use std::sync::Arc;

    /// Build an all-`Utf8` batch the way the loader does.
    pub fn utf8_batch(columns: &[(&str, Vec<Option<&str>>)]) -> RecordBatch {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Utf8, true))
            .collect();
        let arrays: Vec<ArrayRef> = columns
            .iter()
            .map(|(_, values)| Arc::new(StringArray::from(values.clone())) as ArrayRef)
            .collect();
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
    }

    pub fn init_test_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::utf8_batch;
    use super::*;
    use arrow::array::StringArray;

    #[test]
    fn missing_column_names_stage_and_column() {
        let batch = utf8_batch(&[("a", vec![Some("1")])]);
        let err = require_column(&batch, "probe", "b").unwrap_err();
        match err {
            PipelineError::MissingColumn { stage, column } => {
                assert_eq!(stage, "probe");
                assert_eq!(column, "b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rename_then_upsert_keeps_row_count() {
        let batch = utf8_batch(&[("x", vec![Some("1"), None]), ("y", vec![Some("a"), Some("b")])]);
        let renamed = rename_columns(&batch, "probe", &[("x", "z"), ("nope", "never")]).unwrap();
        assert!(renamed.schema().index_of("z").is_ok());
        assert!(renamed.schema().index_of("x").is_err());

        let extra: ArrayRef = Arc::new(StringArray::from(vec!["p", "q"]));
        let grown = upsert_column(&renamed, "probe", "w", extra.clone(), false).unwrap();
        assert_eq!(grown.num_columns(), 3);
        let same = upsert_column(&grown, "probe", "w", extra, false).unwrap();
        assert_eq!(same.num_columns(), 3);
        assert_eq!(same.num_rows(), 2);
    }

    #[test]
    fn non_null_mask_requires_all_columns() {
        let batch = utf8_batch(&[
            ("a", vec![Some("1"), None, Some("3")]),
            ("b", vec![Some("1"), Some("2"), None]),
        ]);
        let mask = non_null_mask(&batch, "probe", &["a", "b"]).unwrap();
        let kept = retain_rows(&batch, "probe", &mask).unwrap();
        assert_eq!(kept.num_rows(), 1);
    }
}

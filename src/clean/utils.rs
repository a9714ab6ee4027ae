use crate::error::PipelineError;
use arrow::{
    array::{Array, ArrayRef, Float64Array, StringArray},
    compute::cast,
    datatypes::DataType,
};

/// Trim whitespace and strip one pair of outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Parse a finite float. Blank, non-numeric, NaN and infinite inputs give `None`.
pub fn parse_finite(raw: &str) -> Option<f64> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce an arbitrary column into `Float64`, turning anything that is not a
/// finite number into null.
///
/// Text is parsed; other numeric types are cast. Re-running on an already
/// coerced column is a no-op.
pub fn coerce_float64(
    array: &ArrayRef,
    stage: &'static str,
    column: &str,
) -> Result<Float64Array, PipelineError> {
    match array.data_type() {
        DataType::Utf8 => {
            let sarr = downcast_utf8(array, stage, column)?;
            Ok(sarr.iter().map(|opt| opt.and_then(parse_finite)).collect())
        }
        DataType::Null => Ok(Float64Array::new_null(array.len())),
        dt if dt.is_numeric() => {
            let casted = cast(array, &DataType::Float64).map_err(PipelineError::arrow(stage))?;
            let farr = casted
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| PipelineError::UnexpectedType {
                    stage,
                    column: column.to_string(),
                    found: casted.data_type().clone(),
                })?;
            Ok(farr.iter().map(|v| v.filter(|x| x.is_finite())).collect())
        }
        other => Err(PipelineError::UnexpectedType {
            stage,
            column: column.to_string(),
            found: other.clone(),
        }),
    }
}

/// View any column as optional strings: text as is, everything else through
/// an arrow cast to `Utf8`.
pub fn coerce_utf8(
    array: &ArrayRef,
    stage: &'static str,
    column: &str,
) -> Result<StringArray, PipelineError> {
    if array.data_type() == &DataType::Utf8 {
        return Ok(downcast_utf8(array, stage, column)?.clone());
    }
    let casted = cast(array, &DataType::Utf8).map_err(PipelineError::arrow(stage))?;
    Ok(downcast_utf8(&casted, stage, column)?.clone())
}

fn downcast_utf8<'a>(
    array: &'a ArrayRef,
    stage: &'static str,
    column: &str,
) -> Result<&'a StringArray, PipelineError> {
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| PipelineError::UnexpectedType {
            stage,
            column: column.to_string(),
            found: array.data_type().clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use std::sync::Arc;

    #[test]
    fn clean_str_strips_quotes_and_spaces() {
        assert_eq!(clean_str("  \" 22 \" "), "22");
        assert_eq!(clean_str("\""), "\"");
        assert_eq!(clean_str(" abc "), "abc");
    }

    #[test]
    fn parse_finite_rejects_garbage_and_non_finite() {
        assert_eq!(parse_finite(" 7.4 "), Some(7.4));
        assert_eq!(parse_finite("1e2"), Some(100.0));
        assert_eq!(parse_finite("22kW"), None);
        assert_eq!(parse_finite(""), None);
        assert_eq!(parse_finite("NaN"), None);
        assert_eq!(parse_finite("inf"), None);
    }

    #[test]
    fn coerce_float64_accepts_text_and_integers() {
        let text: ArrayRef = Arc::new(StringArray::from(vec![Some("3.5"), Some("x"), None]));
        let out = coerce_float64(&text, "probe", "c").unwrap();
        assert_eq!(out.value(0), 3.5);
        assert!(out.is_null(1));
        assert!(out.is_null(2));

        let ints: ArrayRef = Arc::new(Int64Array::from(vec![Some(4), None]));
        let out = coerce_float64(&ints, "probe", "c").unwrap();
        assert_eq!(out.value(0), 4.0);
        assert!(out.is_null(1));
    }
}

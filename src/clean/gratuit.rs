// src/clean/gratuit.rs

use crate::clean::utils::coerce_utf8;
use crate::error::PipelineError;
use crate::table::{columns, replace_column, require_column};
use arrow::{array::StringArray, record_batch::RecordBatch};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, sync::Arc};

pub const STAGE: &str = "gratuit";

/// Whether charging at a station is free of charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gratuity {
    Yes,
    No,
    Unknown,
}

impl Gratuity {
    pub const ALL: [Gratuity; 3] = [Gratuity::Yes, Gratuity::No, Gratuity::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gratuity::Yes => "Yes",
            Gratuity::No => "No",
            Gratuity::Unknown => "Unknown",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Gratuity::ALL.into_iter().find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Total mapping of a raw cell: tokens outside the table, and missing
    /// cells, are `Unknown`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        raw.map(|s| s.trim().to_lowercase())
            .and_then(|token| RAW_TOKENS.get(token.as_str()).copied())
            .unwrap_or(Gratuity::Unknown)
    }
}

impl fmt::Display for Gratuity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every recognised spelling, after trimming and lower-casing.
static RAW_TOKENS: Lazy<HashMap<&'static str, Gratuity>> = Lazy::new(|| {
    HashMap::from([
        ("true", Gratuity::Yes),
        ("1", Gratuity::Yes),
        ("oui", Gratuity::Yes),
        ("false", Gratuity::No),
        ("0", Gratuity::No),
        ("non", Gratuity::No),
    ])
});

/// Replace `gratuit` with its tri-state label. Native booleans are read
/// through their text form, so `true`/`false` columns map the same way.
pub fn clean_gratuit(batch: &RecordBatch) -> Result<RecordBatch, PipelineError> {
    let idx = require_column(batch, STAGE, columns::FREE)?;
    let raw = coerce_utf8(batch.column(idx), STAGE, columns::FREE)?;

    let labels: StringArray = raw
        .iter()
        .map(|opt| Some(Gratuity::from_raw(opt).as_str()))
        .collect();

    replace_column(batch, STAGE, columns::FREE, Arc::new(labels), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::utf8_batch;
    use arrow::{
        array::{ArrayRef, BooleanArray},
        datatypes::{DataType, Field, Schema},
    };

    #[test]
    fn maps_every_known_spelling() {
        let cases = [
            (Some("true"), Gratuity::Yes),
            (Some(" TRUE "), Gratuity::Yes),
            (Some("1"), Gratuity::Yes),
            (Some("Oui"), Gratuity::Yes),
            (Some("false"), Gratuity::No),
            (Some("0"), Gratuity::No),
            (Some(" NON"), Gratuity::No),
            (Some("peut-être"), Gratuity::Unknown),
            (Some("1.0"), Gratuity::Unknown),
            (Some(""), Gratuity::Unknown),
            (None, Gratuity::Unknown),
        ];
        for (raw, expected) in cases {
            assert_eq!(Gratuity::from_raw(raw), expected, "raw = {raw:?}");
        }
    }

    #[test]
    fn column_is_total_over_three_labels() {
        let raw = utf8_batch(&[(
            columns::FREE,
            vec![Some("oui"), Some("non"), None, Some("gratuit"), Some("False")],
        )]);
        let out = clean_gratuit(&raw).unwrap();
        let labels = out
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        let got: Vec<&str> = labels.iter().flatten().collect();
        assert_eq!(got, vec!["Yes", "No", "Unknown", "Unknown", "No"]);
        assert!(got.iter().all(|l| Gratuity::from_label(l).is_some()));
    }

    #[test]
    fn native_booleans_are_accepted() {
        let schema = Arc::new(Schema::new(vec![Field::new(columns::FREE, DataType::Boolean, true)]));
        let values: ArrayRef = Arc::new(BooleanArray::from(vec![Some(true), Some(false), None]));
        let batch = RecordBatch::try_new(schema, vec![values]).unwrap();

        let out = clean_gratuit(&batch).unwrap();
        let labels = out
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(labels.value(0), "Yes");
        assert_eq!(labels.value(1), "No");
        assert_eq!(labels.value(2), "Unknown");
    }
}

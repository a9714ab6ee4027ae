// src/features/power.rs

use crate::error::PipelineError;
use crate::table::{columns, typed_column, upsert_column};
use arrow::{
    array::{Float64Array, StringArray},
    record_batch::RecordBatch,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const STAGE: &str = "power_category";

/// Nominal-power band of a charge point. Bands are closed on the left, open
/// on the right: a value on a boundary belongs to the higher band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerCategory {
    Slow,
    Accelerated,
    Fast,
    UltraFast,
    Unknown,
}

/// Lower edges (kW) of the four bands, in order.
const BAND_EDGES: [(f64, PowerCategory); 4] = [
    (0.0, PowerCategory::Slow),
    (11.0, PowerCategory::Accelerated),
    (50.0, PowerCategory::Fast),
    (150.0, PowerCategory::UltraFast),
];

impl PowerCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PowerCategory::Slow => "Charge Lente (<11kW)",
            PowerCategory::Accelerated => "Charge Accélérée (11-50kW)",
            PowerCategory::Fast => "Charge Rapide (50-150kW)",
            PowerCategory::UltraFast => "Charge Ultra-Rapide (>150kW)",
            PowerCategory::Unknown => "Unknown",
        }
    }

    /// Band for a power value; null and negative values are `Unknown`.
    pub fn from_power(kw: Option<f64>) -> Self {
        let Some(kw) = kw.filter(|v| *v >= 0.0) else {
            return PowerCategory::Unknown;
        };
        BAND_EDGES
            .iter()
            .rev()
            .find(|(edge, _)| kw >= *edge)
            .map(|(_, cat)| *cat)
            .unwrap_or(PowerCategory::Unknown)
    }
}

/// Add `categorie_puissance`, assigned for every row.
pub fn add_power_category(batch: &RecordBatch) -> Result<RecordBatch, PipelineError> {
    let power = typed_column::<Float64Array>(batch, STAGE, columns::POWER)?;
    let labels: StringArray = power
        .iter()
        .map(|kw| Some(PowerCategory::from_power(kw).label()))
        .collect();

    upsert_column(batch, STAGE, columns::POWER_CATEGORY, Arc::new(labels), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::{Array, ArrayRef},
        datatypes::{DataType, Field, Schema},
    };

    #[test]
    fn boundaries_fall_in_the_higher_band() {
        use PowerCategory::*;
        let cases = [
            (Some(0.0), Slow),
            (Some(3.7), Slow),
            (Some(10.999), Slow),
            (Some(11.0), Accelerated),
            (Some(49.9), Accelerated),
            (Some(50.0), Fast),
            (Some(149.99), Fast),
            (Some(150.0), UltraFast),
            (Some(350.0), UltraFast),
            (Some(-1.0), Unknown),
            (None, Unknown),
        ];
        for (kw, expected) in cases {
            assert_eq!(PowerCategory::from_power(kw), expected, "kw = {kw:?}");
        }
        assert_eq!(PowerCategory::from_power(Some(11.0)).label(), "Charge Accélérée (11-50kW)");
        assert!(PowerCategory::from_power(Some(150.0))
            .label()
            .starts_with("Charge Ultra-Rapide"));
    }

    #[test]
    fn null_power_still_gets_a_category() {
        let schema = Arc::new(Schema::new(vec![Field::new(columns::POWER, DataType::Float64, true)]));
        let power: ArrayRef = Arc::new(Float64Array::from(vec![Some(22.0), None]));
        let batch = RecordBatch::try_new(schema, vec![power]).unwrap();

        let out = add_power_category(&batch).unwrap();
        let cats = out
            .column_by_name(columns::POWER_CATEGORY)
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(cats.null_count(), 0);
        assert_eq!(cats.value(0), "Charge Accélérée (11-50kW)");
        assert_eq!(cats.value(1), "Unknown");
    }

    #[test]
    fn requires_typed_power() {
        let schema = Arc::new(Schema::new(vec![Field::new(columns::POWER, DataType::Utf8, true)]));
        let power: ArrayRef = Arc::new(StringArray::from(vec![Some("22")]));
        let batch = RecordBatch::try_new(schema, vec![power]).unwrap();
        assert!(matches!(
            add_power_category(&batch),
            Err(PipelineError::UnexpectedType { .. })
        ));
    }
}

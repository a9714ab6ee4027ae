// src/view/filter.rs

use crate::clean::{text::normalize_operator, Gratuity};
use crate::error::PipelineError;
use crate::table::{columns, retain_rows, typed_column};
use crate::view::{summary::power_range, STAGE};
use arrow::{
    array::{BooleanArray, Float64Array, StringArray},
    record_batch::RecordBatch,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Conjunction of the dashboard selections. `None` leaves a criterion open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationFilter {
    /// Operators to keep, compared after the same normalization the pipeline
    /// applies. An empty set keeps nothing.
    pub operators: Option<BTreeSet<String>>,
    /// Inclusive power range in kW. Rows without a power value never match.
    pub power_range: Option<(f64, f64)>,
    pub gratuit: Option<Gratuity>,
}

impl StationFilter {
    /// Selection a dashboard opens with: every operator, any gratuity and the
    /// full observed power range. Stations without a power value fall outside.
    pub fn dashboard_default(batch: &RecordBatch) -> Result<Self, PipelineError> {
        // no observed power: every row is null and no range matches it
        let (lo, hi) = power_range(batch)?.map_or((0.0, 0.0), |r| (r.min_kw, r.max_kw));
        Ok(Self::default().with_power_range(lo, hi))
    }

    pub fn with_operators<I, S>(mut self, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.operators = Some(
            operators
                .into_iter()
                .map(|op| normalize_operator(Some(op.as_ref())))
                .collect(),
        );
        self
    }

    pub fn with_power_range(mut self, min_kw: f64, max_kw: f64) -> Self {
        self.power_range = Some((min_kw, max_kw));
        self
    }

    pub fn with_gratuit(mut self, gratuit: Gratuity) -> Self {
        self.gratuit = Some(gratuit);
        self
    }

    pub fn is_open(&self) -> bool {
        self.operators.is_none() && self.power_range.is_none() && self.gratuit.is_none()
    }

    /// Rows of a cleaned snapshot matching every criterion.
    pub fn apply(&self, batch: &RecordBatch) -> Result<RecordBatch, PipelineError> {
        if self.is_open() {
            return Ok(batch.clone());
        }

        let operators = typed_column::<StringArray>(batch, STAGE, columns::OPERATOR)?;
        let power = typed_column::<Float64Array>(batch, STAGE, columns::POWER)?;
        let gratuit = typed_column::<StringArray>(batch, STAGE, columns::FREE)?;

        let mask: BooleanArray = operators
            .iter()
            .zip(power.iter())
            .zip(gratuit.iter())
            .map(|((op, kw), g)| Some(self.matches(op, kw, g)))
            .collect();

        retain_rows(batch, STAGE, &mask)
    }

    fn matches(&self, operator: Option<&str>, power_kw: Option<f64>, gratuit: Option<&str>) -> bool {
        let operator_ok = match &self.operators {
            Some(set) => operator.is_some_and(|op| set.contains(op)),
            None => true,
        };
        let power_ok = match self.power_range {
            Some((lo, hi)) => power_kw.is_some_and(|kw| kw >= lo && kw <= hi),
            None => true,
        };
        let gratuit_ok = match self.gratuit {
            Some(wanted) => gratuit == Some(wanted.as_str()),
            None => true,
        };
        operator_ok && power_ok && gratuit_ok
    }
}

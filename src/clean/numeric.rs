// src/clean/numeric.rs

use crate::clean::utils::coerce_float64;
use crate::error::PipelineError;
use crate::table::{columns, replace_column, require_column, retain_rows};
use arrow::{
    array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub const STAGE: &str = "numeric";

/// Power values above this quantile of the observed distribution are dropped.
pub const OUTLIER_QUANTILE: f64 = 0.999;

/// Coerce `puissance_nominale` to `Float64` and `nbre_pdc` to `Int64`, then
/// drop power outliers. Rows with a missing power value are always kept.
///
/// A count that parses but is not a whole number cannot be stored as
/// `Int64` and is set to null; how many were is logged.
pub fn clean_numeric(batch: &RecordBatch) -> Result<RecordBatch, PipelineError> {
    let power_idx = require_column(batch, STAGE, columns::POWER)?;
    let points_idx = require_column(batch, STAGE, columns::CHARGE_POINTS)?;

    let power = coerce_float64(batch.column(power_idx), STAGE, columns::POWER)?;
    let parsed = coerce_float64(batch.column(points_idx), STAGE, columns::CHARGE_POINTS)?;
    let points: Int64Array = parsed.iter().map(|v| v.and_then(as_count)).collect();
    let fractional = points.null_count() - parsed.null_count();
    if fractional > 0 {
        warn!(rows = fractional, "non-integral charge point counts set to null");
    }

    let table = replace_column(
        batch,
        STAGE,
        columns::POWER,
        Arc::new(power.clone()) as ArrayRef,
        true,
    )?;
    let table = replace_column(&table, STAGE, columns::CHARGE_POINTS, Arc::new(points), true)?;

    exclude_power_outliers(&table, &power)
}

/// Threshold used by the outlier rule for `power`, `None` if no value is set.
pub fn power_threshold(power: &Float64Array) -> Option<f64> {
    let mut observed: Vec<f64> = power.iter().flatten().collect();
    quantile(&mut observed, OUTLIER_QUANTILE)
}

fn exclude_power_outliers(
    table: &RecordBatch,
    power: &Float64Array,
) -> Result<RecordBatch, PipelineError> {
    let Some(threshold) = power_threshold(power) else {
        debug!("no power values observed, outlier exclusion skipped");
        return Ok(table.clone());
    };

    let keep: BooleanArray = power
        .iter()
        .map(|v| Some(v.map_or(true, |p| p <= threshold)))
        .collect();
    let out = retain_rows(table, STAGE, &keep)?;

    debug!(
        threshold,
        excluded = table.num_rows() - out.num_rows(),
        "power outliers excluded"
    );
    Ok(out)
}

/// Linear-interpolated quantile (rank `(n - 1) * q`), sorting `values` in place.
pub fn quantile(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let rank = (values.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    let (a, b) = (values[lo], values[hi]);

    // interpolate from the nearer end to stay exact at the sample points
    Some(if frac >= 0.5 {
        b - (b - a) * (1.0 - frac)
    } else {
        a + (b - a) * frac
    })
}

fn as_count(v: f64) -> Option<i64> {
    (v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64).then_some(v as i64)
}

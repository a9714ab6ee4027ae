// src/view/summary.rs

use crate::clean::Gratuity;
use crate::error::PipelineError;
use crate::table::{columns, typed_column};
use crate::view::STAGE;
use arrow::{
    array::{Array, Float64Array, Int64Array, StringArray},
    compute,
    record_batch::RecordBatch,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerRange {
    pub min_kw: f64,
    pub max_kw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount<T> {
    pub value: T,
    pub count: usize,
}

/// Headline figures for a (possibly filtered) snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub stations: usize,
    /// Sum of the known `nbre_pdc` values.
    pub charge_points: i64,
    pub mean_power_kw: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower_kw: f64,
    pub upper_kw: f64,
    pub count: usize,
}

/// Distinct operator names, sorted.
pub fn operator_options(batch: &RecordBatch) -> Result<Vec<String>, PipelineError> {
    let ops = typed_column::<StringArray>(batch, STAGE, columns::OPERATOR)?;
    let set: BTreeSet<&str> = ops.iter().flatten().collect();
    Ok(set.into_iter().map(str::to_string).collect())
}

/// Smallest and largest power, `None` when no row has one.
pub fn power_range(batch: &RecordBatch) -> Result<Option<PowerRange>, PipelineError> {
    let power = typed_column::<Float64Array>(batch, STAGE, columns::POWER)?;
    Ok(compute::min(power)
        .zip(compute::max(power))
        .map(|(min_kw, max_kw)| PowerRange { min_kw, max_kw }))
}

/// Gratuity labels present in the snapshot, in order of first appearance.
pub fn gratuit_options(batch: &RecordBatch) -> Result<Vec<Gratuity>, PipelineError> {
    let labels = typed_column::<StringArray>(batch, STAGE, columns::FREE)?;
    let mut seen = Vec::with_capacity(Gratuity::ALL.len());
    for g in labels.iter().flatten().filter_map(Gratuity::from_label) {
        if !seen.contains(&g) {
            seen.push(g);
            if seen.len() == Gratuity::ALL.len() {
                break;
            }
        }
    }
    Ok(seen)
}

/// Stations per operator, most frequent first (ties by name), truncated to
/// `top` entries when given.
pub fn operator_counts(
    batch: &RecordBatch,
    top: Option<usize>,
) -> Result<Vec<ValueCount<String>>, PipelineError> {
    let ops = typed_column::<StringArray>(batch, STAGE, columns::OPERATOR)?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for op in ops.iter().flatten() {
        *counts.entry(op).or_default() += 1;
    }

    let mut out: Vec<ValueCount<String>> = counts
        .into_iter()
        .map(|(value, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    if let Some(n) = top {
        out.truncate(n);
    }
    Ok(out)
}

/// Stations per distinct power value, ascending by power. Null power is not
/// counted.
pub fn power_counts(batch: &RecordBatch) -> Result<Vec<ValueCount<f64>>, PipelineError> {
    let power = typed_column::<Float64Array>(batch, STAGE, columns::POWER)?;
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for kw in power.iter().flatten() {
        // + 0.0 folds -0.0 into 0.0
        *counts.entry((kw + 0.0).to_bits()).or_default() += 1;
    }

    let mut out: Vec<ValueCount<f64>> = counts
        .into_iter()
        .map(|(bits, count)| ValueCount {
            value: f64::from_bits(bits),
            count,
        })
        .collect();
    out.sort_by(|a, b| a.value.total_cmp(&b.value));
    Ok(out)
}

pub fn kpis(batch: &RecordBatch) -> Result<Kpis, PipelineError> {
    let power = typed_column::<Float64Array>(batch, STAGE, columns::POWER)?;
    let points = typed_column::<Int64Array>(batch, STAGE, columns::CHARGE_POINTS)?;

    let known_power = power.len() - power.null_count();
    let mean_power_kw = match (compute::sum(power), known_power) {
        (Some(total), n) if n > 0 => Some(total / n as f64),
        _ => None,
    };

    Ok(Kpis {
        stations: batch.num_rows(),
        charge_points: compute::sum(points).unwrap_or(0),
        mean_power_kw,
    })
}

/// Equal-width histogram of power over `[min, max]`; the last bin is closed
/// so the maximum is counted. Empty when there is no power value or
/// `bins == 0`.
pub fn power_histogram(
    batch: &RecordBatch,
    bins: usize,
) -> Result<Vec<HistogramBin>, PipelineError> {
    let Some(range) = power_range(batch)? else {
        return Ok(Vec::new());
    };
    if bins == 0 {
        return Ok(Vec::new());
    }
    let power = typed_column::<Float64Array>(batch, STAGE, columns::POWER)?;

    let span = range.max_kw - range.min_kw;
    if span == 0.0 {
        return Ok(vec![HistogramBin {
            lower_kw: range.min_kw,
            upper_kw: range.max_kw,
            count: power.len() - power.null_count(),
        }]);
    }

    let width = span / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower_kw: range.min_kw + width * i as f64,
            upper_kw: if i + 1 == bins {
                range.max_kw
            } else {
                range.min_kw + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for kw in power.iter().flatten() {
        let idx = (((kw - range.min_kw) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    Ok(out)
}

//! Read-only queries a dashboard runs against a cleaned snapshot: option
//! lists for its controls, the filter itself, and the aggregates behind its
//! charts and map.

pub mod filter;
pub mod map;
pub mod summary;

pub use filter::StationFilter;
pub use map::{map_points, map_view, MapBounds, MapPoint, MapView};
pub use summary::{
    gratuit_options, kpis, operator_counts, operator_options, power_counts, power_histogram,
    power_range, HistogramBin, Kpis, PowerRange, ValueCount,
};

use crate::error::PipelineError;
use arrow::{record_batch::RecordBatch, util::pretty::pretty_format_batches};

pub const STAGE: &str = "view";

/// First `rows` rows rendered as a text table.
pub fn preview(batch: &RecordBatch, rows: usize) -> Result<String, PipelineError> {
    let head = batch.slice(0, rows.min(batch.num_rows()));
    pretty_format_batches(&[head])
        .map(|table| table.to_string())
        .map_err(PipelineError::arrow(STAGE))
}

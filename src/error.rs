use arrow::{datatypes::DataType, error::ArrowError};
use thiserror::Error;

/// Failures that abort the cleaning pipeline.
///
/// Per-value coercion failures never show up here: they become nulls.
/// What remains are schema mismatches, which mean the pipeline was handed a
/// table it was not written for.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("stage `{stage}` requires column `{column}`, which is absent from the table")]
    MissingColumn { stage: &'static str, column: String },

    #[error("stage `{stage}` cannot read column `{column}` of type {found}")]
    UnexpectedType {
        stage: &'static str,
        column: String,
        found: DataType,
    },

    #[error("arrow error in stage `{stage}`: {source}")]
    Arrow {
        stage: &'static str,
        #[source]
        source: ArrowError,
    },
}

impl PipelineError {
    /// Adapter for `map_err` on arrow kernel calls.
    pub fn arrow(stage: &'static str) -> impl FnOnce(ArrowError) -> Self {
        move |source| PipelineError::Arrow { stage, source }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::MissingColumn { stage, .. }
            | PipelineError::UnexpectedType { stage, .. }
            | PipelineError::Arrow { stage, .. } => stage,
        }
    }
}

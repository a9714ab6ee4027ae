//! Cleaning and feature-engineering pipeline for the French public
//! charging-point registry (IRVE), plus the read-only queries a dashboard
//! runs over the cleaned snapshot.

pub mod cache;
pub mod clean;
pub mod config;
pub mod error;
pub mod features;
pub mod load;
pub mod pipeline;
pub mod table;
pub mod view;

pub use cache::SnapshotCache;
pub use config::AppConfig;
pub use error::PipelineError;
pub use load::{LoadFailure, LoadOutcome};
pub use pipeline::{clean_data, load_and_clean};

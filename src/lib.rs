//! Load per-category video metadata tables, clean them once, and answer the
//! dashboard's analytical queries over the immutable result.

pub mod clean;
pub mod config;
pub mod error;
pub mod load;
pub mod models;
pub mod orchestrator;
pub mod out_models;
pub mod query;
pub mod raw_types;
pub mod render;
pub mod store;
pub mod text;
pub mod viz_export;

pub use error::{DashboardError, Result};
pub use models::{AnalysisMode, CategoryTable, CleanedRecord, Metric, TextField};
pub use store::CategoryStore;

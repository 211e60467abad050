use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Schema error in category '{category}': missing column(s) {}", .missing.join(", "))]
    Schema {
        category: String,
        missing: Vec<String>,
    },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Empty input: {0} requires at least one record")]
    EmptyInput(&'static str),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown analysis mode: {0}")]
    UnknownAnalysisMode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

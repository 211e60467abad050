use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::clean::{BucketSpec, CleaningParams, DEFAULT_MAX_DURATION_MINUTES};
use crate::error::DashboardError;
use crate::text::stop_words_with;

pub const ENV_CONFIG: &str = "TUBE_VIBES_CONFIG";
pub const ENV_DATA_DIR: &str = "TUBE_VIBES_DATA_DIR";

pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "sports",
    "health",
    "entertainment",
    "education",
    "automotive",
    "business",
    "news",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub file_pattern: String,      // "{category}" is replaced by the category name
    pub categories: Vec<String>,   // published in this order
    pub bucket_width_minutes: f64,
    pub max_bucket_minutes: Option<f64>, // None = cover the longest video
    pub max_duration_minutes: f64,       // longer durations are treated as bad cells
    pub title_aggregation: bool,
    pub top_n: usize,
    pub word_cloud_limit: usize,
    pub extra_stop_words: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_dir: PathBuf::from("data"),
            file_pattern: "dash_csv_{category}.csv".to_string(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            bucket_width_minutes: 3.0,
            max_bucket_minutes: None,
            max_duration_minutes: DEFAULT_MAX_DURATION_MINUTES,
            title_aggregation: true,
            top_n: 10,
            word_cloud_limit: 100,
            extra_stop_words: Vec::new(),
        }
    }
}

impl DashboardConfig {
    /// Read a YAML config file; absent keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: DashboardConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn path_for(&self, category: &str) -> PathBuf {
        self.data_dir.join(self.file_pattern.replace("{category}", category))
    }

    pub fn validate(&self) -> std::result::Result<(), DashboardError> {
        if !self.file_pattern.contains("{category}") {
            return Err(DashboardError::Config(format!(
                "file_pattern '{}' must contain {{category}}",
                self.file_pattern
            )));
        }
        let mut seen = HashSet::new();
        for c in &self.categories {
            if c.trim().is_empty() {
                return Err(DashboardError::Config("empty category name".to_string()));
            }
            if !seen.insert(c.as_str()) {
                return Err(DashboardError::Config(format!("duplicate category '{}'", c)));
            }
        }
        self.cleaning_params().map(|_| ())
    }

    pub fn cleaning_params(&self) -> std::result::Result<CleaningParams, DashboardError> {
        Ok(CleaningParams {
            buckets: BucketSpec::new(self.bucket_width_minutes, self.max_bucket_minutes)?
                .with_ceiling(self.max_duration_minutes)?,
            title_aggregation: self.title_aggregation,
        })
    }

    pub fn stop_words(&self) -> HashSet<String> {
        stop_words_with(&self.extra_stop_words)
    }
}

/// Resolve the config: `--config` path, else `TUBE_VIBES_CONFIG`, else defaults.
/// `TUBE_VIBES_DATA_DIR` then overrides the data directory.
pub fn resolve_config(cli_path: Option<&Path>) -> Result<DashboardConfig> {
    let file = cli_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(ENV_CONFIG).ok().map(PathBuf::from));

    let mut cfg = match file {
        Some(p) => {
            debug!("Using config file: {}", p.display());
            DashboardConfig::load(&p)?
        }
        None => {
            debug!("No config file given, using defaults");
            DashboardConfig::default()
        }
    };

    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        debug!("Data dir overridden by {}: {}", ENV_DATA_DIR, dir);
        cfg.data_dir = PathBuf::from(dir);
    }
    Ok(cfg)
}

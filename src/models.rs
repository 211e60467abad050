use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// One row of a cleaned category table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub record_id: String, // xxh3 of video_url|title
    pub title: String,
    pub channel: String,
    pub video_url: String,
    pub hashtags: String,
    pub description: String,
    pub view_count: u64,
    pub like_count: u64,
    pub dislike_count: u64,
    pub subscriber_count: u64,
    pub duration_minutes: f64, // 0.0 when missing or unparsable
    pub total_interactions: u64,
    pub net_likes: i64,
    pub duration_bucket: Option<String>, // None when unbucketed
}

impl CleanedRecord {
    /// Recompute `total_interactions` and `net_likes` from the raw counts.
    pub fn with_derived_metrics(mut self) -> Self {
        self.total_interactions = self
            .view_count
            .saturating_add(self.like_count)
            .saturating_add(self.dislike_count);
        self.net_likes = to_i64(self.like_count).saturating_sub(to_i64(self.dislike_count));
        self
    }
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Per-bucket view totals for the duration-vs-views chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationBucketAggregate {
    pub width_minutes: f64,
    pub labels: Vec<String>,        // canonical interval order
    pub views: HashMap<String, u64>, // label -> sum(view_count)
}

impl DurationBucketAggregate {
    pub fn views_for(&self, label: &str) -> Option<u64> {
        self.views.get(label).copied()
    }
}

/// Immutable cleaned table for a single category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    pub name: String,
    pub records: Vec<CleanedRecord>,
    pub duration_buckets: Option<DurationBucketAggregate>, // present only when the source had `duration`
}

impl CategoryTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_duration(&self) -> bool {
        self.duration_buckets.is_some()
    }
}

/// Closed set of metrics a table can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalInteractions,
    SubscriberCount,
    LikeCount,
    DislikeCount,
    ViewCount,
    NetLikes,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::TotalInteractions,
        Metric::SubscriberCount,
        Metric::LikeCount,
        Metric::DislikeCount,
        Metric::ViewCount,
        Metric::NetLikes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::TotalInteractions => "total_interactions",
            Metric::SubscriberCount => "subscriber_count",
            Metric::LikeCount => "like_count",
            Metric::DislikeCount => "dislike_count",
            Metric::ViewCount => "view_count",
            Metric::NetLikes => "net_likes",
        }
    }

    pub fn value(self, r: &CleanedRecord) -> i64 {
        match self {
            Metric::TotalInteractions => to_i64(r.total_interactions),
            Metric::SubscriberCount => to_i64(r.subscriber_count),
            Metric::LikeCount => to_i64(r.like_count),
            Metric::DislikeCount => to_i64(r.dislike_count),
            Metric::ViewCount => to_i64(r.view_count),
            Metric::NetLikes => r.net_likes,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| DashboardError::UnknownMetric(s.to_string()))
    }
}

/// Free-text columns usable for keyword extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Title,
    Hashtags,
    Description,
}

impl TextField {
    pub fn get(self, r: &CleanedRecord) -> &str {
        match self {
            TextField::Title => &r.title,
            TextField::Hashtags => &r.hashtags,
            TextField::Description => &r.description,
        }
    }
}

/// The two dashboard analysis views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Engagement,
    Trends,
}

impl AnalysisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::Engagement => "engagement",
            AnalysisMode::Trends => "trends",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "engagement" | "engagement metrics" => Ok(AnalysisMode::Engagement),
            "trends" => Ok(AnalysisMode::Trends),
            _ => Err(DashboardError::UnknownAnalysisMode(s.to_string())),
        }
    }
}

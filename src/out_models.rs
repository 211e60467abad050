use serde::{Deserialize, Serialize};

use crate::models::{AnalysisMode, CleanedRecord, Metric};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub record_id: String,
    pub channel: String,
    pub title: String,
    pub video_url: String,
    pub metric: Metric,
    pub value: i64,
}

impl RankedEntry {
    pub fn from_record(r: &CleanedRecord, metric: Metric) -> Self {
        RankedEntry {
            record_id: r.record_id.clone(),
            channel: r.channel.clone(),
            title: r.title.clone(),
            video_url: r.video_url.clone(),
            metric,
            value: metric.value(r),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelNetLikes {
    pub channel: String,
    pub net_likes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub label: String,
    pub view_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordWeight {
    pub word: String,
    pub count: u64,
}

/* Engagement */
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementReport {
    pub top_total_interactions: Vec<RankedEntry>,
    pub top_subscribers: Vec<RankedEntry>,
    pub top_likes: Vec<RankedEntry>,
    pub top_dislikes: Vec<RankedEntry>,
    pub net_likes_by_channel: Vec<ChannelNetLikes>,
}

/* Trends */
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendsReport {
    pub trending_post: Option<RankedEntry>,
    pub title_words: Vec<WordWeight>,       // word cloud weights, heaviest first
    pub most_common_word: Option<String>,   // highlighted in the cloud
    pub hashtag_frequencies: Vec<WordWeight>, // first-seen order
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnalysisReport {
    Engagement(EngagementReport),
    Trends(TrendsReport),
}

impl AnalysisReport {
    pub fn mode(&self) -> AnalysisMode {
        match self {
            AnalysisReport::Engagement(_) => AnalysisMode::Engagement,
            AnalysisReport::Trends(_) => AnalysisMode::Trends,
        }
    }
}

/* Search */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub channel: String,
    pub video_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "hits", rename_all = "snake_case")]
pub enum SearchPanel {
    Hidden,
    NoResults,
    Results(Vec<SearchHit>),
}

/// Everything the presentation layer needs for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub category: String,
    pub record_count: usize,
    pub report: AnalysisReport,
    pub duration_views: Vec<HistogramBin>, // empty when the category has no durations
    pub search: SearchPanel,
}

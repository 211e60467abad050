use csv::{ByteRecord, StringRecord};

use crate::error::{DashboardError, Result};

pub const REQUIRED_COLUMNS: [&str; 9] = [
    "view_count",
    "like_count",
    "dislike_count",
    "title",
    "hashtags",
    "channel",
    "video_url",
    "subscriber_count",
    "description",
];

pub const DURATION_COLUMN: &str = "duration";

/// A row as read from a category file; empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub dislike_count: Option<String>,
    pub subscriber_count: Option<String>,
    pub title: Option<String>,
    pub hashtags: Option<String>,
    pub description: Option<String>,
    pub channel: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<String>, // "MM:SS"
}

/// Header positions of the known columns.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    view_count: usize,
    like_count: usize,
    dislike_count: usize,
    title: usize,
    hashtags: usize,
    channel: usize,
    video_url: usize,
    subscriber_count: usize,
    description: usize,
    duration: Option<usize>,
}

impl ColumnMap {
    /// Validate the header row, reporting every missing required column at once.
    pub fn from_headers(category: &str, headers: &StringRecord) -> Result<Self> {
        let names: Vec<&str> = headers.iter().map(str::trim).collect();
        let find = |col: &str| names.iter().position(|h| *h == col);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&c| find(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DashboardError::Schema {
                category: category.to_string(),
                missing,
            });
        }

        let pos = |col: &str| find(col).unwrap_or_default();
        Ok(ColumnMap {
            view_count: pos("view_count"),
            like_count: pos("like_count"),
            dislike_count: pos("dislike_count"),
            title: pos("title"),
            hashtags: pos("hashtags"),
            channel: pos("channel"),
            video_url: pos("video_url"),
            subscriber_count: pos("subscriber_count"),
            description: pos("description"),
            duration: find(DURATION_COLUMN),
        })
    }

    pub fn has_duration(&self) -> bool {
        self.duration.is_some()
    }

    /// Pull the known cells out of a row. Short rows yield `None` for absent
    /// cells; bytes that are not UTF-8 become U+FFFD.
    pub fn extract(&self, row: &ByteRecord) -> RawRecord {
        let cell = |idx: usize| {
            row.get(idx)
                .map(String::from_utf8_lossy)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        RawRecord {
            view_count: cell(self.view_count),
            like_count: cell(self.like_count),
            dislike_count: cell(self.dislike_count),
            subscriber_count: cell(self.subscriber_count),
            title: cell(self.title),
            hashtags: cell(self.hashtags),
            description: cell(self.description),
            channel: cell(self.channel),
            video_url: cell(self.video_url),
            duration: self.duration.and_then(cell),
        }
    }
}

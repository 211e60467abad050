use itertools::Itertools;
use std::cmp::Reverse;
use std::collections::HashSet;

use crate::error::{DashboardError, Result};
use crate::models::{CleanedRecord, DurationBucketAggregate, Metric, TextField};
use crate::out_models::{ChannelNetLikes, HistogramBin};
use crate::text::{tokenize, WordFrequencies};

/// Up to `n` records, highest `metric` first. The sort is stable, so equal
/// values keep table order.
pub fn top_n_by(records: &[CleanedRecord], metric: Metric, n: usize) -> Vec<&CleanedRecord> {
    records
        .iter()
        .sorted_by_key(|r| Reverse(metric.value(r)))
        .take(n)
        .collect()
}

/// Net likes per channel, highest first. Tables hold one record per channel,
/// so this is a projection rather than a second aggregation.
pub fn net_likes_by_channel(records: &[CleanedRecord]) -> Vec<ChannelNetLikes> {
    records
        .iter()
        .map(|r| ChannelNetLikes { channel: r.channel.clone(), net_likes: r.net_likes })
        .sorted_by_key(|c| Reverse(c.net_likes))
        .collect()
}

pub fn word_frequencies(records: &[CleanedRecord], field: TextField, stop_words: &HashSet<String>) -> WordFrequencies {
    let mut freq = WordFrequencies::new();
    for r in records {
        for token in tokenize(field.get(r)) {
            if !stop_words.contains(&token) {
                freq.add(&token);
            }
        }
    }
    freq
}

/// Highest-count token; ties go to the token seen first.
pub fn most_frequent_word(freq: &WordFrequencies) -> Result<(&str, u64)> {
    let mut best: Option<(&str, u64)> = None;
    for (w, c) in freq.iter() {
        if best.map_or(true, |(_, bc)| c > bc) {
            best = Some((w, c));
        }
    }
    best.ok_or(DashboardError::EmptyInput("most_frequent_word"))
}

/// Case-insensitive substring match on title or description, in table order.
/// The keyword is matched as given, whitespace included; an empty keyword
/// matches nothing.
pub fn search<'a>(records: &'a [CleanedRecord], keyword: &str) -> Vec<&'a CleanedRecord> {
    if keyword.is_empty() {
        return Vec::new();
    }
    let needle = keyword.to_lowercase();
    records
        .iter()
        .filter(|r| r.title.to_lowercase().contains(&needle) || r.description.to_lowercase().contains(&needle))
        .collect()
}

/// Project bucket totals onto `ordered_labels`. Labels without data read 0;
/// buckets missing from `ordered_labels` are dropped.
pub fn duration_view_histogram(aggregate: &DurationBucketAggregate, ordered_labels: &[String]) -> Vec<HistogramBin> {
    ordered_labels
        .iter()
        .map(|label| HistogramBin {
            label: label.clone(),
            view_count: aggregate.views_for(label).unwrap_or(0),
        })
        .collect()
}

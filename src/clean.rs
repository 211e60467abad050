use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{DashboardError, Result};
use crate::models::{CleanedRecord, DurationBucketAggregate};
use crate::raw_types::RawRecord;

/// Durations past this are treated as bad data and never bucketed.
pub const DEFAULT_MAX_DURATION_MINUTES: f64 = 24.0 * 60.0;
pub const MAX_BUCKETS: usize = 10_000;

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+):([0-5]?\d)\s*$").expect("duration regex"));

/// Fixed-width duration intervals, optionally capped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketSpec {
    width_minutes: f64,
    cap_minutes: Option<f64>, // None = derive the range from the data
    ceiling_minutes: f64,
}

impl BucketSpec {
    pub fn new(width_minutes: f64, cap_minutes: Option<f64>) -> Result<Self> {
        if !width_minutes.is_finite() || width_minutes <= 0.0 {
            return Err(DashboardError::Config(format!(
                "bucket width must be a positive number of minutes, got {}",
                width_minutes
            )));
        }
        if let Some(cap) = cap_minutes {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(DashboardError::Config(format!(
                    "bucket cap must be a positive number of minutes, got {}",
                    cap
                )));
            }
        }
        BucketSpec { width_minutes, cap_minutes, ceiling_minutes: DEFAULT_MAX_DURATION_MINUTES }
            .with_ceiling(DEFAULT_MAX_DURATION_MINUTES)
    }

    /// Set the longest duration that still counts as real data.
    pub fn with_ceiling(self, ceiling_minutes: f64) -> Result<Self> {
        if !ceiling_minutes.is_finite() || ceiling_minutes <= 0.0 {
            return Err(DashboardError::Config(format!(
                "duration ceiling must be a positive number of minutes, got {}",
                ceiling_minutes
            )));
        }
        let checked = BucketSpec { ceiling_minutes, ..self };
        let widest = checked.cap_minutes.unwrap_or(ceiling_minutes).min(ceiling_minutes);
        if widest / checked.width_minutes > MAX_BUCKETS as f64 {
            return Err(DashboardError::Config(format!(
                "{} minutes in {}-minute buckets exceeds {} buckets",
                widest, checked.width_minutes, MAX_BUCKETS
            )));
        }
        Ok(checked)
    }

    pub fn ceiling_minutes(&self) -> f64 {
        self.ceiling_minutes
    }

    pub fn exceeds_ceiling(&self, minutes: f64) -> bool {
        minutes > self.ceiling_minutes
    }

    pub fn width_minutes(&self) -> f64 {
        self.width_minutes
    }

    /// Number of buckets needed to cover `max_minutes` (at least one),
    /// never reaching past the ceiling.
    pub fn bucket_count(&self, max_minutes: f64) -> usize {
        let upper = self.cap_minutes.unwrap_or(max_minutes).min(self.ceiling_minutes);
        ((upper / self.width_minutes).ceil() as usize).clamp(1, MAX_BUCKETS)
    }

    /// Bucket `k` covers `(k*w, (k+1)*w]`; bucket 0 also takes exactly 0.
    pub fn index_for(&self, minutes: f64) -> usize {
        if minutes <= 0.0 {
            return 0;
        }
        ((minutes / self.width_minutes).ceil() as usize).saturating_sub(1)
    }

    pub fn label(&self, idx: usize) -> String {
        let lo = idx as f64 * self.width_minutes;
        let hi = (idx + 1) as f64 * self.width_minutes;
        format!("{}-{}", lo, hi)
    }

    pub fn labels(&self, count: usize) -> Vec<String> {
        (0..count).map(|i| self.label(i)).collect()
    }
}

impl Default for BucketSpec {
    fn default() -> Self {
        BucketSpec { width_minutes: 3.0, cap_minutes: None, ceiling_minutes: DEFAULT_MAX_DURATION_MINUTES }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleaningParams {
    pub buckets: BucketSpec,
    pub title_aggregation: bool, // only applied when the source has a duration column
}

impl Default for CleaningParams {
    fn default() -> Self {
        CleaningParams { buckets: BucketSpec::default(), title_aggregation: true }
    }
}

#[derive(Debug, Clone)]
pub struct CleanedOutput {
    pub records: Vec<CleanedRecord>,
    pub duration_buckets: Option<DurationBucketAggregate>,
}

/// Run every cleaning stage over one category's raw rows.
pub fn clean_records(raw: &[RawRecord], has_duration: bool, params: &CleaningParams) -> CleanedOutput {
    let coerced = coerce_records(raw);

    let merged = if has_duration && params.title_aggregation {
        let before = coerced.len();
        let out = aggregate_by_title(coerced);
        debug!("Title aggregation - rows_in={}, rows_out={}", before, out.len());
        out
    } else {
        coerced
    };

    let before = merged.len();
    let deduped = dedup_by_channel(merged);
    debug!("Channel dedup - rows_in={}, rows_out={}", before, deduped.len());

    if !has_duration {
        return CleanedOutput { records: deduped, duration_buckets: None };
    }

    let (records, labels) = assign_buckets(deduped, &params.buckets);
    let aggregate = bucket_view_totals(&records, labels, params.buckets.width_minutes());
    CleanedOutput { records, duration_buckets: Some(aggregate) }
}

/// Parse a count cell. Missing, non-numeric, negative or non-finite values become 0.
pub fn coerce_count(cell: Option<&str>) -> u64 {
    let Some(s) = cell else { return 0 };
    let s = s.trim().replace(',', "");
    if let Ok(v) = s.parse::<u64>() {
        return v;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

/// Parse `MM:SS` into fractional minutes; any other shape is 0.
pub fn parse_duration_minutes(cell: Option<&str>) -> f64 {
    let Some(caps) = cell.and_then(|s| DURATION_RE.captures(s)) else {
        return 0.0;
    };
    let minutes: f64 = caps[1].parse().unwrap_or(0.0);
    let seconds: f64 = caps[2].parse().unwrap_or(0.0);
    minutes + seconds / 60.0
}

pub fn make_record_id(video_url: &str, title: &str) -> String {
    format!("{:016x}", xxh3_64(format!("{}|{}", video_url, title).as_bytes()))
}

/// Stage 1: one cleaned record per raw row, with derived metrics.
pub fn coerce_records(raw: &[RawRecord]) -> Vec<CleanedRecord> {
    raw.iter()
        .map(|r| {
            let title = r.title.clone().unwrap_or_default();
            let video_url = r.video_url.clone().unwrap_or_default();
            CleanedRecord {
                record_id: make_record_id(&video_url, &title),
                title,
                channel: r.channel.clone().unwrap_or_default(),
                video_url,
                hashtags: r.hashtags.clone().unwrap_or_default(),
                description: r.description.clone().unwrap_or_default(),
                view_count: coerce_count(r.view_count.as_deref()),
                like_count: coerce_count(r.like_count.as_deref()),
                dislike_count: coerce_count(r.dislike_count.as_deref()),
                subscriber_count: coerce_count(r.subscriber_count.as_deref()),
                duration_minutes: parse_duration_minutes(r.duration.as_deref()),
                total_interactions: 0,
                net_likes: 0,
                duration_bucket: None,
            }
            .with_derived_metrics()
        })
        .collect()
}

/// Stage 2: collapse rows sharing a title. Counts sum, duration averages,
/// text fields keep the first non-empty value. Groups stay in first-seen
/// order; rows with an empty title are never merged.
pub fn aggregate_by_title(records: Vec<CleanedRecord>) -> Vec<CleanedRecord> {
    let mut out: Vec<CleanedRecord> = Vec::with_capacity(records.len());
    let mut members: Vec<usize> = Vec::with_capacity(records.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for r in records {
        if r.title.is_empty() {
            out.push(r);
            members.push(1);
            continue;
        }
        match index.get(&r.title) {
            Some(&i) => {
                merge_into(&mut out[i], r);
                members[i] += 1;
            }
            None => {
                index.insert(r.title.clone(), out.len());
                out.push(r);
                members.push(1);
            }
        }
    }

    out.into_iter()
        .zip(members)
        .map(|(mut r, n)| {
            r.duration_minutes /= n as f64;
            r.record_id = make_record_id(&r.video_url, &r.title);
            r.with_derived_metrics()
        })
        .collect()
}

fn merge_into(acc: &mut CleanedRecord, r: CleanedRecord) {
    acc.view_count = acc.view_count.saturating_add(r.view_count);
    acc.like_count = acc.like_count.saturating_add(r.like_count);
    acc.dislike_count = acc.dislike_count.saturating_add(r.dislike_count);
    acc.subscriber_count = acc.subscriber_count.saturating_add(r.subscriber_count);
    acc.duration_minutes += r.duration_minutes; // divided by member count afterwards

    for (dst, src) in [
        (&mut acc.channel, r.channel),
        (&mut acc.video_url, r.video_url),
        (&mut acc.hashtags, r.hashtags),
        (&mut acc.description, r.description),
    ] {
        if dst.is_empty() && !src.is_empty() {
            *dst = src;
        }
    }
}

/// Stage 3: keep the highest-subscriber row per channel. The sort is stable,
/// so ties keep first-seen order and the first such row wins.
pub fn dedup_by_channel(records: Vec<CleanedRecord>) -> Vec<CleanedRecord> {
    let mut sorted = records;
    sorted.sort_by(|a, b| b.subscriber_count.cmp(&a.subscriber_count));

    let mut seen: HashSet<String> = HashSet::new();
    sorted.retain(|r| seen.insert(r.channel.clone()));
    sorted
}

/// Stage 4: label each record with its duration bucket. Returns the canonical
/// label list, sized from the longest record unless a cap is set. Records
/// past the ceiling stay unbucketed and do not size the list.
pub fn assign_buckets(records: Vec<CleanedRecord>, buckets: &BucketSpec) -> (Vec<CleanedRecord>, Vec<String>) {
    let max_minutes = records
        .iter()
        .map(|r| r.duration_minutes)
        .filter(|m| !buckets.exceeds_ceiling(*m))
        .fold(0.0_f64, f64::max);
    let count = buckets.bucket_count(max_minutes);
    let labels = buckets.labels(count);

    let records = records
        .into_iter()
        .map(|mut r| {
            if buckets.exceeds_ceiling(r.duration_minutes) {
                warn!(
                    "Duration past ceiling, leaving unbucketed - title={:?}, minutes={}, ceiling={}",
                    r.title,
                    r.duration_minutes,
                    buckets.ceiling_minutes()
                );
                return r;
            }
            let idx = buckets.index_for(r.duration_minutes);
            r.duration_bucket = labels.get(idx).cloned();
            r
        })
        .collect();
    (records, labels)
}

pub fn bucket_view_totals(records: &[CleanedRecord], labels: Vec<String>, width_minutes: f64) -> DurationBucketAggregate {
    let mut views: HashMap<String, u64> = HashMap::new();
    for r in records {
        if let Some(label) = &r.duration_bucket {
            let slot = views.entry(label.clone()).or_insert(0);
            *slot = slot.saturating_add(r.view_count);
        }
    }
    DurationBucketAggregate { width_minutes, labels, views }
}

// src/viz_export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{fs, path::Path};
use tracing::debug;

use crate::models::{CategoryTable, Metric};
use crate::orchestrator::{build_engagement, build_trends};
use crate::out_models::{EngagementReport, HistogramBin, RankedEntry, TrendsReport};
use crate::store::CategoryStore;

/* -------------------------------------------------------------------------- */
/* Entry point                                                                */
/* -------------------------------------------------------------------------- */

/// Write chart-ready JSON for each of `categories` into `out/<category>/`,
/// plus `out/viz.index.json` describing what was written.
pub fn write_all_viz(
    out_dir: &Path,
    store: &CategoryStore,
    categories: &[String],
    top_n: usize,
    cloud_limit: usize,
) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;

    let mut index_entries = Vec::with_capacity(categories.len());
    for category in categories {
        let table = store.get_table(category)?;
        let dir = out_dir.join(category);
        fs::create_dir_all(&dir).with_context(|| format!("create {:?}", dir))?;

        // 1) Engagement charts (bars, dots, net-like line)
        let engagement = build_engagement(table, top_n);
        write_json(dir.join("viz.engagement.json"), &engagement_charts(&engagement))?;

        // 2) Trends (word cloud + hashtag line)
        let trends = build_trends(table, store.stop_words(), cloud_limit)?;
        write_json(dir.join("viz.trends.json"), &trends_charts(&trends))?;

        // 3) Duration vs views
        let durations = store.duration_view_histogram(category)?;
        write_json(dir.join("viz.durations.json"), &duration_chart(table, &durations))?;

        debug!("Wrote viz bundle - category={}, dir={}", category, dir.display());
        index_entries.push(index_entry(table));
    }

    let idx = json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "version": 1,
        "available": store.get_category_names(),
        "categories": index_entries,
        "files": ["viz.engagement.json", "viz.trends.json", "viz.durations.json"],
    });
    write_json(out_dir.join("viz.index.json"), &idx)?;

    Ok(())
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("write {:?}", path))
}

fn index_entry(table: &CategoryTable) -> serde_json::Value {
    json!({
        "category": table.name,
        "records": table.len(),
        "has_durations": table.has_duration(),
    })
}

/* -------------------------------------------------------------------------- */
/* 1) Engagement                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VPoint {
    x: String, // channel
    y: i64,
    id: String,
}

#[derive(Serialize)]
struct VRanking {
    title: String,
    metric: Metric,
    kind: &'static str, // bar | dot
    points: Vec<VPoint>,
}

#[derive(Serialize)]
struct VEngagement {
    rankings: Vec<VRanking>,
    net_likes: Vec<VPoint>,
}

fn engagement_charts(r: &EngagementReport) -> VEngagement {
    let ranking = |title: &str, metric: Metric, kind: &'static str, entries: &[RankedEntry]| VRanking {
        title: title.to_string(),
        metric,
        kind,
        points: entries
            .iter()
            .map(|e| VPoint { x: e.channel.clone(), y: e.value, id: e.record_id.clone() })
            .collect(),
    };

    VEngagement {
        rankings: vec![
            ranking("Top Channels by Total Interactions", Metric::TotalInteractions, "bar", &r.top_total_interactions),
            ranking("Top Channels by Subscriber Count", Metric::SubscriberCount, "bar", &r.top_subscribers),
            ranking("Top Users by Like Counts", Metric::LikeCount, "dot", &r.top_likes),
            ranking("Top Users by Dislike Counts", Metric::DislikeCount, "dot", &r.top_dislikes),
        ],
        net_likes: r
            .net_likes_by_channel
            .iter()
            .map(|c| VPoint { x: c.channel.clone(), y: c.net_likes, id: c.channel.clone() })
            .collect(),
    }
}

/* -------------------------------------------------------------------------- */
/* 2) Trends                                                                  */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VCloudWord {
    text: String,
    weight: u64,
    highlight: bool,
}

#[derive(Serialize)]
struct VTrends {
    trending: Option<serde_json::Value>,
    cloud: Vec<VCloudWord>,
    hashtags: Vec<(String, u64)>, // line chart, first-seen order
}

fn trends_charts(r: &TrendsReport) -> VTrends {
    let cloud = r
        .title_words
        .iter()
        .map(|w| VCloudWord {
            text: w.word.clone(),
            weight: w.count,
            highlight: r.most_common_word.as_deref() == Some(w.word.as_str()),
        })
        .collect();

    VTrends {
        trending: r.trending_post.as_ref().map(|p| {
            json!({
                "id": p.record_id,
                "title": p.title,
                "channel": p.channel,
                "url": p.video_url,
                "total_interactions": p.value,
            })
        }),
        cloud,
        hashtags: r.hashtag_frequencies.iter().map(|w| (w.word.clone(), w.count)).collect(),
    }
}

/* -------------------------------------------------------------------------- */
/* 3) Durations                                                               */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VDurations<'a> {
    available: bool,
    width_minutes: Option<f64>,
    bins: &'a [HistogramBin],
    unbucketed: usize, // records beyond a configured cap
}

fn duration_chart<'a>(table: &CategoryTable, bins: &'a [HistogramBin]) -> VDurations<'a> {
    let unbucketed = if table.has_duration() {
        table.records.iter().filter(|r| r.duration_bucket.is_none()).count()
    } else {
        0
    };
    VDurations {
        available: table.has_duration(),
        width_minutes: table.duration_buckets.as_ref().map(|b| b.width_minutes),
        bins,
        unbucketed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::{clean_records, CleaningParams};
    use crate::raw_types::RawRecord;

    fn store() -> CategoryStore {
        let raw = vec![
            RawRecord {
                title: Some("Marathon tips".into()),
                channel: Some("runner".into()),
                hashtags: Some("#run".into()),
                view_count: Some("40".into()),
                duration: Some("4:30".into()),
                ..Default::default()
            },
            RawRecord {
                title: Some("Marathon recovery".into()),
                channel: Some("coach".into()),
                view_count: Some("10".into()),
                duration: Some("1:00".into()),
                ..Default::default()
            },
        ];
        let cleaned = clean_records(&raw, true, &CleaningParams::default());
        let table = CategoryTable {
            name: "sports".into(),
            records: cleaned.records,
            duration_buckets: cleaned.duration_buckets,
        };
        CategoryStore::from_tables(vec![table], crate::text::default_stop_words().clone())
    }

    #[test]
    fn test_write_all_viz_files() {
        let dir = tempfile::tempdir().unwrap();
        let s = store();
        write_all_viz(dir.path(), &s, &["sports".to_string()], 10, 50).unwrap();

        for f in ["viz.engagement.json", "viz.trends.json", "viz.durations.json"] {
            assert!(dir.path().join("sports").join(f).exists(), "missing {}", f);
        }

        let idx: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("viz.index.json")).unwrap()).unwrap();
        assert_eq!(idx["categories"][0]["category"], "sports");
        assert_eq!(idx["categories"][0]["records"], 2);

        let durations: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("sports/viz.durations.json")).unwrap()).unwrap();
        assert_eq!(durations["available"], true);
        assert_eq!(durations["bins"][0]["view_count"], 10);
        assert_eq!(durations["bins"][1]["view_count"], 40);

        let trends: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("sports/viz.trends.json")).unwrap()).unwrap();
        assert_eq!(trends["cloud"][0]["text"], "marathon");
        assert_eq!(trends["cloud"][0]["highlight"], true);
        assert_eq!(trends["trending"]["channel"], "runner");
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_all_viz(dir.path(), &store(), &["news".to_string()], 10, 50).is_err());
    }
}

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::models::{AnalysisMode, CategoryTable, Metric, TextField};
use crate::out_models::{
    AnalysisReport, DashboardView, EngagementReport, RankedEntry, SearchHit, SearchPanel, TrendsReport, WordWeight,
};
use crate::query::{most_frequent_word, net_likes_by_channel, search, top_n_by, word_frequencies};
use crate::render::render_view_markdown;
use crate::store::CategoryStore;
use crate::viz_export::write_all_viz;

/// What the user picked in the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub category: String,
    pub mode: AnalysisMode,
    pub search: Option<String>,
    pub top_n: usize,
    pub word_cloud_limit: usize,
}

fn ranked(table: &CategoryTable, metric: Metric, n: usize) -> Vec<RankedEntry> {
    top_n_by(&table.records, metric, n)
        .into_iter()
        .map(|r| RankedEntry::from_record(r, metric))
        .collect()
}

pub fn build_engagement(table: &CategoryTable, top_n: usize) -> EngagementReport {
    if table.is_empty() {
        return EngagementReport::default();
    }
    EngagementReport {
        top_total_interactions: ranked(table, Metric::TotalInteractions, top_n),
        top_subscribers: ranked(table, Metric::SubscriberCount, top_n),
        top_likes: ranked(table, Metric::LikeCount, top_n),
        top_dislikes: ranked(table, Metric::DislikeCount, top_n),
        net_likes_by_channel: net_likes_by_channel(&table.records),
    }
}

pub fn build_trends(
    table: &CategoryTable,
    stop_words: &HashSet<String>,
    cloud_limit: usize,
) -> crate::error::Result<TrendsReport> {
    if table.is_empty() {
        return Ok(TrendsReport::default());
    }

    let trending_post = ranked(table, Metric::TotalInteractions, 1).into_iter().next();

    let title_freq = word_frequencies(&table.records, TextField::Title, stop_words);
    let (title_words, most_common_word) = if title_freq.is_empty() {
        debug!("No title tokens after stop-word filtering - category={}", table.name);
        (Vec::new(), None)
    } else {
        let (word, _) = most_frequent_word(&title_freq)?;
        let weights = title_freq
            .top(cloud_limit)
            .into_iter()
            .map(|(w, c)| WordWeight { word: w.to_string(), count: c })
            .collect();
        (weights, Some(word.to_string()))
    };

    let hashtag_frequencies = word_frequencies(&table.records, TextField::Hashtags, stop_words)
        .iter()
        .map(|(w, c)| WordWeight { word: w.to_string(), count: c })
        .collect();

    Ok(TrendsReport { trending_post, title_words, most_common_word, hashtag_frequencies })
}

pub fn build_search_panel(table: &CategoryTable, keyword: Option<&str>) -> SearchPanel {
    let Some(keyword) = keyword.filter(|k| !k.is_empty()) else {
        return SearchPanel::Hidden;
    };
    let hits: Vec<SearchHit> = search(&table.records, keyword)
        .into_iter()
        .map(|r| SearchHit {
            title: r.title.clone(),
            channel: r.channel.clone(),
            video_url: r.video_url.clone(),
        })
        .collect();
    debug!("Search - category={}, keyword={:?}, hits={}", table.name, keyword, hits.len());
    if hits.is_empty() {
        SearchPanel::NoResults
    } else {
        SearchPanel::Results(hits)
    }
}

/// Recompute every panel for one selection against the loaded store.
pub fn build_view(store: &CategoryStore, selection: &Selection) -> crate::error::Result<DashboardView> {
    let table = store.get_table(&selection.category)?;

    let report = match selection.mode {
        AnalysisMode::Engagement => AnalysisReport::Engagement(build_engagement(table, selection.top_n)),
        AnalysisMode::Trends => {
            AnalysisReport::Trends(build_trends(table, store.stop_words(), selection.word_cloud_limit)?)
        }
    };

    Ok(DashboardView {
        category: table.name.clone(),
        record_count: table.len(),
        report,
        duration_views: store.duration_view_histogram(&selection.category)?,
        search: build_search_panel(table, selection.search.as_deref()),
    })
}

/// Load every category, answer the selection, and persist the view plus the
/// chart exports. Returns the rendered Markdown for the selected view.
pub fn run_dashboard(
    config: &DashboardConfig,
    selection: &Selection,
    output_dir: &Path,
    export_all: bool,
) -> Result<String> {
    let pipeline_start = std::time::Instant::now();
    info!(
        "Dashboard run started - data_dir={}, category={}, mode={}",
        config.data_dir.display(),
        selection.category,
        selection.mode
    );

    // 1) load once
    let store = CategoryStore::load(config).context("loading category store")?;
    if store.get_category_names().is_empty() {
        bail!(
            "No categories available (checked {} under {}).",
            config.categories.join(", "),
            config.data_dir.display()
        );
    }

    // 2) answer the selection
    let view = build_view(&store, selection)
        .with_context(|| format!("building view for category '{}'", selection.category))?;
    let markdown = render_view_markdown(&view);

    // 3) persist
    std::fs::create_dir_all(output_dir).with_context(|| format!("create {:?}", output_dir))?;
    std::fs::write(output_dir.join("view.json"), serde_json::to_vec_pretty(&view)?)?;
    std::fs::write(output_dir.join("dashboard.md"), markdown.as_bytes())?;
    debug!("Wrote view.json and dashboard.md");

    let exported: Vec<String> = if export_all {
        store.get_category_names().to_vec()
    } else {
        vec![view.category.clone()]
    };
    write_all_viz(output_dir, &store, &exported, selection.top_n, selection.word_cloud_limit)?;

    let dropped = config.categories.len() - store.get_category_names().len();
    if dropped > 0 {
        warn!("Categories unavailable this run - dropped={}", dropped);
    }

    info!(
        "Dashboard run completed - total_duration={:.2}s, categories={}, exported={}, directory={}",
        pipeline_start.elapsed().as_secs_f32(),
        store.get_category_names().len(),
        exported.len(),
        output_dir.display()
    );
    Ok(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::coerce_records;
    use crate::raw_types::RawRecord;
    use crate::text::default_stop_words;

    fn table(rows: &[(&str, &str, &str, &str)]) -> CategoryTable {
        let raw: Vec<RawRecord> = rows
            .iter()
            .map(|(channel, title, tags, views)| RawRecord {
                channel: Some(channel.to_string()),
                title: Some(title.to_string()),
                hashtags: Some(tags.to_string()),
                view_count: Some(views.to_string()),
                video_url: Some(format!("https://video.example/{}", channel)),
                ..Default::default()
            })
            .collect();
        CategoryTable { name: "auto".into(), records: coerce_records(&raw), duration_buckets: None }
    }

    fn sample() -> CategoryTable {
        table(&[
            ("a", "Electric truck review", "#ev #truck", "500"),
            ("b", "Truck towing test", "#truck", "900"),
            ("c", "Hybrid sedan tour", "#hybrid", "100"),
        ])
    }

    #[test]
    fn test_engagement_report() {
        let report = build_engagement(&sample(), 2);
        assert_eq!(report.top_total_interactions.len(), 2);
        assert_eq!(report.top_total_interactions[0].channel, "b");
        assert_eq!(report.top_total_interactions[0].value, 900);
        assert_eq!(report.net_likes_by_channel.len(), 3);
    }

    #[test]
    fn test_trends_report() {
        let report = build_trends(&sample(), default_stop_words(), 10).unwrap();
        assert_eq!(report.trending_post.map(|p| p.channel), Some("b".to_string()));
        assert_eq!(report.most_common_word.as_deref(), Some("truck"));
        assert_eq!(report.title_words[0], WordWeight { word: "truck".into(), count: 2 });
        let tags: Vec<&str> = report.hashtag_frequencies.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(tags, vec!["ev", "truck", "hybrid"]);
    }

    #[test]
    fn test_empty_table_short_circuits() {
        let empty = table(&[]);
        assert_eq!(build_trends(&empty, default_stop_words(), 10).unwrap(), TrendsReport::default());
        assert_eq!(build_engagement(&empty, 10), EngagementReport::default());
    }

    #[test]
    fn test_trends_with_only_stop_words() {
        let t = table(&[("a", "The car", "", "1")]);
        let report = build_trends(&t, default_stop_words(), 10).unwrap();
        assert!(report.most_common_word.is_none());
        assert!(report.trending_post.is_some());
    }

    #[test]
    fn test_search_panel_states() {
        let t = sample();
        assert_eq!(build_search_panel(&t, None), SearchPanel::Hidden);
        assert_eq!(build_search_panel(&t, Some("")), SearchPanel::Hidden);
        assert_eq!(build_search_panel(&t, Some("   ")), SearchPanel::NoResults);
        assert_eq!(build_search_panel(&t, Some("boat")), SearchPanel::NoResults);
        match build_search_panel(&t, Some("TRUCK")) {
            SearchPanel::Results(hits) => {
                let channels: Vec<&str> = hits.iter().map(|h| h.channel.as_str()).collect();
                assert_eq!(channels, vec!["a", "b"]);
            }
            other => panic!("expected results, got {:?}", other),
        }
    }

    #[test]
    fn test_build_view_unknown_category() {
        let store = CategoryStore::from_tables(vec![sample()], HashSet::new());
        let selection = Selection {
            category: "news".into(),
            mode: AnalysisMode::Engagement,
            search: None,
            top_n: 10,
            word_cloud_limit: 50,
        };
        assert!(build_view(&store, &selection).is_err());

        let ok = Selection { category: "auto".into(), ..selection };
        let view = build_view(&store, &ok).unwrap();
        assert_eq!(view.record_count, 3);
        assert_eq!(view.report.mode(), AnalysisMode::Engagement);
    }
}

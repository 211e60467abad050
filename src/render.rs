// src/render.rs
use itertools::Itertools;

use crate::out_models::{AnalysisReport, DashboardView, EngagementReport, RankedEntry, SearchPanel, TrendsReport};

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn push_ranking(md: &mut String, heading: &str, entries: &[RankedEntry]) {
    if entries.is_empty() {
        return;
    }
    md.push_str(&format!("## {}\n", heading));
    for (i, e) in entries.iter().enumerate() {
        md.push_str(&format!("{}. **{}** — {}\n", i + 1, e.channel, e.value));
    }
    md.push('\n');
}

fn render_engagement(md: &mut String, r: &EngagementReport, top_n: usize) {
    push_ranking(md, &format!("Top {} Channels by Total Interactions", top_n), &r.top_total_interactions);
    push_ranking(md, &format!("Top {} Channels by Subscriber Count", top_n), &r.top_subscribers);
    push_ranking(md, &format!("Top {} Users by Like Counts", top_n), &r.top_likes);
    push_ranking(md, &format!("Top {} Users by Dislike Counts", top_n), &r.top_dislikes);

    if !r.net_likes_by_channel.is_empty() {
        md.push_str("## Channel Popularity by Net Like\n");
        for c in &r.net_likes_by_channel {
            md.push_str(&format!("- {}: {}\n", c.channel, c.net_likes));
        }
        md.push('\n');
    }
}

fn render_trends(md: &mut String, r: &TrendsReport) {
    if let Some(p) = &r.trending_post {
        md.push_str("## Trending Post\n");
        md.push_str(&format!("**{}** by {} ({} interactions)\n\n", p.title, p.channel, p.value));
    }

    if !r.title_words.is_empty() {
        md.push_str("## Title Words\n");
        let words = r
            .title_words
            .iter()
            .map(|w| {
                if r.most_common_word.as_deref() == Some(w.word.as_str()) {
                    format!("**{}** ({})", w.word, w.count)
                } else {
                    format!("{} ({})", w.word, w.count)
                }
            })
            .join(", ");
        md.push_str(&format!("{}\n\n", words));
    }

    if !r.hashtag_frequencies.is_empty() {
        md.push_str("## Hashtag Frequencies\n");
        for h in &r.hashtag_frequencies {
            md.push_str(&format!("- #{}: {}\n", h.word, h.count));
        }
        md.push('\n');
    }
}

pub fn render_search_panel(panel: &SearchPanel) -> String {
    let mut out = String::new();
    match panel {
        SearchPanel::Hidden => {}
        SearchPanel::NoResults => {
            out.push_str("## Search Results\n");
            out.push_str("No Video Found\n");
        }
        SearchPanel::Results(hits) => {
            out.push_str("## Search Results\n");
            for h in hits {
                out.push_str(&format!("- Title: {}\n  Channel: {}\n  [Watch Video]({})\n", h.title, h.channel, h.video_url));
            }
        }
    }
    out
}

pub fn render_view_markdown(v: &DashboardView) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {} — {}\n\n", capitalize(&v.category), capitalize(v.report.mode().as_str())));
    md.push_str(&format!("{} videos after cleaning.\n\n", v.record_count));

    match &v.report {
        AnalysisReport::Engagement(r) => render_engagement(&mut md, r, r.top_total_interactions.len()),
        AnalysisReport::Trends(r) => render_trends(&mut md, r),
    }

    if !v.duration_views.is_empty() {
        md.push_str("## Views by Duration (minutes)\n");
        for b in &v.duration_views {
            md.push_str(&format!("- {}: {}\n", b.label, b.view_count));
        }
        md.push('\n');
    }

    md.push_str(&render_search_panel(&v.search));
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metric;
    use crate::out_models::{ChannelNetLikes, HistogramBin, SearchHit, WordWeight};

    fn entry(channel: &str, value: i64) -> RankedEntry {
        RankedEntry {
            record_id: "0".into(),
            channel: channel.into(),
            title: format!("{} video", channel),
            video_url: String::new(),
            metric: Metric::TotalInteractions,
            value,
        }
    }

    #[test]
    fn test_render_engagement() {
        let view = DashboardView {
            category: "sports".into(),
            record_count: 2,
            report: AnalysisReport::Engagement(EngagementReport {
                top_total_interactions: vec![entry("a", 10), entry("b", 5)],
                net_likes_by_channel: vec![ChannelNetLikes { channel: "a".into(), net_likes: 3 }],
                ..Default::default()
            }),
            duration_views: vec![HistogramBin { label: "0-3".into(), view_count: 15 }],
            search: SearchPanel::Hidden,
        };
        let md = render_view_markdown(&view);
        assert!(md.starts_with("# Sports — Engagement\n"));
        assert!(md.contains("## Top 2 Channels by Total Interactions\n1. **a** — 10\n2. **b** — 5\n"));
        assert!(!md.contains("Subscriber Count"));
        assert!(md.contains("- a: 3\n"));
        assert!(md.contains("- 0-3: 15\n"));
        assert!(!md.contains("Search Results"));
    }

    #[test]
    fn test_render_trends_highlights_most_common_word() {
        let view = DashboardView {
            category: "news".into(),
            record_count: 1,
            report: AnalysisReport::Trends(TrendsReport {
                trending_post: Some(entry("a", 99)),
                title_words: vec![
                    WordWeight { word: "vote".into(), count: 3 },
                    WordWeight { word: "poll".into(), count: 1 },
                ],
                most_common_word: Some("vote".into()),
                hashtag_frequencies: vec![WordWeight { word: "election".into(), count: 2 }],
            }),
            duration_views: Vec::new(),
            search: SearchPanel::NoResults,
        };
        let md = render_view_markdown(&view);
        assert!(md.contains("**a video** by a (99 interactions)"));
        assert!(md.contains("**vote** (3), poll (1)"));
        assert!(md.contains("- #election: 2\n"));
        assert!(md.ends_with("## Search Results\nNo Video Found\n"));
    }

    #[test]
    fn test_render_search_hits() {
        let panel = SearchPanel::Results(vec![SearchHit {
            title: "Leg day".into(),
            channel: "gym".into(),
            video_url: "https://video.example/leg".into(),
        }]);
        let out = render_search_panel(&panel);
        assert!(out.contains("- Title: Leg day\n  Channel: gym\n  [Watch Video](https://video.example/leg)\n"));
        assert_eq!(render_search_panel(&SearchPanel::Hidden), "");
    }
}

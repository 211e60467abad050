use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{error, info, warn};

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::load::load_category_path;
use crate::models::{CategoryTable, CleanedRecord, Metric, TextField};
use crate::out_models::{ChannelNetLikes, HistogramBin};
use crate::query;
use crate::text::WordFrequencies;

/// Every successfully loaded category table, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    order: Vec<String>,
    tables: HashMap<String, CategoryTable>,
    stop_words: HashSet<String>,
}

impl CategoryStore {
    /// Load all configured categories. A category whose file is unreadable or
    /// fails schema validation is logged and left out; only an invalid config
    /// is an error.
    pub fn load(config: &DashboardConfig) -> Result<Self> {
        config.validate()?;
        let params = config.cleaning_params()?;
        let start = std::time::Instant::now();

        let loaded: Vec<(String, Result<CategoryTable>)> = config
            .categories
            .par_iter()
            .map(|c| (c.clone(), load_category_path(c, &config.path_for(c), &params)))
            .collect();

        let mut tables = Vec::with_capacity(loaded.len());
        for (category, result) in loaded {
            match result {
                Ok(t) => tables.push(t),
                Err(DashboardError::Schema { missing, .. }) => {
                    warn!("Dropping category - category={}, missing_columns={}", category, missing.join(","));
                }
                Err(e) => {
                    error!("Dropping category - category={}, error={}", category, e);
                }
            }
        }

        let store = Self::from_tables(tables, config.stop_words());
        info!(
            "Category store ready - duration={:.2}s, categories={}/{}",
            start.elapsed().as_secs_f32(),
            store.order.len(),
            config.categories.len()
        );
        Ok(store)
    }

    /// Build from already-cleaned tables; keeps the given order, first name wins.
    pub fn from_tables(tables: Vec<CategoryTable>, stop_words: HashSet<String>) -> Self {
        let mut order = Vec::with_capacity(tables.len());
        let mut by_name = HashMap::with_capacity(tables.len());
        for t in tables {
            if by_name.contains_key(&t.name) {
                warn!("Ignoring duplicate category table - category={}", t.name);
                continue;
            }
            order.push(t.name.clone());
            by_name.insert(t.name.clone(), t);
        }
        CategoryStore { order, tables: by_name, stop_words }
    }

    pub fn get_category_names(&self) -> &[String] {
        &self.order
    }

    pub fn get_table(&self, category: &str) -> Result<&CategoryTable> {
        self.tables
            .get(category)
            .ok_or_else(|| DashboardError::UnknownCategory(category.to_string()))
    }

    pub fn stop_words(&self) -> &HashSet<String> {
        &self.stop_words
    }

    pub fn top_n_by(&self, category: &str, metric: Metric, n: usize) -> Result<Vec<&CleanedRecord>> {
        Ok(query::top_n_by(&self.get_table(category)?.records, metric, n))
    }

    pub fn net_likes_by_channel(&self, category: &str) -> Result<Vec<ChannelNetLikes>> {
        Ok(query::net_likes_by_channel(&self.get_table(category)?.records))
    }

    pub fn word_frequencies(&self, category: &str, field: TextField) -> Result<WordFrequencies> {
        Ok(query::word_frequencies(&self.get_table(category)?.records, field, &self.stop_words))
    }

    pub fn most_frequent_word(&self, category: &str, field: TextField) -> Result<(String, u64)> {
        let table = self.get_table(category)?;
        if table.is_empty() {
            return Err(DashboardError::EmptyInput("most_frequent_word"));
        }
        let freq = query::word_frequencies(&table.records, field, &self.stop_words);
        query::most_frequent_word(&freq).map(|(w, c)| (w.to_string(), c))
    }

    pub fn search(&self, category: &str, keyword: &str) -> Result<Vec<&CleanedRecord>> {
        Ok(query::search(&self.get_table(category)?.records, keyword))
    }

    /// Views per duration bucket in interval order; empty for categories without durations.
    pub fn duration_view_histogram(&self, category: &str) -> Result<Vec<HistogramBin>> {
        let table = self.get_table(category)?;
        Ok(table
            .duration_buckets
            .as_ref()
            .map(|agg| query::duration_view_histogram(agg, &agg.labels))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::coerce_records;
    use crate::raw_types::RawRecord;

    fn table(name: &str, titles: &[&str]) -> CategoryTable {
        let raw: Vec<RawRecord> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| RawRecord {
                title: Some(t.to_string()),
                channel: Some(format!("ch{}", i)),
                view_count: Some((i * 10).to_string()),
                ..Default::default()
            })
            .collect();
        CategoryTable { name: name.to_string(), records: coerce_records(&raw), duration_buckets: None }
    }

    fn store() -> CategoryStore {
        CategoryStore::from_tables(
            vec![table("news", &["Election night", "Election recap", "Weather"]), table("sports", &[])],
            crate::text::default_stop_words().clone(),
        )
    }

    #[test]
    fn test_names_keep_order() {
        assert_eq!(store().get_category_names(), &["news".to_string(), "sports".to_string()]);
    }

    #[test]
    fn test_unknown_category() {
        let s = store();
        assert!(matches!(s.get_table("cooking"), Err(DashboardError::UnknownCategory(c)) if c == "cooking"));
        assert!(s.search("cooking", "x").is_err());
    }

    #[test]
    fn test_queries_forward_to_table() {
        let s = store();
        let top = s.top_n_by("news", Metric::ViewCount, 1).unwrap();
        assert_eq!(top[0].title, "Weather");
        assert_eq!(s.most_frequent_word("news", TextField::Title).unwrap(), ("election".to_string(), 2));
        assert_eq!(s.search("news", "RECAP").unwrap().len(), 1);
        assert!(s.duration_view_histogram("news").unwrap().is_empty());
    }

    #[test]
    fn test_empty_category_guards_most_frequent_word() {
        let s = store();
        assert!(matches!(
            s.most_frequent_word("sports", TextField::Title),
            Err(DashboardError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_load_drops_broken_categories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("dash_csv_news.csv"),
            "view_count,like_count,dislike_count,title,hashtags,channel,video_url,subscriber_count,description\n1,1,1,t,h,c,u,1,d\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("dash_csv_sports.csv"), "view_count,title\n1,t\n").unwrap();

        let cfg = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            categories: vec!["sports".into(), "news".into(), "health".into()],
            ..Default::default()
        };
        let s = CategoryStore::load(&cfg).unwrap();
        assert_eq!(s.get_category_names(), &["news".to_string()]);
        assert_eq!(s.get_table("news").unwrap().len(), 1);
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation regex"));

/// Stop words shipped with the dashboard. Includes a few dataset-specific
/// fillers ("hashtags", "2024", "car") that otherwise dominate the clouds.
pub fn default_stop_words() -> &'static HashSet<String> {
    static SET: Lazy<HashSet<String>> = Lazy::new(|| {
        let words = [
            "is", "the", "and", "for", "or", "of", "to", "in", "a", "an", "that", "it", "on", "with",
            "as", "this", "by", "from", "at", "but", "not", "no", "hashtags", "2024", "5", "w", "too",
            "vs", "you", "its", "car", "are", "just", "what", "why", "about", "were", "they",
        ];
        words.iter().map(|s| s.to_string()).collect()
    });
    &SET
}

/// Default stop words plus `extra`, lowercased.
pub fn stop_words_with<S: AsRef<str>>(extra: &[S]) -> HashSet<String> {
    let mut set = default_stop_words().clone();
    set.extend(extra.iter().map(|s| s.as_ref().trim().to_lowercase()).filter(|s| !s.is_empty()));
    set
}

/// NFC-normalize, drop punctuation, lowercase.
pub fn normalize_text(s: &str) -> String {
    let nfc: String = s.nfc().collect();
    PUNCT_RE.replace_all(&nfc, "").to_lowercase()
}

pub fn tokenize(s: &str) -> Vec<String> {
    normalize_text(s).split_whitespace().map(str::to_string).collect()
}

/// Token counts in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordFrequencies {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl WordFrequencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: &str) {
        match self.index.get(token) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(token.to_string(), self.entries.len());
                self.entries.push((token.to_string(), 1));
            }
        }
    }

    pub fn get(&self, token: &str) -> u64 {
        self.index.get(token).map(|&i| self.entries[i].1).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// Highest counts first; equal counts keep first-seen order.
    pub fn top(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut v: Vec<(&str, u64)> = self.iter().collect();
        v.sort_by_key(|(_, c)| std::cmp::Reverse(*c));
        v.truncate(limit);
        v
    }
}

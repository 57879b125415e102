use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

pub mod dimensions;

pub use dimensions::keyword_scorers;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("static word pattern"));

/// Case-insensitive substring matcher over a fixed keyword list.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let mut seen = HashSet::new();
        let keywords = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();
        Self { keywords }
    }

    /// Keywords present in `lowered`, each counted once, in list order.
    pub fn matches(&self, lowered: &str) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .cloned()
            .collect()
    }

    pub fn count(&self, lowered: &str) -> usize {
        self.keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Lowercased word tokens with at least `min_len` characters.
pub fn significant_tokens(text: &str, min_len: usize) -> HashSet<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|token| token.chars().count() >= min_len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_counts_each_keyword_once() {
        let matcher = KeywordMatcher::new(&["Cost", "save", "cost"]);
        assert_eq!(matcher.len(), 2);
        assert_eq!(matcher.count("cost cost cost"), 1);
        assert_eq!(matcher.matches("we save on cost"), vec!["cost", "save"]);
    }

    #[test]
    fn matcher_is_substring_based() {
        let matcher = KeywordMatcher::new(&["optimize"]);
        assert_eq!(matcher.count("we optimized the pipeline"), 1);
    }

    #[test]
    fn tokens_respect_minimum_length() {
        let tokens = significant_tokens("Help me SAVE money on the cloud", 4);
        let mut sorted: Vec<_> = tokens.into_iter().collect();
        sorted.sort();
        assert_eq!(sorted, vec!["cloud", "help", "money", "save"]);
    }
}

use crate::domains::assessment::{Dimension, DimensionScore};

/// Inputs shared by every dimension scorer for one response.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub text: &'a str,
    pub lowered: String,
    pub user_query: Option<&'a str>,
    pub expected_outcomes: Option<&'a [String]>,
    pub char_count: usize,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        text: &'a str,
        user_query: Option<&'a str>,
        expected_outcomes: Option<&'a [String]>,
    ) -> Self {
        Self {
            text,
            lowered: text.to_lowercase(),
            user_query: user_query.filter(|q| !q.trim().is_empty()),
            expected_outcomes: expected_outcomes.filter(|outcomes| !outcomes.is_empty()),
            char_count: text.chars().count(),
        }
    }

    pub fn has_expected_outcomes(&self) -> bool {
        self.expected_outcomes.is_some()
    }
}

/// Scores one business-value dimension. Implementations must be pure: the
/// same context always yields the same score.
pub trait DimensionScorer: Send + Sync {
    fn dimension(&self) -> Dimension;
    fn score(&self, ctx: &ScoringContext<'_>) -> DimensionScore;
}

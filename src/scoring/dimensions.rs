use regex::Regex;

use crate::config::{
    compile_pattern, ActionabilityConfig, BonusTier, BusinessImpactConfig, CostOptimizationConfig,
    CustomerOutcomeConfig, FractionTier, InsightQualityConfig, KeywordRule, ProblemSolvingConfig,
    ScoringConfig,
};
use crate::domains::assessment::{Dimension, DimensionScore};
use crate::error::Result;
use crate::interfaces::scorer::{DimensionScorer, ScoringContext};
use crate::scoring::{significant_tokens, KeywordMatcher};

/// Keyword list plus tier table, the part every keyword scorer shares.
#[derive(Debug, Clone)]
struct TieredKeywords {
    matcher: KeywordMatcher,
    rule: KeywordRule,
}

impl TieredKeywords {
    fn new(rule: &KeywordRule) -> Self {
        Self {
            matcher: KeywordMatcher::new(&rule.keywords),
            rule: rule.clone(),
        }
    }

    fn score(&self, dimension: Dimension, lowered: &str) -> DimensionScore {
        let matched = self.matcher.matches(lowered);
        let mut score = DimensionScore::new(dimension, self.rule.score_for(matched.len()));
        score.matched_keywords = matched;
        score
    }
}

fn bonus_for(tiers: &[BonusTier], count: usize) -> f64 {
    tiers
        .iter()
        .find(|tier| count >= tier.min_matches)
        .map(|tier| tier.bonus)
        .unwrap_or(0.0)
}

fn fraction_score(tiers: &[FractionTier], floor: f64, fraction: f64) -> f64 {
    tiers
        .iter()
        .find(|tier| fraction + 1e-9 >= tier.min_fraction)
        .map(|tier| tier.score)
        .unwrap_or(floor)
}

fn finish(mut score: DimensionScore) -> DimensionScore {
    score.score = score.score.clamp(0.0, 1.0);
    score
}

pub struct ProblemSolvingScorer {
    keywords: TieredKeywords,
    min_token_len: usize,
    query_overlap: Vec<BonusTier>,
}

impl ProblemSolvingScorer {
    pub fn new(config: &ProblemSolvingConfig) -> Self {
        Self {
            keywords: TieredKeywords::new(&config.rule),
            min_token_len: config.min_token_len,
            query_overlap: config.query_overlap.clone(),
        }
    }
}

impl DimensionScorer for ProblemSolvingScorer {
    fn dimension(&self) -> Dimension {
        Dimension::ProblemSolving
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> DimensionScore {
        let mut score = self.keywords.score(self.dimension(), &ctx.lowered);
        if let Some(query) = ctx.user_query {
            let query_tokens = significant_tokens(query, self.min_token_len);
            let response_tokens = significant_tokens(ctx.text, self.min_token_len);
            let shared = query_tokens.intersection(&response_tokens).count();
            let bonus = bonus_for(&self.query_overlap, shared);
            if bonus > 0.0 {
                score.score += bonus;
                score
                    .notes
                    .push(format!("query overlap: {shared} shared tokens (+{bonus:.2})"));
            }
        }
        finish(score)
    }
}

pub struct ActionabilityScorer {
    keywords: TieredKeywords,
    list_marker: Regex,
    list_marker_bonus: f64,
    implementation: KeywordMatcher,
    implementation_min_matches: usize,
    implementation_bonus: f64,
}

impl ActionabilityScorer {
    pub fn new(config: &ActionabilityConfig) -> Result<Self> {
        Ok(Self {
            keywords: TieredKeywords::new(&config.rule),
            list_marker: compile_pattern("actionability", &config.list_marker_pattern)?,
            list_marker_bonus: config.list_marker_bonus,
            implementation: KeywordMatcher::new(&config.implementation_keywords),
            implementation_min_matches: config.implementation_min_matches,
            implementation_bonus: config.implementation_bonus,
        })
    }
}

impl DimensionScorer for ActionabilityScorer {
    fn dimension(&self) -> Dimension {
        Dimension::Actionability
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> DimensionScore {
        let mut score = self.keywords.score(self.dimension(), &ctx.lowered);
        if self.list_marker.is_match(ctx.text) {
            score.score += self.list_marker_bonus;
            score
                .notes
                .push(format!("list markers (+{:.2})", self.list_marker_bonus));
        }
        let implementation = self.implementation.count(&ctx.lowered);
        if implementation >= self.implementation_min_matches {
            score.score += self.implementation_bonus;
            score.notes.push(format!(
                "{implementation} implementation terms (+{:.2})",
                self.implementation_bonus
            ));
        }
        finish(score)
    }
}

pub struct CostOptimizationScorer {
    keywords: TieredKeywords,
    quantified: Vec<Regex>,
    quantified_bonus: f64,
}

impl CostOptimizationScorer {
    pub fn new(config: &CostOptimizationConfig) -> Result<Self> {
        let quantified = config
            .quantified_patterns
            .iter()
            .map(|pattern| compile_pattern("cost_optimization", pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            keywords: TieredKeywords::new(&config.rule),
            quantified,
            quantified_bonus: config.quantified_bonus,
        })
    }
}

impl DimensionScorer for CostOptimizationScorer {
    fn dimension(&self) -> Dimension {
        Dimension::CostOptimization
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> DimensionScore {
        let mut score = self.keywords.score(self.dimension(), &ctx.lowered);
        if self.quantified.iter().any(|re| re.is_match(&ctx.lowered)) {
            score.score += self.quantified_bonus;
            score
                .notes
                .push(format!("quantified savings (+{:.2})", self.quantified_bonus));
        }
        finish(score)
    }
}

pub struct InsightQualityScorer {
    keywords: TieredKeywords,
    long_response_chars: usize,
    long_response_bonus: f64,
    short_response_chars: usize,
    short_response_penalty: f64,
}

impl InsightQualityScorer {
    pub fn new(config: &InsightQualityConfig) -> Self {
        Self {
            keywords: TieredKeywords::new(&config.rule),
            long_response_chars: config.long_response_chars,
            long_response_bonus: config.long_response_bonus,
            short_response_chars: config.short_response_chars,
            short_response_penalty: config.short_response_penalty,
        }
    }
}

impl DimensionScorer for InsightQualityScorer {
    fn dimension(&self) -> Dimension {
        Dimension::InsightQuality
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> DimensionScore {
        let mut score = self.keywords.score(self.dimension(), &ctx.lowered);
        if ctx.char_count > self.long_response_chars {
            score.score += self.long_response_bonus;
            score.notes.push(format!(
                "{} chars, detailed (+{:.2})",
                ctx.char_count, self.long_response_bonus
            ));
        } else if ctx.char_count < self.short_response_chars {
            score.score -= self.short_response_penalty;
            score.notes.push(format!(
                "{} chars, brief (-{:.2})",
                ctx.char_count, self.short_response_penalty
            ));
        }
        finish(score)
    }
}

pub struct CustomerOutcomeScorer {
    fallback: TieredKeywords,
    expected_tiers: Vec<FractionTier>,
    expected_floor: f64,
}

impl CustomerOutcomeScorer {
    pub fn new(config: &CustomerOutcomeConfig) -> Self {
        Self {
            fallback: TieredKeywords::new(&config.rule),
            expected_tiers: config.expected_tiers.clone(),
            expected_floor: config.expected_floor,
        }
    }
}

impl DimensionScorer for CustomerOutcomeScorer {
    fn dimension(&self) -> Dimension {
        Dimension::CustomerOutcome
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> DimensionScore {
        let Some(expected) = ctx.expected_outcomes else {
            return finish(self.fallback.score(self.dimension(), &ctx.lowered));
        };

        let found: Vec<String> = expected
            .iter()
            .filter(|outcome| ctx.lowered.contains(&outcome.to_lowercase()))
            .cloned()
            .collect();
        let fraction = found.len() as f64 / expected.len() as f64;
        let mut score = DimensionScore::new(
            self.dimension(),
            fraction_score(&self.expected_tiers, self.expected_floor, fraction),
        );
        score.notes.push(format!(
            "{} of {} expected outcomes present",
            found.len(),
            expected.len()
        ));
        score.matched_keywords = found;
        finish(score)
    }
}

pub struct BusinessImpactScorer {
    keywords: TieredKeywords,
}

impl BusinessImpactScorer {
    pub fn new(config: &BusinessImpactConfig) -> Self {
        Self {
            keywords: TieredKeywords::new(&config.rule),
        }
    }
}

impl DimensionScorer for BusinessImpactScorer {
    fn dimension(&self) -> Dimension {
        Dimension::BusinessImpact
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> DimensionScore {
        finish(self.keywords.score(self.dimension(), &ctx.lowered))
    }
}

/// The six keyword scorers in `Dimension::ALL` order.
pub fn keyword_scorers(config: &ScoringConfig) -> Result<Vec<Box<dyn DimensionScorer>>> {
    let scorers: Vec<Box<dyn DimensionScorer>> = vec![
        Box::new(ProblemSolvingScorer::new(&config.problem_solving)),
        Box::new(ActionabilityScorer::new(&config.actionability)?),
        Box::new(CostOptimizationScorer::new(&config.cost_optimization)?),
        Box::new(InsightQualityScorer::new(&config.insight_quality)),
        Box::new(CustomerOutcomeScorer::new(&config.customer_outcome)),
        Box::new(BusinessImpactScorer::new(&config.business_impact)),
    ];
    Ok(scorers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(
        text: &'a str,
        query: Option<&'a str>,
        expected: Option<&'a [String]>,
    ) -> ScoringContext<'a> {
        ScoringContext::new(text, query, expected)
    }

    #[test]
    fn problem_solving_adds_query_overlap() {
        let scorer = ProblemSolvingScorer::new(&ScoringConfig::default().problem_solving);
        let text = "We should fix the database migration latency issue.";
        let plain = scorer.score(&ctx(text, None, None));
        assert!((plain.score - 0.5).abs() < 1e-9);

        let overlap = scorer.score(&ctx(text, Some("database migration latency"), None));
        assert!((overlap.score - 0.7).abs() < 1e-9);
        assert_eq!(overlap.notes.len(), 1);

        let partial = scorer.score(&ctx(text, Some("database outage"), None));
        assert!((partial.score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn actionability_bonuses_stack_and_clamp() {
        let scorer = ActionabilityScorer::new(&ScoringConfig::default().actionability).unwrap();
        let text = "Recommend this plan:\n1. install the agent\n2. configure alerts\n\
                    3. deploy then follow up, finally schedule a review";
        let score = scorer.score(&ctx(text, None, None));
        assert_eq!(score.score, 1.0);
        assert_eq!(score.notes.len(), 2);
    }

    #[test]
    fn inline_list_markers_earn_the_bonus() {
        let scorer = ActionabilityScorer::new(&ScoringConfig::default().actionability).unwrap();
        for text in [
            "Steps: 1. gather logs 2. compare them",
            "Options - cheaper nodes * fewer replicas",
            "Plan: • tag owners",
        ] {
            let score = scorer.score(&ctx(text, None, None));
            assert!((score.score - 0.3).abs() < 1e-9, "{text}");
            assert_eq!(score.notes, vec!["list markers (+0.10)".to_string()]);
        }

        let plain = scorer.score(&ctx("Nothing to enumerate here.", None, None));
        assert!(plain.notes.is_empty());
        assert!((plain.score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn cost_bonus_needs_a_quantity() {
        let scorer = CostOptimizationScorer::new(&ScoringConfig::default().cost_optimization)
            .unwrap();
        let vague = scorer.score(&ctx("Trim the budget.", None, None));
        assert!((vague.score - 0.5).abs() < 1e-9);
        let exact = scorer.score(&ctx("Trim the budget by 12 percent.", None, None));
        assert!((exact.score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn insight_length_boundaries() {
        let scorer = InsightQualityScorer::new(&ScoringConfig::default().insight_quality);
        let at_500 = "a".repeat(500);
        let at_501 = "a".repeat(501);
        let at_100 = "a".repeat(100);
        let at_99 = "a".repeat(99);
        assert!((scorer.score(&ctx(&at_500, None, None)).score - 0.2).abs() < 1e-9);
        assert!((scorer.score(&ctx(&at_501, None, None)).score - 0.3).abs() < 1e-9);
        assert!((scorer.score(&ctx(&at_100, None, None)).score - 0.2).abs() < 1e-9);
        assert!((scorer.score(&ctx(&at_99, None, None)).score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn customer_outcome_uses_expected_fraction() {
        let scorer = CustomerOutcomeScorer::new(&ScoringConfig::default().customer_outcome);
        let expected = vec![
            "cost reduction".to_string(),
            "faster queries".to_string(),
        ];
        let half = scorer.score(&ctx(
            "Cost Reduction is in sight.",
            None,
            Some(expected.as_slice()),
        ));
        assert!((half.score - 0.6).abs() < 1e-9);
        assert_eq!(half.matched_keywords, vec!["cost reduction".to_string()]);

        let none = scorer.score(&ctx("Nothing relevant.", None, Some(expected.as_slice())));
        assert!((none.score - 0.3).abs() < 1e-9);

        let empty: Vec<String> = Vec::new();
        let fallback = scorer.score(&ctx(
            "A clear outcome and goal.",
            None,
            Some(empty.as_slice()),
        ));
        assert!((fallback.score - 0.5).abs() < 1e-9);
    }
}

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AgentValueError, Result};

/// Score assigned once a keyword count reaches `min_matches`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KeywordTier {
    pub min_matches: usize,
    pub score: f64,
}

/// Additive bonus once a count reaches `min_matches`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BonusTier {
    pub min_matches: usize,
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FractionTier {
    pub min_fraction: f64,
    pub score: f64,
}

/// Keyword list plus the tier table mapping a match count to a score.
/// Tiers are ordered from the highest `min_matches` down; the first tier the
/// count reaches wins, otherwise `base` applies.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KeywordRule {
    pub base: f64,
    pub keywords: Vec<String>,
    pub tiers: Vec<KeywordTier>,
}

impl KeywordRule {
    fn new(base: f64, keywords: &[&str], tiers: &[(usize, f64)]) -> Self {
        Self {
            base,
            keywords: words(keywords),
            tiers: tiers
                .iter()
                .map(|(min_matches, score)| KeywordTier {
                    min_matches: *min_matches,
                    score: *score,
                })
                .collect(),
        }
    }

    pub fn score_for(&self, matches: usize) -> f64 {
        self.tiers
            .iter()
            .find(|tier| matches >= tier.min_matches)
            .map(|tier| tier.score)
            .unwrap_or(self.base)
    }

    fn validate(&self, section: &str) -> Result<()> {
        check_unit(section, "base", self.base)?;
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(AgentValueError::Config(format!(
                "{section}: keywords must not be blank"
            )));
        }
        let mut previous: Option<usize> = None;
        for tier in &self.tiers {
            check_unit(section, "tier score", tier.score)?;
            if tier.min_matches == 0 {
                return Err(AgentValueError::Config(format!(
                    "{section}: tier min_matches must be at least 1"
                )));
            }
            if let Some(prev) = previous {
                if tier.min_matches >= prev {
                    return Err(AgentValueError::Config(format!(
                        "{section}: tiers must be ordered by descending min_matches"
                    )));
                }
            }
            previous = Some(tier.min_matches);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProblemSolvingConfig {
    pub rule: KeywordRule,
    pub min_token_len: usize,
    pub query_overlap: Vec<BonusTier>,
}

impl Default for ProblemSolvingConfig {
    fn default() -> Self {
        Self {
            rule: KeywordRule::new(
                0.3,
                &[
                    "solution",
                    "solve",
                    "resolve",
                    "fix",
                    "address",
                    "approach",
                    "strategy",
                    "recommend",
                    "optimize",
                    "improve",
                    "analyze",
                    "identify",
                    "diagnose",
                    "root cause",
                    "audit",
                ],
                &[(3, 0.7), (1, 0.5)],
            ),
            min_token_len: 4,
            query_overlap: vec![
                BonusTier {
                    min_matches: 3,
                    bonus: 0.2,
                },
                BonusTier {
                    min_matches: 1,
                    bonus: 0.1,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionabilityConfig {
    pub rule: KeywordRule,
    pub list_marker_pattern: String,
    pub list_marker_bonus: f64,
    pub implementation_keywords: Vec<String>,
    pub implementation_min_matches: usize,
    pub implementation_bonus: f64,
}

impl Default for ActionabilityConfig {
    fn default() -> Self {
        Self {
            rule: KeywordRule::new(
                0.2,
                &[
                    "recommend",
                    "suggest",
                    "should",
                    "next step",
                    "action",
                    "implement",
                    "execute",
                    "apply",
                    "configure",
                    "set up",
                    "install",
                    "deploy",
                    "step 1",
                    "start by",
                    "first",
                    "then",
                    "finally",
                    "follow",
                    "schedule",
                    "audit",
                ],
                &[(5, 0.9), (3, 0.7), (1, 0.5)],
            ),
            list_marker_pattern: r"\d+\.|[-*•]".to_string(),
            list_marker_bonus: 0.1,
            implementation_keywords: words(&[
                "implement",
                "configure",
                "deploy",
                "install",
                "automate",
                "migrate",
            ]),
            implementation_min_matches: 2,
            implementation_bonus: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CostOptimizationConfig {
    pub rule: KeywordRule,
    pub quantified_patterns: Vec<String>,
    pub quantified_bonus: f64,
}

impl Default for CostOptimizationConfig {
    fn default() -> Self {
        Self {
            rule: KeywordRule::new(
                0.1,
                &[
                    "cost",
                    "save",
                    "saving",
                    "spend",
                    "budget",
                    "expense",
                    "pricing",
                    "billing",
                    "waste",
                    "efficiency",
                    "reduction",
                    "discount",
                    "cheaper",
                ],
                &[(3, 0.8), (1, 0.5)],
            ),
            quantified_patterns: words(&[r"\$\d+", r"\d+%", r"\d+\s*percent"]),
            quantified_bonus: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InsightQualityConfig {
    pub rule: KeywordRule,
    pub long_response_chars: usize,
    pub long_response_bonus: f64,
    pub short_response_chars: usize,
    pub short_response_penalty: f64,
}

impl Default for InsightQualityConfig {
    fn default() -> Self {
        Self {
            rule: KeywordRule::new(
                0.2,
                &[
                    "insight",
                    "analysis",
                    "pattern",
                    "trend",
                    "indicates",
                    "reveals",
                    "shows",
                    "because",
                    "due to",
                    "driven by",
                    "usage",
                    "utilization",
                    "benchmark",
                ],
                &[(3, 0.8), (1, 0.5)],
            ),
            long_response_chars: 500,
            long_response_bonus: 0.1,
            short_response_chars: 100,
            short_response_penalty: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CustomerOutcomeConfig {
    /// Used only when no expected outcomes are supplied.
    pub rule: KeywordRule,
    pub expected_tiers: Vec<FractionTier>,
    pub expected_floor: f64,
}

impl Default for CustomerOutcomeConfig {
    fn default() -> Self {
        Self {
            rule: KeywordRule::new(
                0.3,
                &[
                    "result",
                    "outcome",
                    "achieve",
                    "goal",
                    "success",
                    "resolved",
                    "benefit",
                    "deliver",
                    "improvement",
                ],
                &[(3, 0.7), (1, 0.5)],
            ),
            expected_tiers: vec![
                FractionTier {
                    min_fraction: 0.8,
                    score: 0.9,
                },
                FractionTier {
                    min_fraction: 0.5,
                    score: 0.6,
                },
            ],
            expected_floor: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BusinessImpactConfig {
    pub rule: KeywordRule,
}

impl Default for BusinessImpactConfig {
    fn default() -> Self {
        Self {
            rule: KeywordRule::new(
                0.2,
                &[
                    "revenue",
                    "profit",
                    "roi",
                    "saving",
                    "bottom line",
                    "growth",
                    "competitive",
                    "productivity",
                    "margin",
                    "month",
                ],
                &[(3, 0.9), (2, 0.6), (1, 0.4)],
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VerdictConfig {
    pub excellent_min: f64,
    pub good_min: f64,
    pub acceptable_min: f64,
    pub delivers_value_min: f64,
    pub competitive_advantage_min: f64,
    pub revenue_protection_min: f64,
    pub required_dimension_min: f64,
    pub strength_min: f64,
    pub deficiency_below: f64,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            excellent_min: 0.9,
            good_min: 0.75,
            acceptable_min: 0.6,
            delivers_value_min: 0.6,
            competitive_advantage_min: 0.8,
            revenue_protection_min: 0.7,
            required_dimension_min: 0.5,
            strength_min: 0.7,
            deficiency_below: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompositeWeights {
    pub substance_problem_solving: f64,
    pub substance_actionability: f64,
    pub substance_insight: f64,
    pub optimization_cost: f64,
    pub optimization_impact: f64,
    pub goal_outcome_expected: f64,
    pub goal_problem_solving_expected: f64,
    pub goal_outcome_fallback: f64,
    pub goal_problem_solving_fallback: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            substance_problem_solving: 0.4,
            substance_actionability: 0.4,
            substance_insight: 0.2,
            optimization_cost: 0.6,
            optimization_impact: 0.4,
            goal_outcome_expected: 0.7,
            goal_problem_solving_expected: 0.3,
            goal_outcome_fallback: 0.5,
            goal_problem_solving_fallback: 0.5,
        }
    }
}

/// Every tunable of the business-value heuristic. Each section defaults to
/// the built-in tables, so a JSON file only needs the fields it overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub problem_solving: ProblemSolvingConfig,
    pub actionability: ActionabilityConfig,
    pub cost_optimization: CostOptimizationConfig,
    pub insight_quality: InsightQualityConfig,
    pub customer_outcome: CustomerOutcomeConfig,
    pub business_impact: BusinessImpactConfig,
    pub verdict: VerdictConfig,
    pub composites: CompositeWeights,
}

impl ScoringConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| AgentValueError::Config(e.to_string()))?;
        let config: ScoringConfig =
            serde_json::from_str(&content).map_err(|e| AgentValueError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AgentValueError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.problem_solving.rule.validate("problem_solving")?;
        check_bonus_tiers(
            "problem_solving",
            "query overlap",
            &self.problem_solving.query_overlap,
        )?;

        let actionability = &self.actionability;
        actionability.rule.validate("actionability")?;
        compile_pattern("actionability", &actionability.list_marker_pattern)?;
        check_unit("actionability", "list marker bonus", actionability.list_marker_bonus)?;
        check_unit(
            "actionability",
            "implementation bonus",
            actionability.implementation_bonus,
        )?;
        if actionability.implementation_min_matches == 0 {
            return Err(AgentValueError::Config(
                "actionability: implementation_min_matches must be at least 1".to_string(),
            ));
        }

        self.cost_optimization.rule.validate("cost_optimization")?;
        for pattern in &self.cost_optimization.quantified_patterns {
            compile_pattern("cost_optimization", pattern)?;
        }
        check_unit(
            "cost_optimization",
            "quantified bonus",
            self.cost_optimization.quantified_bonus,
        )?;

        let insight = &self.insight_quality;
        insight.rule.validate("insight_quality")?;
        check_unit("insight_quality", "long response bonus", insight.long_response_bonus)?;
        check_unit(
            "insight_quality",
            "short response penalty",
            insight.short_response_penalty,
        )?;
        if insight.short_response_chars > insight.long_response_chars {
            return Err(AgentValueError::Config(
                "insight_quality: short_response_chars exceeds long_response_chars".to_string(),
            ));
        }

        let outcome = &self.customer_outcome;
        outcome.rule.validate("customer_outcome")?;
        check_unit("customer_outcome", "expected floor", outcome.expected_floor)?;
        let mut previous: Option<f64> = None;
        for tier in &outcome.expected_tiers {
            check_unit("customer_outcome", "expected tier score", tier.score)?;
            check_unit("customer_outcome", "expected tier fraction", tier.min_fraction)?;
            if previous.is_some_and(|prev| tier.min_fraction >= prev) {
                return Err(AgentValueError::Config(
                    "customer_outcome: expected tiers must be ordered by descending fraction"
                        .to_string(),
                ));
            }
            previous = Some(tier.min_fraction);
        }

        self.business_impact.rule.validate("business_impact")?;

        let verdict = &self.verdict;
        for (name, value) in [
            ("excellent_min", verdict.excellent_min),
            ("good_min", verdict.good_min),
            ("acceptable_min", verdict.acceptable_min),
            ("delivers_value_min", verdict.delivers_value_min),
            ("competitive_advantage_min", verdict.competitive_advantage_min),
            ("revenue_protection_min", verdict.revenue_protection_min),
            ("required_dimension_min", verdict.required_dimension_min),
            ("strength_min", verdict.strength_min),
            ("deficiency_below", verdict.deficiency_below),
        ] {
            check_unit("verdict", name, value)?;
        }
        if !(verdict.acceptable_min <= verdict.good_min
            && verdict.good_min <= verdict.excellent_min)
        {
            return Err(AgentValueError::Config(
                "verdict: tier thresholds must satisfy acceptable <= good <= excellent".to_string(),
            ));
        }

        let weights = &self.composites;
        for value in [
            weights.substance_problem_solving,
            weights.substance_actionability,
            weights.substance_insight,
            weights.optimization_cost,
            weights.optimization_impact,
            weights.goal_outcome_expected,
            weights.goal_problem_solving_expected,
            weights.goal_outcome_fallback,
            weights.goal_problem_solving_fallback,
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AgentValueError::Config(
                    "composites: weights must be finite and non-negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

pub(crate) fn compile_pattern(section: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| AgentValueError::Config(format!("{section}: invalid pattern: {e}")))
}

fn check_unit(section: &str, field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(AgentValueError::Config(format!(
            "{section}: {field} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn check_bonus_tiers(section: &str, field: &str, tiers: &[BonusTier]) -> Result<()> {
    let mut previous: Option<usize> = None;
    for tier in tiers {
        check_unit(section, field, tier.bonus)?;
        if tier.min_matches == 0 {
            return Err(AgentValueError::Config(format!(
                "{section}: {field} min_matches must be at least 1"
            )));
        }
        if previous.is_some_and(|prev| tier.min_matches >= prev) {
            return Err(AgentValueError::Config(format!(
                "{section}: {field} tiers must be ordered by descending min_matches"
            )));
        }
        previous = Some(tier.min_matches);
    }
    Ok(())
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

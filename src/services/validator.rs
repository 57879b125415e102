use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::domains::assessment::{
    BusinessValueAssessment, CustomerSatisfactionTier, Dimension, DimensionScore,
};
use crate::domains::response::AgentResponse;
use crate::error::{AgentValueError, Result};
use crate::interfaces::scorer::{DimensionScorer, ScoringContext};
use crate::scoring::keyword_scorers;

pub const DEFAULT_MIN_SCORE: f64 = 0.6;
pub const DEFAULT_MIN_CHAT_SUBSTANCE: f64 = 0.6;

/// Threshold comparisons tolerate this much float drift.
const SCORE_EPSILON: f64 = 1e-9;

static DEFAULT_VALIDATOR: Lazy<BusinessValueValidator> = Lazy::new(|| {
    BusinessValueValidator::new(ScoringConfig::default())
        .expect("built-in scoring tables are valid")
});

fn at_least(value: f64, threshold: f64) -> bool {
    value + SCORE_EPSILON >= threshold
}

/// Heuristic business-value oracle for agent responses.
///
/// Immutable after construction; a single instance can be shared across
/// threads and tasks.
pub struct BusinessValueValidator {
    config: ScoringConfig,
    scorers: Vec<Box<dyn DimensionScorer>>,
}

impl BusinessValueValidator {
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        let scorers = keyword_scorers(&config)?;
        Ok(Self { config, scorers })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Replaces the scorer for `scorer.dimension()`.
    pub fn with_scorer(mut self, scorer: Box<dyn DimensionScorer>) -> Self {
        let dimension = scorer.dimension();
        match self.scorers.iter().position(|s| s.dimension() == dimension) {
            Some(idx) => self.scorers[idx] = scorer,
            None => self.scorers.push(scorer),
        }
        self
    }

    pub fn validate_business_value(
        &self,
        response: &AgentResponse,
        user_query: Option<&str>,
        user_context: Option<&Value>,
        expected_outcomes: Option<&[String]>,
    ) -> BusinessValueAssessment {
        if let Some(context) = user_context {
            debug!(context = %context, "user context supplied; not used for scoring");
        }

        let Some(text) = response.text() else {
            warn!("cannot score agent response: empty response");
            return BusinessValueAssessment::failed("empty response");
        };

        let ctx = ScoringContext::new(&text, user_query, expected_outcomes);
        let dimensions: Vec<DimensionScore> = Dimension::ALL
            .iter()
            .map(|dimension| {
                self.scorers
                    .iter()
                    .find(|s| s.dimension() == *dimension)
                    .map(|s| s.score(&ctx))
                    .unwrap_or_else(|| DimensionScore::zero(*dimension))
            })
            .collect();

        for dim in &dimensions {
            debug!(
                dimension = %dim.dimension,
                score = dim.score,
                matched = ?dim.matched_keywords,
                notes = ?dim.notes,
                "dimension scored"
            );
        }

        let assessment = self.assess(dimensions, ctx.has_expected_outcomes(), ctx.char_count);
        info!(
            overall = assessment.overall_score,
            tier = %assessment.customer_satisfaction_tier,
            delivers_value = assessment.delivers_business_value,
            substance = assessment.chat_substance_quality,
            "business value assessed"
        );
        assessment
    }

    fn assess(
        &self,
        dimensions: Vec<DimensionScore>,
        has_expected_outcomes: bool,
        response_length: usize,
    ) -> BusinessValueAssessment {
        let verdict = &self.config.verdict;
        let weights = &self.config.composites;
        let score = |dimension: Dimension| {
            dimensions
                .iter()
                .find(|d| d.dimension == dimension)
                .map(|d| d.score)
                .unwrap_or(0.0)
        };

        let overall = dimensions.iter().map(|d| d.score).sum::<f64>() / dimensions.len() as f64;

        let problem_solving = score(Dimension::ProblemSolving);
        let chat_substance_quality = weights.substance_problem_solving * problem_solving
            + weights.substance_actionability * score(Dimension::Actionability)
            + weights.substance_insight * score(Dimension::InsightQuality);
        let ai_optimization_value = weights.optimization_cost * score(Dimension::CostOptimization)
            + weights.optimization_impact * score(Dimension::BusinessImpact);
        let outcome = score(Dimension::CustomerOutcome);
        let user_goal_achievement = if has_expected_outcomes {
            weights.goal_outcome_expected * outcome
                + weights.goal_problem_solving_expected * problem_solving
        } else {
            weights.goal_outcome_fallback * outcome
                + weights.goal_problem_solving_fallback * problem_solving
        };

        let mut strengths = Vec::new();
        let mut deficiencies = Vec::new();
        let mut improvement_suggestions = Vec::new();
        for dim in &dimensions {
            if at_least(dim.score, verdict.strength_min) {
                strengths.push(format!("strong {} ({:.2})", dim.dimension, dim.score));
            } else if !at_least(dim.score, verdict.deficiency_below) {
                deficiencies.push(format!("weak {} ({:.2})", dim.dimension, dim.score));
                improvement_suggestions.push(dim.dimension.improvement_hint().to_string());
            }
        }

        BusinessValueAssessment {
            overall_score: overall,
            customer_satisfaction_tier: self.tier_for(overall),
            delivers_business_value: at_least(overall, verdict.delivers_value_min),
            revenue_protection_score: overall,
            competitive_advantage: at_least(overall, verdict.competitive_advantage_min),
            chat_substance_quality,
            ai_optimization_value,
            user_goal_achievement,
            dimensions,
            strengths,
            deficiencies,
            improvement_suggestions,
            response_length,
        }
    }

    fn tier_for(&self, overall: f64) -> CustomerSatisfactionTier {
        let verdict = &self.config.verdict;
        if at_least(overall, verdict.excellent_min) {
            CustomerSatisfactionTier::Excellent
        } else if at_least(overall, verdict.good_min) {
            CustomerSatisfactionTier::Good
        } else if at_least(overall, verdict.acceptable_min) {
            CustomerSatisfactionTier::Acceptable
        } else {
            CustomerSatisfactionTier::Poor
        }
    }

    /// Fails with every threshold the assessment misses.
    pub fn assert_business_value_delivered(
        &self,
        assessment: &BusinessValueAssessment,
        min_score: f64,
        require_actionable: bool,
        require_problem_solving: bool,
    ) -> Result<()> {
        let verdict = &self.config.verdict;
        let mut violations = Vec::new();

        if !at_least(assessment.overall_score, min_score) {
            violations.push(format!(
                "overall score {:.3} below required {:.3}",
                assessment.overall_score, min_score
            ));
        }
        if !assessment.delivers_business_value {
            violations.push("response does not deliver business value".to_string());
        }
        if require_actionable {
            let actionability = assessment.score(Dimension::Actionability);
            if !at_least(actionability, verdict.required_dimension_min) {
                violations.push(format!(
                    "actionability {:.3} below required {:.3}",
                    actionability, verdict.required_dimension_min
                ));
            }
        }
        if require_problem_solving {
            let problem_solving = assessment.score(Dimension::ProblemSolving);
            if !at_least(problem_solving, verdict.required_dimension_min) {
                violations.push(format!(
                    "problem solving {:.3} below required {:.3}",
                    problem_solving, verdict.required_dimension_min
                ));
            }
        }
        if !at_least(
            assessment.revenue_protection_score,
            verdict.revenue_protection_min,
        ) {
            violations.push(format!(
                "revenue protection {:.3} below required {:.3}",
                assessment.revenue_protection_score, verdict.revenue_protection_min
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AgentValueError::Assertion(format!(
                "{} ({})",
                violations.join("; "),
                assessment.summary()
            )))
        }
    }

    /// Scores `response`; a score under `min_score` is logged and recorded as
    /// a deficiency but never raised.
    pub fn validate_agent_response(
        &self,
        response: &AgentResponse,
        user_query: Option<&str>,
        expected_outcomes: Option<&[String]>,
        min_score: f64,
    ) -> BusinessValueAssessment {
        let mut assessment =
            self.validate_business_value(response, user_query, None, expected_outcomes);
        if !at_least(assessment.overall_score, min_score) {
            warn!(
                overall = assessment.overall_score,
                min_score, "agent response below business value minimum"
            );
            assessment.deficiencies.push(format!(
                "overall score {:.3} below minimum {:.3}",
                assessment.overall_score, min_score
            ));
        }
        assessment
    }

    /// Golden-path oracle: substantive chat that delivers business value.
    pub fn assert_golden_path_value(
        &self,
        response: &AgentResponse,
        user_query: Option<&str>,
        expected_outcomes: Option<&[String]>,
        min_chat_substance: f64,
        min_overall_score: f64,
    ) -> Result<BusinessValueAssessment> {
        let assessment =
            self.validate_business_value(response, user_query, None, expected_outcomes);

        let mut violations = Vec::new();
        if !at_least(assessment.chat_substance_quality, min_chat_substance) {
            violations.push(format!(
                "chat substance {:.3} below required {:.3}",
                assessment.chat_substance_quality, min_chat_substance
            ));
        }
        if !at_least(assessment.overall_score, min_overall_score) {
            violations.push(format!(
                "overall score {:.3} below required {:.3}",
                assessment.overall_score, min_overall_score
            ));
        }
        if !assessment.delivers_business_value {
            violations.push("response does not deliver business value".to_string());
        }

        if violations.is_empty() {
            Ok(assessment)
        } else {
            Err(AgentValueError::Assertion(format!(
                "golden path business value: {}",
                violations.join("; ")
            )))
        }
    }
}

pub fn default_validator() -> &'static BusinessValueValidator {
    &DEFAULT_VALIDATOR
}

/// Scores `response` with the built-in tables. A score under `min_score` is
/// logged and recorded as a deficiency but never raised.
pub fn validate_agent_business_value(
    response: impl Into<AgentResponse>,
    user_query: Option<&str>,
    expected_outcomes: Option<&[String]>,
    min_score: f64,
) -> BusinessValueAssessment {
    default_validator().validate_agent_response(
        &response.into(),
        user_query,
        expected_outcomes,
        min_score,
    )
}

/// Golden-path oracle over the built-in tables.
pub fn assert_golden_path_business_value(
    response: impl Into<AgentResponse>,
    user_query: Option<&str>,
    expected_outcomes: Option<&[String]>,
    min_chat_substance: f64,
    min_overall_score: f64,
) -> Result<BusinessValueAssessment> {
    default_validator().assert_golden_path_value(
        &response.into(),
        user_query,
        expected_outcomes,
        min_chat_substance,
        min_overall_score,
    )
}

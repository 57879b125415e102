use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    ProblemSolving,
    Actionability,
    CostOptimization,
    InsightQuality,
    CustomerOutcome,
    BusinessImpact,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::ProblemSolving,
        Dimension::Actionability,
        Dimension::CostOptimization,
        Dimension::InsightQuality,
        Dimension::CustomerOutcome,
        Dimension::BusinessImpact,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::ProblemSolving => "problem solving",
            Dimension::Actionability => "actionability",
            Dimension::CostOptimization => "cost optimization",
            Dimension::InsightQuality => "insight quality",
            Dimension::CustomerOutcome => "customer outcome",
            Dimension::BusinessImpact => "business impact",
        }
    }

    pub fn improvement_hint(&self) -> &'static str {
        match self {
            Dimension::ProblemSolving => "address the problem directly and name the approach",
            Dimension::Actionability => "give concrete next steps, ideally as a numbered list",
            Dimension::CostOptimization => "quantify savings with amounts or percentages",
            Dimension::InsightQuality => "explain the patterns or causes behind the recommendation",
            Dimension::CustomerOutcome => "state the outcome the user will achieve",
            Dimension::BusinessImpact => "connect the advice to revenue, margin or productivity",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub notes: Vec<String>,
}

impl DimensionScore {
    pub fn new(dimension: Dimension, score: f64) -> Self {
        Self {
            dimension,
            score: score.clamp(0.0, 1.0),
            matched_keywords: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn zero(dimension: Dimension) -> Self {
        Self::new(dimension, 0.0)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CustomerSatisfactionTier {
    #[default]
    Poor,
    Acceptable,
    Good,
    Excellent,
}

impl fmt::Display for CustomerSatisfactionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CustomerSatisfactionTier::Poor => "Poor",
            CustomerSatisfactionTier::Acceptable => "Acceptable",
            CustomerSatisfactionTier::Good => "Good",
            CustomerSatisfactionTier::Excellent => "Excellent",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessValueAssessment {
    pub overall_score: f64,
    pub dimensions: Vec<DimensionScore>,
    pub customer_satisfaction_tier: CustomerSatisfactionTier,
    pub delivers_business_value: bool,
    pub revenue_protection_score: f64,
    pub competitive_advantage: bool,
    pub chat_substance_quality: f64,
    pub ai_optimization_value: f64,
    pub user_goal_achievement: f64,
    pub strengths: Vec<String>,
    pub deficiencies: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub response_length: usize,
}

impl BusinessValueAssessment {
    /// All-zero assessment for responses that could not be scored.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            overall_score: 0.0,
            dimensions: Dimension::ALL.iter().map(|d| DimensionScore::zero(*d)).collect(),
            customer_satisfaction_tier: CustomerSatisfactionTier::Poor,
            delivers_business_value: false,
            revenue_protection_score: 0.0,
            competitive_advantage: false,
            chat_substance_quality: 0.0,
            ai_optimization_value: 0.0,
            user_goal_achievement: 0.0,
            strengths: Vec::new(),
            deficiencies: vec![reason.into()],
            improvement_suggestions: Vec::new(),
            response_length: 0,
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }

    pub fn score(&self, dimension: Dimension) -> f64 {
        self.dimension(dimension).map(|d| d.score).unwrap_or(0.0)
    }

    pub fn summary(&self) -> String {
        format!(
            "overall={:.3} tier={} delivers_value={} substance={:.3} optimization={:.3} goal={:.3}",
            self.overall_score,
            self.customer_satisfaction_tier,
            self.delivers_business_value,
            self.chat_substance_quality,
            self.ai_optimization_value,
            self.user_goal_achievement
        )
    }
}

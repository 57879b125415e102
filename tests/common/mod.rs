#![allow(dead_code)]

use agent_value::config::ScoringConfig;
use agent_value::services::validator::BusinessValueValidator;

/// Hits at least three keywords of every dimension, quantifies savings and
/// uses a numbered list.
pub const HIGH_VALUE_RESPONSE: &str = "Analysis of your cloud usage shows a clear pattern: idle GPU nodes drive most of the waste because autoscaling never scales in.

I recommend this approach to solve it and identify the root cause:
1. Audit idle nodes and configure autoscaling to scale in after 10 minutes.
2. Deploy spot instances for batch jobs, then install budget alerts.
3. Finally, schedule a monthly review of billing data.

Expected result: cost reduction of 35% (about $12000 per month), which protects margin, improves productivity and sustains revenue growth. This outcome helps you achieve your efficiency goal and deliver a competitive benefit.";

/// Contains no keyword from any dimension.
pub const NO_VALUE_RESPONSE: &str = "The weather was pleasant and the birds sang near the lake.";

pub const COST_SCENARIO_RESPONSE: &str = "I recommend you optimize costs by reducing resource waste, saving 30% ($5000/month). Step 1: audit usage.";

pub fn validator() -> BusinessValueValidator {
    BusinessValueValidator::new(ScoringConfig::default()).unwrap()
}

pub fn outcomes(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

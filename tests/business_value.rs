mod common;

use serde_json::{json, Value};

use agent_value::domains::assessment::{CustomerSatisfactionTier, Dimension};
use agent_value::domains::response::AgentResponse;
use agent_value::error::AgentValueError;
use agent_value::services::validator::{
    assert_golden_path_business_value, validate_agent_business_value, DEFAULT_MIN_CHAT_SUBSTANCE,
    DEFAULT_MIN_SCORE,
};

use common::{
    approx, outcomes, validator, COST_SCENARIO_RESPONSE, HIGH_VALUE_RESPONSE, NO_VALUE_RESPONSE,
};

#[test]
fn keyword_free_response_stays_in_low_band() {
    let v = validator();
    let assessment = v.validate_business_value(&NO_VALUE_RESPONSE.into(), None, None, None);

    assert!(assessment.overall_score >= 0.18 && assessment.overall_score <= 0.25);
    assert!(!assessment.delivers_business_value);
    assert!(!assessment.competitive_advantage);
    assert_eq!(
        assessment.customer_satisfaction_tier,
        CustomerSatisfactionTier::Poor
    );
    assert!(approx(assessment.score(Dimension::CostOptimization), 0.1));
    assert!(assessment
        .deficiencies
        .contains(&"weak cost optimization (0.10)".to_string()));
    assert_eq!(assessment.improvement_suggestions.len(), assessment.deficiencies.len());
    assert!(assessment.strengths.is_empty());
}

#[test]
fn keyword_rich_response_has_competitive_advantage() {
    let v = validator();
    let assessment = v.validate_business_value(
        &HIGH_VALUE_RESPONSE.into(),
        Some("How do I cut our cloud GPU costs?"),
        None,
        None,
    );

    assert!(assessment.overall_score > 0.8);
    assert!(assessment.competitive_advantage);
    assert!(assessment.delivers_business_value);
    assert_eq!(
        assessment.customer_satisfaction_tier,
        CustomerSatisfactionTier::Good
    );
    assert!(approx(assessment.score(Dimension::Actionability), 1.0));
    assert!(approx(assessment.score(Dimension::CostOptimization), 1.0));
    assert!(approx(assessment.chat_substance_quality, 0.9));
    assert!(approx(assessment.revenue_protection_score, assessment.overall_score));
    assert_eq!(assessment.response_length, HIGH_VALUE_RESPONSE.chars().count());

    let expected = outcomes(&["Cost Reduction", "budget alerts"]);
    let with_outcomes = v.validate_business_value(
        &HIGH_VALUE_RESPONSE.into(),
        Some("How do I cut our cloud GPU costs?"),
        None,
        Some(expected.as_slice()),
    );
    assert!(approx(with_outcomes.score(Dimension::CustomerOutcome), 0.9));
    assert_eq!(
        with_outcomes.customer_satisfaction_tier,
        CustomerSatisfactionTier::Excellent
    );
}

#[test]
fn expected_outcomes_match_case_insensitively() {
    let v = validator();
    let expected = outcomes(&["cost reduction"]);
    let assessment = v.validate_business_value(
        &"We delivered Cost Reduction across every team.".into(),
        None,
        None,
        Some(expected.as_slice()),
    );
    let outcome = assessment.dimension(Dimension::CustomerOutcome).unwrap();
    assert!(approx(outcome.score, 0.9));
    assert_eq!(outcome.matched_keywords, expected);
}

#[test]
fn scoring_is_idempotent_and_ignores_user_context() {
    let v = validator();
    let expected = outcomes(&["cost reduction"]);
    let response = AgentResponse::from(HIGH_VALUE_RESPONSE);
    let expected = Some(expected.as_slice());
    let first = v.validate_business_value(&response, Some("cut costs"), None, expected);
    let second = v.validate_business_value(&response, Some("cut costs"), None, expected);
    assert_eq!(first, second);

    let context = json!({"plan": "enterprise", "region": "eu"});
    let with_context =
        v.validate_business_value(&response, Some("cut costs"), Some(&context), expected);
    assert_eq!(first, with_context);
}

#[test]
fn structured_responses_use_first_text_field() {
    let v = validator();
    let structured = AgentResponse::from(json!({
        "content": null,
        "message": COST_SCENARIO_RESPONSE,
        "output": "ignored",
    }));
    let from_dict = v.validate_business_value(&structured, None, None, None);
    let from_text = v.validate_business_value(&COST_SCENARIO_RESPONSE.into(), None, None, None);
    assert_eq!(from_dict, from_text);

    let opaque = AgentResponse::from(json!({"status": "ok"}));
    let serialized = v.validate_business_value(&opaque, None, None, None);
    let literal = v.validate_business_value(&r#"{"status":"ok"}"#.into(), None, None, None);
    assert_eq!(serialized, literal);
    assert_eq!(serialized.response_length, 15);
}

#[test]
fn insight_length_bonus_boundaries() {
    let v = validator();
    let insight = |len: usize| {
        v.validate_business_value(&"a".repeat(len).into(), None, None, None)
            .score(Dimension::InsightQuality)
    };
    assert!(approx(insight(500), 0.2));
    assert!(approx(insight(501), 0.3));
    assert!(approx(insight(100), 0.2));
    assert!(approx(insight(99), 0.1));
}

#[test]
fn query_overlap_lifts_problem_solving() {
    let v = validator();
    let assessment = v.validate_business_value(
        &NO_VALUE_RESPONSE.into(),
        Some("what about the weather near the lake"),
        None,
        None,
    );
    assert!(approx(assessment.score(Dimension::ProblemSolving), 0.5));
    assert!(!assessment.delivers_business_value);
}

#[test]
fn empty_responses_fail_without_raising() {
    let v = validator();
    for response in [
        AgentResponse::from(""),
        AgentResponse::from("  \n\t "),
        AgentResponse::from(Value::Null),
        AgentResponse::from(json!({"content": "   "})),
    ] {
        let assessment = v.validate_business_value(&response, Some("anything"), None, None);
        assert_eq!(assessment.overall_score, 0.0);
        assert_eq!(assessment.dimensions.len(), 6);
        assert!(assessment.dimensions.iter().all(|d| d.score == 0.0));
        assert!(!assessment.delivers_business_value);
        assert_eq!(assessment.deficiencies, vec!["empty response".to_string()]);
    }
}

#[test]
fn cost_saving_scenario_delivers_value() {
    let expected = outcomes(&["cost reduction"]);
    let assessment = validate_agent_business_value(
        COST_SCENARIO_RESPONSE,
        Some("help me save money"),
        Some(expected.as_slice()),
        DEFAULT_MIN_SCORE,
    );

    assert!(assessment.delivers_business_value);
    assert!(assessment.customer_satisfaction_tier >= CustomerSatisfactionTier::Acceptable);
    assert!(approx(assessment.overall_score, 3.8 / 6.0));
    assert!(approx(assessment.score(Dimension::CustomerOutcome), 0.3));
    assert!(!assessment
        .deficiencies
        .iter()
        .any(|d| d.contains("below minimum")));
}

#[test]
fn below_minimum_is_recorded_not_raised() {
    let assessment = validate_agent_business_value(NO_VALUE_RESPONSE, None, None, 0.6);
    let last = assessment.deficiencies.last().unwrap();
    assert!(last.contains("below minimum 0.600"));
}

#[test]
fn delivered_assertion_checks_revenue_protection() {
    let v = validator();
    let strong = v.validate_business_value(&HIGH_VALUE_RESPONSE.into(), None, None, None);
    v.assert_business_value_delivered(&strong, 0.8, true, true)
        .unwrap();

    let expected = outcomes(&["cost reduction"]);
    let acceptable = v.validate_business_value(
        &COST_SCENARIO_RESPONSE.into(),
        Some("help me save money"),
        None,
        Some(expected.as_slice()),
    );
    let err = v
        .assert_business_value_delivered(&acceptable, 0.6, true, true)
        .unwrap_err();
    assert!(matches!(err, AgentValueError::Assertion(_)));
    let message = format!("{err}");
    assert!(message.contains("revenue protection"));
    assert!(!message.contains("does not deliver"));
    assert!(!message.contains("actionability"));
}

#[test]
fn golden_path_assertion() {
    let expected = outcomes(&["cost reduction"]);
    let assessment = assert_golden_path_business_value(
        HIGH_VALUE_RESPONSE,
        Some("How do I cut our cloud GPU costs?"),
        Some(expected.as_slice()),
        DEFAULT_MIN_CHAT_SUBSTANCE,
        DEFAULT_MIN_SCORE,
    )
    .unwrap();
    assert!(assessment.delivers_business_value);

    let err = assert_golden_path_business_value(
        NO_VALUE_RESPONSE,
        None,
        None,
        DEFAULT_MIN_CHAT_SUBSTANCE,
        DEFAULT_MIN_SCORE,
    )
    .unwrap_err();
    let message = format!("{err}");
    assert!(message.contains("chat substance"));
    assert!(message.contains("overall score"));
}

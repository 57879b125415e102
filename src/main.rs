use std::io::Read;

use clap::Parser;
use console::style;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use agent_value::config::ScoringConfig;
use agent_value::domains::assessment::{BusinessValueAssessment, CustomerSatisfactionTier};
use agent_value::domains::message::parse_message_log;
use agent_value::domains::response::AgentResponse;
use agent_value::error::{AgentValueError, Result};
use agent_value::services::golden_path::{
    assert_golden_path_with, check_event_sequence, final_response,
};
use agent_value::services::validator::{BusinessValueValidator, DEFAULT_MIN_SCORE};

#[derive(Parser, Debug)]
#[command(name = "agent-value")]
#[command(about = "Business value oracle for AI agent responses")]
struct Cli {
    #[arg(long, env = "AGENT_VALUE_CONFIG", help = "JSON file overriding scoring tables")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Score one agent response (text or JSON) from --text, --file or stdin.
    Score {
        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        file: Option<String>,

        #[arg(long)]
        query: Option<String>,

        #[arg(long = "expect")]
        expected: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_MIN_SCORE)]
        min_score: f64,

        #[arg(long, default_value_t = false)]
        require_actionable: bool,

        #[arg(long, default_value_t = false)]
        require_problem_solving: bool,

        #[arg(long, default_value_t = false, help = "Fail when business value is not delivered")]
        assert: bool,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Check a JSON array of WebSocket messages against the golden path.
    CheckEvents {
        #[arg(long)]
        file: String,

        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        query: Option<String>,

        #[arg(long = "expect")]
        expected: Vec<String>,

        #[arg(
            long,
            default_value_t = false,
            help = "Fail unless the events are complete and the final response delivers value"
        )]
        assert: bool,
    },
    /// Print the effective scoring configuration.
    ShowConfig,
}

fn load_config(path: Option<&str>) -> Result<ScoringConfig> {
    match path {
        Some(path) => ScoringConfig::from_file(path),
        None => Ok(ScoringConfig::default()),
    }
}

fn read_input(text: Option<String>, file: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .map_err(|e| AgentValueError::Runtime(e.to_string()));
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| AgentValueError::Runtime(e.to_string()))?;
    Ok(buffer)
}

/// JSON objects and arrays are scored structurally, anything else as text.
fn to_response(raw: String) -> AgentResponse {
    match serde_json::from_str::<Value>(&raw) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => AgentResponse::Structured(value),
        _ => AgentResponse::Text(raw),
    }
}

fn expected_slice(expected: &[String]) -> Option<&[String]> {
    if expected.is_empty() {
        None
    } else {
        Some(expected)
    }
}

fn tier_color(tier: CustomerSatisfactionTier) -> u8 {
    match tier {
        CustomerSatisfactionTier::Excellent => 42,
        CustomerSatisfactionTier::Good => 114,
        CustomerSatisfactionTier::Acceptable => 214,
        CustomerSatisfactionTier::Poor => 196,
    }
}

fn print_assessment(assessment: &BusinessValueAssessment) {
    let tier = assessment.customer_satisfaction_tier;
    println!(
        "{} {} {}",
        style("Business value").bold(),
        style(format!("{:.3}", assessment.overall_score)).bold(),
        style(tier.to_string()).color256(tier_color(tier)).bold()
    );
    for dim in &assessment.dimensions {
        let matched = if dim.matched_keywords.is_empty() {
            String::new()
        } else {
            format!("  [{}]", dim.matched_keywords.join(", "))
        };
        println!(
            "  {:<18} {:.2}{}",
            dim.dimension.label(),
            dim.score,
            style(matched).color256(244)
        );
        for note in &dim.notes {
            println!("  {:<18} {}", "", style(note).color256(244));
        }
    }
    println!(
        "  delivers value: {}  competitive advantage: {}",
        assessment.delivers_business_value, assessment.competitive_advantage
    );
    println!(
        "  substance {:.2}  optimization {:.2}  goal achievement {:.2}",
        assessment.chat_substance_quality,
        assessment.ai_optimization_value,
        assessment.user_goal_achievement
    );
    for strength in &assessment.strengths {
        println!("  {} {}", style("+").color256(42), strength);
    }
    for deficiency in &assessment.deficiencies {
        println!("  {} {}", style("-").color256(196), deficiency);
    }
    for suggestion in &assessment.improvement_suggestions {
        println!("  {} {}", style("→").color256(45), suggestion);
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,agent_value=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::ShowConfig => {
            println!("{}", config.to_json_pretty()?);
        }
        Commands::Score {
            text,
            file,
            query,
            expected,
            min_score,
            require_actionable,
            require_problem_solving,
            assert,
            json,
        } => {
            let validator = BusinessValueValidator::new(config)?;
            let response = to_response(read_input(text, file)?);
            let assessment = validator.validate_business_value(
                &response,
                query.as_deref(),
                None,
                expected_slice(&expected),
            );
            if json {
                let out = serde_json::to_string_pretty(&assessment)
                    .map_err(|e| AgentValueError::Serialization(e.to_string()))?;
                println!("{out}");
            } else {
                print_assessment(&assessment);
            }
            if assert {
                validator.assert_business_value_delivered(
                    &assessment,
                    min_score,
                    require_actionable,
                    require_problem_solving,
                )?;
            }
        }
        Commands::CheckEvents {
            file,
            user_id,
            query,
            expected,
            assert,
        } => {
            let raw = std::fs::read_to_string(&file)
                .map_err(|e| AgentValueError::Runtime(e.to_string()))?;
            let events = parse_message_log(&raw)?;
            for event in &events {
                println!(
                    "  {}  {:<16} {}",
                    style(event.timestamp_label()).color256(244),
                    event.message_type.as_str(),
                    event.message_id
                );
            }
            let report = check_event_sequence(&events, user_id.as_deref());
            let marker = if report.is_complete() {
                style("✓").color256(42)
            } else {
                style("✗").color256(196)
            };
            println!("{marker} {report}");

            let validator = BusinessValueValidator::new(config)?;
            if let Some(result) = final_response(&events) {
                let assessment = validator.validate_business_value(
                    &AgentResponse::from(result),
                    query.as_deref(),
                    None,
                    expected_slice(&expected),
                );
                print_assessment(&assessment);
            }
            if assert {
                assert_golden_path_with(
                    &validator,
                    &events,
                    user_id.as_deref(),
                    query.as_deref(),
                    expected_slice(&expected),
                )?;
            }
        }
    }
    Ok(())
}

pub mod config;
pub mod domains;
pub mod error;
pub mod factories;
pub mod interfaces;
pub mod scoring;
pub mod services;

pub use crate::config::ScoringConfig;
pub use crate::domains::assessment::{
    BusinessValueAssessment, CustomerSatisfactionTier, Dimension, DimensionScore,
};
pub use crate::domains::message::{MessageType, WebSocketMessage};
pub use crate::domains::response::AgentResponse;
pub use crate::error::{AgentValueError, Result};
pub use crate::services::validator::{
    assert_golden_path_business_value, validate_agent_business_value, BusinessValueValidator,
};

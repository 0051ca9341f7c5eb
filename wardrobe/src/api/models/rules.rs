use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::FashionRule;
use crate::types::RuleId;

pub const RULE_CREATED_MESSAGE: &str = "Fashion rule created successfully";

/// Request body for creating a fashion rule. Nothing is persisted or validated, so every
/// field takes any JSON value and the whole body may be `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FashionRuleCreate {
    /// Owner of the rule; clients send either a string or a number
    #[schema(value_type = Option<String>)]
    pub user_id: Option<serde_json::Value>,
    #[schema(value_type = Option<String>)]
    pub name: Option<serde_json::Value>,
    #[schema(value_type = Option<String>)]
    pub description: Option<serde_json::Value>,
    #[schema(value_type = Option<String>, example = "color_preferences")]
    pub category: Option<serde_json::Value>,
    #[schema(value_type = Option<bool>)]
    pub active: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FashionRuleCreated {
    pub success: bool,
    #[schema(value_type = String, format = Uuid)]
    pub rule_id: RuleId,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FashionRulesResponse {
    pub success: bool,
    pub rules: Vec<FashionRule>,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::Recommendation;

/// Request body for recommendations. Accepted and currently ignored, so fields take any JSON
/// value and the whole body may be `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RecommendationsRequest {
    #[schema(value_type = Option<String>)]
    pub analysis_id: Option<serde_json::Value>,
    /// Results previously returned by the analysis endpoint
    #[schema(value_type = Option<Object>)]
    pub results: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendationsResponse {
    pub success: bool,
    pub recommendations: Vec<Recommendation>,
}

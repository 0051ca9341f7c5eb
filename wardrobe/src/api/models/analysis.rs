use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::analysis::AnalysisResults;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub success: bool,
    /// The path identifier, echoed back unchanged
    pub analysis_id: String,
    pub results: AnalysisResults,
}

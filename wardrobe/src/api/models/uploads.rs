use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::intake::Submission;
use crate::types::AnalysisId;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// Response for an accepted upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    #[schema(example = "File uploaded successfully")]
    pub message: String,
    /// Name the file was stored under
    #[schema(example = "3f2b9c1d0e8a4b7c9d6e5f4a3b2c1d0e_photo.jpg")]
    pub filename: String,
    /// Identifier to pass to `/analyze/{analysis_id}`
    #[schema(value_type = String, format = Uuid)]
    pub analysis_id: AnalysisId,
}

impl From<Submission> for UploadResponse {
    fn from(submission: Submission) -> Self {
        Self {
            success: true,
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            filename: submission.stored_filename,
            analysis_id: submission.analysis_id,
        }
    }
}

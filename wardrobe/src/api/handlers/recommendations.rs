//! Outfit recommendations endpoint.

use axum::{Json, extract::rejection::JsonRejection};
use tracing::instrument;

use crate::{
    api::models::recommendations::{RecommendationsRequest, RecommendationsResponse},
    catalog,
    errors::{ErrorBody, Result},
};

#[utoipa::path(
    post,
    path = "/recommendations",
    tag = "recommendations",
    summary = "Get outfit recommendations",
    description = "Returns outfit recommendations for an analysis. The request body is accepted but
does not influence the result yet.",
    request_body = RecommendationsRequest,
    responses(
        (status = 200, description = "Recommended outfits", body = RecommendationsResponse),
        (status = 400, description = "Malformed JSON body", body = ErrorBody),
        (status = 415, description = "Body is not JSON", body = ErrorBody),
        (status = 422, description = "Body is a JSON scalar instead of an object", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn get_recommendations(
    payload: std::result::Result<Json<Option<RecommendationsRequest>>, JsonRejection>,
) -> Result<Json<RecommendationsResponse>> {
    let Json(request) = payload?;
    let request = request.unwrap_or_default();
    tracing::debug!(analysis_id = ?request.analysis_id, "Serving recommendations");

    Ok(Json(RecommendationsResponse {
        success: true,
        recommendations: catalog::recommendations(),
    }))
}

//! Style analysis endpoint.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::analysis::AnalysisResponse,
    errors::{ErrorBody, Result},
    metrics,
};

#[utoipa::path(
    post,
    path = "/analyze/{analysis_id}",
    tag = "analysis",
    summary = "Analyze an uploaded photo",
    description = "Runs the configured analysis backend and returns body type, colour palette,
recommended styles and size. The mock backend answers after a fixed delay.

Unless identifier correlation is enforced, any `analysis_id` is accepted.",
    params(
        ("analysis_id" = String, Path, description = "Identifier returned by `/upload`")
    ),
    responses(
        (status = 200, description = "Analysis complete", body = AnalysisResponse),
        (status = 404, description = "Unknown analysis id (only when correlation is enforced)", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn analyze(State(state): State<AppState>, Path(analysis_id): Path<String>) -> Result<Json<AnalysisResponse>> {
    let stored_filename = match &state.correlations {
        Some(correlations) => {
            let storage = state.intake.storage();
            Some(correlations.resolve(&analysis_id, storage.as_ref()).await?)
        }
        None => None,
    };

    let results = state.analysis.analyze(&analysis_id, stored_filename.as_deref()).await?;
    metrics::record_analysis(state.analysis.name());

    Ok(Json(AnalysisResponse {
        success: true,
        analysis_id,
        results,
    }))
}

#[cfg(test)]
mod tests {
    use crate::analysis::mock::MockBackend;
    use crate::api::models::{analysis::AnalysisResponse, uploads::UploadResponse};
    use crate::config::AnalysisBackendConfig;
    use crate::errors::ErrorBody;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use std::future::IntoFuture;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_any_identifier_is_analyzed() {
        let dir = tempfile::tempdir().unwrap();
        let server = create_test_app(create_test_config(dir.path())).await;

        let response = server.post("/analyze/whatever-id").await;

        response.assert_status_ok();
        let body: AnalysisResponse = response.json();
        assert!(body.success);
        assert_eq!(body.analysis_id, "whatever-id");
        assert_eq!(body.results, MockBackend::canned_results());
    }

    #[tokio::test]
    async fn test_latency_observed_and_concurrent_requests_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = create_test_config(dir.path());
        config.analysis.backend = AnalysisBackendConfig::Mock {
            latency: Duration::from_millis(300),
        };
        let server = create_test_app(config).await;

        let start = Instant::now();
        let (a, b, c) = tokio::join!(
            server.post("/analyze/a").into_future(),
            server.post("/analyze/b").into_future(),
            server.post("/analyze/c").into_future(),
        );
        let elapsed = start.elapsed();

        a.assert_status_ok();
        b.assert_status_ok();
        c.assert_status_ok();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(900), "analyses did not overlap: {elapsed:?}");
    }

    #[tokio::test]
    async fn test_enforced_correlation_rejects_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = create_test_config(dir.path());
        config.analysis.correlation.enforce = true;
        let server = create_test_app(config).await;

        let response = server.post("/analyze/3c9a7e1e-6a0f-4c57-9d0b-2b8f7f3d9e11").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            response.json::<ErrorBody>().error,
            "Analysis 3c9a7e1e-6a0f-4c57-9d0b-2b8f7f3d9e11 not found"
        );

        server
            .post("/analyze/not-a-uuid")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_enforced_correlation_accepts_issued_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = create_test_config(dir.path());
        config.analysis.correlation.enforce = true;
        let server = create_test_app(config).await;

        let upload: UploadResponse = server
            .post("/upload")
            .multipart(MultipartForm::new().add_part("file", Part::bytes(b"img".to_vec()).file_name("me.png")))
            .await
            .json();

        let response = server.post(&format!("/analyze/{}", upload.analysis_id)).await;
        response.assert_status_ok();
        assert_eq!(response.json::<AnalysisResponse>().analysis_id, upload.analysis_id.to_string());

        // Once the stored file is gone the id no longer resolves
        std::fs::remove_file(dir.path().join(&upload.filename)).unwrap();
        server
            .post(&format!("/analyze/{}", upload.analysis_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

//! Upload intake endpoint.

use axum::{
    Json,
    body::HttpBody,
    extract::{
        FromRequest, Multipart, Request, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header::CONTENT_LENGTH},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::uploads::UploadResponse,
    errors::{Error, ErrorBody, Result},
    intake::Upload,
    metrics,
};

/// Form field carrying the image
const FILE_FIELD: &str = "file";

#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    summary = "Upload a photo",
    description = "Upload a photo for style analysis as the `file` field of a multipart form.

Only `png`, `jpg` and `jpeg` files are accepted by default, and the whole request must fit in the
configured size limit (10 MiB by default). The response carries the stored filename and an
`analysis_id` to pass to `/analyze/{analysis_id}`.",
    request_body(
        content_type = "multipart/form-data",
        description = "Multipart form with a `file` part"
    ),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "No file part, no selected file, or file type not allowed", body = ErrorBody),
        (status = 413, description = "Request exceeds the upload size limit", body = ErrorBody),
        (status = 429, description = "Too many uploads in progress", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn upload(State(state): State<AppState>, request: Request) -> Result<Json<UploadResponse>> {
    let body_len = declared_body_len(&request);
    let multipart = Multipart::from_request(request, &state).await;
    let result = accept_upload(&state, multipart, body_len).await;
    metrics::record_upload(metrics::upload_outcome(&result));
    result.map(Json)
}

/// Body length from `Content-Length`, or from the body itself when its size is known up front.
fn declared_body_len(request: &Request) -> Option<u64> {
    request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .or_else(|| request.body().size_hint().exact())
}

async fn accept_upload(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
    body_len: Option<u64>,
) -> Result<UploadResponse> {
    let max_request_size = state.config.uploads.max_request_size;
    // Hold the slot until the file is on disk
    let _permit = match &state.limiters.uploads {
        Some(limiter) => Some(limiter.acquire().await?),
        None => None,
    };

    let upload = match multipart {
        Ok(multipart) => read_file_part(multipart, max_request_size).await?,
        Err(rejection) => {
            // The body is never read here, so the size limit is checked against its declared length
            if body_len.is_some_and(|len| len > max_request_size) {
                return Err(payload_too_large(max_request_size));
            }
            // Not a multipart body at all, so there is no file part
            tracing::debug!("Upload without multipart body: {}", rejection.body_text());
            None
        }
    };

    let submission = state.intake.submit(upload).await?;
    Ok(submission.into())
}

/// Read the whole form and return the first `file` part that carries a filename.
///
/// Every field is consumed so the body limit applies to the complete request before any file
/// is validated or stored.
async fn read_file_part(mut multipart: Multipart, max_request_size: u64) -> Result<Option<Upload>> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_request_size))?
    {
        if upload.is_some() || field.name() != Some(FILE_FIELD) {
            continue;
        }
        // Without a filename attribute the part is an ordinary form value
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field.bytes().await.map_err(|e| multipart_error(e, max_request_size))?;
        tracing::debug!(filename = %filename, bytes = data.len(), "Read file part");
        upload = Some(Upload { filename, data });
    }

    Ok(upload)
}

fn multipart_error(err: MultipartError, max_request_size: u64) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        payload_too_large(max_request_size)
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", err.body_text()),
        }
    }
}

fn payload_too_large(max_request_size: u64) -> Error {
    Error::PayloadTooLarge {
        message: format!(
            "Request exceeds the maximum upload size of {} bytes ({} MB)",
            max_request_size,
            max_request_size / (1024 * 1024)
        ),
    }
}

//! HTTP handlers for the landing page and embedded assets.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Response, Uri, header},
    response::{Html, IntoResponse},
};
use tracing::instrument;

use crate::{
    AppState,
    errors::{Error, Result},
    static_assets,
};

/// Serve the landing page
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let page = static_assets::render_landing_page(&state.config.metadata.title)?;
    Ok(Html(page))
}

/// Serve an embedded file from under `/static/`
#[instrument]
pub async fn serve_embedded_asset(Path(path): Path<String>) -> Result<impl IntoResponse> {
    let content = static_assets::Assets::get(&path).ok_or_else(|| Error::NotFound {
        resource: "Asset".to_string(),
        id: path.clone(),
    })?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(content.data.into_owned()))
        .map_err(|e| Error::from(anyhow::Error::new(e).context("failed to build asset response")))
}

/// JSON 404 for unmatched routes
#[instrument]
pub async fn not_found(uri: Uri) -> Error {
    Error::NotFound {
        resource: "Route".to_string(),
        id: uri.path().to_string(),
    }
}

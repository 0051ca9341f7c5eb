//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! - **Uploads** (`POST /upload`): photo intake
//! - **Analysis** (`POST /analyze/{analysis_id}`): style analysis of an upload
//! - **Recommendations** (`POST /recommendations`): outfit suggestions
//! - **Rules** (`POST /rules`, `GET /rules/{user_id}`): fashion rules
//!
//! Every error is returned as `{"error": "<message>"}`. The OpenAPI document is served at
//! `/api-docs/openapi.json` and rendered at `/docs`.

pub mod handlers;
pub mod models;

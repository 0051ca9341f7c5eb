//! API request and response data models.
//!
//! These structures define the JSON contract of the public endpoints and are annotated with
//! `utoipa` for the generated OpenAPI document. Request bodies are deliberately permissive:
//! every field is optional and unknown fields are ignored.

pub mod analysis;
pub mod recommendations;
pub mod rules;
pub mod uploads;

//! Analysis backend abstraction layer
//!
//! This module defines the `AnalysisBackend` trait which abstracts the style analysis step
//! behind `/analyze/{analysis_id}`. The only backend today is [`mock::MockBackend`], which waits
//! a fixed latency and returns a canned result; a real inference backend plugs in here without
//! touching the HTTP layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::AnalysisBackendConfig;
use crate::errors::Result;

mod correlation;
pub mod mock;

pub use correlation::Correlations;

/// Create an analysis backend from configuration
///
/// Adding a new backend requires adding a match arm here.
pub fn create_backend(config: &AnalysisBackendConfig) -> Box<dyn AnalysisBackend> {
    match config {
        AnalysisBackendConfig::Mock { latency } => Box::new(mock::MockBackend::new(*latency)),
    }
}

/// Style analysis of an uploaded photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResults {
    #[schema(example = "hourglass")]
    pub body_type: String,
    #[schema(example = json!(["warm", "autumn"]))]
    pub color_palette: Vec<String>,
    #[schema(example = json!(["casual", "bohemian", "business casual"]))]
    pub recommended_styles: Vec<String>,
    #[schema(example = "M")]
    pub size_recommendation: String,
}

/// Abstract analysis backend interface
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Short name used in logs and metrics
    fn name(&self) -> &'static str;

    /// Analyze the upload behind `analysis_id`.
    ///
    /// `stored_filename` is only known when identifier correlation is enforced; otherwise the
    /// backend receives `None` and must cope with an unverified identifier.
    async fn analyze(&self, analysis_id: &str, stored_filename: Option<&str>) -> Result<AnalysisResults>;
}

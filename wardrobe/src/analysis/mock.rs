//! Mock analysis backend
//!
//! Sleeps for a configured latency (without blocking the runtime) and returns the same
//! result for every identifier. Useful for demos and frontend development.

use async_trait::async_trait;
use std::time::Duration;

use super::{AnalysisBackend, AnalysisResults};
use crate::errors::Result;

pub struct MockBackend {
    latency: Duration,
}

impl MockBackend {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// The canned result every analysis resolves to
    pub fn canned_results() -> AnalysisResults {
        AnalysisResults {
            body_type: "hourglass".to_string(),
            color_palette: vec!["warm".to_string(), "autumn".to_string()],
            recommended_styles: vec!["casual".to_string(), "bohemian".to_string(), "business casual".to_string()],
            size_recommendation: "M".to_string(),
        }
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn analyze(&self, analysis_id: &str, stored_filename: Option<&str>) -> Result<AnalysisResults> {
        tracing::debug!(
            analysis_id,
            stored_filename,
            latency_ms = self.latency.as_millis() as u64,
            "Simulating analysis"
        );
        tokio::time::sleep(self.latency).await;
        Ok(Self::canned_results())
    }
}

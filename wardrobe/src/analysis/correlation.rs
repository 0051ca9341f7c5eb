//! Bounded, expiring record of issued analysis identifiers.
//!
//! Only used when `analysis.correlation.enforce` is set. Entries map the analysis id returned by
//! an upload to the stored filename it was issued for.

use moka::future::Cache;
use std::time::Duration;
use uuid::Uuid;

use crate::config::CorrelationConfig;
use crate::errors::{Error, Result};
use crate::storage::FileStorage;
use crate::types::AnalysisId;

#[derive(Clone)]
pub struct Correlations {
    issued: Cache<AnalysisId, String>,
}

impl Correlations {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            issued: Cache::builder().max_capacity(max_entries).time_to_live(ttl).build(),
        }
    }

    /// `None` unless enforcement is switched on.
    pub fn from_config(config: &CorrelationConfig) -> Option<Self> {
        config.enforce.then(|| Self::new(config.max_entries, config.ttl))
    }

    pub async fn record(&self, analysis_id: AnalysisId, stored_filename: String) {
        self.issued.insert(analysis_id, stored_filename).await;
    }

    pub async fn get(&self, analysis_id: &AnalysisId) -> Option<String> {
        self.issued.get(analysis_id).await
    }

    /// Map a raw path identifier to the stored file it was issued for.
    ///
    /// Fails with `NotFound` when the id is malformed, was never issued, has expired, or its
    /// file is gone from storage.
    pub async fn resolve(&self, raw_id: &str, storage: &dyn FileStorage) -> Result<String> {
        let not_found = || Error::NotFound {
            resource: "Analysis".to_string(),
            id: raw_id.to_string(),
        };

        let analysis_id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
        let stored_filename = self.get(&analysis_id).await.ok_or_else(not_found)?;

        let present = storage
            .exists(&stored_filename)
            .await
            .map_err(|e| anyhow::Error::new(e).context("failed to check stored upload"))?;
        if !present {
            tracing::debug!(analysis_id = %analysis_id, stored_filename = %stored_filename, "Upload for issued analysis id is gone");
            return Err(not_found());
        }

        Ok(stored_filename)
    }
}

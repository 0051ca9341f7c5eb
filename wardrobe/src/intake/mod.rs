//! Upload intake: validation, naming and persistence of submitted images.
//!
//! [`IntakeService::submit`] is the only write path in the system. A submission is checked in a
//! fixed order (file part present, filename non-empty, extension allowed), then stored under
//! `<32 hex>_<sanitized name>` and answered with a fresh, independent analysis identifier.
//!
//! Request size is not checked here: the HTTP layer enforces the body limit while reading the
//! multipart stream, so oversized uploads never reach this module.

pub mod filename;

use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::analysis::Correlations;
use crate::config::UploadsConfig;
use crate::storage::{FileStorage, LocalFileStorage};
use crate::types::{AnalysisId, abbrev_uuid};

/// Client-correctable rejections plus storage failures.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("File type not allowed")]
    FileTypeNotAllowed,

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
}

/// Immutable intake settings, fixed at construction.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Lower-case extensions accepted without a leading dot
    pub allowed_extensions: Vec<String>,
}

impl From<&UploadsConfig> for IntakeConfig {
    fn from(config: &UploadsConfig) -> Self {
        Self {
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }
}

/// A file part as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename from the part's content disposition, possibly empty
    pub filename: String,
    pub data: Bytes,
}

/// Identifiers handed back for an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Name of the stored file inside the upload directory
    pub stored_filename: String,
    /// Correlation token for a later analysis call
    pub analysis_id: AnalysisId,
}

pub struct IntakeService {
    config: IntakeConfig,
    storage: Arc<dyn FileStorage>,
    correlations: Option<Correlations>,
}

impl IntakeService {
    pub fn new(config: IntakeConfig, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            config,
            storage,
            correlations: None,
        }
    }

    /// Record every issued analysis id so the analysis step can resolve it later.
    pub fn with_correlations(mut self, correlations: Correlations) -> Self {
        self.correlations = Some(correlations);
        self
    }

    /// Build the service on local disk, creating the upload directory if it does not exist.
    pub async fn open(config: &UploadsConfig) -> std::io::Result<Self> {
        let storage = LocalFileStorage::new(&config.directory);
        storage.prepare().await?;
        tracing::info!(directory = %config.directory.display(), "Upload directory ready");
        Ok(Self::new(IntakeConfig::from(config), Arc::new(storage)))
    }

    pub fn storage(&self) -> Arc<dyn FileStorage> {
        self.storage.clone()
    }

    /// Check a submission without touching storage. Returns the validated client filename.
    pub fn validate<'a>(&self, upload: Option<&'a Upload>) -> Result<&'a str, IntakeError> {
        let upload = upload.ok_or(IntakeError::MissingFile)?;
        if upload.filename.is_empty() {
            return Err(IntakeError::NoSelectedFile);
        }
        if !filename::is_allowed(&upload.filename, &self.config.allowed_extensions) {
            return Err(IntakeError::FileTypeNotAllowed);
        }
        Ok(&upload.filename)
    }

    /// Validate, name and persist an upload.
    #[instrument(skip_all)]
    pub async fn submit(&self, upload: Option<Upload>) -> Result<Submission, IntakeError> {
        let stored_filename = storage_name(self.validate(upload.as_ref())?);
        let data = upload.map(|u| u.data).unwrap_or_default();

        self.storage.store(&stored_filename, &data).await?;

        let analysis_id = Uuid::new_v4();
        if let Some(correlations) = &self.correlations {
            correlations.record(analysis_id, stored_filename.clone()).await;
        }

        tracing::info!(
            stored_filename = %stored_filename,
            bytes = data.len(),
            analysis_id = %abbrev_uuid(&analysis_id),
            "Upload accepted"
        );

        Ok(Submission {
            stored_filename,
            analysis_id,
        })
    }
}

/// `<random 32 hex>_<sanitized client name>`, falling back to `upload.<ext>` when sanitization
/// leaves nothing.
pub fn storage_name(client_name: &str) -> String {
    let token = Uuid::new_v4().simple();
    let sanitized = filename::sanitize(client_name);
    if sanitized.is_empty() {
        let ext = filename::extension(client_name).unwrap_or_default();
        format!("{token}_upload.{ext}")
    } else {
        format!("{token}_{sanitized}")
    }
}

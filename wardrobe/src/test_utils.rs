//! Helpers for HTTP-level tests.

use axum_test::TestServer;
use std::path::Path;
use std::time::Duration;

use crate::Application;
use crate::config::{AnalysisBackendConfig, Config, UploadsConfig};

/// Defaults with uploads going to `upload_dir`, a near-instant mock backend and metrics off.
pub fn create_test_config(upload_dir: &Path) -> Config {
    let mut config = Config {
        uploads: UploadsConfig {
            directory: upload_dir.to_path_buf(),
            ..Default::default()
        },
        enable_metrics: false,
        ..Default::default()
    };
    config.analysis.backend = AnalysisBackendConfig::Mock {
        latency: Duration::from_millis(10),
    };
    config
}

pub async fn create_test_application(config: Config) -> Application {
    Application::new(config).await.expect("Failed to create application")
}

pub async fn create_test_app(config: Config) -> TestServer {
    create_test_application(config).await.into_test_server()
}

/// Names of the files currently in `upload_dir`
pub fn stored_files(upload_dir: &Path) -> Vec<String> {
    std::fs::read_dir(upload_dir)
        .expect("upload directory should exist")
        .map(|entry| entry.expect("readable entry").file_name().to_string_lossy().into_owned())
        .collect()
}

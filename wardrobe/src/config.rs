//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `WARDROBE_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`, optional)
//! 2. **Environment variables** - Variables prefixed with `WARDROBE_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `WARDROBE_UPLOADS__DIRECTORY=/srv/uploads` sets the `uploads.directory` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use wardrobe::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! WARDROBE_PORT=8080
//! WARDROBE_UPLOADS__MAX_REQUEST_SIZE=20971520
//! WARDROBE_ANALYSIS__CORRELATION__ENFORCE=true
//! WARDROBE_LIMITS__UPLOADS__MAX_CONCURRENT=8
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "WARDROBE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults matching the demo deployment, so an empty (or missing)
/// config file yields a runnable server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Upload intake settings
    pub uploads: UploadsConfig,
    /// Analysis backend and identifier correlation
    pub analysis: AnalysisConfig,
    /// Resource limits for protecting system capacity
    pub limits: LimitsConfig,
    /// CORS settings for browser clients
    pub security: SecurityConfig,
    /// Landing page metadata
    pub metadata: Metadata,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Upload intake configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Directory where accepted uploads are written. Created at startup if absent.
    pub directory: PathBuf,
    /// Maximum size in bytes of an upload request body (default: 10 MiB)
    pub max_request_size: u64,
    /// Lower-case file extensions accepted by the intake service
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("uploads"),
            max_request_size: 10 * 1024 * 1024,
            allowed_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }
}

/// Analysis configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Which analysis backend serves `/analyze/{analysis_id}`
    pub backend: AnalysisBackendConfig,
    /// Optional linkage between issued analysis ids and stored uploads
    pub correlation: CorrelationConfig,
}

/// Analysis backend selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisBackendConfig {
    /// Fixed-latency backend returning a canned result
    Mock {
        /// Simulated processing time (default: 2s)
        #[serde(with = "humantime_serde", default = "default_mock_latency")]
        latency: Duration,
    },
}

fn default_mock_latency() -> Duration {
    Duration::from_secs(2)
}

impl Default for AnalysisBackendConfig {
    fn default() -> Self {
        AnalysisBackendConfig::Mock {
            latency: default_mock_latency(),
        }
    }
}

/// Correlation between upload and analysis identifiers.
///
/// Disabled by default: the analysis endpoint then accepts any identifier.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorrelationConfig {
    /// Reject analysis ids that were never issued by an upload
    pub enforce: bool,
    /// Maximum number of issued ids remembered at once
    pub max_entries: u64,
    /// How long an issued id stays valid
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            enforce: false,
            max_entries: 10_000,
            ttl: Duration::from_secs(60 * 60),
        }
    }
}

/// Resource limits for protecting system capacity.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Upload concurrency limits
    pub uploads: UploadLimitsConfig,
}

/// Upload concurrency configuration.
///
/// Uploads beyond the concurrency limit wait in a bounded queue; when the queue is full or
/// the wait times out, the request receives HTTP 429.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadLimitsConfig {
    /// Maximum number of concurrent uploads. 0 = unlimited.
    pub max_concurrent: usize,
    /// Maximum number of uploads waiting for a slot. 0 = unlimited.
    pub max_waiting: usize,
    /// Maximum time to wait for an upload slot. Zero rejects immediately.
    #[serde(with = "humantime_serde")]
    pub max_wait: Duration,
}

impl Default for UploadLimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 0,
            max_waiting: 20,
            max_wait: Duration::from_secs(60),
        }
    }
}

/// Security configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: Some(3600),
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

/// Metadata rendered into the landing page.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Metadata {
    /// Page title
    pub title: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: "Wardrobe - AI Outfit Recommendations".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            uploads: UploadsConfig::default(),
            analysis: AnalysisConfig::default(),
            limits: LimitsConfig::default(),
            security: SecurityConfig::default(),
            metadata: Metadata::default(),
            enable_metrics: true,
            enable_otel_export: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.uploads.directory.as_os_str().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: uploads.directory must not be empty".to_string(),
            });
        }

        if self.uploads.max_request_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_request_size must be greater than 0".to_string(),
            });
        }

        if usize::try_from(self.uploads.max_request_size).is_err() {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: uploads.max_request_size ({}) does not fit in memory on this platform",
                    self.uploads.max_request_size
                ),
            });
        }

        if self.uploads.allowed_extensions.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: uploads.allowed_extensions must list at least one extension".to_string(),
            });
        }

        for ext in &self.uploads.allowed_extensions {
            let canonical = ext.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
            if ext.is_empty() || !canonical {
                return Err(Error::Internal {
                    operation: format!(
                        "Config validation: invalid extension '{ext}' in uploads.allowed_extensions \
                         (use lower-case alphanumerics without a leading dot, e.g. 'png')"
                    ),
                });
            }
        }

        let wildcard_origin = self
            .security
            .cors
            .allowed_origins
            .iter()
            .any(|origin| matches!(origin, CorsOrigin::Wildcard));
        if wildcard_origin && self.security.cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: security.cors.allow_credentials cannot be combined with a '*' origin".to_string(),
            });
        }

        if self.analysis.correlation.enforce {
            if self.analysis.correlation.max_entries == 0 {
                return Err(Error::Internal {
                    operation: "Config validation: analysis.correlation.max_entries must be greater than 0 when enforce is true"
                        .to_string(),
                });
            }
            if self.analysis.correlation.ttl.is_zero() {
                return Err(Error::Internal {
                    operation: "Config validation: analysis.correlation.ttl must be greater than 0 when enforce is true".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // WARDROBE_CONFIG selects the file itself and is not a config key
            .merge(Env::prefixed("WARDROBE_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_match_demo_deployment() {
        let config = Config::default();

        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.uploads.directory, PathBuf::from("uploads"));
        assert_eq!(config.uploads.max_request_size, 10 * 1024 * 1024);
        assert_eq!(config.uploads.allowed_extensions, vec!["png", "jpg", "jpeg"]);
        assert!(!config.analysis.correlation.enforce);
        match config.analysis.backend {
            AnalysisBackendConfig::Mock { latency } => assert_eq!(latency, Duration::from_secs(2)),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args("does-not-exist.yaml"))?;
            assert_eq!(config.port, 5000);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 8080
uploads:
  directory: /srv/wardrobe/uploads
  allowed_extensions: [png, webp]
analysis:
  backend:
    type: mock
    latency: 250ms
  correlation:
    enforce: true
    ttl: 10m
limits:
  uploads:
    max_concurrent: 4
    max_wait: 5s
security:
  cors:
    allowed_origins:
      - "*"
      - https://shop.example.com
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.port, 8080);
            assert_eq!(config.uploads.directory, PathBuf::from("/srv/wardrobe/uploads"));
            assert_eq!(config.uploads.allowed_extensions, vec!["png", "webp"]);
            // untouched values keep their defaults
            assert_eq!(config.uploads.max_request_size, 10 * 1024 * 1024);

            match config.analysis.backend {
                AnalysisBackendConfig::Mock { latency } => assert_eq!(latency, Duration::from_millis(250)),
            }
            assert!(config.analysis.correlation.enforce);
            assert_eq!(config.analysis.correlation.ttl, Duration::from_secs(600));
            assert_eq!(config.analysis.correlation.max_entries, 10_000);

            assert_eq!(config.limits.uploads.max_concurrent, 4);
            assert_eq!(config.limits.uploads.max_waiting, 20);
            assert_eq!(config.limits.uploads.max_wait, Duration::from_secs(5));

            assert_eq!(config.security.cors.allowed_origins.len(), 2);
            assert!(matches!(config.security.cors.allowed_origins[0], CorsOrigin::Wildcard));
            match &config.security.cors.allowed_origins[1] {
                CorsOrigin::Url(url) => assert_eq!(url.as_str(), "https://shop.example.com/"),
                other => panic!("Expected URL origin, got {other:?}"),
            }

            Ok(())
        });
    }

    #[test]
    fn test_mock_latency_defaults_when_omitted() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
analysis:
  backend:
    type: mock
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;
            match config.analysis.backend {
                AnalysisBackendConfig::Mock { latency } => assert_eq!(latency, Duration::from_secs(2)),
            }
            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "port: 7000\n")?;

            jail.set_env("WARDROBE_HOST", "0.0.0.0");
            jail.set_env("WARDROBE_PORT", "9090");
            jail.set_env("WARDROBE_UPLOADS__MAX_REQUEST_SIZE", "1024");
            jail.set_env("WARDROBE_ANALYSIS__CORRELATION__ENFORCE", "true");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 9090);
            assert_eq!(config.uploads.max_request_size, 1024);
            assert!(config.analysis.correlation.enforce);

            Ok(())
        });
    }

    #[test]
    fn test_unknown_field_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
uploads:
  max_file_size: 10
"#,
            )?;

            assert!(Config::load(&args("test.yaml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_validation_empty_allow_list() {
        let mut config = Config::default();
        config.uploads.allowed_extensions.clear();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("allowed_extensions"));
    }

    #[test]
    fn test_validation_rejects_dotted_or_uppercase_extensions() {
        let mut config = Config::default();
        config.uploads.allowed_extensions = vec![".png".to_string()];
        assert!(config.validate().is_err());

        config.uploads.allowed_extensions = vec!["PNG".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_request_size() {
        let mut config = Config::default();
        config.uploads.max_request_size = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_request_size"));
    }

    #[test]
    fn test_validation_empty_directory() {
        let mut config = Config::default();
        config.uploads.directory = PathBuf::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_wildcard_with_credentials() {
        let mut config = Config::default();
        config.security.cors.allow_credentials = true;
        assert!(config.validate().is_err());

        config.security.cors.allowed_origins = vec![CorsOrigin::Url(Url::parse("https://shop.example.com").unwrap())];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_env_var_is_not_a_config_key() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "port: 5000\n")?;
            jail.set_env("WARDROBE_CONFIG", "test.yaml");

            assert!(Config::load(&args("test.yaml")).is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_correlation_bounds_only_checked_when_enforced() {
        let mut config = Config::default();
        config.analysis.correlation.max_entries = 0;
        assert!(config.validate().is_ok());

        config.analysis.correlation.enforce = true;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_entries"));

        config.analysis.correlation.max_entries = 10;
        config.analysis.correlation.ttl = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ttl"));
    }
}

//! # wardrobe: outfit recommendation backend
//!
//! `wardrobe` accepts photo uploads, runs a (currently simulated) style analysis on them, and
//! serves outfit recommendations and user-defined fashion rules over a small JSON API.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). There is no database:
//! accepted uploads are written to a local directory, and everything else the API returns is
//! either computed per request or fixed.
//!
//! The **intake service** ([`intake`]) is the only write path. It validates a submission,
//! stores the file under a collision-resistant name through a [`storage::FileStorage`] backend,
//! and issues an analysis identifier.
//!
//! The **analysis layer** ([`analysis`]) hides style analysis behind the
//! [`analysis::AnalysisBackend`] trait. The configured mock backend waits a fixed latency and
//! returns a canned result. Optionally, issued identifiers are tracked so that analysis only
//! accepts ids that came from a real upload.
//!
//! The **catalog** ([`catalog`]) holds the fixed recommendations and fashion rules.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use wardrobe::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = wardrobe::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     wardrobe::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod analysis;
pub mod api;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod intake;
mod limits;
mod metrics;
mod openapi;
mod static_assets;
pub mod storage;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test_utils;

use crate::{
    analysis::{AnalysisBackend, Correlations},
    config::CorsOrigin,
    intake::IntakeService,
    limits::Limiters,
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{self, HeaderValue, Method},
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// Everything in here is immutable after startup; the only mutable pieces (the correlation
/// cache and the limiter queues) synchronize internally.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .intake(intake)
///     .analysis(backend)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub intake: Arc<IntakeService>,
    pub analysis: Arc<dyn AnalysisBackend>,
    /// Present only when `analysis.correlation.enforce` is set
    pub correlations: Option<Correlations>,
    #[builder(default)]
    pub limiters: Limiters,
}

impl AppState {
    /// Build the state from configuration, preparing the upload directory.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let correlations = Correlations::from_config(&config.analysis.correlation);

        let mut intake = IntakeService::open(&config.uploads).await.map_err(|e| {
            anyhow::anyhow!(
                "Failed to prepare upload directory {}: {}",
                config.uploads.directory.display(),
                e
            )
        })?;
        if let Some(correlations) = &correlations {
            intake = intake.with_correlations(correlations.clone());
        }

        let analysis: Arc<dyn AnalysisBackend> = Arc::from(analysis::create_backend(&config.analysis.backend));
        info!(backend = analysis.name(), enforce_correlation = correlations.is_some(), "Analysis backend ready");

        Ok(Self::builder()
            .limiters(Limiters::new(&config.limits))
            .intake(Arc::new(intake))
            .analysis(analysis)
            .maybe_correlations(correlations)
            .config(config)
            .build())
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.security.cors;

    // tower-http refuses "*" inside an origin list, so a wildcard anywhere means any origin
    let allow_origin = if cors_config
        .allowed_origins
        .iter()
        .any(|origin| matches!(origin, CorsOrigin::Wildcard))
    {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// Returns an error if the CORS configuration cannot be turned into header values.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let max_request_size = usize::try_from(state.config.uploads.max_request_size)?;

    let mut router = Router::new()
        .route("/", get(api::handlers::static_assets::index))
        .route(
            "/upload",
            post(api::handlers::uploads::upload).layer(DefaultBodyLimit::max(max_request_size)),
        )
        .route("/analyze/{analysis_id}", post(api::handlers::analysis::analyze))
        .route("/recommendations", post(api::handlers::recommendations::get_recommendations))
        .route("/rules", post(api::handlers::rules::create_rule))
        .route("/rules/{user_id}", get(api::handlers::rules::list_rules))
        .route("/static/{*path}", get(api::handlers::static_assets::serve_embedded_asset))
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .fallback(api::handlers::static_assets::not_found);

    if state.config.enable_metrics {
        let metric_handle = metrics::prometheus_handle();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(PrometheusMetricLayer::new());
    }

    let router = router.layer(create_cors_layer(&state.config)?).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled service.
///
/// 1. **Create**: [`Application::new`] prepares the upload directory, selects the analysis
///    backend and builds the router
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    state: AppState,
    config: Config,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting wardrobe with configuration: {:#?}", config);

        let state = AppState::from_config(config.clone()).await?;
        let router = build_router(state.clone())?;

        Ok(Self { router, state, config })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Wardrobe listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

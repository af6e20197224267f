//! Climate Observation API Server
//!
//! Read-only JSON endpoints over daily precipitation and temperature
//! observations.

use axum::{routing::get, Router};
use climate_storage::ClimateRepository;
use metrics_exporter_prometheus::PrometheusHandle;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
mod error;
pub mod metrics;
mod routes;

pub use config::{LoggingConfig, Settings};
pub use error::{ApiError, ErrorBody};
pub use routes::health::HealthResponse;
pub use routes::home::HELP_TEXT;

/// Application state shared across handlers
pub struct AppState {
    /// Observation store handle
    pub repository: ClimateRepository,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus handle, if the exporter is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(repository: ClimateRepository) -> Self {
        Self {
            repository,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Serve `/metrics` from `handle`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::home::index))
        .route("/api/v1.0/precipitation", get(routes::precipitation::get_precipitation))
        .route("/api/v1.0/stations", get(routes::stations::get_stations))
        .route("/api/v1.0/tobs", get(routes::temperature::get_tobs))
        .route("/api/v1.0/date/:start", get(routes::temperature::get_stats_since))
        .route("/api/v1.0/date/:start/:end", get(routes::temperature::get_stats_between))
        .route("/api/v1.0/health", get(routes::health::get_health))
        .route("/metrics", get(routes::health::get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}

/// Serve `state` on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    info!("Starting API server on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Connect to the store, verify its schema and run the server until Ctrl-C
pub async fn run_server(
    settings: Settings,
    metrics: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    let repository = ClimateRepository::connect(&settings.database).await?;
    repository.verify_schema().await?;

    let mut state = AppState::new(repository.clone());
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }

    let listener = TcpListener::bind(&settings.server.bind_addr).await?;
    serve(listener, Arc::new(state), shutdown_signal()).await?;

    repository.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::NaiveDate;
    use climate_storage::fixtures::{self, daily_series};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 2017-01-01..=2017-01-10 with temperatures 50..=59
    async fn ten_day_app() -> Router {
        let repo = fixtures::seeded_repository(&daily_series("USC00519281", date(2017, 1, 1), 50..60))
            .await
            .unwrap();
        create_router(Arc::new(AppState::new(repo)))
    }

    async fn empty_app() -> Router {
        let repo = fixtures::memory_repository().await.unwrap();
        create_router(Arc::new(AppState::new(repo)))
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_index_lists_routes() {
        let response = ten_day_app()
            .await
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        for route in ["/api/v1.0/precipitation", "/api/v1.0/stations", "/api/v1.0/tobs"] {
            assert!(body.contains(route), "missing {route}");
        }
    }

    #[tokio::test]
    async fn test_stats_since_start() {
        let (status, body) = fetch(ten_day_app().await, "/api/v1.0/date/2017-01-05").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"min_temp":54,"max_temp":59,"avg_temp":56.5}"#);
    }

    #[tokio::test]
    async fn test_stats_between_dates() {
        let (status, body) = fetch(ten_day_app().await, "/api/v1.0/date/2017-01-01/2017-01-03").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"min_temp":50,"max_temp":52,"avg_temp":51.0}"#);
    }

    #[tokio::test]
    async fn test_stats_without_matches_are_null() {
        let (status, body) = fetch(ten_day_app().await, "/api/v1.0/date/2020-01-01").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, json!({"min_temp": null, "max_temp": null, "avg_temp": null}));
    }

    #[tokio::test]
    async fn test_bad_date_is_bad_request() {
        let (status, body) = fetch(ten_day_app().await, "/api/v1.0/date/2017-02-30").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("2017-02-30"));

        let (status, _) = fetch(ten_day_app().await, "/api/v1.0/date/2017-01-01/later").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = fetch(ten_day_app().await, "/api/v1.0/date/+2017-01-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_precipitation_shape() {
        let (status, body) = fetch(ten_day_app().await, "/api/v1.0/precipitation").await;

        assert_eq!(status, StatusCode::OK);
        let value: Vec<Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(value.len(), 10);
        assert!(value
            .iter()
            .all(|v| v["date"].is_string() && v["precipitation"].is_number()));
    }

    #[tokio::test]
    async fn test_stations_and_tobs() {
        let (status, body) = fetch(ten_day_app().await, "/api/v1.0/stations").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"["USC00519281"]"#);

        let (status, body) = fetch(ten_day_app().await, "/api/v1.0/tobs").await;
        assert_eq!(status, StatusCode::OK);
        let readings: Vec<Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(readings.len(), 10);
        assert!(readings.contains(&json!({"date": "2017-01-10", "temperature": 59})));
    }

    #[tokio::test]
    async fn test_empty_store_is_not_found() {
        let (status, body) = fetch(empty_app().await, "/api/v1.0/precipitation").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert!(value["error"].as_str().unwrap().contains("No data available"));

        let (status, _) = fetch(empty_app().await, "/api/v1.0/tobs").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = fetch(empty_app().await, "/api/v1.0/stations").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_health_reports_database() {
        let (status, body) = fetch(ten_day_app().await, "/api/v1.0/health").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["database"], "ok");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_metrics_disabled_is_not_found() {
        let (status, _) = fetch(ten_day_app().await, "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = fetch(ten_day_app().await, "/api/v1.0/forecast").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

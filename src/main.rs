// Main entry point for the lens annotation backend

use lens_server::{
    core::types::{ErrorBody, GenerateRequest, GenerateResponse, ObjectRequest, ObjectResponse},
    orchestration::ObjectPipeline,
    utils::Metrics,
    Config, PipelineError,
};

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    pipeline: Arc<ObjectPipeline>,
    metrics: Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::new().expect("Failed to load configuration"));

    // Initialize logging
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(format!(
        "lens_server={},ort=off",
        match config.log_level() {
            tracing::Level::TRACE => "trace",
            tracing::Level::DEBUG => "debug",
            tracing::Level::INFO => "info",
            tracing::Level::WARN => "warn",
            tracing::Level::ERROR => "error",
        }
    ));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("=== LENS ANNOTATION BACKEND ===");

    // Initialize metrics
    let metrics = Metrics::new();

    // Initialize the pipeline (facts + overlay clients, storage dirs)
    info!("Initializing object pipeline...");
    let pipeline = Arc::new(ObjectPipeline::new(config.clone(), metrics.clone())?);
    let state = AppState {
        pipeline: pipeline.clone(),
        metrics,
    };

    // Setup CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Create router with monitoring endpoints and static mounts
    let app = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/stats", get(stats_endpoint))
        .route("/api/objects", post(process_object))
        .route("/generate", post(generate))
        .nest_service(
            "/uploads",
            ServeDir::new(pipeline.storage().upload_dir().to_path_buf()),
        )
        .nest_service(
            "/outputs",
            ServeDir::new(pipeline.storage().output_dir().to_path_buf()),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024)) // 25MB for base64 uploads
        .layer(cors);

    let addr = format!("{}:{}", config.server_host(), config.server_port());
    info!("{}", "=".repeat(70));
    info!("Server starting on http://{}", addr);
    info!("{}", "-".repeat(70));
    info!("Endpoints:");
    info!("  GET  /             - Root endpoint");
    info!("  GET  /api/health   - Health check");
    info!("  GET  /metrics      - Prometheus metrics");
    info!("  GET  /stats        - Detailed statistics");
    info!("  POST /api/objects  - Annotate an uploaded object photo");
    info!("  POST /generate     - Re-annotate a previously uploaded photo");
    info!("  GET  /uploads/*    - Uploaded images");
    info!("  GET  /outputs/*    - Generated overlays");
    info!("{}", "=".repeat(70));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> &'static str {
    "Lens Annotation Backend"
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.metrics.record_endpoint_request("/api/health");
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Prometheus metrics endpoint
async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}

/// Detailed statistics endpoint (JSON)
async fn stats_endpoint(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let snapshot = state.metrics.snapshot();
    serde_json::to_value(snapshot).map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to serialize metrics: {}", e),
        )
    })
}

/// Annotate an uploaded object photo
///
/// # Request: JSON
/// `{clientObjectId?, lensMode?, label|object, imageBase64}`
///
/// # Response:
/// `{clientObjectId, lensMode, equation, explanation, message, annotatedImageBase64}`
async fn process_object(
    State(state): State<AppState>,
    Json(request): Json<ObjectRequest>,
) -> Result<Json<ObjectResponse>, (StatusCode, Json<ErrorBody>)> {
    state.metrics.record_endpoint_request("/api/objects");
    info!("Received object request for '{}'", request.object_label());

    state
        .pipeline
        .process_object(&request)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Re-annotate a previously uploaded photo by object name
async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<ErrorBody>)> {
    state.metrics.record_endpoint_request("/generate");

    let object_name = request
        .object
        .as_deref()
        .unwrap_or("cup")
        .trim()
        .to_lowercase();

    state
        .pipeline
        .generate_from_existing(&object_name, request.lens_mode.as_deref())
        .await
        .map(Json)
        .map_err(error_response)
}

/// Map the pipeline error taxonomy onto HTTP statuses: caller mistakes and
/// unusable model content are 4xx, upstream/integration failures are 5xx.
fn error_response(err: PipelineError) -> (StatusCode, Json<ErrorBody>) {
    if err.is_not_found() {
        return (StatusCode::NOT_FOUND, Json(ErrorBody::new(err.to_string())));
    }
    if err.is_client_error() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(err.to_string())),
        );
    }

    error!("Object processing error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::with_details(
            "Failed to process object.",
            err.to_string(),
        )),
    )
}

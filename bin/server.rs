// ERP Finance - Web Server
// JSON API over the report menu

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{Local, NaiveDate};
use erp_finance::{render, ReportError, ReportKind, ReportOutput, Settings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Shared application state. Only the path is shared; every request opens
/// and releases its own store handle.
#[derive(Clone)]
struct AppState {
    db_path: Arc<PathBuf>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Menu entry response
#[derive(Serialize)]
struct MenuEntry {
    slug: &'static str,
    title: &'static str,
    heading: &'static str,
}

impl From<ReportKind> for MenuEntry {
    fn from(kind: ReportKind) -> Self {
        Self {
            slug: kind.slug(),
            title: kind.title(),
            heading: kind.heading(),
        }
    }
}

#[derive(Deserialize)]
struct ReportParams {
    today: Option<NaiveDate>,
}

struct ApiError(StatusCode, String);

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ApiResponse::<()>::err(self.1))).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/reports - The report menu
async fn list_reports() -> impl IntoResponse {
    let menu: Vec<MenuEntry> = ReportKind::ALL.into_iter().map(MenuEntry::from).collect();
    Json(ApiResponse::ok(menu))
}

/// GET /api/reports/:slug?today=YYYY-MM-DD - Render one report
async fn get_report(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ApiResponse<ReportOutput>>, ApiError> {
    let kind: ReportKind = slug.parse()?;
    let today = params.today.unwrap_or_else(|| Local::now().date_naive());
    let db_path = Arc::clone(&state.db_path);

    // The store is synchronous; keep it off the async workers.
    let output = tokio::task::spawn_blocking(move || render(&db_path, kind, today))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "report task panicked");
            ApiError(StatusCode::INTERNAL_SERVER_ERROR, "report task failed".to_string())
        })??;

    Ok(Json(ApiResponse::ok(output)))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env();

    if !settings.database_path.exists() {
        tracing::warn!(
            path = %settings.database_path.display(),
            "database not found; reports will fail until it exists"
        );
    }

    let state = AppState {
        db_path: Arc::new(settings.database_path.clone()),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/reports", get(list_reports))
        .route("/reports/:slug", get(get_report))
        .with_state(state);

    let app = Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(
        addr = %settings.bind_addr,
        db = %settings.database_path.display(),
        "server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

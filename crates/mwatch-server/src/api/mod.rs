mod entities;
mod export;
mod mentions;
mod scan;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use mwatch_collect::{ScanError, Scanner};
use mwatch_core::{AppConfig, CoreError};
use mwatch_db::{DbError, MentionStore, MAX_WINDOW_HOURS};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_secret, RateLimitState, RequestId, SharedSecret,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MentionStore>,
    pub scanner: Scanner,
    pub config: Arc<AppConfig>,
}

/// Bearer secrets for the write routes that trigger work.
#[derive(Debug, Clone)]
pub struct RouteSecrets {
    pub scan: SharedSecret,
    pub cron: SharedSecret,
}

impl RouteSecrets {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            scan: SharedSecret::new(config.scan_password.as_deref()),
            cron: SharedSecret::new(config.cron_secret.as_deref()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(50).clamp(1, 500)
}

/// A positive `hours` parameter, or the configured default window.
/// Trailing window for a read: zero falls back to `default`, anything past
/// [`MAX_WINDOW_HOURS`] is capped.
pub(super) fn window_hours(hours: Option<u32>, default: u32) -> u32 {
    hours
        .filter(|h| *h > 0)
        .unwrap_or(default)
        .min(MAX_WINDOW_HOURS)
}

pub(super) fn map_db_error(request_id: &str, error: &DbError) -> ApiError {
    match error {
        DbError::NotFound => ApiError::new(request_id, "not_found", "resource not found"),
        DbError::Validation(CoreError::DuplicateEntity { .. }) => {
            ApiError::new(request_id, "conflict", error.to_string())
        }
        DbError::Validation(e) => ApiError::new(request_id, "validation_error", e.to_string()),
        _ => {
            tracing::error!(error = %error, "store operation failed");
            ApiError::new(request_id, "internal_error", "store operation failed")
        }
    }
}

pub(super) fn map_scan_error(request_id: &str, error: &ScanError) -> ApiError {
    tracing::error!(error = %error, "scan failed");
    ApiError::new(request_id, "scan_failed", "scan failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn data_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/entities",
            get(entities::list_entities).post(entities::create_entity),
        )
        .route(
            "/api/v1/entities/{id}",
            patch(entities::update_entity).delete(entities::delete_entity),
        )
        .route("/api/v1/mentions", get(mentions::list_mentions))
        .route("/api/v1/insights", get(mentions::list_insights))
        .route("/api/v1/metrics", get(mentions::list_metrics))
        .route("/api/v1/scan/status", get(scan::scan_status))
        .route("/api/v1/export/csv", get(export::export_csv))
        .route("/api/v1/export/json", get(export::export_json))
        .route("/api/v1/debug/collectors", get(scan::debug_collectors))
}

fn guarded_router(secrets: RouteSecrets) -> Router<AppState> {
    let scan_routes = Router::new()
        .route("/api/v1/scan", post(scan::trigger_scan))
        .route("/api/v1/clear", post(scan::clear_mentions))
        .route_layer(axum::middleware::from_fn_with_state(
            secrets.scan,
            require_secret,
        ));
    let cron_routes = Router::new()
        .route("/api/v1/cron/scan", get(scan::cron_scan))
        .route_layer(axum::middleware::from_fn_with_state(
            secrets.cron,
            require_secret,
        ));
    scan_routes.merge(cron_routes)
}

pub fn build_app(state: AppState, secrets: RouteSecrets, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    let limited = data_router()
        .merge(guarded_router(secrets))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ));

    Router::new()
        .merge(public_routes)
        .merge(limited)
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            ApiResponse::new(
                req_id.0,
                HealthData {
                    status: "ok",
                    store: "ok",
                },
            ),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::new(
                    req_id.0,
                    HealthData {
                        status: "degraded",
                        store: "unavailable",
                    },
                ),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

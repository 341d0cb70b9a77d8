//! Scan triggers, status, clearing and collector diagnostics.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use mwatch_collect::{probe_sources, ProbeReport, ScanStatus};
use mwatch_core::ScanResult;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, map_scan_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(in crate::api) struct ScanStatusResponse {
    #[serde(flatten)]
    pub status: ScanStatus,
    pub last_scan: Option<DateTime<Utc>>,
    pub sources: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct ClearResponse {
    pub cleared: bool,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct DebugQuery {
    pub keyword: Option<String>,
}

async fn run_scan(state: &AppState, rid: &str) -> Result<ScanResult, ApiError> {
    state
        .scanner
        .run()
        .await
        .map_err(|e| map_scan_error(rid, &e))
}

/// POST /api/v1/scan
pub(in crate::api) async fn trigger_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ScanResult>>, ApiError> {
    tracing::info!(request_id = %req_id.0, "scan requested");
    let result = run_scan(&state, &req_id.0).await?;
    Ok(ApiResponse::new(req_id.0, result))
}

/// GET /api/v1/cron/scan
pub(in crate::api) async fn cron_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ScanResult>>, ApiError> {
    tracing::info!(request_id = %req_id.0, "cron scan triggered");
    let result = run_scan(&state, &req_id.0).await?;
    Ok(ApiResponse::new(req_id.0, result))
}

/// GET /api/v1/scan/status
pub(in crate::api) async fn scan_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ScanStatusResponse>>, ApiError> {
    let last_scan = state
        .store
        .get_last_scan()
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    let response = ScanStatusResponse {
        status: state.scanner.status().await,
        last_scan,
        sources: state.scanner.registry().names(),
    };
    Ok(ApiResponse::new(req_id.0, response))
}

/// POST /api/v1/clear: drop every mention and insight, keep entities.
pub(in crate::api) async fn clear_mentions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ClearResponse>>, ApiError> {
    state
        .store
        .clear_all_mentions()
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    tracing::info!(request_id = %req_id.0, "all mentions cleared");
    Ok(ApiResponse::new(req_id.0, ClearResponse { cleared: true }))
}

/// GET /api/v1/debug/collectors?keyword=...
pub(in crate::api) async fn debug_collectors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<DebugQuery>,
) -> Result<Json<ApiResponse<Vec<ProbeReport>>>, ApiError> {
    let keyword = params
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::new(&req_id.0, "validation_error", "keyword is required"))?
        .to_string();

    let reports = probe_sources(state.scanner.registry(), &keyword).await;
    Ok(ApiResponse::new(req_id.0, reports))
}

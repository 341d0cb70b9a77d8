use axum::{
    extract::{Query, State},
    Extension, Json,
};
use mwatch_core::{entity_metrics, CompanyInsight, EntityMetrics, Mention};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, window_hours, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct MentionsQuery {
    pub entity_id: Option<Uuid>,
    pub hours: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct InsightsQuery {
    pub entity_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct MetricsQuery {
    pub hours: Option<u32>,
}

/// GET /api/v1/mentions
///
/// Scoped to one entity when `entity_id` is given, otherwise every mention
/// published within `hours` (default: dashboard window).
pub(in crate::api) async fn list_mentions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<MentionsQuery>,
) -> Result<Json<ApiResponse<Vec<Mention>>>, ApiError> {
    let rid = &req_id.0;
    let limit = normalize_limit(params.limit);

    let mentions = if let Some(entity_id) = params.entity_id {
        state.store.get_mentions_by_entity(entity_id, limit).await
    } else {
        let hours = window_hours(params.hours, state.config.dashboard_window_hours);
        state.store.get_recent_mentions(hours).await.map(|mut all| {
            all.truncate(limit);
            all
        })
    }
    .map_err(|e| map_db_error(rid, &e))?;

    Ok(ApiResponse::new(req_id.0, mentions))
}

/// GET /api/v1/insights
pub(in crate::api) async fn list_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<InsightsQuery>,
) -> Result<Json<ApiResponse<Vec<CompanyInsight>>>, ApiError> {
    let rid = &req_id.0;

    let insights = if let Some(entity_id) = params.entity_id {
        state
            .store
            .get_insights_by_company(entity_id)
            .await
            .map_err(|e| map_db_error(rid, &e))?
    } else {
        let entities = state
            .store
            .get_all_entities()
            .await
            .map_err(|e| map_db_error(rid, &e))?;
        let mut all = Vec::new();
        for entity in entities.iter().filter(|e| e.is_company()) {
            let found = state
                .store
                .get_insights_by_company(entity.id)
                .await
                .map_err(|e| map_db_error(rid, &e))?;
            all.extend(found);
        }
        all
    };

    Ok(ApiResponse::new(req_id.0, insights))
}

/// GET /api/v1/metrics: sentiment and platform breakdown per entity.
pub(in crate::api) async fn list_metrics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<MetricsQuery>,
) -> Result<Json<ApiResponse<Vec<EntityMetrics>>>, ApiError> {
    let rid = &req_id.0;
    let hours = window_hours(params.hours, state.config.dashboard_window_hours);

    let entities = state
        .store
        .get_all_entities()
        .await
        .map_err(|e| map_db_error(rid, &e))?;
    let recent = state
        .store
        .get_recent_mentions(hours)
        .await
        .map_err(|e| map_db_error(rid, &e))?;

    let metrics = entities
        .iter()
        .map(|entity| {
            let own: Vec<Mention> = recent
                .iter()
                .filter(|m| m.entity_id == entity.id)
                .cloned()
                .collect();
            entity_metrics(entity, &own)
        })
        .collect();

    Ok(ApiResponse::new(req_id.0, metrics))
}

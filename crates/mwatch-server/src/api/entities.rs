//! Entity handlers: list, create, enable/disable, delete.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use mwatch_core::{Entity, NewEntity};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Both fields are optional at the serde level so missing values surface as
/// validation errors rather than JSON rejections.
#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateEntityRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct UpdateEntityRequest {
    pub enabled: bool,
}

#[derive(Debug, serde::Serialize)]
pub(in crate::api) struct DeletedEntity {
    pub id: Uuid,
    pub deleted: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/entities
pub(in crate::api) async fn list_entities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Entity>>>, ApiError> {
    let entities = state
        .store
        .get_all_entities()
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(ApiResponse::new(req_id.0, entities))
}

/// POST /api/v1/entities
pub(in crate::api) async fn create_entity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateEntityRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Entity>>), ApiError> {
    let rid = &req_id.0;
    let input = NewEntity::parse(body.name.as_deref(), body.entity_type.as_deref())
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;

    let entity = state
        .store
        .create_entity(input)
        .await
        .map_err(|e| map_db_error(rid, &e))?;

    tracing::info!(id = %entity.id, name = %entity.name, kind = %entity.entity_type, "entity created");
    Ok((StatusCode::CREATED, ApiResponse::new(req_id.0, entity)))
}

/// PATCH /api/v1/entities/{id}
pub(in crate::api) async fn update_entity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEntityRequest>,
) -> Result<Json<ApiResponse<Entity>>, ApiError> {
    let entity = state
        .store
        .set_entity_enabled(id, body.enabled)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(ApiResponse::new(req_id.0, entity))
}

/// DELETE /api/v1/entities/{id}: removes the entity with its mentions and
/// insights.
pub(in crate::api) async fn delete_entity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedEntity>>, ApiError> {
    state
        .store
        .delete_entity(id)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    tracing::info!(%id, "entity deleted");
    Ok(ApiResponse::new(req_id.0, DeletedEntity { id, deleted: true }))
}

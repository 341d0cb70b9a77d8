//! CSV and JSON export downloads.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;
use mwatch_core::{mentions_to_csv, ExportBundle, Mention};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

/// Upper bound on mentions exported for a single entity.
const ENTITY_EXPORT_LIMIT: usize = 10_000;

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ExportQuery {
    pub entity_id: Option<Uuid>,
    pub hours: Option<u32>,
}

async fn load_mentions(
    state: &AppState,
    params: &ExportQuery,
    rid: &str,
) -> Result<Vec<Mention>, ApiError> {
    let result = match params.entity_id {
        Some(id) => state.store.get_mentions_by_entity(id, ENTITY_EXPORT_LIMIT).await,
        None => {
            let hours = super::window_hours(params.hours, state.config.export_window_hours);
            state.store.get_recent_mentions(hours).await
        }
    };
    result.map_err(|e| map_db_error(rid, &e))
}

fn attachment(content_type: &'static str, extension: &str, body: String) -> Response {
    let filename = format!(
        "mentions-export-{}.{extension}",
        Utc::now().format("%Y-%m-%d")
    );
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /api/v1/export/csv
pub(in crate::api) async fn export_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let rid = &req_id.0;
    let mentions = load_mentions(&state, &params, rid).await?;
    let csv = mentions_to_csv(&mentions).map_err(|e| {
        tracing::error!(error = %e, "csv export failed");
        ApiError::new(rid, "internal_error", "export failed")
    })?;
    Ok(attachment("text/csv; charset=utf-8", "csv", csv))
}

/// GET /api/v1/export/json: entities, mentions and all company insights.
pub(in crate::api) async fn export_json(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let rid = &req_id.0;
    let entities = state
        .store
        .get_all_entities()
        .await
        .map_err(|e| map_db_error(rid, &e))?;
    let mentions = load_mentions(&state, &params, rid).await?;

    let mut insights = Vec::new();
    for entity in entities.iter().filter(|e| e.is_company()) {
        insights.extend(
            state
                .store
                .get_insights_by_company(entity.id)
                .await
                .map_err(|e| map_db_error(rid, &e))?,
        );
    }

    let bundle = ExportBundle {
        exported_at: Utc::now(),
        entities,
        mentions,
        insights,
    };
    let body = serde_json::to_string_pretty(&bundle).map_err(|e| {
        tracing::error!(error = %e, "json export failed");
        ApiError::new(rid, "internal_error", "export failed")
    })?;
    Ok(attachment("application/json", "json", body))
}

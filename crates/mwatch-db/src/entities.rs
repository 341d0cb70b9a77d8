//! Database operations for the `entities` table.

use chrono::{DateTime, Utc};
use mwatch_core::{CoreError, Entity, EntityType, NewEntity};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `entities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntityRow {
    pub id: Uuid,
    pub name: String,
    pub entity_type: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EntityRow> for Entity {
    type Error = DbError;

    fn try_from(row: EntityRow) -> Result<Self, Self::Error> {
        let entity_type =
            row.entity_type
                .parse::<EntityType>()
                .map_err(|e| DbError::CorruptRow {
                    table: "entities",
                    reason: e.to_string(),
                })?;
        Ok(Entity {
            id: row.id,
            name: row.name,
            entity_type,
            created_at: row.created_at,
            enabled: row.enabled,
        })
    }
}

const ENTITY_COLUMNS: &str = "id, name, entity_type, enabled, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a new entity.
///
/// # Errors
///
/// Returns [`DbError::Validation`] wrapping [`CoreError::DuplicateEntity`] on a
/// case-insensitive (name, type) collision, or [`DbError::Sqlx`] otherwise.
pub async fn insert_entity(pool: &PgPool, input: NewEntity) -> Result<Entity, DbError> {
    let entity = Entity::new(input);

    let result = sqlx::query(
        "INSERT INTO entities (id, name, entity_type, enabled, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(entity.id)
    .bind(&entity.name)
    .bind(entity.entity_type.as_str())
    .bind(entity.enabled)
    .bind(entity.created_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(entity),
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
            Err(DbError::Validation(CoreError::DuplicateEntity {
                name: entity.name,
                entity_type: entity.entity_type,
            }))
        }
        Err(e) => Err(DbError::Sqlx(e)),
    }
}

/// Fetch one entity by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_entity(pool: &PgPool, id: Uuid) -> Result<Option<Entity>, DbError> {
    let row = sqlx::query_as::<_, EntityRow>(&format!(
        "SELECT {ENTITY_COLUMNS} FROM entities WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Entity::try_from).transpose()
}

/// List all entities, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_entities(pool: &PgPool) -> Result<Vec<Entity>, DbError> {
    let rows = sqlx::query_as::<_, EntityRow>(&format!(
        "SELECT {ENTITY_COLUMNS} FROM entities ORDER BY created_at, name"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Entity::try_from).collect()
}

/// Toggle the `enabled` flag and return the updated entity.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no entity has this id.
pub async fn set_entity_enabled(pool: &PgPool, id: Uuid, enabled: bool) -> Result<Entity, DbError> {
    let row = sqlx::query_as::<_, EntityRow>(&format!(
        "UPDATE entities SET enabled = $2 WHERE id = $1 RETURNING {ENTITY_COLUMNS}"
    ))
    .bind(id)
    .bind(enabled)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Entity::try_from(row)
}

/// Delete an entity; mentions and insights go with it via `ON DELETE CASCADE`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no entity has this id.
pub async fn delete_entity(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM entities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

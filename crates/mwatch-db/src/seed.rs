use mwatch_core::{CoreError, EntityConfig, NewEntity};

use crate::store::MentionStore;
use crate::DbError;

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub existing: usize,
}

/// Create entities from the seed file, leaving ones that already exist untouched.
///
/// Safe to run repeatedly; a (name, type) that is already stored counts as
/// `existing` rather than an error.
///
/// # Errors
///
/// Returns [`DbError`] for any failure other than a duplicate.
pub async fn seed_entities(
    store: &dyn MentionStore,
    entities: &[EntityConfig],
) -> Result<SeedReport, DbError> {
    let mut report = SeedReport::default();

    for config in entities {
        let input = NewEntity {
            name: config.name.clone(),
            entity_type: config.entity_type,
        };
        match store.create_entity(input).await {
            Ok(entity) => {
                if !config.enabled {
                    store.set_entity_enabled(entity.id, false).await?;
                }
                report.created += 1;
            }
            Err(DbError::Validation(CoreError::DuplicateEntity { .. })) => {
                report.existing += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        created = report.created,
        existing = report.existing,
        "entity seed complete"
    );
    Ok(report)
}

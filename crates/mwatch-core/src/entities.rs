use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ConfigError, CoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Keyword,
    Company,
}

impl EntityType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Keyword => "keyword",
            EntityType::Company => "company",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(EntityType::Keyword),
            "company" => Ok(EntityType::Company),
            other => Err(CoreError::UnknownEntityType(other.to_string())),
        }
    }
}

/// A tracked keyword or company.
///
/// `name` may embed boolean query syntax (`AND`/`OR`/`NOT`, parentheses);
/// collectors decide how much of it their upstream API understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub created_at: DateTime<Utc>,
    pub enabled: bool,
}

impl Entity {
    /// Build a fresh, enabled entity from validated input.
    #[must_use]
    pub fn new(input: NewEntity) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            entity_type: input.entity_type,
            created_at: Utc::now(),
            enabled: true,
        }
    }

    #[must_use]
    pub fn is_company(&self) -> bool {
        self.entity_type == EntityType::Company
    }
}

/// Validated input for entity creation. Construct with [`NewEntity::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntity {
    pub name: String,
    pub entity_type: EntityType,
}

impl NewEntity {
    /// Sanitize and validate raw user input.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] when the name or type is absent or
    /// blank, and [`CoreError::UnknownEntityType`] for an unrecognized type.
    pub fn parse(name: Option<&str>, entity_type: Option<&str>) -> Result<Self, CoreError> {
        let name = name
            .map(sanitize_entity_name)
            .filter(|n| !n.is_empty())
            .ok_or(CoreError::MissingField("name"))?;
        let raw_type = entity_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CoreError::MissingField("type"))?;
        let entity_type = raw_type.parse::<EntityType>()?;
        Ok(Self { name, entity_type })
    }
}

/// Trim and collapse internal whitespace runs to a single space.
#[must_use]
pub fn sanitize_entity_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Seed file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct EntitiesFile {
    pub entities: Vec<EntityConfig>,
}

/// Load and validate the entity seed list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_entities(path: &Path) -> Result<EntitiesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::EntitiesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut file: EntitiesFile = serde_yaml::from_str(&content)?;
    for entity in &mut file.entities {
        entity.name = sanitize_entity_name(&entity.name);
    }

    validate_entities(&file)?;

    Ok(file)
}

fn validate_entities(file: &EntitiesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entity in &file.entities {
        if entity.name.is_empty() {
            return Err(ConfigError::Validation(
                "entity name must be non-empty".to_string(),
            ));
        }

        if !seen.insert((entity.name.to_lowercase(), entity.entity_type)) {
            return Err(ConfigError::Validation(format!(
                "duplicate {} entity: '{}'",
                entity.entity_type, entity.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_entity_name("  rust \t  lang\n"), "rust lang");
        assert_eq!(sanitize_entity_name("   "), "");
    }

    #[test]
    fn entity_type_parses_case_insensitively() {
        assert_eq!("Company".parse::<EntityType>().unwrap(), EntityType::Company);
        assert_eq!("keyword".parse::<EntityType>().unwrap(), EntityType::Keyword);
        assert!(matches!(
            "brand".parse::<EntityType>(),
            Err(CoreError::UnknownEntityType(ref t)) if t == "brand"
        ));
    }

    #[test]
    fn new_entity_requires_name_and_type() {
        assert!(matches!(
            NewEntity::parse(None, Some("keyword")),
            Err(CoreError::MissingField("name"))
        ));
        assert!(matches!(
            NewEntity::parse(Some("   "), Some("keyword")),
            Err(CoreError::MissingField("name"))
        ));
        assert!(matches!(
            NewEntity::parse(Some("rust"), None),
            Err(CoreError::MissingField("type"))
        ));
    }

    #[test]
    fn new_entity_sanitizes_name() {
        let parsed = NewEntity::parse(Some("  (rust  OR  go) "), Some("keyword")).unwrap();
        assert_eq!(parsed.name, "(rust OR go)");
        assert_eq!(parsed.entity_type, EntityType::Keyword);
    }

    #[test]
    fn entity_new_is_enabled() {
        let entity = Entity::new(NewEntity {
            name: "Acme".to_string(),
            entity_type: EntityType::Company,
        });
        assert!(entity.enabled);
        assert!(entity.is_company());
    }

    #[test]
    fn entity_serializes_type_field() {
        let entity = Entity::new(NewEntity {
            name: "rust".to_string(),
            entity_type: EntityType::Keyword,
        });
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["type"], "keyword");
        assert_eq!(json["enabled"], true);
    }

    #[test]
    fn validate_rejects_case_insensitive_duplicates() {
        let file: EntitiesFile = serde_yaml::from_str(
            "entities:\n  - name: Acme\n    type: company\n  - name: acme\n    type: company\n",
        )
        .unwrap();
        let err = validate_entities(&file).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn validate_allows_same_name_with_different_type() {
        let file: EntitiesFile = serde_yaml::from_str(
            "entities:\n  - name: Acme\n    type: company\n  - name: Acme\n    type: keyword\n    enabled: false\n",
        )
        .unwrap();
        assert!(validate_entities(&file).is_ok());
        assert!(!file.entities[1].enabled);
        assert!(file.entities[0].enabled);
    }
}

//! `entity` subcommands.

use clap::Subcommand;
use mwatch_core::{Entity, NewEntity};
use mwatch_db::MentionStore;
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum EntityCommands {
    /// Track a new keyword or company
    Add {
        name: String,

        /// `keyword` or `company`
        #[arg(long = "type", default_value = "keyword")]
        entity_type: String,
    },
    List,
    /// Delete an entity along with its mentions and insights
    Remove { id: Uuid },
    Enable { id: Uuid },
    Disable { id: Uuid },
}

pub(crate) async fn run_entity(
    store: &dyn MentionStore,
    command: EntityCommands,
) -> anyhow::Result<()> {
    match command {
        EntityCommands::Add { name, entity_type } => {
            let input = NewEntity::parse(Some(&name), Some(&entity_type))?;
            let entity = store.create_entity(input).await?;
            println!("created {}", format_entity(&entity));
        }
        EntityCommands::List => {
            let entities = store.get_all_entities().await?;
            if entities.is_empty() {
                println!("no entities; add one with `mwatch-cli entity add <name>`");
            }
            for entity in &entities {
                println!("{}", format_entity(entity));
            }
        }
        EntityCommands::Remove { id } => {
            store.delete_entity(id).await?;
            println!("removed {id}");
        }
        EntityCommands::Enable { id } => {
            let entity = store.set_entity_enabled(id, true).await?;
            println!("enabled {}", format_entity(&entity));
        }
        EntityCommands::Disable { id } => {
            let entity = store.set_entity_enabled(id, false).await?;
            println!("disabled {}", format_entity(&entity));
        }
    }
    Ok(())
}

pub(crate) fn format_entity(entity: &Entity) -> String {
    format!(
        "{}  {:<8} {:<8} {}",
        entity.id,
        entity.entity_type,
        if entity.enabled { "enabled" } else { "disabled" },
        entity.name
    )
}

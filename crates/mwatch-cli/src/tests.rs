use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["mwatch-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_seed_with_file_override() {
    let cli = Cli::try_parse_from(["mwatch-cli", "db", "seed", "--file", "other.yaml"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed { file: Some(ref f) }
        }) if f == &PathBuf::from("other.yaml")
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["mwatch-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn entity_add_defaults_to_keyword() {
    let cli = Cli::try_parse_from(["mwatch-cli", "entity", "add", "rust"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Entity {
            command: EntityCommands::Add { ref name, ref entity_type }
        }) if name == "rust" && entity_type == "keyword"
    ));
}

#[test]
fn entity_add_accepts_type_flag() {
    let cli =
        Cli::try_parse_from(["mwatch-cli", "entity", "add", "Anthropic", "--type", "company"])
            .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Entity {
            command: EntityCommands::Add { ref entity_type, .. }
        }) if entity_type == "company"
    ));
}

#[test]
fn entity_remove_requires_uuid() {
    assert!(Cli::try_parse_from(["mwatch-cli", "entity", "remove", "not-a-uuid"]).is_err());

    let id = Uuid::new_v4();
    let cli = Cli::try_parse_from(["mwatch-cli", "entity", "remove", &id.to_string()]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Entity {
            command: EntityCommands::Remove { id: parsed }
        }) if parsed == id
    ));
}

#[test]
fn scan_dry_run_flag() {
    let cli = Cli::try_parse_from(["mwatch-cli", "scan"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Scan { dry_run: false })));

    let cli = Cli::try_parse_from(["mwatch-cli", "scan", "--dry-run"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Scan { dry_run: true })));
}

#[test]
fn mentions_defaults() {
    let cli = Cli::try_parse_from(["mwatch-cli", "mentions"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Mentions {
            entity: None,
            hours: None,
            limit: 20
        })
    ));
}

#[test]
fn export_defaults_to_csv_on_stdout() {
    let cli = Cli::try_parse_from(["mwatch-cli", "export"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Export {
            format: ExportFormat::Csv,
            entity: None,
            out: None
        })
    ));
}

#[test]
fn export_json_to_file() {
    let cli = Cli::try_parse_from([
        "mwatch-cli",
        "export",
        "--format",
        "json",
        "--out",
        "dump.json",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Export {
            format: ExportFormat::Json,
            out: Some(ref p),
            ..
        }) if p == &PathBuf::from("dump.json")
    ));
}

#[test]
fn export_rejects_unknown_format() {
    assert!(Cli::try_parse_from(["mwatch-cli", "export", "--format", "xml"]).is_err());
}

#[test]
fn probe_takes_keyword() {
    let cli = Cli::try_parse_from(["mwatch-cli", "probe", "tokio"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Probe { ref keyword }) if keyword == "tokio"
    ));
}

#[test]
fn format_entity_shows_state() {
    let mut entity = mwatch_core::Entity::new(mwatch_core::NewEntity {
        name: "Anthropic".to_string(),
        entity_type: mwatch_core::EntityType::Company,
    });
    assert!(entity::format_entity(&entity).contains("enabled"));
    entity.enabled = false;
    let line = entity::format_entity(&entity);
    assert!(line.contains("disabled"));
    assert!(line.ends_with("Anthropic"));
}

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use brainsait_journey::cli::commands::catalog::CatalogCommands;
use brainsait_journey::cli::commands::replay::{run_script, ReplayScript};
use brainsait_journey::cli::{load_config, Cli, Commands};
use brainsait_journey::{EngineConfig, TriggerCatalog};
use clap::Parser;
use tempfile::NamedTempFile;

#[test]
fn test_parse_catalog_list() {
    let cli = Cli::try_parse_from(["brainsait-journey", "catalog", "list"]).expect("parses");

    assert!(!cli.json);
    assert!(cli.config.is_none());
    match cli.command {
        Commands::Catalog(args) => assert!(matches!(args.command, CatalogCommands::List)),
        Commands::Replay(_) => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_catalog_show_with_global_flags() {
    let cli = Cli::try_parse_from([
        "brainsait-journey",
        "catalog",
        "show",
        "trial_activation_flow",
        "--json",
        "--config",
        "custom.yaml",
    ])
    .expect("parses");

    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    match cli.command {
        Commands::Catalog(args) => match args.command {
            CatalogCommands::Show { id } => assert_eq!(id, "trial_activation_flow"),
            _ => panic!("Wrong catalog command"),
        },
        Commands::Replay(_) => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_replay() {
    let cli = Cli::try_parse_from(["brainsait-journey", "-j", "replay", "journey.yaml"])
        .expect("parses");

    assert!(cli.json);
    match cli.command {
        Commands::Replay(args) => assert_eq!(args.script, PathBuf::from("journey.yaml")),
        Commands::Catalog(_) => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["brainsait-journey"]).is_err());
    assert!(Cli::try_parse_from(["brainsait-journey", "catalog", "show"]).is_err());
    assert!(Cli::try_parse_from(["brainsait-journey", "replay"]).is_err());
}

#[test]
fn test_load_config_from_explicit_file() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "engine:\n  throttle_window_secs: 15\n  derive_engagement_score: true")
        .expect("write config");
    file.flush().expect("flush config");

    temp_env::with_vars_unset(
        [
            "BRAINSAIT_ENGINE__THROTTLE_WINDOW_SECS",
            "BRAINSAIT_ENGINE__DERIVE_ENGAGEMENT_SCORE",
        ],
        || {
            let config = load_config(Some(file.path())).expect("config loads");
            assert_eq!(config.engine.throttle_window_secs, 15);
            assert!(config.engine.derive_engagement_score);
        },
    );
}

#[test]
fn test_replay_script_with_custom_catalog_file() {
    let mut catalog_file = NamedTempFile::new().expect("temp file");
    writeln!(
        catalog_file,
        r#"
triggers:
  - id: docs_reader
    name: Docs reader
    conditions:
      - type: behavioral
        condition: page_visit
        value: /docs
    actions:
      - type: email
        payload:
          template: docs_digest
"#
    )
    .expect("write catalog");
    catalog_file.flush().expect("flush catalog");

    let catalog = TriggerCatalog::from_yaml_file(catalog_file.path()).expect("catalog loads");
    let script: ReplayScript = serde_yaml::from_str(
        r"
start: 2026-02-02T08:00:00Z
user: reader
steps:
  - action: behavior
    page_views:
      - page: /docs
        duration: 3
  - action: behavior
    user: someone_else
    page_views:
      - page: /blog
",
    )
    .expect("script parses");

    let out = run_script(&script, &EngineConfig::default(), Arc::new(catalog)).expect("replay runs");

    assert_eq!(out.fired(), vec!["docs_reader"]);
    assert_eq!(out.events.len(), 1);
    assert_eq!(out.events[0].user_id, "reader");
    assert_eq!(out.events[0].action, "email");
}

//! Trigger catalog CLI commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::Cell;
use serde::Serialize;

use crate::cli::commands::load_catalog;
use crate::cli::output::{output, table_with_header, truncate, CommandOutput};
use crate::domain::models::{AutomationTrigger, Config, RawCondition};
use crate::services::TriggerCatalog;

/// Arguments for `catalog`.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Catalog subcommand
    #[command(subcommand)]
    pub command: CatalogCommands,
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List the triggers of the active catalog
    List,
    /// Show conditions and actions of one trigger
    Show {
        /// Trigger ID
        id: String,
    },
    /// Load and validate a YAML catalog file
    Validate {
        /// Path to the catalog file
        file: PathBuf,
    },
}

/// One row of `catalog list`.
#[derive(Debug, Serialize)]
pub struct TriggerSummary {
    /// Trigger id
    pub id: String,
    /// Display name
    pub name: String,
    /// Condition count
    pub conditions: usize,
    /// Action kinds in order
    pub actions: Vec<String>,
    /// Has a milestone condition
    pub one_shot: bool,
}

impl From<&AutomationTrigger> for TriggerSummary {
    fn from(trigger: &AutomationTrigger) -> Self {
        Self {
            id: trigger.id.clone(),
            name: trigger.name.clone(),
            conditions: trigger.conditions.len(),
            actions: trigger.actions.iter().map(|a| a.kind.to_string()).collect(),
            one_shot: trigger.is_one_shot(),
        }
    }
}

/// Output of `catalog list`.
#[derive(Debug, Serialize)]
pub struct CatalogListOutput {
    /// `built-in catalog` or the catalog path
    pub source: String,
    /// Triggers in evaluation order
    pub triggers: Vec<TriggerSummary>,
    /// Trigger count
    pub total: usize,
}

impl CommandOutput for CatalogListOutput {
    fn to_human(&self) -> String {
        if self.triggers.is_empty() {
            return format!("No triggers in catalog ({}).", self.source);
        }

        let mut table = table_with_header(&["ID", "Name", "Conditions", "Actions", "One-shot"]);
        for trigger in &self.triggers {
            table.add_row(vec![
                Cell::new(&trigger.id),
                Cell::new(truncate(&trigger.name, 36)),
                Cell::new(trigger.conditions),
                Cell::new(trigger.actions.join(", ")),
                Cell::new(if trigger.one_shot { "yes" } else { "no" }),
            ]);
        }

        format!(
            "{} trigger(s) from {}:\n{table}",
            self.total, self.source
        )
    }
}

/// Output of `catalog show`.
#[derive(Debug, Serialize)]
pub struct TriggerDetailOutput {
    /// The trigger as loaded
    pub trigger: AutomationTrigger,
}

impl CommandOutput for TriggerDetailOutput {
    fn to_human(&self) -> String {
        let trigger = &self.trigger;
        let mut lines = vec![
            format!("Trigger: {}", trigger.name),
            format!("ID: {}", trigger.id),
            String::new(),
            "Conditions (all must hold):".to_string(),
        ];

        if trigger.conditions.is_empty() {
            lines.push("  (none, always passes)".to_string());
        }
        for condition in &trigger.conditions {
            let raw = RawCondition::from(condition.clone());
            let marker = if condition.is_unrecognized() {
                " [unrecognized, never holds]"
            } else {
                ""
            };
            lines.push(format!(
                "  {:<10} {} = {}{marker}",
                raw.kind.to_string(),
                raw.condition,
                raw.value
            ));
        }

        lines.push(String::new());
        lines.push("Actions:".to_string());
        for action in &trigger.actions {
            lines.push(format!("  {:<13} {}", action.kind.to_string(), action.payload));
        }

        lines.join("\n")
    }
}

/// Output of `catalog validate`.
#[derive(Debug, Serialize)]
pub struct CatalogValidationOutput {
    /// File that was checked
    pub file: String,
    /// Always true; invalid files are reported as errors
    pub valid: bool,
    /// Trigger count
    pub triggers: usize,
    /// `trigger_id:condition` for every key that never holds
    pub unrecognized_conditions: Vec<String>,
}

impl CommandOutput for CatalogValidationOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{}: valid catalog with {} trigger(s)",
            self.file, self.triggers
        )];
        if !self.unrecognized_conditions.is_empty() {
            lines.push(format!(
                "Warning: unrecognized conditions never hold: {}",
                self.unrecognized_conditions.join(", ")
            ));
        }
        lines.join("\n")
    }
}

/// Run a `catalog` subcommand.
pub async fn execute(args: CatalogArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        CatalogCommands::List => {
            let catalog = load_catalog(&config.engine).await?;
            let source = config
                .engine
                .catalog_path
                .as_ref()
                .map_or_else(|| "built-in catalog".to_string(), |p| p.display().to_string());

            let out = CatalogListOutput {
                source,
                total: catalog.len(),
                triggers: catalog.iter().map(TriggerSummary::from).collect(),
            };
            output(&out, json_mode);
        }

        CatalogCommands::Show { id } => {
            let catalog = load_catalog(&config.engine).await?;
            let trigger = catalog
                .get(&id)
                .with_context(|| format!("Trigger not found: {id}"))?;

            let out = TriggerDetailOutput {
                trigger: trigger.clone(),
            };
            output(&out, json_mode);
        }

        CatalogCommands::Validate { file } => {
            let yaml = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read catalog {}", file.display()))?;
            let catalog = TriggerCatalog::from_yaml_str(&yaml)
                .with_context(|| format!("Invalid catalog {}", file.display()))?;

            let unrecognized_conditions = catalog
                .iter()
                .flat_map(|trigger| {
                    trigger
                        .conditions
                        .iter()
                        .filter(|c| c.is_unrecognized())
                        .map(move |c| format!("{}:{}", trigger.id, c.key()))
                })
                .collect();

            let out = CatalogValidationOutput {
                file: file.display().to_string(),
                valid: true,
                triggers: catalog.len(),
                unrecognized_conditions,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}

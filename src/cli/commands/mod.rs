//! CLI command implementations.

pub mod catalog;
pub mod replay;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::models::EngineConfig;
use crate::services::TriggerCatalog;

/// Catalog named by `catalog_path`, or the built-in one.
pub(crate) async fn load_catalog(config: &EngineConfig) -> Result<Arc<TriggerCatalog>> {
    let Some(path) = config.catalog_path.clone() else {
        return Ok(Arc::new(TriggerCatalog::builtin()));
    };

    let display = path.display().to_string();
    let catalog = tokio::task::spawn_blocking(move || TriggerCatalog::from_yaml_file(path))
        .await
        .context("Catalog loader task failed")?
        .with_context(|| format!("Failed to load catalog {display}"))?;

    Ok(Arc::new(catalog))
}

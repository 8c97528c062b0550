//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::commands::catalog::CatalogArgs;
use crate::cli::commands::replay::ReplayArgs;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "brainsait-journey")]
#[command(about = "BrainSAIT journey automation engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Config file (defaults to .brainsait/config.yaml plus overrides)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and validate trigger catalogs
    Catalog(CatalogArgs),

    /// Replay a scripted user journey against the engine
    Replay(ReplayArgs),
}

//! CLI argument structs for all commands.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Store backend choices for `init`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    /// In-process graph, nothing persisted
    Memory,
    /// In-process graph persisted to `.blastradius/graph.jsonl`
    Jsonl,
    /// Neo4j over Bolt (requires the `neo4j` feature)
    Neo4j,
}

impl BackendArg {
    /// Name as written to `config.yaml`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Jsonl => "jsonl",
            Self::Neo4j => "neo4j",
        }
    }
}

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Store backend
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub backend: BackendArg,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `import` command
#[derive(Parser, Debug, Clone)]
pub struct ImportArgs {
    /// Workbook to import (`.xlsx`, `.xls`, `.ods`, `.yaml`, `.yml`)
    pub path: PathBuf,
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Show the four-node overview instead of every entity
    #[arg(short, long)]
    pub summary: bool,
}

/// Arguments for the `counts` command
#[derive(Parser, Debug, Clone)]
pub struct CountsArgs {}

/// Arguments for the `simulate` command
#[derive(Parser, Debug, Clone)]
pub struct SimulateArgs {
    /// Nodes to toggle as one event (comma-separated); repeat for more events
    ///
    /// A selector is a node id, `Kind:Name` (e.g. `Server:Server1`) or a
    /// name that matches exactly one node. Events are applied in order, so
    /// toggling the same node twice restores it.
    #[arg(short, long = "toggle", value_name = "SELECTORS")]
    pub toggles: Vec<String>,
}

impl SimulateArgs {
    /// Selector groups, one per `--toggle`, with blanks removed.
    #[must_use]
    pub fn events(&self) -> Vec<Vec<&str>> {
        self.toggles
            .iter()
            .map(|group| {
                group
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .collect()
    }
}

/// Arguments for the `clear` command
#[derive(Parser, Debug, Clone)]
pub struct ClearArgs {}

/// Arguments for the `status` command
#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {}

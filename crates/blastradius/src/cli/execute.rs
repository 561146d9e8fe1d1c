//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use super::args::{
    ClearArgs, CountsArgs, GraphArgs, ImportArgs, InitArgs, SimulateArgs, StatusArgs,
};
use crate::app::App;
use crate::domain::{EntityKind, SummaryCounts};
use crate::output::{self, OutputMode, StoreStatus};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(&current_dir, Some(args.backend.as_str())).await?;

    if !args.quiet {
        println!(
            "Initialized blastradius in {}",
            result.blastradius_dir.display()
        );
        println!("  Config:  {}", result.config_file.display());
        println!("  Graph:   {}", result.graph_file.display());
        println!("  Backend: {}", result.backend);
    }

    Ok(())
}

/// Execute the import command
///
/// The store is saved only when the import completes; a fatal error leaves
/// the data file as it was.
pub async fn execute_import(app: &mut App, args: &ImportArgs, output_mode: OutputMode) -> Result<()> {
    use crate::import::import_from_source;

    let source = args
        .path
        .file_name()
        .map_or_else(|| args.path.display().to_string(), |name| name.to_string_lossy().into_owned());

    info!(path = %args.path.display(), "Importing workbook");
    let outcome = match blastradius_sheets::open_workbook(&args.path) {
        Ok(workbook) => import_from_source(&workbook, app.store_mut()).await,
        Err(e) => Err(e.into()),
    };

    let stats = match outcome {
        Ok(stats) => stats,
        Err(e) => {
            error!(source = %source, error = %e, "Import failed");
            return Err(e).with_context(|| format!("Failed to import {source}"));
        }
    };

    app.save().await?;
    output::print_import_stats(&stats, &source, output_mode)?;
    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    use crate::projection::{project, project_summary};

    let view = if args.summary {
        project_summary(app.store()).await?
    } else {
        project(app.store()).await?
    };

    output::print_graph(&view, output_mode)?;
    Ok(())
}

/// Execute the counts command
///
/// A store error is logged and reported as all-zero counts.
pub async fn execute_counts(app: &App, _args: &CountsArgs, output_mode: OutputMode) -> Result<()> {
    let counts = match app.store().summary_counts().await {
        Ok(counts) => counts.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Failed to read summary counts, reporting zeros");
            SummaryCounts::default()
        }
    };

    output::print_counts(&counts, output_mode)?;
    Ok(())
}

/// Execute the simulate command
pub async fn execute_simulate(
    app: &App,
    args: &SimulateArgs,
    output_mode: OutputMode,
) -> Result<()> {
    use crate::domain::NodeId;
    use crate::projection::project;
    use crate::propagation::FailureSimulation;

    let view = project(app.store()).await?;
    let mut sim = FailureSimulation::new(&view);

    for event in args.events() {
        let selected = event
            .into_iter()
            .map(|selector| view.resolve(selector))
            .collect::<crate::error::Result<Vec<NodeId>>>()?;
        sim.toggle_failure(&selected)?;
    }

    output::print_simulation(&sim, output_mode)?;
    Ok(())
}

/// Execute the clear command
pub async fn execute_clear(app: &mut App, _args: &ClearArgs, output_mode: OutputMode) -> Result<()> {
    app.store_mut().delete_all().await?;
    app.save().await?;
    info!("Cleared graph");

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "cleared": true }))?,
        OutputMode::Text => println!("Cleared all entities and relationships."),
    }
    Ok(())
}

/// Execute the status command
pub async fn execute_status(app: &App, _args: &StatusArgs, output_mode: OutputMode) -> Result<()> {
    let store = app.store();
    let status = match store.ping().await {
        Ok(()) => {
            let mut nodes = SummaryCounts::default();
            for kind in EntityKind::ESTATE {
                nodes.set(kind, store.count_nodes(kind).await?);
            }
            StoreStatus {
                backend: app.backend(),
                reachable: true,
                error: None,
                nodes: Some(nodes),
            }
        }
        Err(e) => {
            warn!(error = %e, "Store did not answer");
            StoreStatus {
                backend: app.backend(),
                reachable: false,
                error: Some(e.to_string()),
                nodes: None,
            }
        }
    };

    output::print_status(&status, output_mode)?;
    Ok(())
}

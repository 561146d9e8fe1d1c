//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for blastradius using
//! clap's derive API.
//!
//! # Commands
//!
//! - `init`: Create a `.blastradius/` workspace
//! - `import`: Replace the graph with the contents of a workbook
//! - `graph`: Print the projected graph, or the summary overview
//! - `counts`: Print the stored summary counts
//! - `simulate`: Fail nodes and print what goes down with them
//! - `clear`: Delete every entity and relationship
//! - `status`: Check that the store answers
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! blastradius init
//! blastradius import estate.xlsx
//! blastradius simulate --toggle Datacenter:DC1
//! blastradius simulate --toggle DC1,App7 --toggle DC1
//! ```

mod args;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    BackendArg, ClearArgs, CountsArgs, GraphArgs, ImportArgs, InitArgs, SimulateArgs, StatusArgs,
};

/// Blastradius - see what breaks when part of your estate goes down
///
/// Imports datacenter, server, application and business-function
/// relationships from a workbook into a dependency graph and simulates
/// cascading failures along it.
#[derive(Parser, Debug)]
#[command(name = "blastradius")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new workspace
    ///
    /// Creates `.blastradius/` with a configuration file and an empty graph.
    Init(InitArgs),

    /// Import a workbook
    ///
    /// Reads the DCSV, SVAP and BFAPv2 sections, replaces the stored graph
    /// and refreshes the summary counts.
    Import(ImportArgs),

    /// Show the graph
    ///
    /// Prints every entity and relationship with its render color, or the
    /// four-node overview with `--summary`.
    Graph(GraphArgs),

    /// Show summary counts
    Counts(CountsArgs),

    /// Simulate failures
    ///
    /// Each `--toggle` flips the listed nodes between failed and healthy.
    /// Failure spreads forward: datacenter to servers to applications to
    /// business functions.
    Simulate(SimulateArgs),

    /// Delete everything in the store
    Clear(ClearArgs),

    /// Check the store connection
    Status(StatusArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace cannot be opened or the command fails.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Import(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_import(&mut app, args, output_mode).await
            }
            Some(Commands::Graph(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_graph(&app, args, output_mode).await
            }
            Some(Commands::Counts(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_counts(&app, args, output_mode).await
            }
            Some(Commands::Simulate(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_simulate(&app, args, output_mode).await
            }
            Some(Commands::Clear(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_clear(&mut app, args, output_mode).await
            }
            Some(Commands::Status(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_status(&app, args, output_mode).await
            }
            None => {
                println!("Blastradius failure impact simulator");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or JSON for programmatic
//! use. Text writers take any `Write` so they can be tested against a buffer.
//!
//! Submodules:
//! - [`color`]: Semantic colors and palette swatches

pub mod color;

use crate::domain::{EntityKind, SummaryCounts};
use crate::import::ImportStats;
use crate::projection::{GraphView, RenderNode, palette};
use crate::propagation::FailureSimulation;
use serde::Serialize;
use std::collections::BTreeSet;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

use color::{bold, dimmed, paint, swatch};

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only glyphs instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `BLASTRADIUS_ASCII`: Set to "1" or "true" for ASCII-only glyphs
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `BLASTRADIUS_COLOR`: Set to "0" or "false" to disable colors
    #[must_use]
    pub fn from_env() -> Self {
        let use_ascii = match env::var("BLASTRADIUS_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "BLASTRADIUS_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("BLASTRADIUS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Store health as reported by the `status` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    /// Backend name
    pub backend: &'static str,
    /// Whether the store answered
    pub reachable: bool,
    /// Why the store did not answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Live node counts per kind, when reachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<SummaryCounts>,
}

#[derive(Serialize)]
struct SimulationJson<'a> {
    failed_roots: &'a BTreeSet<crate::domain::NodeId>,
    impacted: Vec<&'a RenderNode>,
    graph: &'a GraphView,
}

#[derive(Serialize)]
struct ImportJson<'a> {
    source: &'a str,
    #[serde(flatten)]
    stats: &'a ImportStats,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print the outcome of an import.
pub fn print_import_stats(stats: &ImportStats, source: &str, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&ImportJson { source, stats }),
        OutputMode::Text => with_stdout(|w, config| write_import_stats(w, stats, source, config)),
    }
}

/// Print a projected graph.
pub fn print_graph(view: &GraphView, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(view),
        OutputMode::Text => with_stdout(|w, config| write_graph(w, view, config)),
    }
}

/// Print summary counts.
pub fn print_counts(counts: &SummaryCounts, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(counts),
        OutputMode::Text => with_stdout(|w, config| write_counts(w, counts, config)),
    }
}

/// Print the state of a failure simulation.
pub fn print_simulation(sim: &FailureSimulation, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&SimulationJson {
            failed_roots: sim.failed_roots(),
            impacted: impacted_nodes(sim),
            graph: sim.render(),
        }),
        OutputMode::Text => with_stdout(|w, config| write_simulation(w, sim, config)),
    }
}

/// Print store health.
pub fn print_status(status: &StoreStatus, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(status),
        OutputMode::Text => with_stdout(|w, config| write_status(w, status, config)),
    }
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

fn with_stdout<F>(write: F) -> io::Result<()>
where
    F: FnOnce(&mut io::StdoutLock<'static>, &OutputConfig) -> io::Result<()>,
{
    let mut handle = io::stdout().lock();
    let config = OutputConfig::from_env();
    write(&mut handle, &config)
}

fn impacted_nodes(sim: &FailureSimulation) -> Vec<&RenderNode> {
    sim.render()
        .nodes
        .iter()
        .filter(|node| sim.is_impacted(&node.id))
        .collect()
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_node<W: Write>(w: &mut W, node: &RenderNode, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "  {} {} {} {}",
        swatch(node.color, config),
        dimmed(&format!("[{}]", node.id), config),
        node.kind,
        paint(&node.label, node.color, config)
    )
}

pub(crate) fn write_import_stats<W: Write>(
    w: &mut W,
    stats: &ImportStats,
    source: &str,
    config: &OutputConfig,
) -> io::Result<()> {
    if stats.is_complete() {
        writeln!(w, "{} {}", success("Imported", config), info(source, config))?;
    } else {
        writeln!(
            w,
            "{} {} ({} of {} relationship kinds failed)",
            warning("Imported with errors", config),
            info(source, config),
            stats.failures.len(),
            stats.kinds.len()
        )?;
    }
    writeln!(w)?;

    for kind in &stats.kinds {
        writeln!(
            w,
            "  {:<6} {:>6} rows  {:>6} unique  {:>6} merged",
            kind.kind.as_str(),
            kind.extracted,
            kind.unique,
            kind.merged
        )?;
    }
    for failure in &stats.failures {
        writeln!(
            w,
            "  {} {}: {}",
            error("failed", config),
            failure.kind,
            failure.message
        )?;
    }

    writeln!(w)?;
    write_counts(w, &stats.summary, config)
}

pub(crate) fn write_graph<W: Write>(
    w: &mut W,
    view: &GraphView,
    config: &OutputConfig,
) -> io::Result<()> {
    if view.nodes.is_empty() {
        writeln!(w, "Graph is empty. Run 'blastradius import <PATH>' first.")?;
        return Ok(());
    }

    writeln!(w, "{}", bold(&format!("Nodes ({})", view.nodes.len()), config))?;
    for node in &view.nodes {
        write_node(w, node, config)?;
    }

    writeln!(w)?;
    writeln!(w, "{}", bold(&format!("Edges ({})", view.edges.len()), config))?;
    for edge in &view.edges {
        writeln!(
            w,
            "  {} {} -{}-> {}",
            swatch(edge.color, config),
            edge.from,
            paint(&edge.kind, edge.color, config),
            edge.to
        )?;
    }
    Ok(())
}

pub(crate) fn write_counts<W: Write>(
    w: &mut W,
    counts: &SummaryCounts,
    config: &OutputConfig,
) -> io::Result<()> {
    for kind in EntityKind::ESTATE {
        let title = format!("{}:", palette::summary_title(kind));
        writeln!(
            w,
            "{} {:<19} {}",
            swatch(palette::entity_color(kind), config),
            title,
            counts.get(kind)
        )?;
    }
    Ok(())
}

pub(crate) fn write_simulation<W: Write>(
    w: &mut W,
    sim: &FailureSimulation,
    config: &OutputConfig,
) -> io::Result<()> {
    let view = sim.render();
    if sim.failed_roots().is_empty() {
        writeln!(w, "No failed nodes.")?;
        return Ok(());
    }

    writeln!(
        w,
        "{}",
        bold(&format!("Failed roots ({})", sim.failed_roots().len()), config)
    )?;
    for id in sim.failed_roots() {
        if let Some(node) = view.find_node(id) {
            write_node(w, node, config)?;
        }
    }

    let impacted = impacted_nodes(sim);
    writeln!(w)?;
    writeln!(
        w,
        "{} {} of {} nodes",
        bold("Impacted:", config),
        error(&impacted.len().to_string(), config),
        view.nodes.len()
    )?;
    for node in impacted {
        write_node(w, node, config)?;
    }
    Ok(())
}

pub(crate) fn write_status<W: Write>(
    w: &mut W,
    status: &StoreStatus,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "Backend: {}", status.backend)?;
    if status.reachable {
        writeln!(w, "Store:   {}", success("reachable", config))?;
    } else {
        writeln!(
            w,
            "Store:   {} ({})",
            error("unreachable", config),
            status.error.as_deref().unwrap_or("unknown error")
        )?;
    }

    if let Some(nodes) = &status.nodes {
        writeln!(w)?;
        write_counts(w, nodes, config)?;
    }
    Ok(())
}

//! Blastradius - failure impact analysis for an IT estate.
//!
//! This crate imports a workbook describing which datacenters host which
//! servers, which servers run which applications and which business functions
//! use which applications into a property graph, projects that graph for
//! rendering and simulates how a failure spreads through it.
//!
//! The graph lives behind the [`storage::GraphStore`] trait: an in-process
//! petgraph store, the same store persisted as JSON Lines, or Neo4j.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod import;
pub mod projection;
pub mod propagation;
pub mod storage;

// Application context and configuration
pub mod app;
pub mod config;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

// Terminal and JSON output
pub mod output;

//! Error types for blastradius operations.

use crate::domain::RelationshipKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for import, projection and simulation operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required workbook section is absent. Raised before any store mutation.
    #[error("Workbook is missing required section '{section}'")]
    MissingSection {
        /// Name of the missing section
        section: String,
    },

    /// The store failed during a step the import cannot continue without.
    #[error("Graph store unavailable during {operation}: {source}")]
    StoreUnavailable {
        /// The import step that failed
        operation: &'static str,
        /// The underlying store failure
        #[source]
        source: StoreError,
    },

    /// One relationship kind's batch failed to merge.
    #[error("Failed to merge {kind} relationships: {source}")]
    RelationshipMerge {
        /// Relationship kind of the failed batch
        kind: RelationshipKind,
        /// The underlying store failure
        #[source]
        source: StoreError,
    },

    /// The graph could not be read back for display.
    #[error("Failed to read graph projection: {0}")]
    Projection(#[source] StoreError),

    /// A selector did not match any projected node.
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// A name selector matched more than one projected node.
    #[error("Node selector '{selector}' is ambiguous ({matches} nodes match); use an id or Kind:Name")]
    AmbiguousNode {
        /// The selector as given
        selector: String,
        /// Number of matching nodes
        matches: usize,
    },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The workbook could not be loaded.
    #[error("Workbook error: {0}")]
    Workbook(#[from] blastradius_sheets::Error),

    /// Storage error outside the import pipeline.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Failures reported by graph store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error while reading or writing the data file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A record could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record holds a value the store cannot represent.
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Every store identity has been handed out.
    #[error("No store identities left")]
    IdsExhausted,

    /// A link was passed in a batch of a different relationship kind.
    #[error("Link of kind {found} in a {expected} batch")]
    MismatchedLink {
        /// Kind of the batch
        expected: RelationshipKind,
        /// Kind of the offending link
        found: RelationshipKind,
    },

    /// The backend could not be reached or refused the operation.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// A row returned by the database did not have the expected shape.
    #[error("Unexpected result shape: {0}")]
    Decode(String),

    /// Neo4j driver error.
    #[cfg(feature = "neo4j")]
    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.blastradius/` directory was found in the directory tree.
    #[error("Not a blastradius workspace (or any parent). Run 'blastradius init' first.")]
    NotInitialized,

    /// `init` was run where a workspace already exists.
    #[error("Blastradius is already initialized here. Found existing '{}'", .0.display())]
    AlreadyInitialized(PathBuf),

    /// The configuration file could not be parsed or written.
    #[error("Configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `store.backend` names an unknown backend.
    #[error("Unknown store backend '{0}'. Valid backends: memory, jsonl, neo4j")]
    UnknownBackend(String),

    /// The backend is known but this binary was built without it.
    #[error("Store backend '{0}' is not available in this build")]
    BackendNotCompiled(String),

    /// The Neo4j password variable is unset.
    #[error("Environment variable {0} is not set; it must hold the Neo4j password")]
    MissingPassword(String),

    /// The data file path escapes the workspace.
    #[error("Data file path must stay inside the workspace: {0}")]
    InvalidDataPath(String),
}

/// A specialized Result type for blastradius operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result type for graph store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

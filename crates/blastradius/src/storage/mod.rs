//! Graph store abstraction for blastradius.
//!
//! This module provides the core store trait and factory for creating store
//! backends. It supports multiple implementations:
//!
//! - **In-memory**: Fast, ephemeral store backed by a petgraph `DiGraph`
//! - **JSONL**: The in-memory store persisted to a JSON Lines file
//! - **Neo4j**: A Bolt connection to a Neo4j database (feature `neo4j`)
//!
//! # Architecture
//!
//! The store layer uses an async trait so the same import and projection code
//! runs against both the in-process graph and a remote database. The trait is
//! object-safe and callers receive the store as `&mut dyn GraphStore`; there is
//! no global connection handle.
//!
//! # Test Utilities
//!
//! This module provides a [`RecordingStore`] that logs every call and can be
//! told to fail selected operations. To use it in your tests, enable the
//! `test-util` feature:
//!
//! ```toml
//! [dev-dependencies]
//! blastradius = { version = "...", features = ["test-util"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use blastradius::domain::{EntityKind, RelationshipKind};
//! use blastradius::storage::{GraphStore, StoreBackend, create_store};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut store = create_store(StoreBackend::InMemory).await?;
//!
//!     store
//!         .merge_relationship(RelationshipKind::Hosts, "DC1", "Server1")
//!         .await?;
//!     assert_eq!(store.count_nodes(EntityKind::Server).await?, 1);
//!
//!     Ok(())
//! }
//! ```

use crate::domain::{EntityKind, Link, NodeId, RelationshipKind, SummaryCounts};
use crate::error::{Result, StoreResult};
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod in_memory;
#[cfg(feature = "neo4j")]
pub mod neo4j;

/// Name of the `Metadata` singleton that holds [`SummaryCounts`].
pub const SUMMARY_NODE_NAME: &str = "SummaryCounts";

/// Core store trait for the estate graph.
///
/// Implementations must be `Send + Sync` so a store can be held across
/// `.await` points in async contexts.
///
/// # Method Categories
///
/// - **Merge**: `merge_node`, `merge_relationship`, `merge_links`
/// - **Bulk**: `delete_all`
/// - **Counts**: `count_nodes`, `store_summary_counts`, `summary_counts`
/// - **Reads**: `snapshot`, `ping`
/// - **Persistence**: `save`, `reload`
///
/// # Merge Semantics
///
/// Entities are identified by `(kind, name)`. Merging an entity that exists
/// returns the existing identity; merging a relationship that exists between
/// the same two entities leaves a single edge.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ========== Merge Operations ==========

    /// Merge an entity by name, creating it if absent.
    ///
    /// Returns the store identity of the entity.
    async fn merge_node(&mut self, kind: EntityKind, name: &str) -> StoreResult<NodeId>;

    /// Merge a relationship between two named entities.
    ///
    /// Endpoint kinds follow from `kind`; both endpoints are merged first.
    async fn merge_relationship(
        &mut self,
        kind: RelationshipKind,
        source: &str,
        target: &str,
    ) -> StoreResult<()>;

    /// Merge a batch of links of one relationship kind.
    ///
    /// The batch is applied atomically: on error nothing from the batch is
    /// visible. Returns the number of links applied.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MismatchedLink` if any link is of another kind.
    async fn merge_links(&mut self, kind: RelationshipKind, links: &[Link]) -> StoreResult<usize>;

    // ========== Bulk Operations ==========

    /// Delete every entity and relationship, including the summary record.
    async fn delete_all(&mut self) -> StoreResult<()>;

    // ========== Counts ==========

    /// Count the live entities of one kind.
    async fn count_nodes(&self, kind: EntityKind) -> StoreResult<u64>;

    /// Overwrite the `Metadata` singleton with `counts`, creating it if absent.
    async fn store_summary_counts(&mut self, counts: SummaryCounts) -> StoreResult<()>;

    /// Read the `Metadata` singleton.
    ///
    /// Returns `None` if no import has stored counts yet.
    async fn summary_counts(&self) -> StoreResult<Option<SummaryCounts>>;

    // ========== Reads ==========

    /// Read every node and relationship in one consistent view.
    ///
    /// Backends with transactions run both reads in one transaction and roll
    /// it back on failure.
    async fn snapshot(&self) -> StoreResult<GraphSnapshot>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;

    // ========== Persistence ==========

    /// Save changes to persistent storage.
    ///
    /// For the JSONL backend this writes the data file atomically. For the
    /// in-memory and database backends this is a no-op.
    async fn save(&self) -> StoreResult<()>;

    /// Reload state from persistent storage, discarding unsaved changes.
    ///
    /// - **JSONL backend**: Re-reads the file and rebuilds the graph
    /// - **In-memory only**: No-op
    /// - **Database backends**: No-op
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read.
    async fn reload(&mut self) -> StoreResult<()>;
}

/// A node as returned by [`GraphStore::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredNode {
    /// Store identity, stringified
    pub id: NodeId,
    /// Graph labels; the first is the entity kind
    pub labels: Vec<String>,
    /// The `name` property, if the node has one
    pub name: Option<String>,
}

impl StoredNode {
    /// Returns `true` if the node carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// A relationship as returned by [`GraphStore::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredRelationship {
    /// Identity of the source node
    pub source: NodeId,
    /// Relationship type as stored (`HOSTS`, `RUNS`, `USES`, or anything else
    /// a database may hold)
    pub kind: String,
    /// Identity of the target node
    pub target: NodeId,
}

/// Every node and relationship of a store, read in one consistent view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphSnapshot {
    /// All nodes, `Metadata` included
    pub nodes: Vec<StoredNode>,
    /// All relationships
    pub relationships: Vec<StoredRelationship>,
}

/// Connection settings for the Neo4j backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neo4jSettings {
    /// Bolt URI, e.g. `bolt://localhost:7687`
    pub uri: String,
    /// User name
    pub user: String,
    /// Password, resolved from the environment
    pub password: String,
    /// Database name; `None` uses the server default
    pub database: Option<String>,
    /// Connection attempts before giving up
    pub connect_retries: u32,
    /// Pause between connection attempts
    pub retry_delay: Duration,
}

/// Store backend configuration.
///
/// Determines which store implementation to use.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// In-memory store (ephemeral)
    InMemory,

    /// JSONL file store (persistent)
    Jsonl(PathBuf),

    /// Neo4j database (persistent, requires the `neo4j` feature)
    Neo4j(Neo4jSettings),
}

impl StoreBackend {
    /// Returns the data file path for file-based backends.
    #[must_use]
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StoreBackend::Jsonl(path) => Some(path),
            StoreBackend::InMemory | StoreBackend::Neo4j(_) => None,
        }
    }

    /// Short backend name as used in the configuration file.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::InMemory => "memory",
            StoreBackend::Jsonl(_) => "jsonl",
            StoreBackend::Neo4j(_) => "neo4j",
        }
    }
}

/// Wrapper that adds JSONL file persistence to the in-memory store.
///
/// Every operation is delegated to the in-memory graph; `save()` writes the
/// graph to the data file and `reload()` rebuilds it from there.
struct JsonlBackedStore {
    inner: in_memory::InMemoryStore,
    path: PathBuf,
}

impl JsonlBackedStore {
    async fn open(path: PathBuf) -> StoreResult<Self> {
        let inner = load_or_empty(&path).await?;
        Ok(Self { inner, path })
    }
}

async fn load_or_empty(path: &Path) -> StoreResult<in_memory::InMemoryStore> {
    if !path.exists() {
        // First run: nothing saved yet
        return Ok(in_memory::new_shared_store());
    }

    let (store, warnings) = in_memory::load_store(path).await?;
    for warning in &warnings {
        tracing::warn!(warning = %warning, "JSONL load warning");
    }
    Ok(store)
}

#[async_trait]
impl GraphStore for JsonlBackedStore {
    async fn merge_node(&mut self, kind: EntityKind, name: &str) -> StoreResult<NodeId> {
        self.inner.merge_node(kind, name).await
    }

    async fn merge_relationship(
        &mut self,
        kind: RelationshipKind,
        source: &str,
        target: &str,
    ) -> StoreResult<()> {
        self.inner.merge_relationship(kind, source, target).await
    }

    async fn merge_links(&mut self, kind: RelationshipKind, links: &[Link]) -> StoreResult<usize> {
        self.inner.merge_links(kind, links).await
    }

    async fn delete_all(&mut self) -> StoreResult<()> {
        self.inner.delete_all().await
    }

    async fn count_nodes(&self, kind: EntityKind) -> StoreResult<u64> {
        self.inner.count_nodes(kind).await
    }

    async fn store_summary_counts(&mut self, counts: SummaryCounts) -> StoreResult<()> {
        self.inner.store_summary_counts(counts).await
    }

    async fn summary_counts(&self) -> StoreResult<Option<SummaryCounts>> {
        self.inner.summary_counts().await
    }

    async fn snapshot(&self) -> StoreResult<GraphSnapshot> {
        self.inner.snapshot().await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }

    async fn save(&self) -> StoreResult<()> {
        in_memory::save_to_jsonl(&self.inner, &self.path).await
    }

    async fn reload(&mut self) -> StoreResult<()> {
        self.inner = load_or_empty(&self.path).await?;
        Ok(())
    }
}

/// Create a store instance for the given backend.
///
/// This factory function returns a trait object that can be used
/// polymorphically regardless of the backend implementation.
///
/// # Example
///
/// ```no_run
/// use blastradius::storage::{create_store, StoreBackend};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> anyhow::Result<()> {
///     let store = create_store(StoreBackend::InMemory).await?;
///     store.ping().await?;
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - `Error::Store` if the data file cannot be read or the database cannot
///   be reached
/// - `Error::Config` if the backend was not compiled into this build
pub async fn create_store(backend: StoreBackend) -> Result<Box<dyn GraphStore>> {
    match backend {
        StoreBackend::InMemory => Ok(in_memory::new_in_memory_store()),
        StoreBackend::Jsonl(path) => Ok(Box::new(JsonlBackedStore::open(path).await?)),
        #[cfg(feature = "neo4j")]
        StoreBackend::Neo4j(settings) => Ok(Box::new(neo4j::Neo4jStore::connect(&settings).await?)),
        #[cfg(not(feature = "neo4j"))]
        StoreBackend::Neo4j(_) => Err(crate::error::ConfigError::BackendNotCompiled(
            "neo4j".to_string(),
        )
        .into()),
    }
}

// ========== Test Utilities ==========

#[cfg(any(test, feature = "test-util"))]
mod recording;

#[cfg(any(test, feature = "test-util"))]
pub use recording::{FailurePoint, RecordingStore, StoreCall};

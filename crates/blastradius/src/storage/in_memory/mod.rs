//! In-memory graph store using petgraph.
//!
//! This module provides a fast, **ephemeral** store where the whole graph is
//! held in RAM and **lost when the process exits**, unless it is wrapped by the
//! JSONL backend, which writes the graph to its data file on `save()`.
//!
//! # Architecture
//!
//! The implementation uses:
//! - `petgraph::DiGraph` with one node per entity and one edge per relationship
//! - `HashMap<(EntityKind, String), NodeIndex>` for merge-by-name lookups
//! - A monotonically increasing counter for store identities
//!
//! ## Edge Direction
//!
//! Edges point in **dependency direction**, the way failure spreads:
//!
//! - **HOSTS**: `Datacenter -> Server`
//! - **RUNS**: `Server -> Application`
//! - **USES**: `Application -> BusinessFunction`
//!
//! The `Metadata` singleton is an ordinary node with no edges; its counts are
//! kept beside the graph.
//!
//! # Thread Safety
//!
//! The store is wrapped in `Arc<Mutex<InMemoryGraphInner>>`. Every operation
//! holds the lock for its whole duration, so a `merge_links` batch is atomic
//! with respect to other callers.

mod graph;
mod inner;
mod jsonl;
mod trait_impl;

use crate::storage::GraphStore;
use inner::InMemoryGraphInner;
use std::sync::Arc;
use tokio::sync::Mutex;

// Re-export public API
pub use jsonl::{LoadWarning, load_from_jsonl};
pub(crate) use jsonl::{load_store, save_to_jsonl};

/// Thread-safe in-memory store.
///
/// Implements [`GraphStore`] via the trait implementation in `trait_impl.rs`.
pub(crate) type InMemoryStore = Arc<Mutex<InMemoryGraphInner>>;

/// Create a new empty in-memory store.
///
/// # Example
///
/// ```
/// use blastradius::storage::GraphStore;
/// use blastradius::storage::in_memory::new_in_memory_store;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let store = new_in_memory_store();
///     assert!(store.snapshot().await.unwrap().nodes.is_empty());
/// }
/// ```
#[must_use]
pub fn new_in_memory_store() -> Box<dyn GraphStore> {
    Box::new(new_shared_store())
}

pub(crate) fn new_shared_store() -> InMemoryStore {
    Arc::new(Mutex::new(InMemoryGraphInner::new()))
}

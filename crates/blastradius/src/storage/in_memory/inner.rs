//! Core in-memory graph data structures.
//!
//! This module contains the inner graph structure that holds all data
//! and is wrapped in `Arc<Mutex<>>` for thread safety.

use crate::domain::{EntityKind, RelationshipKind, SummaryCounts};
use crate::error::{StoreError, StoreResult};
use crate::storage::SUMMARY_NODE_NAME;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Node weight: an entity with its store identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GraphNode {
    pub(crate) id: u64,
    pub(crate) kind: EntityKind,
    pub(crate) name: String,
}

/// Inner graph structure (not thread-safe).
///
/// Edges point in dependency direction: `Datacenter -> Server -> Application
/// -> BusinessFunction`, weighted by relationship kind.
pub(crate) struct InMemoryGraphInner {
    /// Entities and relationships.
    pub(super) graph: DiGraph<GraphNode, RelationshipKind>,

    /// Mapping from `(kind, name)` to graph node.
    ///
    /// Every node in `graph` has exactly one entry here.
    pub(super) node_map: HashMap<(EntityKind, String), NodeIndex>,

    /// Counts held by the `Metadata` singleton, if it exists.
    pub(super) summary: Option<SummaryCounts>,

    /// Next store identity to hand out. Never decreases, so identities are not
    /// reused after `clear`. `u64::MAX` is never handed out.
    next_id: u64,
}

impl InMemoryGraphInner {
    /// Create a new empty graph
    pub(crate) fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            summary: None,
            next_id: 1,
        }
    }

    /// Find or create the node for `(kind, name)`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IdsExhausted` if a new node is needed and no
    /// identity is left.
    pub(super) fn merge_node(&mut self, kind: EntityKind, name: &str) -> StoreResult<NodeIndex> {
        if let Some(&index) = self.node_map.get(&(kind, name.to_string())) {
            return Ok(index);
        }

        if self.remaining_ids() == 0 {
            return Err(StoreError::IdsExhausted);
        }
        self.insert_node(self.next_id, kind, name.to_string())
    }

    /// Insert a node with a known identity, as read back from disk.
    ///
    /// The caller must ensure `(kind, name)` is not present yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidFormat` for `u64::MAX`, which would leave no
    /// identity for the next node. The graph is unchanged.
    pub(super) fn insert_node(
        &mut self,
        id: u64,
        kind: EntityKind,
        name: String,
    ) -> StoreResult<NodeIndex> {
        let Some(next) = id.checked_add(1) else {
            return Err(StoreError::InvalidFormat(format!(
                "node id {id} is out of range"
            )));
        };

        let index = self.graph.add_node(GraphNode {
            id,
            kind,
            name: name.clone(),
        });
        self.node_map.insert((kind, name), index);
        self.next_id = self.next_id.max(next);
        Ok(index)
    }

    /// Number of identities `merge_node` can still hand out.
    pub(super) fn remaining_ids(&self) -> u64 {
        u64::MAX - self.next_id
    }

    /// Add `source -[kind]-> target` unless that exact edge exists.
    ///
    /// Returns `true` if an edge was added.
    pub(super) fn merge_edge(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        kind: RelationshipKind,
    ) -> bool {
        let exists = self
            .graph
            .edges_connecting(source, target)
            .any(|edge| *edge.weight() == kind);
        if !exists {
            self.graph.add_edge(source, target, kind);
        }
        !exists
    }

    /// Merge both endpoints and the relationship between them.
    pub(super) fn merge_relationship(
        &mut self,
        kind: RelationshipKind,
        source: &str,
        target: &str,
    ) -> StoreResult<()> {
        let source = self.merge_node(kind.source_kind(), source)?;
        let target = self.merge_node(kind.target_kind(), target)?;
        self.merge_edge(source, target, kind);
        Ok(())
    }

    /// Overwrite the `Metadata` singleton.
    pub(super) fn set_summary(&mut self, counts: SummaryCounts) -> StoreResult<()> {
        self.merge_node(EntityKind::Metadata, SUMMARY_NODE_NAME)?;
        self.summary = Some(counts);
        Ok(())
    }

    /// Number of live nodes of `kind`.
    pub(super) fn count(&self, kind: EntityKind) -> u64 {
        let count = self.node_map.keys().filter(|(k, _)| *k == kind).count();
        u64::try_from(count).unwrap_or(u64::MAX)
    }

    /// Remove every node, edge and the summary.
    pub(super) fn clear(&mut self) {
        self.graph.clear();
        self.node_map.clear();
        self.summary = None;
    }
}

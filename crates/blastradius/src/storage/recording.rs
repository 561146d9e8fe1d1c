//! A store that records every call and fails on request.

use super::in_memory::{InMemoryStore, new_shared_store};
use super::{GraphSnapshot, GraphStore};
use crate::domain::{EntityKind, Link, NodeId, RelationshipKind, SummaryCounts};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// One call made against a [`RecordingStore`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `merge_node(kind, name)`
    MergeNode(EntityKind, String),
    /// `merge_relationship(kind, ..)`
    MergeRelationship(RelationshipKind),
    /// `merge_links(kind, links)` with the batch size
    MergeLinks {
        /// Relationship kind of the batch
        kind: RelationshipKind,
        /// Number of links in the batch
        links: usize,
    },
    /// `delete_all()`
    DeleteAll,
    /// `count_nodes(kind)`
    CountNodes(EntityKind),
    /// `store_summary_counts(counts)`
    StoreSummaryCounts(SummaryCounts),
    /// `summary_counts()`
    SummaryCounts,
    /// `snapshot()`
    Snapshot,
    /// `ping()`
    Ping,
    /// `save()`
    Save,
    /// `reload()`
    Reload,
}

/// An operation a [`RecordingStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    /// `merge_links` for one relationship kind
    MergeLinks(RelationshipKind),
    /// `delete_all`
    DeleteAll,
    /// `count_nodes` for any kind
    CountNodes,
    /// `store_summary_counts`
    StoreSummaryCounts,
    /// `summary_counts`
    SummaryCounts,
    /// `snapshot`
    Snapshot,
    /// `ping`
    Ping,
}

/// In-memory store wrapper that logs calls and injects failures.
///
/// Calls are logged even when they fail. A failed call leaves the wrapped
/// store untouched.
///
/// # Availability
///
/// This type is available when:
/// - Running tests (`#[cfg(test)]`)
/// - The `test-util` feature is enabled
///
/// # Example
///
/// ```rust,ignore
/// use blastradius::storage::{FailurePoint, RecordingStore, StoreCall};
/// use blastradius::domain::RelationshipKind;
///
/// let mut store = RecordingStore::new().failing_on(FailurePoint::MergeLinks(RelationshipKind::Runs));
/// // run an import against `&mut store`, then inspect `store.calls()`
/// ```
pub struct RecordingStore {
    inner: InMemoryStore,
    calls: Mutex<Vec<StoreCall>>,
    failures: HashSet<FailurePoint>,
}

impl RecordingStore {
    /// Create an empty store that fails nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: new_shared_store(),
            calls: Mutex::new(Vec::new()),
            failures: HashSet::new(),
        }
    }

    /// Builder form of [`RecordingStore::fail_on`].
    #[must_use]
    pub fn failing_on(mut self, point: FailurePoint) -> Self {
        self.fail_on(point);
        self
    }

    /// Make every later call matching `point` fail.
    pub fn fail_on(&mut self, point: FailurePoint) {
        self.failures.insert(point);
    }

    /// Stop failing calls matching `point`.
    pub fn recover(&mut self, point: FailurePoint) {
        self.failures.remove(&point);
    }

    /// All calls so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the call log.
    pub fn clear_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, call: StoreCall, point: Option<FailurePoint>) -> StoreResult<()> {
        let description = format!("{call:?}");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        match point {
            Some(point) if self.failures.contains(&point) => Err(StoreError::Unavailable(
                format!("injected failure on {description}"),
            )),
            _ => Ok(()),
        }
    }
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for RecordingStore {
    async fn merge_node(&mut self, kind: EntityKind, name: &str) -> StoreResult<NodeId> {
        self.record(StoreCall::MergeNode(kind, name.to_string()), None)?;
        self.inner.merge_node(kind, name).await
    }

    async fn merge_relationship(
        &mut self,
        kind: RelationshipKind,
        source: &str,
        target: &str,
    ) -> StoreResult<()> {
        self.record(StoreCall::MergeRelationship(kind), None)?;
        self.inner.merge_relationship(kind, source, target).await
    }

    async fn merge_links(&mut self, kind: RelationshipKind, links: &[Link]) -> StoreResult<usize> {
        self.record(
            StoreCall::MergeLinks {
                kind,
                links: links.len(),
            },
            Some(FailurePoint::MergeLinks(kind)),
        )?;
        self.inner.merge_links(kind, links).await
    }

    async fn delete_all(&mut self) -> StoreResult<()> {
        self.record(StoreCall::DeleteAll, Some(FailurePoint::DeleteAll))?;
        self.inner.delete_all().await
    }

    async fn count_nodes(&self, kind: EntityKind) -> StoreResult<u64> {
        self.record(StoreCall::CountNodes(kind), Some(FailurePoint::CountNodes))?;
        self.inner.count_nodes(kind).await
    }

    async fn store_summary_counts(&mut self, counts: SummaryCounts) -> StoreResult<()> {
        self.record(
            StoreCall::StoreSummaryCounts(counts),
            Some(FailurePoint::StoreSummaryCounts),
        )?;
        self.inner.store_summary_counts(counts).await
    }

    async fn summary_counts(&self) -> StoreResult<Option<SummaryCounts>> {
        self.record(StoreCall::SummaryCounts, Some(FailurePoint::SummaryCounts))?;
        self.inner.summary_counts().await
    }

    async fn snapshot(&self) -> StoreResult<GraphSnapshot> {
        self.record(StoreCall::Snapshot, Some(FailurePoint::Snapshot))?;
        self.inner.snapshot().await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.record(StoreCall::Ping, Some(FailurePoint::Ping))
    }

    async fn save(&self) -> StoreResult<()> {
        self.record(StoreCall::Save, None)
    }

    async fn reload(&mut self) -> StoreResult<()> {
        self.record(StoreCall::Reload, None)
    }
}

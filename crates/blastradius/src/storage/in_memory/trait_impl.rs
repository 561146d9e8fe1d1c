//! `GraphStore` trait implementation for the in-memory store.

use super::graph::{merge_links_impl, snapshot_impl};
use super::InMemoryStore;
use crate::domain::{EntityKind, Link, NodeId, RelationshipKind, SummaryCounts};
use crate::error::StoreResult;
use crate::storage::{GraphSnapshot, GraphStore};
use async_trait::async_trait;

#[async_trait]
impl GraphStore for InMemoryStore {
    async fn merge_node(&mut self, kind: EntityKind, name: &str) -> StoreResult<NodeId> {
        let mut inner = self.lock().await;
        let index = inner.merge_node(kind, name)?;
        Ok(NodeId::from(inner.graph[index].id))
    }

    async fn merge_relationship(
        &mut self,
        kind: RelationshipKind,
        source: &str,
        target: &str,
    ) -> StoreResult<()> {
        let mut inner = self.lock().await;
        inner.merge_relationship(kind, source, target)
    }

    async fn merge_links(&mut self, kind: RelationshipKind, links: &[Link]) -> StoreResult<usize> {
        let mut inner = self.lock().await;
        merge_links_impl(&mut inner, kind, links)
    }

    async fn delete_all(&mut self) -> StoreResult<()> {
        let mut inner = self.lock().await;
        inner.clear();
        Ok(())
    }

    async fn count_nodes(&self, kind: EntityKind) -> StoreResult<u64> {
        let inner = self.lock().await;
        Ok(inner.count(kind))
    }

    async fn store_summary_counts(&mut self, counts: SummaryCounts) -> StoreResult<()> {
        let mut inner = self.lock().await;
        inner.set_summary(counts)
    }

    async fn summary_counts(&self) -> StoreResult<Option<SummaryCounts>> {
        let inner = self.lock().await;
        Ok(inner.summary)
    }

    async fn snapshot(&self) -> StoreResult<GraphSnapshot> {
        let inner = self.lock().await;
        Ok(snapshot_impl(&inner))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn save(&self) -> StoreResult<()> {
        // No-op: nothing to persist without a data file
        Ok(())
    }

    async fn reload(&mut self) -> StoreResult<()> {
        Ok(())
    }
}

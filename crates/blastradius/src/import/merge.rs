//! The graph merge engine: cleanup, per-kind batch merge and summary counts.

use crate::domain::{EntityKind, Link, RelationshipKind, SummaryCounts};
use crate::error::{Error, Result};
use crate::storage::GraphStore;
use tracing::{debug, info};

/// Drives the store through one import.
///
/// Holds the store only for the duration of the import; no handle outlives it.
pub struct GraphMerger<'a> {
    store: &'a mut dyn GraphStore,
}

impl<'a> GraphMerger<'a> {
    /// Wrap a store for one import.
    pub fn new(store: &'a mut dyn GraphStore) -> Self {
        Self { store }
    }

    /// Delete every entity and relationship.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreUnavailable`; the import must stop.
    pub async fn cleanup(&mut self) -> Result<()> {
        self.store
            .delete_all()
            .await
            .map_err(|source| Error::StoreUnavailable {
                operation: "cleanup",
                source,
            })?;
        info!("Cleared existing graph");
        Ok(())
    }

    /// Merge one kind's deduplicated links in a single batch.
    ///
    /// An empty batch issues no store operation. Returns the number of links
    /// merged.
    ///
    /// # Errors
    ///
    /// Returns `Error::RelationshipMerge` naming the kind; the caller may carry
    /// on with the next kind.
    pub async fn merge_kind(&mut self, kind: RelationshipKind, links: &[Link]) -> Result<usize> {
        if links.is_empty() {
            debug!(kind = %kind, "No links to merge");
            return Ok(0);
        }

        let merged = self
            .store
            .merge_links(kind, links)
            .await
            .map_err(|source| Error::RelationshipMerge { kind, source })?;
        info!(kind = %kind, links = merged, "Merged relationships");
        Ok(merged)
    }

    /// Count live entities of each estate kind and overwrite the summary record.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreUnavailable` if counting or storing fails.
    pub async fn store_summary_counts(&mut self) -> Result<SummaryCounts> {
        let unavailable = |source| Error::StoreUnavailable {
            operation: "summary counts",
            source,
        };

        let mut counts = SummaryCounts::default();
        for kind in EntityKind::ESTATE {
            let count = self.store.count_nodes(kind).await.map_err(unavailable)?;
            counts.set(kind, count);
        }

        self.store
            .store_summary_counts(counts)
            .await
            .map_err(unavailable)?;
        info!(
            datacenters = counts.total_dc,
            servers = counts.total_server,
            applications = counts.total_app,
            business_functions = counts.total_bf,
            "Stored summary counts"
        );
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FailurePoint, RecordingStore, StoreCall};

    #[tokio::test]
    async fn empty_kind_issues_no_store_call() {
        let mut store = RecordingStore::new();
        let merged = GraphMerger::new(&mut store)
            .merge_kind(RelationshipKind::Runs, &[])
            .await
            .unwrap();

        assert_eq!(merged, 0);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_kind_names_the_kind() {
        let mut store =
            RecordingStore::new().failing_on(FailurePoint::MergeLinks(RelationshipKind::Uses));
        let links = [Link::new(RelationshipKind::Uses, "App1".into(), "BF1".into())];

        let result = GraphMerger::new(&mut store)
            .merge_kind(RelationshipKind::Uses, &links)
            .await;

        assert!(matches!(
            result,
            Err(Error::RelationshipMerge {
                kind: RelationshipKind::Uses,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn cleanup_failure_is_store_unavailable() {
        let mut store = RecordingStore::new().failing_on(FailurePoint::DeleteAll);

        let result = GraphMerger::new(&mut store).cleanup().await;

        assert!(matches!(
            result,
            Err(Error::StoreUnavailable {
                operation: "cleanup",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn summary_counts_write_zeros() {
        let mut store = RecordingStore::new();
        store
            .merge_relationship(RelationshipKind::Hosts, "DC1", "Server1")
            .await
            .unwrap();
        store.clear_calls();

        let counts = GraphMerger::new(&mut store)
            .store_summary_counts()
            .await
            .unwrap();

        let expected = SummaryCounts {
            total_dc: 1,
            total_server: 1,
            total_app: 0,
            total_bf: 0,
        };
        assert_eq!(counts, expected);
        assert_eq!(
            store.calls().last(),
            Some(&StoreCall::StoreSummaryCounts(expected))
        );
    }

    #[tokio::test]
    async fn count_failure_stores_nothing() {
        let mut store = RecordingStore::new().failing_on(FailurePoint::CountNodes);

        let result = GraphMerger::new(&mut store).store_summary_counts().await;

        assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
        assert!(
            !store
                .calls()
                .iter()
                .any(|call| matches!(call, StoreCall::StoreSummaryCounts(_)))
        );
    }
}

//! Graph reads and batch writes on the in-memory store.

use super::inner::InMemoryGraphInner;
use crate::domain::{Link, NodeId, RelationshipKind};
use crate::error::{StoreError, StoreResult};
use crate::storage::{GraphSnapshot, StoredNode, StoredRelationship};
use petgraph::visit::EdgeRef;

/// Apply a batch of links of one kind.
///
/// Every link is checked before the first one is applied, so a rejected batch
/// leaves the graph untouched. A batch needs at most two fresh identities per
/// link.
pub(super) fn merge_links_impl(
    inner: &mut InMemoryGraphInner,
    kind: RelationshipKind,
    links: &[Link],
) -> StoreResult<usize> {
    if let Some(mismatch) = links.iter().find(|link| link.kind() != kind) {
        return Err(StoreError::MismatchedLink {
            expected: kind,
            found: mismatch.kind(),
        });
    }

    let needed = u64::try_from(links.len()).map_or(u64::MAX, |n| n.saturating_mul(2));
    if needed > inner.remaining_ids() {
        return Err(StoreError::IdsExhausted);
    }

    for link in links {
        let (source, target) = link.endpoints();
        inner.merge_relationship(kind, source, target)?;
    }

    Ok(links.len())
}

/// Copy out every node and relationship, nodes in creation order.
pub(super) fn snapshot_impl(inner: &InMemoryGraphInner) -> GraphSnapshot {
    let graph = &inner.graph;

    let nodes = graph
        .node_indices()
        .map(|index| {
            let node = &graph[index];
            StoredNode {
                id: NodeId::from(node.id),
                labels: vec![node.kind.label().to_string()],
                name: Some(node.name.clone()),
            }
        })
        .collect();

    let relationships = graph
        .edge_references()
        .map(|edge| StoredRelationship {
            source: NodeId::from(graph[edge.source()].id),
            kind: edge.weight().as_str().to_string(),
            target: NodeId::from(graph[edge.target()].id),
        })
        .collect();

    GraphSnapshot {
        nodes,
        relationships,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityKind;

    #[test]
    fn mismatched_batch_is_rejected_without_changes() {
        let mut inner = InMemoryGraphInner::new();
        let links = vec![
            Link::new(RelationshipKind::Hosts, "DC1".into(), "Server1".into()),
            Link::new(RelationshipKind::Runs, "Server1".into(), "App1".into()),
        ];

        let result = merge_links_impl(&mut inner, RelationshipKind::Hosts, &links);

        assert!(matches!(
            result,
            Err(StoreError::MismatchedLink {
                expected: RelationshipKind::Hosts,
                found: RelationshipKind::Runs,
            })
        ));
        assert_eq!(inner.graph.node_count(), 0);
    }

    #[test]
    fn snapshot_reports_labels_and_endpoints() {
        let mut inner = InMemoryGraphInner::new();
        merge_links_impl(
            &mut inner,
            RelationshipKind::Uses,
            &[Link::new(RelationshipKind::Uses, "App1".into(), "BF1".into())],
        )
        .unwrap();

        let snapshot = snapshot_impl(&inner);

        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].labels, vec!["Application"]);
        assert_eq!(snapshot.nodes[1].name.as_deref(), Some("BF1"));
        assert_eq!(snapshot.relationships.len(), 1);
        let rel = &snapshot.relationships[0];
        assert_eq!(rel.kind, "USES");
        assert_eq!(rel.source, snapshot.nodes[0].id);
        assert_eq!(rel.target, snapshot.nodes[1].id);
        assert_eq!(inner.count(EntityKind::BusinessFunction), 1);
    }

    #[test]
    fn batch_without_identity_headroom_is_rejected_up_front() {
        let mut inner = InMemoryGraphInner::new();
        inner
            .insert_node(u64::MAX - 3, EntityKind::Datacenter, "DC0".to_string())
            .unwrap();
        let links = vec![
            Link::new(RelationshipKind::Hosts, "DC1".into(), "Server1".into()),
            Link::new(RelationshipKind::Hosts, "DC2".into(), "Server2".into()),
        ];

        let result = merge_links_impl(&mut inner, RelationshipKind::Hosts, &links);

        assert!(matches!(result, Err(StoreError::IdsExhausted)));
        assert_eq!(inner.graph.node_count(), 1);
    }
}

//! Render-ready views of the stored graph.
//!
//! [`project`] turns one consistent store snapshot into nodes and edges with
//! stable ids and palette colors; the `Metadata` record is left out.
//! [`project_summary`] builds the four-node overview from the summary counts.

pub mod palette;

use crate::domain::{Color, EntityKind, NodeId, RelationshipKind, SummaryCounts};
use crate::error::{Error, Result};
use crate::storage::{GraphSnapshot, GraphStore};
use serde::Serialize;
use tracing::debug;

/// Label and kind used when a stored node lacks them.
pub const UNKNOWN: &str = "Unknown";

/// A node ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderNode {
    /// Stable id (store identity stringified)
    pub id: NodeId,
    /// The entity's name
    pub label: String,
    /// Entity kind label
    pub kind: String,
    /// Palette color
    pub color: Color,
}

/// An edge ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderEdge {
    /// `"{from}_{to}_{kind}"`
    pub id: String,
    /// Source node id
    pub from: NodeId,
    /// Target node id
    pub to: NodeId,
    /// Relationship type
    pub kind: String,
    /// Palette color
    pub color: Color,
}

/// Nodes and edges of one projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphView {
    /// Projected nodes
    pub nodes: Vec<RenderNode>,
    /// Projected edges
    pub edges: Vec<RenderEdge>,
}

impl GraphView {
    /// Look up a node by id.
    #[must_use]
    pub fn find_node(&self, id: &NodeId) -> Option<&RenderNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Resolve a user-facing selector to a node id.
    ///
    /// A selector is tried as a node id, then as `Kind:Name`, then as a name
    /// that must match exactly one node.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownNode` if nothing matches
    /// - `Error::AmbiguousNode` if a bare name matches several nodes
    pub fn resolve(&self, selector: &str) -> Result<NodeId> {
        let selector = selector.trim();
        if let Some(node) = self.find_node(&NodeId::from(selector)) {
            return Ok(node.id.clone());
        }

        if let Some((kind, name)) = selector.split_once(':')
            && let Ok(kind) = kind.trim().parse::<EntityKind>()
        {
            let name = name.trim();
            return self
                .nodes
                .iter()
                .find(|node| node.kind == kind.label() && node.label == name)
                .map(|node| node.id.clone())
                .ok_or_else(|| Error::UnknownNode(selector.to_string()));
        }

        let mut matches = self.nodes.iter().filter(|node| node.label == selector);
        match (matches.next(), matches.count()) {
            (Some(node), 0) => Ok(node.id.clone()),
            (Some(_), others) => Err(Error::AmbiguousNode {
                selector: selector.to_string(),
                matches: others + 1,
            }),
            (None, _) => Err(Error::UnknownNode(selector.to_string())),
        }
    }
}

/// Stable id of a projected edge.
#[must_use]
pub fn edge_id(from: &NodeId, to: &NodeId, kind: &str) -> String {
    format!("{from}_{to}_{kind}")
}

/// Turn a store snapshot into a render view.
#[must_use]
pub fn project_snapshot(snapshot: GraphSnapshot) -> GraphView {
    let metadata = EntityKind::Metadata.label();
    let nodes: Vec<RenderNode> = snapshot
        .nodes
        .into_iter()
        .filter(|node| !node.has_label(metadata))
        .map(|node| {
            let kind = node
                .labels
                .into_iter()
                .next()
                .unwrap_or_else(|| UNKNOWN.to_string());
            RenderNode {
                id: node.id,
                label: node.name.unwrap_or_else(|| UNKNOWN.to_string()),
                color: palette::node_color(&kind),
                kind,
            }
        })
        .collect();

    let edges = snapshot
        .relationships
        .into_iter()
        .map(|rel| RenderEdge {
            id: edge_id(&rel.source, &rel.target, &rel.kind),
            color: palette::edge_color(&rel.kind),
            from: rel.source,
            to: rel.target,
            kind: rel.kind,
        })
        .collect();

    GraphView { nodes, edges }
}

/// Project the whole graph from one consistent read.
///
/// # Errors
///
/// Returns `Error::Projection` if the read fails; no partial view is returned.
pub async fn project(store: &dyn GraphStore) -> Result<GraphView> {
    let snapshot = store.snapshot().await.map_err(Error::Projection)?;
    let view = project_snapshot(snapshot);
    debug!(
        nodes = view.nodes.len(),
        edges = view.edges.len(),
        "Projected graph"
    );
    Ok(view)
}

const SUMMARY_EDGES: [(&str, usize, usize, RelationshipKind); 3] = [
    ("summary-dc-sv", 0, 1, RelationshipKind::Hosts),
    ("summary-sv-app", 1, 2, RelationshipKind::Runs),
    ("summary-app-bf", 2, 3, RelationshipKind::Uses),
];

/// Build the four-node overview from stored counts.
#[must_use]
pub fn summary_view(counts: SummaryCounts) -> GraphView {
    let nodes: Vec<RenderNode> = EntityKind::ESTATE
        .iter()
        .enumerate()
        .map(|(index, &kind)| RenderNode {
            id: NodeId::new(format!("summary-{index}")),
            label: format!("{} ({})", palette::summary_title(kind), counts.get(kind)),
            kind: kind.label().to_string(),
            color: palette::entity_color(kind),
        })
        .collect();

    let edges = SUMMARY_EDGES
        .iter()
        .map(|&(id, from, to, kind)| RenderEdge {
            id: id.to_string(),
            from: nodes[from].id.clone(),
            to: nodes[to].id.clone(),
            kind: kind.as_str().to_string(),
            color: palette::relationship_color(kind),
        })
        .collect();

    GraphView { nodes, edges }
}

/// Project the summary overview.
///
/// A store that has never been imported into reads as all zeros.
///
/// # Errors
///
/// Returns `Error::Projection` if the counts cannot be read.
pub async fn project_summary(store: &dyn GraphStore) -> Result<GraphView> {
    let counts = store
        .summary_counts()
        .await
        .map_err(Error::Projection)?
        .unwrap_or_default();
    Ok(summary_view(counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::in_memory::new_in_memory_store;
    use crate::storage::{FailurePoint, RecordingStore, StoredNode, StoredRelationship};

    fn node(id: &str, labels: &[&str], name: Option<&str>) -> StoredNode {
        StoredNode {
            id: NodeId::from(id),
            labels: labels.iter().map(ToString::to_string).collect(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn metadata_is_excluded_and_defaults_apply() {
        let snapshot = GraphSnapshot {
            nodes: vec![
                node("0", &["Datacenter"], Some("DC1")),
                node("1", &["Metadata"], Some("SummaryCounts")),
                node("2", &[], None),
            ],
            relationships: vec![StoredRelationship {
                source: NodeId::from("0"),
                kind: "OWNS".to_string(),
                target: NodeId::from("2"),
            }],
        };

        let view = project_snapshot(snapshot);

        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.nodes[0].color, Color("#f47535"));
        assert_eq!(view.nodes[1].label, UNKNOWN);
        assert_eq!(view.nodes[1].kind, UNKNOWN);
        assert_eq!(view.nodes[1].color, palette::DEFAULT);
        assert_eq!(view.edges[0].id, "0_2_OWNS");
        assert_eq!(view.edges[0].color, palette::DEFAULT);
    }

    #[tokio::test]
    async fn projection_reads_store() {
        let mut store = new_in_memory_store();
        store
            .merge_relationship(RelationshipKind::Hosts, "DC1", "Server1")
            .await
            .unwrap();
        store
            .store_summary_counts(SummaryCounts {
                total_dc: 1,
                total_server: 1,
                ..SummaryCounts::default()
            })
            .await
            .unwrap();

        let view = project(store.as_ref()).await.unwrap();

        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.edges.len(), 1);
        let edge = &view.edges[0];
        assert_eq!(edge.id, format!("{}_{}_HOSTS", edge.from, edge.to));
        assert_eq!(edge.color, Color("#f6a565"));
    }

    #[tokio::test]
    async fn failed_read_is_projection_error() {
        let store = RecordingStore::new().failing_on(FailurePoint::Snapshot);

        let result = project(&store).await;

        assert!(matches!(result, Err(Error::Projection(_))));
    }

    #[tokio::test]
    async fn summary_defaults_to_zero() {
        let store = new_in_memory_store();

        let view = project_summary(store.as_ref()).await.unwrap();

        let labels: Vec<&str> = view.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Datacenter (0)",
                "Server (0)",
                "IT Application (0)",
                "Business Function (0)"
            ]
        );
    }

    #[test]
    fn summary_has_fixed_ids_and_edges() {
        let view = summary_view(SummaryCounts {
            total_dc: 2,
            total_server: 10,
            total_app: 5,
            total_bf: 3,
        });

        assert_eq!(view.nodes[1].id, NodeId::from("summary-1"));
        assert_eq!(view.nodes[1].label, "Server (10)");
        let edges: Vec<(&str, &str, &str)> = view
            .edges
            .iter()
            .map(|e| (e.id.as_str(), e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("summary-dc-sv", "summary-0", "summary-1"),
                ("summary-sv-app", "summary-1", "summary-2"),
                ("summary-app-bf", "summary-2", "summary-3"),
            ]
        );
    }

    fn view() -> GraphView {
        project_snapshot(GraphSnapshot {
            nodes: vec![
                node("0", &["Server"], Some("Shared")),
                node("1", &["Application"], Some("Shared")),
                node("2", &["Application"], Some("App1")),
            ],
            relationships: vec![],
        })
    }

    #[test]
    fn resolve_by_id_kind_and_name() {
        let view = view();
        assert_eq!(view.resolve("1").unwrap(), NodeId::from("1"));
        assert_eq!(view.resolve("server:Shared").unwrap(), NodeId::from("0"));
        assert_eq!(view.resolve(" App1 ").unwrap(), NodeId::from("2"));
    }

    #[test]
    fn resolve_rejects_ambiguous_and_unknown() {
        let view = view();
        assert!(matches!(
            view.resolve("Shared"),
            Err(Error::AmbiguousNode { matches: 2, .. })
        ));
        assert!(matches!(view.resolve("App9"), Err(Error::UnknownNode(_))));
        assert!(matches!(
            view.resolve("Datacenter:Shared"),
            Err(Error::UnknownNode(_))
        ));
    }
}

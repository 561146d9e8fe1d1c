//! Forward failure propagation over a projected graph.
//!
//! A [`FailureSimulation`] holds the manually failed roots and the impacted
//! set derived from them: every node reachable from a root along `HOSTS`,
//! `RUNS` and `USES` edges, roots included. Impacted nodes take the failed
//! color; each node remembers its color from before it first turned red and
//! gets it back when it leaves the impacted set.
//!
//! The simulation is synchronous and does no I/O. The impacted set is
//! recomputed from the roots on every toggle.

use crate::domain::{Color, NodeId, RelationshipKind};
use crate::error::{Error, Result};
use crate::import::dedupe;
use crate::projection::{GraphView, palette};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
struct NodeState {
    /// Color before the node entered the impacted set
    original_color: Option<Color>,
}

/// Failure state layered over one projection.
#[derive(Debug, Clone)]
pub struct FailureSimulation {
    view: GraphView,
    graph: DiGraph<NodeId, RelationshipKind>,
    index: HashMap<NodeId, NodeIndex>,
    states: Vec<NodeState>,
    failed_roots: BTreeSet<NodeId>,
    impacted: BTreeSet<NodeId>,
}

impl FailureSimulation {
    /// Start a simulation with no failures.
    ///
    /// Only dependency edges (`HOSTS`, `RUNS`, `USES`) between projected nodes
    /// carry failure; other edges are kept for rendering only.
    #[must_use]
    pub fn new(view: &GraphView) -> Self {
        let mut graph = DiGraph::with_capacity(view.nodes.len(), view.edges.len());
        let mut index = HashMap::with_capacity(view.nodes.len());
        for node in &view.nodes {
            let idx = graph.add_node(node.id.clone());
            index.insert(node.id.clone(), idx);
        }

        for edge in &view.edges {
            let Ok(kind) = edge.kind.parse::<RelationshipKind>() else {
                continue;
            };
            if kind.as_str() != edge.kind {
                continue;
            }
            if let (Some(&from), Some(&to)) = (index.get(&edge.from), index.get(&edge.to)) {
                graph.add_edge(from, to, kind);
            }
        }

        Self {
            states: vec![NodeState::default(); view.nodes.len()],
            view: view.clone(),
            graph,
            index,
            failed_roots: BTreeSet::new(),
            impacted: BTreeSet::new(),
        }
    }

    /// Toggle each selected node in the failed roots and recompute.
    ///
    /// Repeated ids in one selection toggle once. An empty selection changes
    /// nothing. Returns the new impacted set.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if any id is not in the projection; the
    /// state is left unchanged.
    pub fn toggle_failure(&mut self, selected: &[NodeId]) -> Result<&BTreeSet<NodeId>> {
        if let Some(unknown) = selected.iter().find(|id| !self.index.contains_key(id)) {
            return Err(Error::UnknownNode(unknown.to_string()));
        }
        if selected.is_empty() {
            return Ok(&self.impacted);
        }

        for id in dedupe(selected.iter().cloned()) {
            if !self.failed_roots.remove(&id) {
                self.failed_roots.insert(id);
            }
        }

        self.recompute();
        debug!(
            roots = self.failed_roots.len(),
            impacted = self.impacted.len(),
            "Recomputed impacted set"
        );
        Ok(&self.impacted)
    }

    /// Clear every failure and restore all original colors.
    pub fn reset(&mut self) {
        self.failed_roots.clear();
        self.recompute();
    }

    /// Nodes marked failed by hand.
    #[must_use]
    pub fn failed_roots(&self) -> &BTreeSet<NodeId> {
        &self.failed_roots
    }

    /// Nodes currently failed, roots included.
    #[must_use]
    pub fn impacted_set(&self) -> &BTreeSet<NodeId> {
        &self.impacted
    }

    /// Returns `true` if `id` is in the impacted set.
    #[must_use]
    pub fn is_impacted(&self, id: &NodeId) -> bool {
        self.impacted.contains(id)
    }

    /// Current render color of a node.
    #[must_use]
    pub fn color_of(&self, id: &NodeId) -> Option<Color> {
        self.index
            .get(id)
            .map(|idx| self.view.nodes[idx.index()].color)
    }

    /// The projection with current colors applied.
    #[must_use]
    pub fn render(&self) -> &GraphView {
        &self.view
    }

    fn recompute(&mut self) {
        let reached = self.reachable_from_roots();

        for (position, node) in self.view.nodes.iter_mut().enumerate() {
            let state = &mut self.states[position];
            if reached.contains(&NodeIndex::new(position)) {
                if state.original_color.is_none() {
                    state.original_color = Some(node.color);
                }
                node.color = palette::FAILED;
            } else if let Some(original) = state.original_color.take() {
                node.color = original;
            }
        }

        self.impacted = reached
            .into_iter()
            .map(|idx| self.graph[idx].clone())
            .collect();
    }

    /// BFS from every root; each node is visited once.
    fn reachable_from_roots(&self) -> HashSet<NodeIndex> {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();

        for root in &self.failed_roots {
            if let Some(&idx) = self.index.get(root)
                && visited.insert(idx)
            {
                queue.push_back(idx);
            }
        }

        while let Some(current) = queue.pop_front() {
            for next in self.graph.neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{RenderEdge, RenderNode, edge_id};
    use proptest::prelude::*;

    fn view(nodes: &[(&str, &str)], edges: &[(&str, &str, &str)]) -> GraphView {
        GraphView {
            nodes: nodes
                .iter()
                .map(|&(id, kind)| RenderNode {
                    id: NodeId::from(id),
                    label: id.to_string(),
                    kind: kind.to_string(),
                    color: palette::node_color(kind),
                })
                .collect(),
            edges: edges
                .iter()
                .map(|&(from, to, kind)| RenderEdge {
                    id: edge_id(&NodeId::from(from), &NodeId::from(to), kind),
                    from: NodeId::from(from),
                    to: NodeId::from(to),
                    kind: kind.to_string(),
                    color: palette::edge_color(kind),
                })
                .collect(),
        }
    }

    fn chain() -> GraphView {
        view(
            &[
                ("dc", "Datacenter"),
                ("sv", "Server"),
                ("app", "Application"),
                ("bf", "BusinessFunction"),
            ],
            &[
                ("dc", "sv", "HOSTS"),
                ("sv", "app", "RUNS"),
                ("app", "bf", "USES"),
            ],
        )
    }

    fn ids(names: &[&str]) -> BTreeSet<NodeId> {
        names.iter().map(|&n| NodeId::from(n)).collect()
    }

    #[test]
    fn failing_datacenter_reaches_everything_downstream() {
        let mut sim = FailureSimulation::new(&chain());

        let impacted = sim.toggle_failure(&[NodeId::from("dc")]).unwrap();

        assert_eq!(impacted, &ids(&["dc", "sv", "app", "bf"]));
        assert!(
            sim.render()
                .nodes
                .iter()
                .all(|node| node.color == palette::FAILED)
        );
    }

    #[test]
    fn propagation_is_forward_only() {
        let mut sim = FailureSimulation::new(&chain());

        sim.toggle_failure(&[NodeId::from("app")]).unwrap();

        assert_eq!(sim.impacted_set(), &ids(&["app", "bf"]));
        assert_eq!(
            sim.color_of(&NodeId::from("sv")),
            Some(palette::node_color("Server"))
        );
    }

    #[test]
    fn leaf_marks_only_itself() {
        let mut sim = FailureSimulation::new(&chain());

        sim.toggle_failure(&[NodeId::from("bf")]).unwrap();

        assert_eq!(sim.impacted_set(), &ids(&["bf"]));
    }

    #[test]
    fn toggling_twice_restores_original_colors() {
        let original = chain();
        let mut sim = FailureSimulation::new(&original);

        sim.toggle_failure(&[NodeId::from("sv")]).unwrap();
        sim.toggle_failure(&[NodeId::from("sv")]).unwrap();

        assert!(sim.impacted_set().is_empty());
        assert!(sim.failed_roots().is_empty());
        assert_eq!(sim.render(), &original);
    }

    #[test]
    fn shared_node_stays_failed_until_no_root_reaches_it() {
        let graph = view(
            &[("a", "Server"), ("b", "Server"), ("x", "Application")],
            &[("a", "x", "RUNS"), ("b", "x", "RUNS")],
        );
        let x = NodeId::from("x");
        let mut sim = FailureSimulation::new(&graph);

        sim.toggle_failure(&[NodeId::from("a"), NodeId::from("b")])
            .unwrap();
        sim.toggle_failure(&[NodeId::from("a")]).unwrap();
        assert_eq!(sim.color_of(&x), Some(palette::FAILED));

        sim.toggle_failure(&[NodeId::from("b")]).unwrap();
        assert_eq!(sim.color_of(&x), Some(palette::node_color("Application")));
    }

    #[test]
    fn empty_selection_is_a_no_op() {
        let mut sim = FailureSimulation::new(&chain());
        sim.toggle_failure(&[NodeId::from("app")]).unwrap();

        let impacted = sim.toggle_failure(&[]).unwrap().clone();

        assert_eq!(impacted, ids(&["app", "bf"]));
    }

    #[test]
    fn repeated_id_in_one_selection_toggles_once() {
        let mut sim = FailureSimulation::new(&chain());

        sim.toggle_failure(&[NodeId::from("bf"), NodeId::from("bf")])
            .unwrap();

        assert_eq!(sim.failed_roots(), &ids(&["bf"]));
    }

    #[test]
    fn unknown_id_changes_nothing() {
        let mut sim = FailureSimulation::new(&chain());

        let result = sim.toggle_failure(&[NodeId::from("dc"), NodeId::from("nope")]);

        assert!(matches!(result, Err(Error::UnknownNode(id)) if id == "nope"));
        assert!(sim.failed_roots().is_empty());
        assert!(sim.impacted_set().is_empty());
    }

    #[test]
    fn non_dependency_edges_do_not_carry_failure() {
        let graph = view(
            &[("a", "Server"), ("b", "Server")],
            &[("a", "b", "REPLICATES")],
        );
        let mut sim = FailureSimulation::new(&graph);

        sim.toggle_failure(&[NodeId::from("a")]).unwrap();

        assert_eq!(sim.impacted_set(), &ids(&["a"]));
    }

    #[test]
    fn reset_restores_everything() {
        let original = chain();
        let mut sim = FailureSimulation::new(&original);
        sim.toggle_failure(&[NodeId::from("dc"), NodeId::from("app")])
            .unwrap();

        sim.reset();

        assert!(sim.impacted_set().is_empty());
        assert_eq!(sim.render(), &original);
    }

    fn closure(size: usize, edges: &[(usize, usize)], roots: &BTreeSet<usize>) -> BTreeSet<usize> {
        let mut reached: BTreeSet<usize> = roots.clone();
        loop {
            let before = reached.len();
            for &(from, to) in edges {
                if reached.contains(&from) && to < size {
                    reached.insert(to);
                }
            }
            if reached.len() == before {
                return reached;
            }
        }
    }

    proptest! {
        #[test]
        fn impacted_set_is_exact_forward_closure(
            edges in prop::collection::vec((0usize..12, 0usize..12), 0..40),
            toggles in prop::collection::vec(0usize..12, 0..10),
        ) {
            let names: Vec<String> = (0..12).map(|i| i.to_string()).collect();
            let nodes: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "Server")).collect();
            let edge_refs: Vec<(&str, &str, &str)> = edges
                .iter()
                .map(|&(a, b)| (names[a].as_str(), names[b].as_str(), "RUNS"))
                .collect();
            let graph = view(&nodes, &edge_refs);
            let mut sim = FailureSimulation::new(&graph);

            let mut roots = BTreeSet::new();
            for t in toggles {
                sim.toggle_failure(&[NodeId::from(t.to_string())]).unwrap();
                if !roots.remove(&t) {
                    roots.insert(t);
                }

                let expected: BTreeSet<NodeId> = closure(12, &edges, &roots)
                    .into_iter()
                    .map(|i| NodeId::from(i.to_string()))
                    .collect();
                prop_assert_eq!(sim.impacted_set(), &expected);
                for node in &sim.render().nodes {
                    let failed = expected.contains(&node.id);
                    prop_assert_eq!(node.color == palette::FAILED, failed);
                }
            }

            sim.reset();
            prop_assert_eq!(sim.render(), &graph);
        }
    }
}

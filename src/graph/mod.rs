//! The functional graph induced by the Kaprekar map.
//!
//! Nodes are raw values or canonical signatures (see [`NodeKind`]) and every node that has
//! been assigned a successor has *exactly one* outgoing edge, because the map is a function.
//! Many edges can enter the same node, representing converging trajectories. Edges carry a
//! weight counting how many times they were inserted, which allows pruning of rarely visited
//! parts of graphs built from random samples.


use crate::digits::Width;
use crate::error::{KaprekarError, KaprekarResult};
use crate::log_graph;
use crate::trace::Trajectory;
use crate::transform::{NodeKind, Transformer};
use cancel_this::is_cancelled;
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};

/// The single outgoing edge of a node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedEdge {
    pub target: u64,
    pub weight: u64,
}

#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionalGraph {
    width: Width,
    kind: NodeKind,
    successors: BTreeMap<u64, WeightedEdge>,
    nodes: BTreeSet<u64>,
}

impl FunctionalGraph {
    /// Create an empty graph for nodes of the given width and kind.
    pub fn new(width: Width, kind: NodeKind) -> FunctionalGraph {
        FunctionalGraph {
            width,
            kind,
            successors: BTreeMap::new(),
            nodes: BTreeSet::new(),
        }
    }

    /// Build a graph from a batch of trajectories.
    pub fn from_trajectories<'a, I>(
        width: Width,
        kind: NodeKind,
        trajectories: I,
    ) -> KaprekarResult<FunctionalGraph>
    where
        I: IntoIterator<Item = &'a Trajectory>,
    {
        let mut graph = FunctionalGraph::new(width, kind);
        for trajectory in trajectories {
            graph.add_trajectory(trajectory)?;
        }
        info!("Built graph from trajectories ({}).", log_graph(&graph));
        Ok(graph)
    }

    /// Build the graph reachable from `seeds` directly, without recording trajectories.
    ///
    /// Each walk stops as soon as it reaches a node whose successor is already known, so
    /// every edge is computed exactly once and all edges have weight `1`. Exploring from
    /// every canonical signature yields the complete class graph.
    pub fn explore<I>(
        transformer: &Transformer,
        kind: NodeKind,
        seeds: I,
    ) -> KaprekarResult<FunctionalGraph>
    where
        I: IntoIterator<Item = u64>,
    {
        let width = transformer.width();
        let mut graph = FunctionalGraph::new(width, kind);
        let mut walks = 0usize;
        for seed in seeds {
            is_cancelled!()?;
            let mut current = transformer.node_of(width.check(seed)?, kind);
            graph.nodes.insert(current);
            while !graph.successors.contains_key(&current) {
                let next = transformer.step(current, kind);
                graph.successors.insert(
                    current,
                    WeightedEdge {
                        target: next,
                        weight: 1,
                    },
                );
                graph.nodes.insert(next);
                current = next;
            }
            walks += 1;
        }
        info!(
            "[width:{}] Explored {} seeds ({}).",
            width,
            walks,
            log_graph(&graph)
        );
        Ok(graph)
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn node_kind(&self) -> NodeKind {
        self.kind
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.len()
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> u64 {
        self.successors.values().map(|edge| edge.weight).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: u64) -> bool {
        self.nodes.contains(&node)
    }

    /// All nodes in increasing order.
    pub fn nodes(&self) -> impl Iterator<Item = u64> + '_ {
        self.nodes.iter().copied()
    }

    /// All edges, ordered by their source node.
    pub fn edges(&self) -> impl Iterator<Item = (u64, WeightedEdge)> + '_ {
        self.successors.iter().map(|(source, edge)| (*source, *edge))
    }

    /// The successor of `node`, if it has been assigned one.
    pub fn successor(&self, node: u64) -> Option<u64> {
        self.successors.get(&node).map(|edge| edge.target)
    }

    pub fn edge(&self, node: u64) -> Option<WeightedEdge> {
        self.successors.get(&node).copied()
    }

    /// Either `0` or `1`.
    pub fn out_degree(&self, node: u64) -> usize {
        usize::from(self.successors.contains_key(&node))
    }

    /// The reverse adjacency: for every node with at least one predecessor, the sorted
    /// list of its predecessors.
    pub fn predecessors(&self) -> BTreeMap<u64, Vec<u64>> {
        let mut reverse: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
        for (source, edge) in &self.successors {
            reverse.entry(edge.target).or_default().push(*source);
        }
        reverse
    }

    /// Insert the edge `source -> target`, or increase its weight by `weight` if it exists.
    ///
    /// Fails with [`KaprekarError::InconsistentEdge`] if `source` already has a different
    /// successor. The graph is unchanged in that case.
    pub fn add_edge(&mut self, source: u64, target: u64, weight: u64) -> KaprekarResult<()> {
        self.check_edge(source, target)?;
        self.insert_edge(source, target, weight);
        Ok(())
    }

    /// Insert (or reinforce) every edge of `trajectory`, including the one closing its cycle.
    ///
    /// Either all edges are inserted or, on error, none of them.
    pub fn add_trajectory(&mut self, trajectory: &Trajectory) -> KaprekarResult<()> {
        self.check_compatible(trajectory.width(), trajectory.node_kind())?;
        for (source, target) in trajectory.edges() {
            self.check_edge(source, target)?;
        }
        for (source, target) in trajectory.edges() {
            self.insert_edge(source, target, 1);
        }
        Ok(())
    }

    /// Merge another graph into this one, adding up the weights of shared edges. Used to
    /// combine graphs built independently by parallel workers.
    ///
    /// Either the whole graph is merged or, on error, nothing is changed.
    pub fn merge(&mut self, other: &FunctionalGraph) -> KaprekarResult<()> {
        self.check_compatible(other.width, other.kind)?;
        for (source, edge) in &other.successors {
            self.check_edge(*source, edge.target)?;
        }
        for (source, edge) in &other.successors {
            self.insert_edge(*source, edge.target, edge.weight);
        }
        self.nodes.extend(other.nodes.iter().copied());
        debug!("Merged graph ({}).", log_graph(self));
        Ok(())
    }

    /// A copy of this graph without edges of weight below `min_weight` and without the
    /// nodes that are left with no incident edges.
    pub fn prune_by_weight(&self, min_weight: u64) -> FunctionalGraph {
        let pruned = self.restrict(|_, edge| edge.weight >= min_weight);
        debug!(
            "Pruned edges below weight {}: ({}) -> ({}).",
            min_weight,
            log_graph(self),
            log_graph(&pruned)
        );
        pruned
    }

    /// A copy of this graph retaining only the edges accepted by `keep`, and the nodes
    /// incident to them.
    pub fn restrict<F>(&self, keep: F) -> FunctionalGraph
    where
        F: Fn(u64, &WeightedEdge) -> bool,
    {
        let mut result = FunctionalGraph::new(self.width, self.kind);
        for (source, edge) in &self.successors {
            if keep(*source, edge) {
                result.insert_edge(*source, edge.target, edge.weight);
            }
        }
        result
    }

    fn insert_edge(&mut self, source: u64, target: u64, weight: u64) {
        self.successors
            .entry(source)
            .and_modify(|edge| edge.weight += weight)
            .or_insert(WeightedEdge { target, weight });
        self.nodes.insert(source);
        self.nodes.insert(target);
    }

    fn check_edge(&self, source: u64, target: u64) -> KaprekarResult<()> {
        match self.successors.get(&source) {
            Some(edge) if edge.target != target => Err(KaprekarError::InconsistentEdge {
                node: source,
                existing: edge.target,
                target,
            }),
            _ => Ok(()),
        }
    }

    fn check_compatible(&self, width: Width, kind: NodeKind) -> KaprekarResult<()> {
        if width == self.width && kind == self.kind {
            Ok(())
        } else {
            Err(KaprekarError::GraphMismatch {
                width: self.width.get(),
                kind: self.kind.as_str(),
                found_width: width.get(),
                found_kind: kind.as_str(),
            })
        }
    }
}

//! Cycle and feeder detection in functional graphs.
//!
//! In a general directed graph, enumerating cycles is expensive. Here, every node has at most
//! one outgoing edge, so each walk from a node is fully determined and cycles can be found
//! in linear time:
//!
//!  - Pick an unvisited start node and follow its successors, marking each node with the
//!    current *path id* and its position on the path.
//!  - Reaching a node marked with the *current* path id closes a new cycle (the nodes from
//!    that node's position onwards).
//!  - Reaching a node marked by an *earlier* path means the walk merged into an already
//!    resolved tail or cycle, and nothing new is found.
//!  - Reaching a node without a successor (possible in pruned graphs) ends the walk.
//!
//! [`CycleEnumeration`] implements this as a [`Generator`] that yields every cycle as soon as
//! it is closed. Feeders (nodes one step away from a cycle) and basin sizes are derived from
//! the cycles in a single pass over the graph.

mod cycle;
mod cycle_search;


use crate::graph::FunctionalGraph;
use cancel_this::Cancellable;
pub use cycle::Cycle;
pub use cycle_search::{CycleConfig, CycleSearchState, CycleSearchStep};
use computation_process::{Generator, Stateful};
use log::info;
use std::collections::{BTreeSet, HashMap};

/// Enumerate the cycles of a [`FunctionalGraph`].
pub type CycleEnumeration = Generator<CycleConfig, CycleSearchState, Cycle, CycleSearchStep>;

/// Everything the cycle analysis knows about a graph.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleAnalysis {
    /// All cycles, ordered by their smallest node.
    pub cycles: Vec<Cycle>,
    /// Nodes outside of cycles whose successor is a cycle node.
    pub feeders: BTreeSet<u64>,
    /// `basin_sizes[i]` is the number of nodes (including the cycle itself) draining into
    /// `cycles[i]`.
    pub basin_sizes: Vec<usize>,
}

/// Find all cycles of `graph`, ordered by their smallest node.
pub fn find_cycles(graph: &FunctionalGraph) -> Cancellable<Vec<Cycle>> {
    let mut cycles = Vec::new();
    for cycle in CycleEnumeration::configure(graph, graph) {
        cycles.push(cycle?);
    }
    cycles.sort();
    Ok(cycles)
}

/// The union of all nodes of the given cycles.
pub fn cycle_nodes(cycles: &[Cycle]) -> BTreeSet<u64> {
    cycles
        .iter()
        .flat_map(|cycle| cycle.nodes().iter().copied())
        .collect()
}

/// All direct predecessors of `cycle_nodes` that are not cycle nodes themselves.
pub fn find_feeders(graph: &FunctionalGraph, cycle_nodes: &BTreeSet<u64>) -> BTreeSet<u64> {
    graph
        .edges()
        .filter(|(source, edge)| {
            cycle_nodes.contains(&edge.target) && !cycle_nodes.contains(source)
        })
        .map(|(source, _)| source)
        .collect()
}

/// For every cycle, count the nodes of `graph` whose walk ends in that cycle (the cycle
/// nodes included). Nodes whose walk ends at a node without successor belong to no basin.
pub fn basin_sizes(graph: &FunctionalGraph, cycles: &[Cycle]) -> Vec<usize> {
    let mut basin_of: HashMap<u64, Option<usize>> = HashMap::new();
    for (index, cycle) in cycles.iter().enumerate() {
        for node in cycle.nodes() {
            basin_of.insert(*node, Some(index));
        }
    }

    let mut sizes = vec![0usize; cycles.len()];
    let mut path = Vec::new();
    for start in graph.nodes() {
        let mut node = start;
        let basin = loop {
            if let Some(basin) = basin_of.get(&node) {
                break *basin;
            }
            path.push(node);
            match graph.successor(node) {
                Some(next) => node = next,
                None => break None,
            }
        };
        for visited in path.drain(..) {
            basin_of.insert(visited, basin);
        }
        if let Some(basin) = basin {
            sizes[basin] += 1;
        }
    }
    sizes
}

/// The subgraph handed to renderers: only edges `u -> v` where `u` is a cycle node or a
/// feeder and `v` is a cycle node.
pub fn core_subgraph(
    graph: &FunctionalGraph,
    cycle_nodes: &BTreeSet<u64>,
    feeders: &BTreeSet<u64>,
) -> FunctionalGraph {
    graph.restrict(|source, edge| {
        (cycle_nodes.contains(&source) || feeders.contains(&source))
            && cycle_nodes.contains(&edge.target)
    })
}

/// Run the complete cycle analysis of `graph`.
pub fn analyze(graph: &FunctionalGraph) -> Cancellable<CycleAnalysis> {
    let cycles = find_cycles(graph)?;
    let feeders = find_feeders(graph, &cycle_nodes(&cycles));
    let basin_sizes = basin_sizes(graph, &cycles);
    info!(
        "[width:{}] Found {} cycles ({} fixed points) and {} feeders.",
        graph.width(),
        cycles.len(),
        cycles.iter().filter(|it| it.is_fixed_point()).count(),
        feeders.len()
    );
    Ok(CycleAnalysis {
        cycles,
        feeders,
        basin_sizes,
    })
}

//! Dynamics of the Kaprekar digit-sort-subtract map.
//!
//! For a fixed number of digits `N`, the map sends a value to the difference of its digits
//! sorted in descending and in ascending order. This crate traces trajectories of the map,
//! collapses values into digit-permutation classes, assembles the induced functional graph,
//! and finds its cycles and the nodes feeding into them.
//!
//!  - [`digits`]: validated widths and the zero-padded digit codec.
//!  - [`transform`]: the map itself, with an optional bounded successor cache.
//!  - [`classes`]: canonical signatures of digit-permutation classes.
//!  - [`trace`]: trajectories with cycle detection.
//!  - [`graph`] and [`cycles`]: the functional graph and its cycle/feeder/basin analysis.
//!  - [`statistics`], [`seeds`] and [`analysis`]: reporting and the complete pipeline.

#[cfg(test)]
mod test_utils;

pub mod analysis;
pub mod classes;
pub mod cycles;
pub mod digits;
pub mod error;
pub mod graph;
pub mod seeds;
pub mod statistics;
pub mod trace;
pub mod transform;

pub use error::{KaprekarError, KaprekarResult, split_cancelled};

use graph::FunctionalGraph;

/// A utility method for printing useful metadata of functional graphs.
fn log_graph(graph: &FunctionalGraph) -> String {
    format!(
        "nodes={}; edges={}; weight={}",
        graph.node_count(),
        graph.edge_count(),
        graph.total_weight()
    )
}

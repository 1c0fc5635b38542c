//! Trajectory tracing with cycle detection.
//!
//! A trajectory starts at a seed and repeatedly applies the Kaprekar map until a node repeats.
//! The node space is finite, so by pigeonhole every trajectory eventually closes a cycle.
//! The part before the first repeated node is the *tail*, the rest is the *cycle*.
//!
//! # Algorithms
//!
//!  - [`TrajectoryTracer`]: A resumable [`Computation`] that records every visited node and
//!    performs one map application per step. Use [`trace`] or [`trace_with`] to run it to
//!    completion.
//!  - [`cycle_summary`]: Brent's constant-memory cycle detection, reporting only the tail
//!    length, cycle length and cycle entry.
//!
//! # Example
//!
//! ```rust
//! use kaprekar_dynamics::digits::Width;
//! use kaprekar_dynamics::trace::trace;
//! use kaprekar_dynamics::transform::Transformer;
//!
//! let transformer = Transformer::new(Width::new(4).unwrap());
//! let trajectory = trace(&transformer, 3524, usize::MAX).unwrap();
//! assert_eq!(trajectory.nodes(), &[3524, 3087, 8352, 6174]);
//! assert_eq!(trajectory.cycle(), &[6174]);
//! ```

mod brent;
mod trace_config;
mod trace_state;

#[cfg(test)]
mod tests;

use crate::cycles::Cycle;
use crate::digits::Width;
use crate::error::{KaprekarError, KaprekarResult};
use crate::transform::{NodeKind, Transformer};
pub use brent::{CycleSummary, cycle_summary};
use computation_process::{Algorithm, Computation};
use log::{debug, info};
pub use trace_config::{TraceConfig, default_max_steps};
pub use trace_state::{TraceState, TraceStep};

/// Trace a trajectory one map application at a time.
pub type TrajectoryTracer = Computation<TraceConfig, TraceState, TraceOutcome, TraceStep>;

/// The result of a [`TrajectoryTracer`].
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraceOutcome {
    /// A node repeated and the trajectory is complete.
    Closed(Trajectory),
    /// The step limit was reached before any node repeated.
    Exhausted { seed: u64, steps: usize },
}

/// A complete trajectory: the visited nodes in order, where applying the map to the last
/// node yields the node at [`Trajectory::cycle_start`].
///
/// The repeated node is not stored twice.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "TrajectoryParts")
)]
pub struct Trajectory {
    pub(crate) width: Width,
    pub(crate) kind: NodeKind,
    pub(crate) nodes: Vec<u64>,
    pub(crate) cycle_start: usize,
}

/// Unchecked fields of a deserialized [`Trajectory`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct TrajectoryParts {
    width: Width,
    kind: NodeKind,
    nodes: Vec<u64>,
    cycle_start: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<TrajectoryParts> for Trajectory {
    type Error = KaprekarError;

    fn try_from(value: TrajectoryParts) -> Result<Self, Self::Error> {
        check_shape(&value.nodes, Some(value.cycle_start))?;
        if value.nodes.iter().any(|node| *node >= value.width.state_space()) {
            return Err(KaprekarError::MalformedTrajectory {
                reason: "node outside the width",
            });
        }
        Ok(Trajectory {
            width: value.width,
            kind: value.kind,
            nodes: value.nodes,
            cycle_start: value.cycle_start,
        })
    }
}

/// Every trajectory visits at least one node, and its cycle starts at a visited node.
#[cfg(feature = "serde")]
fn check_shape(nodes: &[u64], cycle_start: Option<usize>) -> KaprekarResult<()> {
    if nodes.is_empty() {
        return Err(KaprekarError::MalformedTrajectory { reason: "no nodes" });
    }
    if cycle_start.is_some_and(|start| start >= nodes.len()) {
        return Err(KaprekarError::MalformedTrajectory {
            reason: "cycle start past the last node",
        });
    }
    Ok(())
}

impl Trajectory {
    pub fn width(&self) -> Width {
        self.width
    }

    pub fn node_kind(&self) -> NodeKind {
        self.kind
    }

    /// The first node (the seed, or its signature in signature mode).
    pub fn seed(&self) -> u64 {
        self.nodes[0]
    }

    /// All visited nodes in order.
    pub fn nodes(&self) -> &[u64] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a trajectory contains at least its seed (deserialization rejects
    /// empty trajectories).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of steps before the trajectory enters its cycle.
    pub fn cycle_start(&self) -> usize {
        self.cycle_start
    }

    /// The nodes before the cycle.
    pub fn tail(&self) -> &[u64] {
        &self.nodes[..self.cycle_start]
    }

    /// The embedded cycle in the order it was visited.
    pub fn cycle(&self) -> &[u64] {
        &self.nodes[self.cycle_start..]
    }

    /// The embedded cycle, normalized to start at its smallest node.
    pub fn to_cycle(&self) -> Cycle {
        Cycle::from_orbit(self.cycle().to_vec())
    }

    /// All edges `(node, successor)` of this trajectory, including the edge that
    /// closes the cycle.
    pub fn edges(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        let closing = (self.nodes[self.nodes.len() - 1], self.nodes[self.cycle_start]);
        self.nodes
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .chain(std::iter::once(closing))
    }
}

/// Trace the raw-value trajectory of `seed`, failing with [`KaprekarError::CycleNotFound`]
/// if no value repeats within `max_steps` applications of the map.
pub fn trace(transformer: &Transformer, seed: u64, max_steps: usize) -> KaprekarResult<Trajectory> {
    let mut config = TraceConfig::new(transformer.clone());
    config.max_steps = max_steps;
    trace_with(&config, seed)
}

/// Trace the trajectory of `seed` using an explicit [`TraceConfig`].
pub fn trace_with(config: &TraceConfig, seed: u64) -> KaprekarResult<Trajectory> {
    let state = TraceState::new(config, seed)?;
    match TrajectoryTracer::run(config.clone(), state)? {
        TraceOutcome::Closed(trajectory) => Ok(trajectory),
        TraceOutcome::Exhausted { seed, .. } => Err(KaprekarError::CycleNotFound {
            seed,
            max_steps: config.max_steps,
        }),
    }
}

/// Trace every seed independently. A failing seed does not affect the others, and the results
/// are returned in the order of `seeds`.
///
/// With the `parallel` feature, seeds are distributed over the `rayon` thread pool. The only
/// state shared between workers is the successor cache of the transformer. Workers observe
/// the cancellation triggers that are active on the calling thread.
pub fn trace_batch(config: &TraceConfig, seeds: &[u64]) -> Vec<KaprekarResult<Trajectory>> {
    info!(
        "[width:{}] Tracing {} seeds over {} nodes.",
        config.width(),
        seeds.len(),
        config.node_kind
    );

    #[cfg(feature = "parallel")]
    let results: Vec<KaprekarResult<Trajectory>> = {
        use rayon::prelude::*;
        // Triggers are thread-local and have to be installed on every worker.
        let triggers = cancel_this::active_triggers();
        seeds
            .par_iter()
            .map(|seed| cancel_this::on_trigger(triggers.clone(), || trace_with(config, *seed)))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let results: Vec<KaprekarResult<Trajectory>> =
        seeds.iter().map(|seed| trace_with(config, *seed)).collect();

    debug!(
        "[width:{}] Batch done: {} traced, {} failed; cache {:?}.",
        config.width(),
        results.iter().filter(|it| it.is_ok()).count(),
        results.iter().filter(|it| it.is_err()).count(),
        config.transformer.cache_stats()
    );
    results
}

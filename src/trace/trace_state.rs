use crate::error::KaprekarResult;
#[cfg(feature = "serde")]
use crate::error::KaprekarError;
#[cfg(feature = "serde")]
use crate::trace::check_shape;
use crate::trace::{TraceConfig, TraceOutcome, Trajectory};
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, ComputationStep};
use log::{debug, trace};
use std::collections::HashMap;

/// Internal state of a trajectory being traced.
///
/// Every visited node is indexed by its position, so detecting a repeat is a single
/// hash lookup per step.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "TraceStateParts")
)]
pub struct TraceState {
    seed: u64,
    nodes: Vec<u64>,
    positions: HashMap<u64, usize>,
    steps: usize,
    cycle_start: Option<usize>,
}

/// Unchecked fields of a deserialized [`TraceState`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct TraceStateParts {
    seed: u64,
    nodes: Vec<u64>,
    positions: HashMap<u64, usize>,
    steps: usize,
    cycle_start: Option<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<TraceStateParts> for TraceState {
    type Error = KaprekarError;

    fn try_from(value: TraceStateParts) -> Result<Self, Self::Error> {
        check_shape(&value.nodes, value.cycle_start)?;
        let indexed = value.positions.len() == value.nodes.len()
            && value
                .nodes
                .iter()
                .enumerate()
                .all(|(index, node)| value.positions.get(node) == Some(&index));
        if !indexed {
            return Err(KaprekarError::MalformedTrajectory {
                reason: "positions do not index the visited nodes",
            });
        }
        Ok(TraceState {
            seed: value.seed,
            nodes: value.nodes,
            positions: value.positions,
            steps: value.steps,
            cycle_start: value.cycle_start,
        })
    }
}

/// Advances a [`TraceState`] by one application of the map.
pub struct TraceStep;

impl TraceState {
    /// Create the initial state for `seed`, validating it against the configured width.
    ///
    /// In signature mode, the trajectory starts at the canonical signature of `seed`.
    pub fn new(config: &TraceConfig, seed: u64) -> KaprekarResult<TraceState> {
        let seed = config.width().check(seed)?;
        let first = config.transformer.node_of(seed, config.node_kind);
        Ok(TraceState {
            seed,
            nodes: vec![first],
            positions: HashMap::from([(first, 0)]),
            steps: 0,
            cycle_start: None,
        })
    }

    /// Number of map applications performed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Nodes visited so far (without the repeated node that closes the cycle).
    pub fn nodes(&self) -> &[u64] {
        &self.nodes
    }

    fn closed(&self, config: &TraceConfig, cycle_start: usize) -> TraceOutcome {
        TraceOutcome::Closed(Trajectory {
            width: config.width(),
            kind: config.node_kind,
            nodes: self.nodes.clone(),
            cycle_start,
        })
    }
}

impl ComputationStep<TraceConfig, TraceState, TraceOutcome> for TraceStep {
    fn step(context: &TraceConfig, state: &mut TraceState) -> Completable<TraceOutcome> {
        if let Some(cycle_start) = state.cycle_start {
            return Ok(state.closed(context, cycle_start));
        }

        if state.steps >= context.max_steps {
            debug!(
                "[seed:{}] Trace exhausted after {} steps without a repeat.",
                state.seed, state.steps
            );
            return Ok(TraceOutcome::Exhausted {
                seed: state.seed,
                steps: state.steps,
            });
        }

        // The node list is never empty, it starts with the seed and deserialization
        // rejects empty states.
        let current = state.nodes[state.nodes.len() - 1];
        let next = context.transformer.step(current, context.node_kind);
        state.steps += 1;
        trace!(
            "[seed:{}][step:{}] {} -> {}",
            state.seed,
            state.steps,
            context.width().pad(current),
            context.width().pad(next)
        );

        if let Some(&cycle_start) = state.positions.get(&next) {
            debug!(
                "[seed:{}] Closed cycle of length {} after a tail of {} steps.",
                state.seed,
                state.nodes.len() - cycle_start,
                cycle_start
            );
            state.cycle_start = Some(cycle_start);
            return Ok(state.closed(context, cycle_start));
        }

        state.positions.insert(next, state.nodes.len());
        state.nodes.push(next);
        Err(Suspended)
    }
}

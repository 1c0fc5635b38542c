use crate::cycles::Cycle;
use crate::graph::FunctionalGraph;
use crate::log_graph;
use cancel_this::is_cancelled;
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, GeneratorStep};
use log::{debug, info, trace};
use std::collections::HashMap;

/// A configuration object for cycle enumeration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleConfig {
    pub graph: FunctionalGraph,
}

impl From<FunctionalGraph> for CycleConfig {
    fn from(value: FunctionalGraph) -> Self {
        CycleConfig { graph: value }
    }
}

impl From<&FunctionalGraph> for CycleConfig {
    fn from(value: &FunctionalGraph) -> Self {
        CycleConfig {
            graph: value.clone(),
        }
    }
}

/// Internal state of the cycle enumeration.
///
/// Every visited node is marked with the id of the walk that reached it first and its
/// position on that walk.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleSearchState {
    starts: Vec<u64>,
    next_start: usize,
    marks: HashMap<u64, (usize, usize)>,
    walks: usize,
}

/// Performs one walk of the cycle enumeration per step.
pub struct CycleSearchStep;

impl From<&FunctionalGraph> for CycleSearchState {
    fn from(value: &FunctionalGraph) -> Self {
        info!("Start cycle search ({}).", log_graph(value));
        CycleSearchState {
            starts: value.nodes().collect(),
            next_start: 0,
            marks: HashMap::new(),
            walks: 0,
        }
    }
}

impl CycleSearchState {
    /// Number of walks performed so far.
    pub fn walks(&self) -> usize {
        self.walks
    }

    /// Number of nodes that have been visited by some walk.
    pub fn visited(&self) -> usize {
        self.marks.len()
    }
}

impl GeneratorStep<CycleConfig, CycleSearchState, Cycle> for CycleSearchStep {
    fn step(context: &CycleConfig, state: &mut CycleSearchState) -> Completable<Option<Cycle>> {
        is_cancelled!()?;

        while state
            .starts
            .get(state.next_start)
            .is_some_and(|it| state.marks.contains_key(it))
        {
            state.next_start += 1;
        }
        let Some(&start) = state.starts.get(state.next_start) else {
            debug!(
                "Cycle search done after {} walks over {} nodes.",
                state.walks,
                state.marks.len()
            );
            return Ok(None);
        };

        let walk = state.walks;
        state.walks += 1;
        let mut path = Vec::new();
        let mut node = start;
        loop {
            if let Some(&(seen_walk, position)) = state.marks.get(&node) {
                if seen_walk == walk {
                    let cycle = Cycle::from_orbit(path[position..].to_vec());
                    debug!(
                        "[walk:{}] Found cycle {} after a tail of {} nodes.",
                        walk, cycle, position
                    );
                    return Ok(Some(cycle));
                }
                trace!(
                    "[walk:{}] Merged into walk {} after {} nodes.",
                    walk,
                    seen_walk,
                    path.len()
                );
                return Err(Suspended);
            }
            state.marks.insert(node, (walk, path.len()));
            path.push(node);
            match context.graph.successor(node) {
                Some(next) => node = next,
                None => {
                    trace!("[walk:{}] Reached a node without successor.", walk);
                    return Err(Suspended);
                }
            }
        }
    }
}

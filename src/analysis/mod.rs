//! The complete analysis pipeline of one width.
//!
//! [`run_analysis`] resolves the seeds, traces them (in parallel with the `parallel`
//! feature), assembles the weighted [`FunctionalGraph`], prunes rarely used edges, and runs
//! the cycle, feeder and basin analysis on what is left. The resulting [`AnalysisReport`]
//! holds every artefact a renderer needs.
//!
//! ```rust
//! use kaprekar_dynamics::analysis::{AnalysisConfig, run_analysis};
//! use kaprekar_dynamics::digits::Width;
//!
//! let report = run_analysis(&AnalysisConfig::new(Width::new(3).unwrap())).unwrap();
//! assert_eq!(report.statistics.classes_reached, 220);
//! let constant = report.cycles.last().unwrap();
//! assert_eq!(constant.nodes(), &[459]); // The class of 495.
//! ```

mod analysis_config;


use crate::cycles::{Cycle, analyze, core_subgraph, cycle_nodes};
use crate::digits::DigitMultiset;
use crate::error::{KaprekarError, KaprekarResult};
use crate::graph::FunctionalGraph;
use crate::log_graph;
use crate::statistics::{WidthSummary, coverage};
use crate::trace::{Trajectory, trace_batch};
use crate::transform::NodeKind;
pub use analysis_config::{AnalysisConfig, DEFAULT_CACHE_CAPACITY};
use log::{info, warn};
use std::collections::{BTreeSet, HashSet};

/// A seed whose trajectory could not be traced.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeedFailure {
    pub seed: u64,
    pub message: String,
}

/// Summary numbers of one analysis run.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisStatistics {
    pub width: WidthSummary,
    pub seeds: usize,
    pub traced: usize,
    /// Distinct classes visited by at least one trajectory.
    pub classes_reached: u64,
    /// `classes_reached` as a percentage of all classes.
    pub coverage: f64,
    pub longest_trajectory: usize,
    pub longest_tail: usize,
}

/// Every artefact produced by [`run_analysis`].
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisReport {
    pub config: AnalysisConfig,
    pub trajectories: Vec<Trajectory>,
    pub failures: Vec<SeedFailure>,
    /// The graph of all trajectories after dropping edges below `min_edge_weight`.
    pub graph: FunctionalGraph,
    /// Only the cycle edges and the edges entering cycles from feeders.
    pub core: FunctionalGraph,
    pub cycles: Vec<Cycle>,
    pub feeders: BTreeSet<u64>,
    pub basin_sizes: Vec<usize>,
    pub statistics: AnalysisStatistics,
}

/// Run the complete analysis described by `config`.
///
/// Invalid seeds fail the whole analysis. Seeds that exceed the step limit are reported in
/// [`AnalysisReport::failures`] and do not affect the other seeds. Cancellation aborts the
/// analysis with [`KaprekarError::Cancelled`].
pub fn run_analysis(config: &AnalysisConfig) -> KaprekarResult<AnalysisReport> {
    let width = config.width;
    info!(
        "[width:{}] Start analysis over {} nodes from {:?}.",
        width, config.node_kind, config.seeds
    );

    let seeds = config.seeds.resolve(width)?;
    let trace_config = config.trace_config();
    let mut trajectories = Vec::with_capacity(seeds.len());
    let mut failures = Vec::new();
    for (seed, result) in seeds.iter().zip(trace_batch(&trace_config, &seeds)) {
        match result {
            Ok(trajectory) => trajectories.push(trajectory),
            Err(KaprekarError::Cancelled(cancelled)) => {
                return Err(KaprekarError::Cancelled(cancelled));
            }
            Err(error) => {
                warn!("[seed:{}] Skipped: {}.", seed, error);
                failures.push(SeedFailure {
                    seed: *seed,
                    message: error.to_string(),
                });
            }
        }
    }

    let full = FunctionalGraph::from_trajectories(width, config.node_kind, &trajectories)?;
    let graph = full.prune_by_weight(config.min_edge_weight);
    let analysis = analyze(&graph)?;
    let core = core_subgraph(&graph, &cycle_nodes(&analysis.cycles), &analysis.feeders);

    let statistics = statistics(config, &seeds, &trajectories);
    info!(
        "[width:{}] Analysis done: graph ({}); {} cycles; {} feeders; {:.1}% classes reached.",
        width,
        log_graph(&graph),
        analysis.cycles.len(),
        analysis.feeders.len(),
        statistics.coverage
    );

    Ok(AnalysisReport {
        config: config.clone(),
        trajectories,
        failures,
        graph,
        core,
        cycles: analysis.cycles,
        feeders: analysis.feeders,
        basin_sizes: analysis.basin_sizes,
        statistics,
    })
}

fn statistics(
    config: &AnalysisConfig,
    seeds: &[u64],
    trajectories: &[Trajectory],
) -> AnalysisStatistics {
    let summary = WidthSummary::from(config.width);
    let classes: HashSet<u64> = trajectories
        .iter()
        .flat_map(|it| it.nodes().iter().copied())
        .map(|node| match config.node_kind {
            NodeKind::Value => DigitMultiset::of_unchecked(node, config.width).ascending(),
            NodeKind::Signature => node,
        })
        .collect();
    let classes_reached = classes.len() as u64;
    AnalysisStatistics {
        width: summary,
        seeds: seeds.len(),
        traced: trajectories.len(),
        classes_reached,
        coverage: coverage(classes_reached, summary.class_count),
        longest_trajectory: trajectories.iter().map(Trajectory::len).max().unwrap_or(0),
        longest_tail: trajectories
            .iter()
            .map(Trajectory::cycle_start)
            .max()
            .unwrap_or(0),
    }
}

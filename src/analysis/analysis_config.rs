use crate::digits::Width;
use crate::seeds::SeedSpec;
use crate::trace::{TraceConfig, default_max_steps};
use crate::transform::{NodeKind, Transformer};

/// Default capacity of the successor cache used by [`crate::analysis::run_analysis`].
pub const DEFAULT_CACHE_CAPACITY: usize = 1 << 16;

/// A configuration object for a complete analysis of one width.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisConfig {
    pub width: Width,
    /// The seeds to trace (default: one canonical signature per class).
    pub seeds: SeedSpec,
    /// Build trajectories and the graph over values or signatures (default: signatures).
    pub node_kind: NodeKind,
    /// Edges traversed fewer times are dropped from the reported graph (default: `1`,
    /// i.e. nothing is dropped).
    pub min_edge_weight: u64,
    /// Step limit of every trajectory. `None` uses [`default_max_steps`], which cannot be
    /// exceeded by a correct trajectory.
    pub max_steps: Option<usize>,
    /// Capacity of the shared successor cache. `0` disables memoization.
    pub cache_capacity: usize,
}

impl From<Width> for AnalysisConfig {
    fn from(value: Width) -> Self {
        AnalysisConfig::new(value)
    }
}

impl AnalysisConfig {
    pub fn new(width: Width) -> AnalysisConfig {
        AnalysisConfig {
            width,
            seeds: SeedSpec::Canonical,
            node_kind: NodeKind::Signature,
            min_edge_weight: 1,
            max_steps: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Same as [`AnalysisConfig::new`], but over raw values starting from the given seeds.
    pub fn values(width: Width, seeds: SeedSpec) -> AnalysisConfig {
        AnalysisConfig {
            seeds,
            node_kind: NodeKind::Value,
            ..AnalysisConfig::new(width)
        }
    }

    pub fn transformer(&self) -> Transformer {
        if self.cache_capacity == 0 {
            Transformer::new(self.width)
        } else {
            Transformer::bounded(self.width, self.cache_capacity)
        }
    }

    pub fn trace_config(&self) -> TraceConfig {
        TraceConfig {
            transformer: self.transformer(),
            node_kind: self.node_kind,
            max_steps: self
                .max_steps
                .unwrap_or_else(|| default_max_steps(self.width, self.node_kind)),
        }
    }
}

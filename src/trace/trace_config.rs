use crate::classes::class_count;
use crate::digits::Width;
use crate::transform::{NodeKind, Transformer};

/// A configuration object for trajectory tracing.
#[derive(Clone, Debug)]
pub struct TraceConfig {
    /// The map (and its successor cache) used to advance trajectories. The width of
    /// the transformer is the width of every traced seed.
    pub transformer: Transformer,
    /// Trace raw values (default) or canonical signatures.
    pub node_kind: NodeKind,
    /// Report [`crate::KaprekarError::CycleNotFound`] if no node repeats after this many
    /// applications of the map (default: the size of the node space, which is always enough).
    pub max_steps: usize,
}

impl From<Transformer> for TraceConfig {
    fn from(value: Transformer) -> Self {
        TraceConfig::new(value)
    }
}

impl From<&Transformer> for TraceConfig {
    fn from(value: &Transformer) -> Self {
        TraceConfig::new(value.clone())
    }
}

impl From<Width> for TraceConfig {
    fn from(value: Width) -> Self {
        TraceConfig::new(Transformer::new(value))
    }
}

impl TraceConfig {
    /// Create a new [`TraceConfig`] over raw values with a step limit that cannot be
    /// reached by a correct trajectory.
    pub fn new(transformer: Transformer) -> TraceConfig {
        let max_steps = default_max_steps(transformer.width(), NodeKind::Value);
        TraceConfig {
            transformer,
            node_kind: NodeKind::Value,
            max_steps,
        }
    }

    /// Same as [`TraceConfig::new`], but tracing canonical signatures instead of values.
    pub fn signatures(transformer: Transformer) -> TraceConfig {
        let max_steps = default_max_steps(transformer.width(), NodeKind::Signature);
        TraceConfig {
            transformer,
            node_kind: NodeKind::Signature,
            max_steps,
        }
    }

    pub fn width(&self) -> Width {
        self.transformer.width()
    }
}

/// The number of distinct nodes of the given kind. By pigeonhole, every trajectory repeats
/// a node within this many steps.
pub fn default_max_steps(width: Width, kind: NodeKind) -> usize {
    let nodes = match kind {
        NodeKind::Value => width.state_space(),
        NodeKind::Signature => class_count(width),
    };
    usize::try_from(nodes).unwrap_or(usize::MAX)
}

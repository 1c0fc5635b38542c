use crate::transform::{NodeKind, Transformer};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// A cycle of the Kaprekar map, normalized to start at its smallest node and listed in the
/// order the map visits it.
///
/// Normalization makes equal cycles compare equal regardless of where they were entered,
/// and the derived ordering sorts cycles by their smallest node.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cycle {
    nodes: Vec<u64>,
}

impl Cycle {
    /// Create a cycle from its nodes in map order, starting anywhere on the cycle.
    pub fn from_orbit(mut nodes: Vec<u64>) -> Cycle {
        let smallest = nodes
            .iter()
            .enumerate()
            .min_by_key(|(_, node)| **node)
            .map(|(index, _)| index)
            .unwrap_or(0);
        nodes.rotate_left(smallest);
        Cycle { nodes }
    }

    pub fn nodes(&self) -> &[u64] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_fixed_point(&self) -> bool {
        self.nodes.len() == 1
    }

    /// The smallest node of the cycle.
    pub fn first(&self) -> Option<u64> {
        self.nodes.first().copied()
    }

    pub fn contains(&self, node: u64) -> bool {
        self.nodes.contains(&node)
    }

    /// Check that the nodes are distinct and that every node maps to the next one, with the
    /// last mapping back to the first.
    pub fn is_valid_for(&self, transformer: &Transformer, kind: NodeKind) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        let distinct: HashSet<u64> = self.nodes.iter().copied().collect();
        if distinct.len() != self.nodes.len() {
            return false;
        }
        let width = transformer.width();
        self.nodes.iter().enumerate().all(|(index, node)| {
            let next = self.nodes[(index + 1) % self.nodes.len()];
            width.check(*node).is_ok() && transformer.step(*node, kind) == next
        })
    }
}

impl Display for Cycle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let nodes: Vec<String> = self.nodes.iter().map(|it| it.to_string()).collect();
        write!(f, "[{}]", nodes.join(" -> "))
    }
}

//! The Kaprekar digit-sort-subtract map.
//!
//! For a value `x` of width `N`, the map sorts the `N` zero-padded digits of `x` in descending
//! (`hi`) and ascending (`lo`) order and returns `hi - lo`. The result is again a value of
//! width `N` (it may need zero padding, e.g. `0` stands for `N` zero digits).
//!
//! The map only depends on the digit multiset of its input, so it also induces a well-defined
//! map on equivalence classes (canonical signatures). [`Transformer`] exposes both views and
//! optionally memoizes successors through a [`SuccessorCache`].

mod cache;

#[cfg(test)]
mod tests;

use crate::digits::{DigitMultiset, Width};
use crate::error::KaprekarResult;
pub use cache::{CacheKey, CacheStats, NoCache, ShardedCache, SuccessorCache};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Selects whether trajectories and graphs are built over raw values or over canonical
/// signatures of equivalence classes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Nodes are raw values and edges are `x -> next_value(x)`.
    Value,
    /// Nodes are canonical signatures and edges are `s -> canonical(next_value(s))`.
    Signature,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Value => "value",
            NodeKind::Signature => "signature",
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply the Kaprekar map to `value` of the given `width` (uncached).
///
/// Fails with [`crate::KaprekarError::InvalidValue`] if `value >= 10^width`.
pub fn next_value(value: u64, width: Width) -> KaprekarResult<u64> {
    let digits = DigitMultiset::of(value, width)?;
    Ok(digits.descending() - digits.ascending())
}

/// The Kaprekar map for one fixed width, backed by a (possibly shared) successor cache.
///
/// Cloning a [`Transformer`] is cheap and all clones share the same cache, so a single
/// instance can be handed to every worker of a parallel batch.
#[derive(Clone)]
pub struct Transformer {
    width: Width,
    cache: Arc<dyn SuccessorCache>,
}

impl Debug for Transformer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("width", &self.width)
            .field("cache", &self.cache.stats())
            .finish()
    }
}

impl From<Width> for Transformer {
    fn from(value: Width) -> Self {
        Transformer::new(value)
    }
}

impl Transformer {
    /// Create a [`Transformer`] without memoization.
    pub fn new(width: Width) -> Transformer {
        Transformer::with_cache(width, Arc::new(NoCache))
    }

    /// Create a [`Transformer`] that memoizes successors in a [`ShardedCache`] of the given
    /// capacity.
    pub fn bounded(width: Width, capacity: usize) -> Transformer {
        Transformer::with_cache(width, Arc::new(ShardedCache::with_capacity(capacity)))
    }

    /// Create a [`Transformer`] using an arbitrary (possibly shared) cache.
    pub fn with_cache(width: Width, cache: Arc<dyn SuccessorCache>) -> Transformer {
        Transformer { width, cache }
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Apply the map to `value`.
    pub fn next_value(&self, value: u64) -> KaprekarResult<u64> {
        Ok(self.successor(self.width.check(value)?))
    }

    /// Apply the class-level map: the canonical signature of the successor of `signature`.
    ///
    /// Any member of a class can be given in place of its signature.
    pub fn next_signature(&self, signature: u64) -> KaprekarResult<u64> {
        Ok(self.step(self.width.check(signature)?, NodeKind::Signature))
    }

    /// A value is a fixed point iff the map sends it to itself (this includes `0`,
    /// the image of every repdigit).
    pub fn is_fixed_point(&self, value: u64) -> KaprekarResult<bool> {
        Ok(self.next_value(value)? == value)
    }

    /// One step in the node space selected by `kind`. Assumes `value < 10^width`.
    pub(crate) fn step(&self, value: u64, kind: NodeKind) -> u64 {
        let next = self.successor(value);
        match kind {
            NodeKind::Value => next,
            NodeKind::Signature => DigitMultiset::of_unchecked(next, self.width).ascending(),
        }
    }

    /// Map a value into the node space selected by `kind`. Assumes `value < 10^width`.
    pub(crate) fn node_of(&self, value: u64, kind: NodeKind) -> u64 {
        match kind {
            NodeKind::Value => value,
            NodeKind::Signature => DigitMultiset::of_unchecked(value, self.width).ascending(),
        }
    }

    /// The unchecked (and memoized) map. Assumes `value < 10^width`.
    pub(crate) fn successor(&self, value: u64) -> u64 {
        let digits = DigitMultiset::of_unchecked(value, self.width);
        let key = CacheKey {
            width: self.width,
            signature: digits.ascending(),
        };
        if let Some(next) = self.cache.get(key) {
            return next;
        }
        let next = digits.descending() - key.signature;
        self.cache.insert(key, next);
        next
    }
}

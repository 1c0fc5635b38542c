//! Coverage and reduction metrics.
//!
//! Everything here is pure reporting over the outputs of the other modules: how much the
//! class model shrinks the state space ([`WidthSummary`]), how quickly the map concentrates
//! values into few classes ([`reachable_classes`]), and how many classes a prefix of the
//! value range already touches ([`prefix_coverage`]).


use crate::classes::class_count;
use crate::digits::{DigitMultiset, Width};
use crate::error::KaprekarResult;
use crate::transform::Transformer;
use cancel_this::is_cancelled;
use log::{debug, info};
use std::collections::HashSet;

/// Percentage of `total_classes` covered by `classes_reached` (`0.0` if there are no classes).
pub fn coverage(classes_reached: u64, total_classes: u64) -> f64 {
    if total_classes == 0 {
        0.0
    } else {
        classes_reached as f64 / total_classes as f64 * 100.0
    }
}

/// How many raw values one class stands for on average.
pub fn reduction_factor(total_values: u64, class_count: u64) -> f64 {
    if class_count == 0 {
        0.0
    } else {
        total_values as f64 / class_count as f64
    }
}

/// Size of the value space and of the class space of one width.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WidthSummary {
    pub width: Width,
    pub total_values: u64,
    pub class_count: u64,
    pub reduction_factor: f64,
}

impl From<Width> for WidthSummary {
    fn from(width: Width) -> Self {
        let total_values = width.state_space();
        let class_count = class_count(width);
        WidthSummary {
            width,
            total_values,
            class_count,
            reduction_factor: reduction_factor(total_values, class_count),
        }
    }
}

/// A [`WidthSummary`] for every width in `widths`.
pub fn width_summaries<I>(widths: I) -> Vec<WidthSummary>
where
    I: IntoIterator<Item = Width>,
{
    widths.into_iter().map(WidthSummary::from).collect()
}

/// For `k` in `1..=steps`, the number of distinct classes reached from `seeds` after exactly
/// `k` applications of the map. The result has `steps` entries.
pub fn reachable_classes<I>(
    transformer: &Transformer,
    seeds: I,
    steps: usize,
) -> KaprekarResult<Vec<usize>>
where
    I: IntoIterator<Item = u64>,
{
    let width = transformer.width();
    let mut reached: Vec<HashSet<u64>> = vec![HashSet::new(); steps];
    let mut count = 0usize;
    for seed in seeds {
        is_cancelled!()?;
        let mut value = width.check(seed)?;
        for classes in reached.iter_mut() {
            value = transformer.successor(value);
            classes.insert(DigitMultiset::of_unchecked(value, width).ascending());
        }
        count += 1;
    }
    let counts: Vec<usize> = reached.iter().map(HashSet::len).collect();
    info!(
        "[width:{}] Classes reached from {} seeds after 1..={} steps: {:?}.",
        width, count, steps, counts
    );
    Ok(counts)
}

/// Classes covered by the first `fraction * 10^N` values.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrefixCoverage {
    pub fraction: f64,
    pub values_checked: u64,
    pub classes_found: u64,
    /// Percentage of all classes of the width.
    pub coverage: f64,
}

/// For every fraction `p` (clamped to `[0, 1]`), count the classes among the values
/// `0..floor(p * 10^N)`. Results are returned in the order of `fractions`.
pub fn prefix_coverage(width: Width, fractions: &[f64]) -> KaprekarResult<Vec<PrefixCoverage>> {
    let total = width.state_space();
    let total_classes = class_count(width);
    let sizes: Vec<u64> = fractions
        .iter()
        .map(|p| {
            let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
            ((total as f64 * p) as u64).min(total)
        })
        .collect();

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by_key(|index| sizes[*index]);

    let mut found = vec![0u64; sizes.len()];
    let mut signatures = HashSet::new();
    let mut next = 0u64;
    for index in order {
        is_cancelled!()?;
        while next < sizes[index] {
            signatures.insert(DigitMultiset::of_unchecked(next, width).ascending());
            next += 1;
        }
        found[index] = signatures.len() as u64;
        debug!(
            "[width:{}] First {} values cover {} classes.",
            width, sizes[index], found[index]
        );
    }

    Ok(fractions
        .iter()
        .zip(sizes.iter().zip(found))
        .map(|(fraction, (size, classes))| PrefixCoverage {
            fraction: *fraction,
            values_checked: *size,
            classes_found: classes,
            coverage: coverage(classes, total_classes),
        })
        .collect())
}

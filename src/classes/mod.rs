//! Equivalence classes of values under digit permutation.
//!
//! Values of width `N` that are digit permutations of each other share a [`DigitMultiset`].
//! Each such class is represented by its *canonical signature*: the digits sorted
//! non-decreasing, read as an integer. There are exactly `C(N + 9, 9)` classes, which is
//! dramatically smaller than the `10^N` raw values (see [`crate::statistics`]).

mod signatures;


use crate::digits::{DigitMultiset, Width};
use crate::error::KaprekarResult;
pub use signatures::CanonicalSignatures;

/// The canonical signature of the class containing `value`.
pub fn canonicalize(value: u64, width: Width) -> KaprekarResult<u64> {
    Ok(DigitMultiset::of(value, width)?.ascending())
}

/// Lazily enumerate all canonical signatures of the given width in increasing order.
///
/// Each call starts a fresh enumeration.
pub fn enumerate_canonical(width: Width) -> CanonicalSignatures {
    CanonicalSignatures::new(width)
}

/// The number of equivalence classes of the given width, i.e. the number of multisets
/// of size `width` over ten digits: `C(width + 9, 9)`.
pub fn class_count(width: Width) -> u64 {
    binomial(width.get() as u64 + 9, 9)
}

/// The number of values that belong to the class of `signature` (the multinomial coefficient
/// `N! / (c_0! c_1! ... c_9!)`). Summed over all classes, this gives `10^N`.
pub fn class_size(signature: u64, width: Width) -> KaprekarResult<u64> {
    let digits = DigitMultiset::of(signature, width)?;
    let mut remaining = width.get() as u64;
    let mut size = 1u64;
    for count in digits.counts() {
        let count = u64::from(*count);
        size *= binomial(remaining, count);
        remaining -= count;
    }
    Ok(size)
}

/// Exact binomial coefficient for the small arguments used in this crate.
///
/// Every partial product `C(n - k + i, i)` is an integer, so the division is always exact.
pub(crate) fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (1..=k).fold(1u64, |acc, i| acc * (n - k + i) / i)
}

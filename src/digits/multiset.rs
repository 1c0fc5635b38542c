use crate::digits::Width;
use crate::error::KaprekarResult;

/// The unordered collection of digits of a zero-padded value, stored as a digit histogram.
///
/// Two values of the same width have the same [`DigitMultiset`] iff they are digit
/// permutations of each other. The ascending arrangement of the multiset is the
/// *canonical signature* of the equivalence class.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DigitMultiset {
    counts: [u8; 10],
}

impl DigitMultiset {
    /// Compute the multiset of `value` padded to `width` digits.
    pub fn of(value: u64, width: Width) -> KaprekarResult<DigitMultiset> {
        Ok(Self::of_unchecked(width.check(value)?, width))
    }

    /// Same as [`DigitMultiset::of`], but assumes `value < 10^width`. Larger values
    /// are silently truncated to their lowest `width` digits.
    pub(crate) fn of_unchecked(mut value: u64, width: Width) -> DigitMultiset {
        let mut counts = [0u8; 10];
        for _ in 0..width.get() {
            counts[(value % 10) as usize] += 1;
            value /= 10;
        }
        DigitMultiset { counts }
    }

    /// Number of occurrences of each digit `0..=9`.
    pub fn counts(&self) -> &[u8; 10] {
        &self.counts
    }

    /// Total number of digits, i.e. the width this multiset was taken at.
    pub fn len(&self) -> usize {
        self.counts.iter().map(|c| usize::from(*c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if all digits are equal (the map sends such values straight to zero).
    pub fn is_repdigit(&self) -> bool {
        self.counts.iter().filter(|c| **c > 0).count() <= 1
    }

    /// Digits sorted non-decreasing, read as an integer (the canonical signature).
    pub fn ascending(&self) -> u64 {
        let mut value = 0u64;
        for (digit, count) in self.counts.iter().enumerate() {
            for _ in 0..*count {
                value = value * 10 + digit as u64;
            }
        }
        value
    }

    /// Digits sorted non-increasing, read as an integer.
    pub fn descending(&self) -> u64 {
        let mut value = 0u64;
        for (digit, count) in self.counts.iter().enumerate().rev() {
            for _ in 0..*count {
                value = value * 10 + digit as u64;
            }
        }
        value
    }
}

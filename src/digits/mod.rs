//! Fixed-width decimal digit handling.
//!
//! Every operation in this crate works with values of a fixed [`Width`]: a value `x` of width
//! `N` is always interpreted as exactly `N` decimal digits, padded with leading zeros. The
//! padding matters, because the Kaprekar map sorts *all* `N` digits (including the leading
//! zeros) before subtracting. As such, width is never implied; it is always passed along
//! explicitly with the value.

mod multiset;


use crate::error::{KaprekarError, KaprekarResult};
pub use multiset::DigitMultiset;
use std::fmt::{Display, Formatter};

/// The largest supported width. `10^19` is the largest power of ten that fits into `u64`.
pub const MAX_WIDTH: usize = 19;

/// `POWERS_OF_TEN[i] == 10^i` for every supported width.
pub(crate) const POWERS_OF_TEN: [u64; MAX_WIDTH + 1] = {
    let mut table = [1u64; MAX_WIDTH + 1];
    let mut i = 1;
    while i <= MAX_WIDTH {
        table[i] = table[i - 1] * 10;
        i += 1;
    }
    table
};

/// A validated number of decimal digits (`1..=MAX_WIDTH`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "usize", into = "usize")
)]
pub struct Width(u8);

impl Width {
    /// Create a new [`Width`], failing with [`KaprekarError::InvalidWidth`] for zero and
    /// [`KaprekarError::UnsupportedWidth`] when `10^width` would overflow `u64`.
    pub fn new(width: usize) -> KaprekarResult<Width> {
        if width == 0 || width > MAX_WIDTH {
            return Err(KaprekarError::bad_width(width));
        }
        Ok(Width(width as u8))
    }

    /// The number of digits.
    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    /// The number of distinct values of this width, i.e. `10^width`.
    pub fn state_space(self) -> u64 {
        POWERS_OF_TEN[self.get()]
    }

    /// Check that `value` lies in `[0, 10^width)`.
    pub fn check(self, value: u64) -> KaprekarResult<u64> {
        if value < self.state_space() {
            Ok(value)
        } else {
            Err(KaprekarError::InvalidValue {
                value,
                width: self.get(),
            })
        }
    }

    /// Format `value` zero-padded to this width.
    pub fn pad(self, value: u64) -> String {
        format!("{:0width$}", value, width = self.get())
    }
}

impl TryFrom<usize> for Width {
    type Error = KaprekarError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Width::new(value)
    }
}

impl From<Width> for usize {
    fn from(value: Width) -> Self {
        value.get()
    }
}

impl Display for Width {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split `value` into exactly `width` decimal digits, most significant digit first.
///
/// Fails with [`KaprekarError::InvalidValue`] if `value >= 10^width`.
pub fn to_digits(value: u64, width: Width) -> KaprekarResult<Vec<u8>> {
    let mut rest = width.check(value)?;
    let mut digits = vec![0u8; width.get()];
    for digit in digits.iter_mut().rev() {
        *digit = (rest % 10) as u8;
        rest /= 10;
    }
    Ok(digits)
}

/// Interpret a sequence of decimal digits (most significant first, leading zeros allowed)
/// as an integer.
///
/// Fails with [`KaprekarError::InvalidDigit`] for elements above `9` and with
/// [`KaprekarError::UnsupportedWidth`] for sequences longer than [`MAX_WIDTH`].
pub fn from_digits(digits: &[u8]) -> KaprekarResult<u64> {
    if digits.len() > MAX_WIDTH {
        return Err(KaprekarError::bad_width(digits.len()));
    }
    digits.iter().try_fold(0u64, |value, &digit| {
        if digit > 9 {
            Err(KaprekarError::InvalidDigit { digit })
        } else {
            Ok(value * 10 + u64::from(digit))
        }
    })
}

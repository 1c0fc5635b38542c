use crate::classes::class_count;
use crate::digits::Width;

/// Iterator over all canonical signatures of one width, in increasing order.
///
/// Internally, this is an "odometer" over non-decreasing digit sequences: the rightmost digit
/// that can still grow is incremented and every digit after it is reset to the same value.
/// This visits exactly the combinations with repetition of `width` digits.
#[derive(Clone, Debug)]
pub struct CanonicalSignatures {
    digits: Option<Vec<u8>>,
    remaining: u64,
}

impl CanonicalSignatures {
    pub(crate) fn new(width: Width) -> CanonicalSignatures {
        CanonicalSignatures {
            digits: Some(vec![0u8; width.get()]),
            remaining: class_count(width),
        }
    }
}

impl Iterator for CanonicalSignatures {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let digits = self.digits.as_mut()?;
        let value = digits
            .iter()
            .fold(0u64, |value, digit| value * 10 + u64::from(*digit));

        match digits.iter().rposition(|digit| *digit < 9) {
            Some(position) => {
                let next = digits[position] + 1;
                for digit in &mut digits[position..] {
                    *digit = next;
                }
            }
            None => {
                // All nines, this was the last signature.
                self.digits = None;
            }
        }

        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CanonicalSignatures {}

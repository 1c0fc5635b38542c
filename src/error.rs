use crate::digits::MAX_WIDTH;
use cancel_this::{Cancellable, Cancelled};
use thiserror::Error;

/// Shorthand for results of fallible operations in this crate.
pub type KaprekarResult<T> = Result<T, KaprekarError>;

/// Errors reported by the digit, tracing and graph operations.
///
/// All operations are deterministic, so retrying after an error is pointless: the same
/// input fails the same way again. The only exception is [`KaprekarError::Cancelled`], which
/// reflects a cancellation trigger installed by the caller (e.g. `cancel_this::on_timeout`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KaprekarError {
    #[error("width must be positive (got {width})")]
    InvalidWidth { width: usize },
    #[error("width {width} exceeds the supported maximum of {max} digits")]
    UnsupportedWidth { width: usize, max: usize },
    #[error("value {value} does not fit into {width} digits")]
    InvalidValue { value: u64, width: usize },
    #[error("{digit} is not a decimal digit")]
    InvalidDigit { digit: u8 },
    #[error("no cycle found from seed {seed} within {max_steps} steps")]
    CycleNotFound { seed: u64, max_steps: usize },
    #[error("node {node} already maps to {existing}, cannot also map to {target}")]
    InconsistentEdge {
        node: u64,
        existing: u64,
        target: u64,
    },
    #[error("trajectory (width {found_width}, {found_kind}) does not match graph (width {width}, {kind})")]
    GraphMismatch {
        width: usize,
        kind: &'static str,
        found_width: usize,
        found_kind: &'static str,
    },
    #[error("malformed trajectory: {reason}")]
    MalformedTrajectory { reason: &'static str },
    #[error("computation cancelled: {0}")]
    Cancelled(Cancelled),
}

impl From<Cancelled> for KaprekarError {
    fn from(value: Cancelled) -> Self {
        KaprekarError::Cancelled(value)
    }
}

/// Separate cancellation from the other errors of `result`, so that callers running inside
/// `cancel_this::on_trigger` (or `on_timeout`) see it as the outer [`Cancelled`] error.
pub fn split_cancelled<T>(result: KaprekarResult<T>) -> Cancellable<KaprekarResult<T>> {
    match result {
        Err(KaprekarError::Cancelled(cancelled)) => Err(cancelled),
        result => Ok(result),
    }
}

impl KaprekarError {
    /// Build the error reported for a width outside `1..=MAX_WIDTH`.
    pub(crate) fn bad_width(width: usize) -> KaprekarError {
        if width == 0 {
            KaprekarError::InvalidWidth { width }
        } else {
            KaprekarError::UnsupportedWidth {
                width,
                max: MAX_WIDTH,
            }
        }
    }
}

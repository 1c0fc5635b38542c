//! Selection of the seeds an analysis starts from.

use crate::classes::enumerate_canonical;
use crate::digits::Width;
use crate::error::{KaprekarError, KaprekarResult};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Which values to start trajectories from. Every variant is resolved against a [`Width`].
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeedSpec {
    /// Exactly these values.
    List(Vec<u64>),
    /// All values in `start..end`.
    Range { start: u64, end: u64 },
    /// Every `step`-th value of `start..end`.
    Stride { start: u64, end: u64, step: u64 },
    /// `count` uniformly random values (with repetition), reproducible from `seed`.
    Random { count: usize, seed: u64 },
    /// The canonical signature of every class, in increasing order.
    Canonical,
}

impl SeedSpec {
    /// Every value of the width if there are at most `max_seeds` of them, otherwise a
    /// reproducible random sample of `max_seeds` values.
    pub fn exhaustive_or_sample(width: Width, max_seeds: usize, seed: u64) -> SeedSpec {
        let total = width.state_space();
        if total <= max_seeds as u64 {
            SeedSpec::Range {
                start: 0,
                end: total,
            }
        } else {
            SeedSpec::Random {
                count: max_seeds,
                seed,
            }
        }
    }

    /// Produce the seeds, drawing random values from a [`StdRng`] seeded with the stored `seed`.
    pub fn resolve(&self, width: Width) -> KaprekarResult<Vec<u64>> {
        let seed = match self {
            SeedSpec::Random { seed, .. } => *seed,
            _ => 0,
        };
        self.sample_with(width, &mut StdRng::seed_from_u64(seed))
    }

    /// Same as [`SeedSpec::resolve`], but random values are drawn from `rng` (the seed
    /// stored in [`SeedSpec::Random`] is ignored).
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        width: Width,
        rng: &mut R,
    ) -> KaprekarResult<Vec<u64>> {
        let seeds = match self {
            SeedSpec::List(values) => values
                .iter()
                .map(|value| width.check(*value))
                .collect::<KaprekarResult<Vec<u64>>>()?,
            SeedSpec::Range { start, end } => {
                check_bounds(width, *start, *end)?;
                (*start..*end).collect()
            }
            SeedSpec::Stride { start, end, step } => {
                check_bounds(width, *start, *end)?;
                let step = usize::try_from((*step).max(1)).unwrap_or(usize::MAX);
                (*start..*end).step_by(step).collect()
            }
            SeedSpec::Random { count, .. } => {
                let total = width.state_space();
                (0..*count).map(|_| rng.gen_range(0..total)).collect()
            }
            SeedSpec::Canonical => enumerate_canonical(width).collect(),
        };
        debug!("[width:{}] Resolved {:?} into {} seeds.", width, self, seeds.len());
        Ok(seeds)
    }
}

/// `end` is exclusive, so it may be equal to `10^N`.
fn check_bounds(width: Width, start: u64, end: u64) -> KaprekarResult<()> {
    let total = width.state_space();
    for bound in [start, end] {
        if bound > total {
            return Err(KaprekarError::InvalidValue {
                value: bound,
                width: width.get(),
            });
        }
    }
    Ok(())
}

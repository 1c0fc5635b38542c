use crate::error::{KaprekarError, KaprekarResult};
use crate::trace::TraceConfig;
use cancel_this::is_cancelled;
use log::debug;

/// Shape of a trajectory, computed without storing it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleSummary {
    /// Number of steps before the trajectory enters its cycle.
    pub tail_length: usize,
    /// Number of distinct nodes on the cycle (`1` for a fixed point).
    pub cycle_length: usize,
    /// The first cycle node reached from the seed.
    pub entry: u64,
}

/// Find the tail length, cycle length and cycle entry of the trajectory starting at `seed`
/// using Brent's cycle detection. Only a constant number of nodes is kept in memory, which
/// makes this usable for very wide values where storing whole trajectories is wasteful.
///
/// The search fails with [`KaprekarError::CycleNotFound`] once the cycle-finding phase
/// exceeds `2 * config.max_steps` applications of the map.
pub fn cycle_summary(config: &TraceConfig, seed: u64) -> KaprekarResult<CycleSummary> {
    let seed = config.width().check(seed)?;
    let kind = config.node_kind;
    let transformer = &config.transformer;
    let start = transformer.node_of(seed, kind);
    let step_limit = config.max_steps.saturating_mul(2);

    // Phase 1: find the cycle length. The tortoise teleports to the hare at powers of two.
    let mut power = 1usize;
    let mut cycle_length = 1usize;
    let mut steps = 1usize;
    let mut tortoise = start;
    let mut hare = transformer.step(start, kind);
    while tortoise != hare {
        if steps >= step_limit {
            return Err(KaprekarError::CycleNotFound {
                seed,
                max_steps: config.max_steps,
            });
        }
        if power == cycle_length {
            is_cancelled!()?;
            tortoise = hare;
            power *= 2;
            cycle_length = 0;
        }
        hare = transformer.step(hare, kind);
        cycle_length += 1;
        steps += 1;
    }

    // Phase 2: a hare `cycle_length` steps ahead meets the tortoise at the cycle entry.
    let mut tortoise = start;
    let mut hare = start;
    for _ in 0..cycle_length {
        hare = transformer.step(hare, kind);
    }
    let mut tail_length = 0usize;
    while tortoise != hare {
        tortoise = transformer.step(tortoise, kind);
        hare = transformer.step(hare, kind);
        tail_length += 1;
    }

    debug!(
        "[seed:{}] Brent search finished: tail={}; cycle={}; entry={}.",
        seed,
        tail_length,
        cycle_length,
        config.width().pad(tortoise)
    );

    Ok(CycleSummary {
        tail_length,
        cycle_length,
        entry: tortoise,
    })
}

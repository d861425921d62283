//! Deterministic random streams.
//!
//! # Determinism strategy
//!
//! Every agent owns a `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent_slot * MIXING_CONSTANT)
//!
//! so the decisions one agent makes never depend on how many random numbers
//! another agent consumed earlier in the same frame.  World-level actors
//! (plots, the director, domain planners) share one [`SimRng`] and are
//! always ticked in a fixed order by the driver.
//!
//! Scoring code (the combat utility evaluator) never draws from either
//! stream; only goal selection, jitter, and crisis resolution are random.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Pick an index with probability proportional to its weight.
///
/// Non-positive and non-finite weights are never picked.  Returns `None`
/// when no weight is positive.
pub fn select_weighted<R: Rng + ?Sized>(rng: &mut R, weights: &[f32]) -> Option<usize> {
    let usable = |w: f32| w.is_finite() && w > 0.0;
    let total: f32 = weights.iter().copied().filter(|&w| usable(w)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.gen_range(0.0..total);
    let mut last = None;
    for (i, &w) in weights.iter().enumerate() {
        if !usable(w) {
            continue;
        }
        if roll < w {
            return Some(i);
        }
        roll -= w;
        last = Some(i);
    }
    // Float rounding can leave a sliver past the final bucket.
    last
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG, stored in the arena next to the agent.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed from the run's global seed and the agent's arena slot.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// The inner `SmallRng`, for `rand` distributions and [`crate::Ticker::randomize`].
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// A random element, or `None` for an empty slice.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    #[inline]
    pub fn select_weighted(&mut self, weights: &[f32]) -> Option<usize> {
        select_weighted(&mut self.0, weights)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// World-level RNG for plots, the director, and domain planners.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent stream, e.g. one per domain planner.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn select_weighted(&mut self, weights: &[f32]) -> Option<usize> {
        select_weighted(&mut self.0, weights)
    }
}

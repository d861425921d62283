//! Simulation time: frame ticks, the millisecond clock, and periodic tickers.
//!
//! # Design
//!
//! The driver advances in whole frames (`Tick`).  Each frame represents a
//! fixed number of milliseconds held in `SimClock`:
//!
//!   elapsed_ms = tick * tick_ms
//!
//! Everything inside an agent is expressed in milliseconds.  Work that must
//! not run every frame (perception, needs, planning) is paced by a
//! [`Ticker`], and every agent tick reports how long it may sleep so the
//! driver only wakes agents that have something to do.

use std::fmt;

use rand::Rng;

/// Milliseconds.  All durations inside the core use this unit.
pub type Millis = u32;

/// Wake hint for "nothing to do for a long while".
pub const VERY_LONG_TICK: Millis = 10_000;

/// Milliseconds per simulated minute.
pub const MINUTE: Millis = 60 * 1000;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute frame counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` frames after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Frames elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Maps frame ticks to simulated milliseconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Milliseconds represented by one frame.
    pub tick_ms: Millis,
    /// The current frame, advanced once per driver iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_ms: Millis) -> Self {
        Self { tick_ms: tick_ms.max(1), current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Simulated milliseconds since frame 0.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.current_tick.0 * self.tick_ms as u64
    }

    /// Frames needed to cover `ms`, rounded up and never less than one so a
    /// zero hint cannot re-wake an agent in the frame it just ran.
    #[inline]
    pub fn ticks_for_ms(&self, ms: Millis) -> u64 {
        (ms as u64).div_ceil(self.tick_ms as u64).max(1)
    }

    /// Milliseconds spanned by `frames` frames.
    #[inline]
    pub fn ms_for_ticks(&self, frames: u64) -> Millis {
        (frames * self.tick_ms as u64).min(Millis::MAX as u64) as Millis
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed_ms() / 1000;
        write!(f, "{} ({}:{:02})", self.current_tick, secs / 60, secs % 60)
    }
}

// ── Ticker ────────────────────────────────────────────────────────────────────

/// A repeating countdown.
///
/// `delta` subtracts elapsed time and reports how many periods elapsed, so a
/// caller that was asleep for several periods can catch up.  A freshly
/// constructed ticker fires on its first `delta`; call [`Ticker::reset`] to
/// wait one full period first, or [`Ticker::randomize`] to start at a random
/// phase so that many agents sharing one period do not all fire on the same
/// frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticker {
    period: i32,
    time: i32,
}

impl Ticker {
    pub fn new(period: Millis) -> Self {
        Self { period: clamp_period(period), time: 0 }
    }

    /// A ticker that first fires after one full period.
    pub fn delayed(period: Millis) -> Self {
        let period = clamp_period(period);
        Self { period, time: period }
    }

    /// Advance by `delta` ms and return how many times the ticker fired.
    pub fn delta(&mut self, delta: Millis) -> u32 {
        let delta = delta.min(i32::MAX as u32) as i32;
        self.time = self.time.saturating_sub(delta);
        if self.time > 0 {
            return 0;
        }
        let behind = -(self.time as i64);
        let period = self.period as i64;
        let fired = behind / period + 1;
        // Lands in (0, period].
        self.time = (self.time as i64 + fired * period) as i32;
        fired.min(u32::MAX as i64) as u32
    }

    /// `delta` reduced to "did it fire at all".
    #[inline]
    pub fn fired(&mut self, delta: Millis) -> bool {
        self.delta(delta) > 0
    }

    /// Milliseconds until the next firing.
    #[inline]
    pub fn next(&self) -> Millis {
        self.time.max(0) as Millis
    }

    #[inline]
    pub fn period(&self) -> Millis {
        self.period as Millis
    }

    /// Restart the countdown at a full period.
    #[inline]
    pub fn reset(&mut self) {
        self.time = self.period;
    }

    /// Change the period without touching the current countdown.
    pub fn set_period(&mut self, period: Millis) {
        self.period = clamp_period(period);
    }

    /// Jump to a uniformly random phase within the period.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.time = rng.gen_range(0..self.period);
    }

    /// Shorten the countdown so it fires no later than `t` ms from now.
    pub fn within(&mut self, t: Millis) {
        let t = t.min(i32::MAX as u32) as i32;
        self.time = self.time.min(t);
    }

    /// Portion of the period still to run, in `[0, 1]`.
    pub fn fraction_remaining(&self) -> f32 {
        (self.time.max(0) as f32 / self.period as f32).min(1.0)
    }
}

fn clamp_period(period: Millis) -> i32 {
    period.clamp(1, i32::MAX as u32) as i32
}

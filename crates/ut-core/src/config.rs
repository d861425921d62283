//! Run configuration and behaviour tuning.
//!
//! Typically deserialized by the application from a file (with the `serde`
//! feature) or built from `Default` and tweaked in code.  None of these
//! values are balance-accurate; they only have to keep the algorithms in
//! their intended regimes.

use crate::time::{Millis, Tick};

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level driver configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Milliseconds per frame.  Default: 100.
    pub tick_ms: Millis,

    /// Frames a full `Sim::run` covers.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed and world always produce the same run.
    pub seed: u64,
}

impl SimConfig {
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    pub fn make_clock(&self) -> crate::SimClock {
        crate::SimClock::new(self.tick_ms)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { tick_ms: 100, total_ticks: 6_000, seed: 0x5eed }
    }
}

// ── AiConfig ──────────────────────────────────────────────────────────────────

/// Behaviour tuning shared by every agent.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiConfig {
    // ── Perception ────────────────────────────────────────────────────────
    /// How often the friend/enemy lists are rebuilt.
    pub perception_period: Millis,
    /// Radius of the friend/enemy scan.
    pub scan_radius: f32,
    /// Capacity of each tracked-id list.
    pub max_track: usize,
    /// Allies told about new threats when entering battle.
    pub ally_fanout: usize,

    // ── Planning cadence ──────────────────────────────────────────────────
    pub normal_rethink: Millis,
    pub battle_rethink: Millis,
    /// Wake hint while the world has the agent locked in an animation.
    pub locked_wake: Millis,
    /// Wake hint while fighting.
    pub battle_wake: Millis,
    /// Consecutive blocked moves before escalating.
    pub blocked_retry_limit: u32,

    // ── Needs ─────────────────────────────────────────────────────────────
    pub needs_period: Millis,
    /// Below this a drive counts as critical.
    pub critical_need: f64,
    /// Minimum summed benefit for a building visit to be worth the walk.
    pub visit_threshold: f64,
    pub social_pulse: Millis,
    pub social_radius: f32,
    pub social_boost: f64,

    // ── Ranges ────────────────────────────────────────────────────────────
    pub melee_range: f32,
    pub pickup_range: f32,
    pub loot_radius: f32,
    pub fruit_radius: f32,
    pub herd_radius: f32,
    pub wander_radius: i32,
    /// Explosive weapons are not fired at targets closer than this.
    pub explosive_safe_range: f32,

    // ── Durations ─────────────────────────────────────────────────────────
    pub build_time: Millis,
    pub guard_time: Millis,
    pub wander_stand: Millis,
    pub flag_stand: Millis,
    pub visitor_stand: Millis,

    // ── Species rules ─────────────────────────────────────────────────────
    /// Workers only fight while their team is smaller than this.
    pub worker_engage_floor: usize,
    /// Chance per idle plan that a greater monster goes on a rampage.
    pub rampage_chance: f64,
    /// Kiosks a visitor sees before leaving the map.
    pub visitor_kiosks: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            perception_period:   1_000,
            scan_radius:         10.0,
            max_track:           8,
            ally_fanout:         4,

            normal_rethink:      2_000,
            battle_rethink:      500,
            locked_wake:         100,
            battle_wake:         100,
            blocked_retry_limit: 3,

            needs_period:        1_000,
            critical_need:       0.1,
            visit_threshold:     0.3,
            social_pulse:        1_000,
            social_radius:       3.0,
            social_boost:        0.02,

            melee_range:         1.0,
            pickup_range:        1.1,
            loot_radius:         8.0,
            fruit_radius:        10.0,
            herd_radius:         12.0,
            wander_radius:       8,
            explosive_safe_range: 1.5,

            build_time:          2_000,
            guard_time:          10_000,
            wander_stand:        3_000,
            flag_stand:          4_000,
            visitor_stand:       4_000,

            worker_engage_floor: 4,
            rampage_chance:      0.05,
            visitor_kiosks:      3,
        }
    }
}

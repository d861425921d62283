//! Drives (food, energy, fun) and morale.
//!
//! All four values live in `[0, 1]` and start full.  Drives decay over
//! [`DECAY_TIME`] seconds; morale falls while any drive is empty and
//! recovers while all are comfortably high.  When morale reaches zero the
//! agent has a one-shot crisis, resolved by the scheduler.

use ut_core::{Personality, Preference, StructureKind};
use ut_world::{BuildingInfo, Inventory};

/// Seconds for a drive to fall from full to empty.
pub const DECAY_TIME: f64 = 200.0;

pub const NUM_NEEDS: usize = 3;
pub const FOOD: usize = 0;
pub const ENERGY: usize = 1;
pub const FUN: usize = 2;

/// Gold a visitor needs to buy at an exchange.
const CRYSTAL_PRICE: u32 = 10;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Needs {
    need:   [f64; NUM_NEEDS],
    morale: f64,
}

impl Default for Needs {
    fn default() -> Self {
        Self { need: [1.0; NUM_NEEDS], morale: 1.0 }
    }
}

impl Needs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(i: usize) -> &'static str {
        match i {
            FOOD => "food",
            ENERGY => "energy",
            _ => "fun",
        }
    }

    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        self.need.get(i).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, i: usize, v: f64) {
        if let Some(n) = self.need.get_mut(i) {
            *n = v.clamp(0.0, 1.0);
        }
    }

    #[inline]
    pub fn values(&self) -> [f64; NUM_NEEDS] {
        self.need
    }

    #[inline]
    pub fn morale(&self) -> f64 {
        self.morale
    }

    pub fn set_morale(&mut self, m: f64) {
        self.morale = m.clamp(0.0, 1.0);
    }

    pub fn add_morale(&mut self, d: f64) {
        self.set_morale(self.morale + d);
    }

    /// Decay at home for `delta` ms.  Drives only fall here; they come back
    /// up through [`Needs::add`].
    pub fn tick(&mut self, delta: u32, in_battle: bool, personality: &Personality) {
        let d = delta as f64 * 0.001 / DECAY_TIME;
        for n in &mut self.need {
            *n -= d;
        }
        if in_battle {
            match personality.fighting {
                Preference::Likes => self.need[FUN] += d * 10.0,
                Preference::Indifferent => self.need[FUN] += d * 2.0,
                Preference::Dislikes => {}
            }
        }
        self.clamp_needs();

        let min = self.need.iter().copied().fold(f64::INFINITY, f64::min);
        if min < 0.001 {
            self.morale -= d;
        }
        if min > 0.5 {
            self.morale += d;
        }
        self.morale = self.morale.clamp(0.0, 1.0);
    }

    /// Away from home the drives hold but morale slowly drains.
    pub fn travel_tick(&mut self, delta: u32) {
        let d = delta as f64 * 0.001 * 0.05 / DECAY_TIME;
        self.morale = (self.morale - d).clamp(0.0, 1.0);
    }

    /// Add `values × scale` to the drives, clamped.
    pub fn add(&mut self, values: [f64; NUM_NEEDS], scale: f64) {
        for (n, v) in self.need.iter_mut().zip(values) {
            *n += v * scale;
        }
        self.clamp_needs();
    }

    /// `true` if any drive is below `threshold`.
    pub fn is_critical(&self, threshold: f64) -> bool {
        self.need.iter().any(|&n| n < threshold)
    }

    /// Index of the emptiest drive.
    pub fn lowest(&self) -> usize {
        let mut best = 0;
        for i in 1..NUM_NEEDS {
            if self.need[i] < self.need[best] {
                best = i;
            }
        }
        best
    }

    /// If morale has bottomed out, restore it and report the crisis.
    ///
    /// Returns `true` at most once per time morale reaches zero.
    pub fn take_crisis(&mut self) -> bool {
        if self.morale > 0.0 {
            return false;
        }
        self.morale = 1.0;
        true
    }

    fn clamp_needs(&mut self) {
        for n in &mut self.need {
            *n = n.clamp(0.0, 1.0);
        }
    }
}

/// What a visit to `building` would give a visitor with `inventory`,
/// `personality` and `hp_fraction`.  Zero for buildings it cannot use.
pub fn fulfilled_by_building(
    building: &BuildingInfo,
    inventory: &Inventory,
    personality: &Personality,
    hp_fraction: f32,
) -> [f64; NUM_NEEDS] {
    const ZERO: [f64; NUM_NEEDS] = [0.0; NUM_NEEDS];

    let scale = 0.55 + 0.45 * building.zone_fit.clamp(-1.0, 1.0) as f64;
    let mut needs = building.kind.need_values().map(|v| v * scale);
    let crafting = personality.crafting;

    match building.kind {
        StructureKind::Factory => {
            if inventory.crystals == 0 {
                return ZERO;
            }
            match crafting {
                Preference::Likes => needs[FUN] *= 1.1,
                Preference::Dislikes => needs[FUN] *= 0.9,
                Preference::Indifferent => {}
            }
        }
        StructureKind::SleepTube => {
            needs[ENERGY] = needs[ENERGY].max(1.0 - hp_fraction as f64);
        }
        StructureKind::Market => {
            let selling = inventory.fruit > 0 || inventory.food > 0;
            if !selling && (inventory.gold == 0 || building.stock == 0) {
                return ZERO;
            }
        }
        StructureKind::Exchange => {
            let can_trade = if crafting == Preference::Dislikes {
                inventory.crystals > 0
            } else {
                building.stock > 0 && inventory.gold >= CRYSTAL_PRICE
            };
            if !can_trade {
                return ZERO;
            }
        }
        StructureKind::Bar => {
            if building.stock == 0 {
                return ZERO;
            }
        }
        _ => {}
    }
    needs
}

//! Battle-mode option scoring.
//!
//! Every tracked enemy is scored for three options (move into range, melee,
//! shoot in place) and the single best (enemy, option) pair wins.  Scoring
//! is a pure function of the snapshot handed in, so it can be tested without
//! a world and two agents in the same situation always choose alike.

use ut_agent::TrackList;
use ut_core::{AiConfig, EntityId, Vec2F};
use ut_world::prelude::*;
use ut_world::{EntityInfo, Loadout};

/// Smallest distance used as a divisor.
const MIN_RANGE: f32 = 0.01;

/// Penalty on shooting while already shooting, so a unit does not camp.
const CAMPING_PENALTY: f32 = 0.9;

const LAST_TARGET_BONUS: f32 = 2.0;
const LOCKED_TARGET_BONUS: f32 = 20.0;
/// Applied to buildings while something that can fight back is around.
const STATIC_TARGET_PENALTY: f32 = 0.1;
/// Extra weight for an enemy straight ahead.
const HEADING_BONUS: f32 = 0.5;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CombatOption {
    /// Walk until the target is inside effective range.
    Move,
    Melee,
    /// Stand still and fire.
    Shoot,
}

impl CombatOption {
    /// Scoring order; earlier options win ties.
    pub const ALL: [CombatOption; 3] = [CombatOption::Move, CombatOption::Melee, CombatOption::Shoot];
}

/// One enemy as seen from the evaluating agent.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Target {
    pub id:            EntityId,
    pub pos:           Vec2F,
    pub mobile:        bool,
    pub line_of_sight: bool,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CombatChoice {
    pub option:  CombatOption,
    pub target:  EntityId,
    /// Index of the winner in the slice passed to `evaluate`.
    pub index:   usize,
    pub utility: f32,
}

/// Snapshot `enemies` into [`Target`]s, skipping ids that no longer resolve.
pub fn gather_targets<W: World + ?Sized>(world: &W, me: &EntityInfo, enemies: &TrackList) -> Vec<Target> {
    enemies
        .iter()
        .filter_map(|id| world.entity(id))
        .map(|e| Target {
            id:            e.id,
            pos:           e.pos,
            mobile:        e.is_mobile(),
            line_of_sight: world.has_straight_path(me.pos, e.pos),
        })
        .collect()
}

#[derive(Copy, Clone, Debug)]
pub struct UtilityEvaluator {
    melee_range:          f32,
    explosive_safe_range: f32,
}

impl UtilityEvaluator {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            melee_range:          config.melee_range,
            explosive_safe_range: config.explosive_safe_range,
        }
    }

    /// Best (target, option) pair, or `None` when no option is available
    /// against any target.
    ///
    /// Options the loadout cannot perform are skipped outright rather than
    /// scored zero, so a missing weapon never ties with a useless one.  The
    /// comparison is strict: on equal utility the earlier target and the
    /// earlier option keep the win.
    pub fn evaluate(
        &self,
        me:       &EntityInfo,
        loadout:  &Loadout,
        targets:  &[Target],
        last:     Option<EntityId>,
        locked:   Option<EntityId>,
        shooting: bool,
    ) -> Option<CombatChoice> {
        let threats_mobile = targets.iter().any(|t| t.mobile);
        let mut best: Option<CombatChoice> = None;
        let mut best_utility = f32::NEG_INFINITY;

        for (index, target) in targets.iter().enumerate() {
            let range = me.pos.distance(target.pos).max(MIN_RANGE);
            let bias = self.targeting_bias(me, target, last, locked, threats_mobile);
            for option in CombatOption::ALL {
                let Some(utility) = self.option_utility(option, range, bias, loadout, target, shooting)
                else {
                    continue;
                };
                if utility > best_utility {
                    best_utility = utility;
                    best = Some(CombatChoice { option, target: target.id, index, utility });
                }
            }
        }
        best
    }

    /// Multiplier shared by every option against `target`.
    pub fn targeting_bias(
        &self,
        me:             &EntityInfo,
        target:         &Target,
        last:           Option<EntityId>,
        locked:         Option<EntityId>,
        threats_mobile: bool,
    ) -> f32 {
        let dir = (target.pos - me.pos).normalized();
        let mut bias = 1.0 + HEADING_BONUS * me.heading.dot(dir).max(0.0);
        if last == Some(target.id) {
            bias *= LAST_TARGET_BONUS;
        }
        if locked == Some(target.id) {
            bias *= LOCKED_TARGET_BONUS;
        }
        if !target.mobile && threats_mobile {
            bias *= STATIC_TARGET_PENALTY;
        }
        bias
    }

    fn option_utility(
        &self,
        option:   CombatOption,
        range:    f32,
        bias:     f32,
        loadout:  &Loadout,
        target:   &Target,
        shooting: bool,
    ) -> Option<f32> {
        match option {
            CombatOption::Shoot => {
                let gun = loadout.ranged?;
                if !gun.has_ammo || !target.line_of_sight {
                    return None;
                }
                if gun.explosive && range < self.explosive_safe_range {
                    return Some(0.0);
                }
                let eff = gun.effective_range.max(MIN_RANGE);
                let mut u = (1.0 - (range - eff) / eff).clamp(0.0, 2.0) * bias;
                if shooting {
                    u *= CAMPING_PENALTY;
                }
                Some(u)
            }
            CombatOption::Move => {
                let gun = loadout.ranged?;
                let eff = gun.effective_range.max(MIN_RANGE);
                let mut u = (range - eff) / eff * bias;
                if !gun.ready {
                    u *= 0.5;
                }
                Some(u)
            }
            CombatOption::Melee => {
                loadout.melee?;
                Some(self.melee_range / range * bias)
            }
        }
    }
}

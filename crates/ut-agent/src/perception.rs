//! Who is around: the per-agent friend and enemy lists.
//!
//! The lists are derived data.  They are rebuilt from a spatial query on a
//! coarse [`Ticker`] and only pruned in between, so a crowd of agents costs
//! one radius query per agent per period rather than per frame.  Dropping
//! the cache and rebuilding it is always safe.

use ut_core::{AiConfig, EntityId, Ticker};
use ut_world::prelude::*;
use ut_world::{EntityInfo, EntityKind, Relation};

use crate::state::TrackList;

#[derive(Clone, Debug)]
pub struct PerceptionCache {
    pub enemies: TrackList,
    pub friends: TrackList,
    pub ticker:  Ticker,
}

impl PerceptionCache {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            enemies: TrackList::new(config.max_track),
            friends: TrackList::new(config.max_track),
            ticker:  Ticker::new(config.perception_period),
        }
    }

    /// Rebuild both lists from a radius query around `me`.
    ///
    /// Mobile enemies come first, nearest first.  Enemy buildings are only
    /// tracked when no mobile enemy is in range.  A still-hostile `locked`
    /// target is kept at index 0 even if it drifted out of the radius.
    pub fn refresh<W: World + ?Sized>(
        &mut self,
        world: &W,
        me: &EntityInfo,
        config: &AiConfig,
        locked: Option<EntityId>,
    ) {
        let hits = world.query_near(me.pos, config.scan_radius, &|e| {
            e.id != me.id && matches!(e.kind, EntityKind::Mob(_) | EntityKind::Building(_))
        });

        let mut mobile = Vec::new();
        let mut fixed = Vec::new();
        self.friends.clear();
        for id in hits {
            let Some(info) = world.entity(id) else { continue };
            match world.relation(me.team, info.team) {
                Relation::Enemy if info.is_mobile() => mobile.push(id),
                Relation::Enemy => fixed.push(id),
                Relation::Friend if info.is_mobile() => {
                    self.friends.push(id);
                }
                _ => {}
            }
        }

        self.enemies.clear();
        if let Some(target) = locked.filter(|&t| is_hostile(world, me, t)) {
            self.enemies.push(target);
        }
        for id in &mobile {
            self.enemies.push(*id);
        }
        if mobile.is_empty() {
            for id in fixed {
                self.enemies.push(id);
            }
        }
    }

    /// Drop ids that no longer resolve or are no longer hostile/friendly.
    ///
    /// Returns `true` if `locked` was among the dropped enemies.
    pub fn prune<W: World + ?Sized>(
        &mut self,
        world: &W,
        me: &EntityInfo,
        locked: Option<EntityId>,
    ) -> bool {
        self.enemies.retain(|&id| is_hostile(world, me, id));
        self.friends.retain(|&id| {
            world
                .entity(id)
                .is_some_and(|e| world.relation(me.team, e.team) == Relation::Friend)
        });
        locked.is_some_and(|t| !self.enemies.contains(t))
    }

    /// Enemies that can move.
    pub fn mobile_enemies<'a, W: World + ?Sized>(
        &'a self,
        world: &'a W,
    ) -> impl Iterator<Item = EntityId> + 'a {
        self.enemies
            .iter()
            .filter(move |&id| world.entity(id).is_some_and(|e| e.is_mobile()))
    }
}

/// `true` if `id` exists and `me`'s team regards it as an enemy.
pub fn is_hostile<W: World + ?Sized>(world: &W, me: &EntityInfo, id: EntityId) -> bool {
    world
        .entity(id)
        .is_some_and(|e| world.relation(me.team, e.team) == Relation::Enemy)
}

//! The global director: runs the active plot and, on a cadence set by the
//! player's temples, sends monsters at the player's home.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use ut_core::{Millis, MobClass, SimRng, TeamId, Ticker, Vec2I, MINUTE, VERY_LONG_TICK};
use ut_world::prelude::*;
use ut_world::{EntityInfo, NewsLog, Relation};

use crate::plot::Plot;

/// Attack cadence without a player home, and its upper bound.
const MAX_ATTACK_MINUTES: u32 = 5;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Director {
    plot:            Option<Plot>,
    attack_ticker:   Ticker,
    attract_lesser:  bool,
    attract_greater: bool,
    /// Teams with a pending one-off summons to the player's home.
    attract_teams:   BTreeSet<TeamId>,
}

impl Default for Director {
    fn default() -> Self {
        Self::new()
    }
}

impl Director {
    pub fn new() -> Self {
        Self {
            plot: None,
            attack_ticker: Ticker::delayed(MAX_ATTACK_MINUTES * MINUTE),
            attract_lesser: false,
            attract_greater: false,
            attract_teams: BTreeSet::new(),
        }
    }

    pub fn plot(&self) -> Option<&Plot> {
        self.plot.as_ref()
    }

    /// Replace the running plot and announce the new one.
    pub fn start_plot(&mut self, plot: Plot, news: &mut NewsLog) {
        if let Some(old) = &self.plot {
            tracing::warn!(old = old.tag(), new = plot.tag(), "replacing running plot");
        }
        tracing::info!(plot = plot.tag(), "plot started");
        plot.announce(news);
        self.plot = Some(plot);
    }

    /// Sector the active plot wants `agent` in.
    pub fn should_send_herd<W: World + ?Sized>(&self, agent: &EntityInfo, world: &W) -> Option<Vec2I> {
        self.plot.as_ref()?.should_influence(agent, world)
    }

    pub fn priority_send_herd(&self, agent: &EntityInfo) -> Option<Vec2I> {
        self.plot.as_ref()?.priority_send(agent)
    }

    /// Summon one idle member of `team` to the player's home.
    pub fn attract_team(&mut self, team: TeamId) {
        self.attract_teams.insert(team);
    }

    pub fn is_attracting(&self, class: MobClass) -> bool {
        match class {
            MobClass::Greater => self.attract_greater,
            _ => self.attract_lesser,
        }
    }

    /// If an attraction applies to `agent`, consume it and return the
    /// player's home sector.
    ///
    /// Only enemies of the player outside the home sector answer.  Denizens
    /// ignore a home with no temples.
    pub fn take_attraction<W: World + ?Sized>(&mut self, agent: &EntityInfo, world: &W) -> Option<Vec2I> {
        let class = agent.species()?.mob_class();
        if matches!(class, MobClass::Worker | MobClass::Visitor) {
            return None;
        }
        let greater = class == MobClass::Greater;
        let by_team = self.attract_teams.contains(&agent.team);
        if !by_team && !self.is_attracting(class) {
            return None;
        }

        let home = world.player_home()?;
        if agent.sector() == home.sector {
            return None;
        }
        if home.temples == 0 && class == MobClass::Denizen {
            return None;
        }
        if world.relation(agent.team, home.team) != Relation::Enemy {
            return None;
        }

        if by_team {
            self.attract_teams.remove(&agent.team);
        } else if greater {
            self.attract_greater = false;
        } else {
            self.attract_lesser = false;
        }
        tracing::debug!(agent = %agent.id, sector = ?home.sector, "sent to player home");
        Some(home.sector)
    }

    /// A building in `sector` was destroyed.  Losses at the player's home
    /// push the next attack back.
    pub fn on_building_lost<W: World + ?Sized>(&mut self, sector: Vec2I, world: &W) {
        if world.player_home().is_some_and(|h| h.sector == sector) {
            self.attack_ticker.reset();
        }
    }

    /// Advance the plot and the attack cadence.  Returns a wake hint.
    pub fn tick<W: World + ?Sized>(
        &mut self,
        delta: Millis,
        world: &mut W,
        rng: &mut SimRng,
        news: &mut NewsLog,
    ) -> Millis {
        if let Some(plot) = &mut self.plot {
            if plot.tick(delta, world, rng, news) {
                tracing::info!(plot = plot.tag(), "plot finished");
                self.plot = None;
            }
        }

        let Some(home) = world.player_home() else {
            self.attack_ticker.set_period(MAX_ATTACK_MINUTES * MINUTE);
            self.attack_ticker.reset();
            return VERY_LONG_TICK;
        };
        let minutes = MAX_ATTACK_MINUTES.saturating_sub(home.temples).clamp(1, MAX_ATTACK_MINUTES);
        self.attack_ticker.set_period(minutes * MINUTE);

        if self.attack_ticker.fired(delta) {
            self.attract_lesser = true;
            self.attract_greater = home.temples > 2;
            tracing::debug!(temples = home.temples, greater = self.attract_greater, "attack wave");
        }
        VERY_LONG_TICK.min(self.attack_ticker.next().max(1))
    }
}

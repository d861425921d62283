//! Scripted world events.
//!
//! A plot is a small state machine the [`crate::Director`] owns.  While it
//! runs it can override where individual agents want to go
//! ([`Plot::should_influence`]); [`Plot::tick`] advances it and reports when
//! it is over.  Plots persist as a `type` tag plus their fields, and
//! [`Plot::from_tag`] builds an empty one from a tag alone.

use serde::{Deserialize, Serialize};

use ut_core::geo::{sector_center, NUM_SECTORS};
use ut_core::{EntityId, Millis, MobClass, Rect2I, SimRng, Species, TeamId, Ticker, Vec2I, MINUTE};
use ut_world::prelude::*;
use ut_world::{EntityInfo, EntityKind, NewsEvent, NewsKind, NewsLog, Relation, SpawnSpec};

use crate::error::{PlotError, PlotResult};

/// Temples a player needs before the rising evil will march on them.
pub const TEMPLES_REPEL_GREATER: u32 = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Plot {
    Swarm(SwarmPlot),
    Battle(BattlePlot),
    Rising(RisingPlot),
}

impl Plot {
    /// Empty plot for `tag`; `"null"` means no plot at all.
    pub fn from_tag(tag: &str) -> PlotResult<Option<Plot>> {
        match tag {
            "null" => Ok(None),
            "Swarm" => Ok(Some(Plot::Swarm(SwarmPlot::default()))),
            "Battle" => Ok(Some(Plot::Battle(BattlePlot::default()))),
            "Rising" => Ok(Some(Plot::Rising(RisingPlot::default()))),
            other => Err(PlotError::UnknownTag(other.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Plot::Swarm(_) => "Swarm",
            Plot::Battle(_) => "Battle",
            Plot::Rising(_) => "Rising",
        }
    }

    /// Post the opening headline, if the plot has one.
    pub fn announce(&self, news: &mut NewsLog) {
        match self {
            Plot::Swarm(p) => news.push(
                NewsEvent::new(NewsKind::PlotStart, "A swarm is beginning.")
                    .at(sector_center(p.start)),
            ),
            Plot::Battle(p) => news.push(
                NewsEvent::new(NewsKind::PlotStart, "The great battle begins.")
                    .at(sector_center(p.dest)),
            ),
            // Nothing to say until the antagonist appears.
            Plot::Rising(_) => {}
        }
    }

    /// Sector `agent` should head for, if the plot wants it somewhere.
    pub fn should_influence<W: World + ?Sized>(&self, agent: &EntityInfo, world: &W) -> Option<Vec2I> {
        match self {
            Plot::Swarm(p) => p.should_influence(agent, world),
            Plot::Battle(p) => p.should_influence(agent),
            Plot::Rising(p) => p.should_influence(agent),
        }
    }

    /// Like [`Plot::should_influence`], but urgent enough to interrupt
    /// whatever the agent is doing.
    pub fn priority_send(&self, agent: &EntityInfo) -> Option<Vec2I> {
        match self {
            Plot::Rising(p) => p.priority_send(agent),
            _ => None,
        }
    }

    /// Advance by `delta` ms.  Returns `true` once the plot is over.
    pub fn tick<W: World + ?Sized>(
        &mut self,
        delta: Millis,
        world: &mut W,
        rng: &mut SimRng,
        news: &mut NewsLog,
    ) -> bool {
        match self {
            Plot::Swarm(p) => p.tick(delta, news),
            Plot::Battle(p) => p.tick(delta, news),
            Plot::Rising(p) => p.tick(delta, world, rng, news),
        }
    }
}

// ── Swarm ─────────────────────────────────────────────────────────────────────

/// A herd of one species migrating sector by sector from `start` to `end`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwarmPlot {
    pub species: Species,
    pub start:   Vec2I,
    pub end:     Vec2I,
    pub current: Vec2I,
    ticker:      Ticker,
}

impl SwarmPlot {
    /// Time the swarm spends in each sector.
    pub const PERIOD: Millis = 2 * MINUTE;

    pub fn new(species: Species, start: Vec2I, end: Vec2I) -> Self {
        Self { species, start, end, current: start, ticker: Ticker::delayed(Self::PERIOD) }
    }

    /// Milliseconds until the swarm next moves.
    pub fn next_move(&self) -> Millis {
        self.ticker.next()
    }

    fn should_influence<W: World + ?Sized>(&self, agent: &EntityInfo, world: &W) -> Option<Vec2I> {
        let has_core = world.sector_info(self.current).is_some_and(|s| s.core.is_some());
        (agent.species() == Some(self.species) && has_core).then_some(self.current)
    }

    fn tick(&mut self, delta: Millis, news: &mut NewsLog) -> bool {
        if !self.ticker.fired(delta) {
            return false;
        }
        if self.current == self.end {
            tracing::info!(species = %self.species, end = ?self.end, "swarm over");
            news.push(
                NewsEvent::new(NewsKind::PlotEnd, "The swarm is over.").at(sector_center(self.end)),
            );
            return true;
        }
        self.current = self.current.step_toward(self.end);
        let period = if self.current == self.end { Self::PERIOD * 2 } else { Self::PERIOD };
        self.ticker.set_period(period);
        self.ticker.reset();
        tracing::debug!(current = ?self.current, "swarm moved");
        news.push(
            NewsEvent::new(NewsKind::PlotEvent, "The swarm is moving.")
                .at(sector_center(self.current)),
        );
        false
    }
}

impl Default for SwarmPlot {
    fn default() -> Self {
        Self::new(Species::Mantis, Vec2I::ZERO, Vec2I::ZERO)
    }
}

// ── Battle ────────────────────────────────────────────────────────────────────

/// Every greater monster converges on one sector for a while.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattlePlot {
    pub dest: Vec2I,
    ticker:   Ticker,
}

impl BattlePlot {
    pub const DURATION: Millis = 4 * MINUTE;

    pub fn new(dest: Vec2I) -> Self {
        Self { dest, ticker: Ticker::delayed(Self::DURATION) }
    }

    fn should_influence(&self, agent: &EntityInfo) -> Option<Vec2I> {
        let greater = agent.species().is_some_and(|s| s.mob_class() == MobClass::Greater);
        greater.then_some(self.dest)
    }

    fn tick(&mut self, delta: Millis, news: &mut NewsLog) -> bool {
        if !self.ticker.fired(delta) {
            return false;
        }
        tracing::info!(dest = ?self.dest, "great battle over");
        news.push(
            NewsEvent::new(NewsKind::PlotEnd, "The great battle is over.")
                .at(sector_center(self.dest)),
        );
        true
    }
}

impl Default for BattlePlot {
    fn default() -> Self {
        Self::new(Vec2I::ZERO)
    }
}

// ── Rising ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum RisingStage {
    /// Corruption is spreading around an abandoned core.
    #[default]
    Growth,
    /// The antagonist is out and leading its swarm.
    Swarm,
}

/// Corruption builds up around an empty core until an antagonist emerges,
/// then roams from enemy sector to enemy sector with a swarm at its back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RisingPlot {
    pub stage:      RisingStage,
    pub antagonist: Option<EntityId>,
    /// Where everything is heading; the growth site during `Growth`.
    pub dest:       Vec2I,
    /// Species of the swarm the antagonist commands.
    pub species:    Species,
    /// Species the antagonist spawns as.
    pub leader:     Species,
    pub team:       TeamId,
    pub name:       String,
    /// Corruption needed to end the growth stage.
    pub threshold:  u32,
    over_time:      Ticker,
    event_time:     Ticker,
}

/// Most candidate sectors considered per move.
const MAX_CANDIDATES: usize = 10;

impl RisingPlot {
    /// Give up if nothing has risen by then.
    pub const MAX_TIME: Millis = 10 * MINUTE;
    /// How often growth is checked.
    pub const GROWTH_CHECK: Millis = 1_000;
    /// Time between moves once the swarm is out.
    pub const MOVE_PERIOD: Millis = 2 * MINUTE;

    pub fn new(
        dest: Vec2I,
        species: Species,
        leader: Species,
        team: TeamId,
        name: impl Into<String>,
        threshold: u32,
    ) -> Self {
        Self {
            stage: RisingStage::Growth,
            antagonist: None,
            dest,
            species,
            leader,
            team,
            name: name.into(),
            threshold,
            over_time: Ticker::delayed(Self::MAX_TIME),
            event_time: Ticker::delayed(Self::GROWTH_CHECK),
        }
    }

    /// `true` if `sector` is where the evil currently lives.
    pub fn sector_is_evil<W: World + ?Sized>(&self, sector: Vec2I, world: &W) -> bool {
        match self.stage {
            RisingStage::Growth => {
                sector == self.dest
                    && world
                        .sector_info(self.dest)
                        .and_then(|s| s.core)
                        .is_some_and(|c| !c.in_use)
            }
            RisingStage::Swarm => self
                .antagonist
                .and_then(|id| world.entity(id))
                .is_some_and(|e| e.sector() == sector),
        }
    }

    fn should_influence(&self, agent: &EntityInfo) -> Option<Vec2I> {
        if self.stage != RisingStage::Swarm || agent.sector() == self.dest {
            return None;
        }
        let follows = Some(agent.id) == self.antagonist || agent.species() == Some(self.species);
        follows.then_some(self.dest)
    }

    fn priority_send(&self, agent: &EntityInfo) -> Option<Vec2I> {
        let urgent = self.stage == RisingStage::Swarm
            && Some(agent.id) == self.antagonist
            && agent.sector() != self.dest
            && self.event_time.fraction_remaining() < 0.5;
        urgent.then_some(self.dest)
    }

    fn tick<W: World + ?Sized>(
        &mut self,
        delta: Millis,
        world: &mut W,
        rng: &mut SimRng,
        news: &mut NewsLog,
    ) -> bool {
        let Some(core) = world.sector_info(self.dest).and_then(|s| s.core) else {
            tracing::warn!(dest = ?self.dest, "rising plot has no core to work from");
            return true;
        };

        match self.stage {
            RisingStage::Growth => {
                if !core.in_use && self.event_time.fired(delta) {
                    let evil = world.corruption(growth_bounds(self.dest));
                    if evil >= self.threshold {
                        self.emerge(core.pos, world, news);
                    }
                }
                if self.stage == RisingStage::Growth && self.over_time.fired(delta) {
                    tracing::info!(dest = ?self.dest, "rising plot ran out of time");
                    return true;
                }
            }
            RisingStage::Swarm => {
                let leader = self.antagonist.and_then(|id| world.entity(id));
                let Some(leader) = leader else {
                    news.push(
                        NewsEvent::new(
                            NewsKind::PlotEnd,
                            format!("{} is gone. The {} swarm is over.", self.name, self.species),
                        )
                        .at(sector_center(self.dest)),
                    );
                    return true;
                };
                if self.event_time.fired(delta) {
                    self.migrate(&leader, world, rng, news);
                }
            }
        }
        false
    }

    fn emerge<W: World + ?Sized>(&mut self, at: Vec2I, world: &mut W, news: &mut NewsLog) {
        let id = world.spawn(SpawnSpec {
            kind: EntityKind::Mob(self.leader),
            team: self.team,
            pos:  at.center(),
            home: None,
        });
        self.antagonist = Some(id);
        self.stage = RisingStage::Swarm;
        self.event_time.set_period(Self::MOVE_PERIOD);
        self.event_time.reset();
        tracing::info!(antagonist = %id, dest = ?self.dest, "antagonist emerged");
        news.push(
            NewsEvent::new(
                NewsKind::PlotStart,
                format!("{} has entered the cores and commands the {}.", self.name, self.species),
            )
            .at(sector_center(self.dest))
            .about(id),
        );
    }

    /// Pick the next sector by weighted lot: enemy-held neighbours, centre
    /// of the map preferred.
    fn migrate<W: World + ?Sized>(
        &mut self,
        leader: &EntityInfo,
        world: &W,
        rng: &mut SimRng,
        news: &mut NewsLog,
    ) {
        let map = Rect2I::from_pair(Vec2I::new(1, 1), Vec2I::new(NUM_SECTORS - 2, NUM_SECTORS - 2));
        let centre = Vec2I::new((map.min.x + map.max.x) / 2, (map.min.y + map.max.y) / 2);
        let home = world.player_home();

        let mut sectors = Vec::new();
        let mut weights = Vec::new();
        for sector in Rect2I::from_cell(self.dest).outset(2).cells() {
            if sectors.len() >= MAX_CANDIDATES {
                break;
            }
            if !map.contains(sector) || sector == self.dest {
                continue;
            }
            let Some(core) = world.sector_info(sector).and_then(|s| s.core) else { continue };
            if world.relation(leader.team, core.team) != Relation::Enemy {
                continue;
            }
            let repelled = home.is_some_and(|h| h.sector == sector && h.temples <= TEMPLES_REPEL_GREATER);
            if repelled {
                continue;
            }
            sectors.push(sector);
            weights.push((NUM_SECTORS * NUM_SECTORS - (sector - centre).length_squared()) as f32);
        }

        if let Some(i) = rng.select_weighted(&weights) {
            self.dest = sectors[i];
            tracing::debug!(dest = ?self.dest, "rising swarm moves");
            news.push(
                NewsEvent::new(
                    NewsKind::PlotEvent,
                    format!("{} and the {} swarm are moving.", self.name, self.species),
                )
                .at(sector_center(self.dest)),
            );
        }
    }
}

impl Default for RisingPlot {
    fn default() -> Self {
        Self::new(Vec2I::ZERO, Species::Mantis, Species::Cyclops, TeamId::ROGUE, "", 0)
    }
}

/// Region whose corruption feeds the growth stage.
fn growth_bounds(sector: Vec2I) -> Rect2I {
    ut_core::geo::inner_sector_bounds(sector).outset(-2)
}

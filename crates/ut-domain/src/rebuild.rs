//! Re-queue destroyed buildings where they stood.

use ut_core::geo::to_sector;
use ut_core::{Millis, SimRng, StructureKind, TeamId, Ticker, Vec2I};
use ut_world::prelude::*;
use ut_world::{NewsLog, WalletId};

use crate::planner::{buy_worker, count_workers, owned_core, WORKER_COST};

pub const REBUILD_PERIOD: Millis = 2000;

/// A building to put back.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct RebuildItem {
    pub kind:     StructureKind,
    /// Footprint minimum cell.
    pub pos:      Vec2I,
    pub rotation: i32,
}

pub struct RebuildQueue {
    team:   TeamId,
    sector: Vec2I,
    items:  Vec<RebuildItem>,
    ticker: Ticker,
}

impl RebuildQueue {
    pub fn new(team: TeamId, sector: Vec2I, rng: &mut SimRng) -> Self {
        let mut ticker = Ticker::new(REBUILD_PERIOD);
        ticker.randomize(rng.inner());
        Self { team, sector, items: Vec::new(), ticker }
    }

    pub fn items(&self) -> &[RebuildItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Queue a destroyed building if it was ours and stood in our sector.
    pub fn on_building_lost(
        &mut self,
        kind: StructureKind,
        pos: Vec2I,
        rotation: i32,
        team: TeamId,
    ) -> bool {
        if team != self.team || to_sector(pos) != self.sector || !kind.is_building() {
            return false;
        }
        tracing::debug!(team = %team, %kind, ?pos, "queued for rebuild");
        self.items.push(RebuildItem { kind, pos, rotation });
        true
    }

    /// On each firing, order the most recent loss back onto the work queue.
    /// A sector without workers buys one first, if the team can pay.
    pub fn tick(&mut self, delta: Millis, world: &mut dyn World, news: &mut NewsLog) -> bool {
        if !self.ticker.fired(delta) || self.items.is_empty() {
            return false;
        }
        let Some(core) = owned_core(world, self.team, self.sector) else {
            return false;
        };

        if count_workers(world, self.team, self.sector) == 0
            && world.can_withdraw(WalletId::Team(self.team), WORKER_COST)
        {
            buy_worker(world, self.team, self.sector, core, news);
        }

        let Some(item) = self.items.pop() else { return false };
        let queued = world.add_action(item.pos, item.kind, item.rotation, 0);
        tracing::info!(team = %self.team, kind = %item.kind, pos = ?item.pos, queued, "rebuild ordered");
        true
    }
}

//! Shared cell reservations, sharded by sector.
//!
//! A reservation says "this agent's queue is going to work on this cell".
//! Proposers consult it before queueing work so two agents never walk to the
//! same job.  Shards exist only for sectors that hold a domain
//! ([`ReservationRegistry::open_sector`]); elsewhere registration is a
//! no-op, because nothing there is contended.
//!
//! Writes are last-writer-wins: registering a cell another agent owns moves
//! the claim.  The previous owner's task stays queued and re-validates the
//! claim when it reaches the head, so the loser drops its plan instead of
//! both agents building on one cell.  Displaced claimants are remembered in
//! claim order; when the owner lets go, the most recent one still waiting
//! owns the cell again, so a cell stays reserved exactly as long as some
//! queue names it.

use rustc_hash::FxHashMap;

use ut_core::geo::to_sector;
use ut_core::{AgentId, Vec2I};

use crate::error::{TaskError, TaskResult};

/// Claimants per cell, oldest first; the last one owns the cell.
type Shard = FxHashMap<Vec2I, Vec<AgentId>>;

#[derive(Debug, Default)]
pub struct ReservationRegistry {
    shards: FxHashMap<Vec2I, Shard>,
}

impl ReservationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `sector`.  Idempotent.
    pub fn open_sector(&mut self, sector: Vec2I) {
        self.shards.entry(sector).or_default();
    }

    /// Stop tracking `sector`, dropping its claims.
    pub fn close_sector(&mut self, sector: Vec2I) {
        if let Some(shard) = self.shards.remove(&sector) {
            if !shard.is_empty() {
                tracing::debug!(?sector, dropped = shard.len(), "sector closed");
            }
        }
    }

    #[inline]
    pub fn is_open(&self, sector: Vec2I) -> bool {
        self.shards.contains_key(&sector)
    }

    /// Claim `cell` for `owner`, taking it over from any previous owner.
    pub fn register(&mut self, cell: Vec2I, owner: AgentId) {
        let Some(shard) = self.shards.get_mut(&to_sector(cell)) else { return };
        let holders = shard.entry(cell).or_default();
        if let Some(&prev) = holders.last() {
            if prev != owner {
                tracing::debug!(?cell, %prev, %owner, "reservation taken over");
            }
        }
        holders.retain(|&h| h != owner);
        holders.push(owner);
    }

    /// Drop `owner`'s claim on `cell`.  If `owner` held the cell, the most
    /// recent displaced claimant gets it back.
    pub fn release(&mut self, cell: Vec2I, owner: AgentId) {
        let Some(shard) = self.shards.get_mut(&to_sector(cell)) else { return };
        let Some(holders) = shard.get_mut(&cell) else { return };
        let was_owner = holders.last() == Some(&owner);
        holders.retain(|&h| h != owner);
        match holders.last().copied() {
            None => {
                shard.remove(&cell);
            }
            Some(next) if was_owner => {
                tracing::debug!(?cell, %owner, %next, "reservation handed back");
            }
            Some(_) => {}
        }
    }

    /// Drop every claim held by `owner`, e.g. when the agent dies.
    pub fn release_all(&mut self, owner: AgentId) {
        for shard in self.shards.values_mut() {
            shard.retain(|_, holders| {
                holders.retain(|&h| h != owner);
                !holders.is_empty()
            });
        }
    }

    #[inline]
    pub fn owner(&self, cell: Vec2I) -> Option<AgentId> {
        self.shards.get(&to_sector(cell))?.get(&cell)?.last().copied()
    }

    /// `true` if someone other than `me` holds `cell`.
    #[inline]
    pub fn is_claimed_by_other(&self, cell: Vec2I, me: AgentId) -> bool {
        self.owner(cell).is_some_and(|o| o != me)
    }

    /// `Ok` if `me` may work on `cell`: it holds the claim, or the sector is
    /// not tracked at all.
    pub fn check(&self, cell: Vec2I, me: AgentId) -> TaskResult<()> {
        if !self.is_open(to_sector(cell)) {
            return Ok(());
        }
        match self.owner(cell) {
            Some(owner) if owner == me => Ok(()),
            Some(owner) => Err(TaskError::Reserved { cell, owner }),
            None => Err(TaskError::Precondition(format!("cell {cell:?} is not reserved"))),
        }
    }

    /// Number of claimed cells across all shards.
    pub fn len(&self) -> usize {
        self.shards.values().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every `(cell, owner)` pair, in no particular order.
    pub fn claims(&self) -> impl Iterator<Item = (Vec2I, AgentId)> + '_ {
        self.shards
            .values()
            .flat_map(|s| s.iter().filter_map(|(c, h)| h.last().map(|o| (*c, *o))))
    }

    /// Agents holding or waiting on `cell`, oldest claim first.
    pub fn claimants(&self, cell: Vec2I) -> &[AgentId] {
        self.shards
            .get(&to_sector(cell))
            .and_then(|s| s.get(&cell))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

//! The scheduler's per-agent decision state.

use ut_core::{EntityId, Ticker, Vec2F, Vec2I};

use crate::perception::PerceptionCache;

/// Top-level behaviour the scheduler runs for an agent.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    #[default]
    Normal,
    Battle,
    Rampage,
    Visitor,
}

/// What the agent is physically doing this frame.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    #[default]
    None,
    Move,
    Melee,
    Shoot,
}

/// Commitment that suppresses re-evaluation.  The two kinds are exclusive.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Focus {
    #[default]
    None,
    /// Moving with purpose: threats do not pull the agent into battle.
    Move,
    /// Locked on `enemies[0]`.
    Target,
}

/// Bounded list of entity ids with no duplicates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackList {
    ids: Vec<EntityId>,
    cap: usize,
}

impl TrackList {
    pub fn new(cap: usize) -> Self {
        Self { ids: Vec::with_capacity(cap), cap: cap.max(1) }
    }

    /// Append `id` if absent and there is room.
    pub fn push(&mut self, id: EntityId) -> bool {
        if self.ids.len() >= self.cap || self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Move (or insert) `id` to index 0, evicting the last entry when full.
    pub fn set_first(&mut self, id: EntityId) {
        if let Some(i) = self.ids.iter().position(|&x| x == id) {
            self.ids.swap(0, i);
            return;
        }
        if self.ids.len() >= self.cap {
            self.ids.pop();
        }
        self.ids.insert(0, id);
    }

    /// Swap entry `i` to the front.
    pub fn swap_to_front(&mut self, i: usize) {
        if i < self.ids.len() {
            self.ids.swap(0, i);
        }
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&x| x != id);
        self.ids.len() != before
    }

    pub fn retain(&mut self, keep: impl FnMut(&EntityId) -> bool) {
        self.ids.retain(keep);
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    #[inline]
    pub fn first(&self) -> Option<EntityId> {
        self.ids.first().copied()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn as_slice(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.iter().copied()
    }
}

/// Visitor bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisitorState {
    pub kiosks_seen: u32,
    /// Done touring; heading off the map.
    pub leaving:     bool,
}

/// Everything one agent decides with.
///
/// Invariants kept by the scheduler:
/// * `mode == Battle` implies `perception.enemies` is non-empty,
/// * `focus == Target` implies `perception.enemies[0]` is the locked target,
/// * `mode` is never both rampaging and fighting (it is a single enum).
#[derive(Clone, Debug)]
pub struct AgentState {
    pub mode:             Mode,
    pub action:           Action,
    pub focus:            Focus,
    /// Sector port a rampaging monster is heading for.
    pub rampage_target:   Option<u8>,
    pub perception:       PerceptionCache,
    pub last_target:      Option<EntityId>,
    pub blocked_count:    u32,
    pub rethink:          Ticker,
    /// Where the current `Move` action is heading.
    pub move_dest:        Option<Vec2F>,
    /// Cell seen on the previous tick, for once-per-cell entry effects.
    pub last_cell:        Option<Vec2I>,
    /// Building being used right now; suppresses battle transitions.
    pub using_building:   Option<EntityId>,
    pub visitor:          VisitorState,
}

impl AgentState {
    pub fn new(perception: PerceptionCache, rethink: Ticker) -> Self {
        Self {
            mode: Mode::Normal,
            action: Action::None,
            focus: Focus::None,
            rampage_target: None,
            perception,
            last_target: None,
            blocked_count: 0,
            rethink,
            move_dest: None,
            last_cell: None,
            using_building: None,
            visitor: VisitorState::default(),
        }
    }

    /// The locked target, if focus is on one.
    pub fn locked_target(&self) -> Option<EntityId> {
        match self.focus {
            Focus::Target => self.perception.enemies.first(),
            _ => None,
        }
    }

    /// Lock onto `target`, placing it at the head of the enemy list.
    pub fn lock_target(&mut self, target: EntityId) {
        self.perception.enemies.set_first(target);
        self.focus = Focus::Target;
    }

    /// Forget any focus and stop acting.
    pub fn reset_action(&mut self) {
        self.action = Action::None;
        self.focus = Focus::None;
        self.move_dest = None;
    }

    /// `true` if the documented invariants hold.
    pub fn is_consistent(&self) -> bool {
        let battle_ok = self.mode != Mode::Battle || !self.perception.enemies.is_empty();
        let focus_ok = self.focus != Focus::Target || !self.perception.enemies.is_empty();
        battle_ok && focus_ok
    }
}

//! Fire-and-forget messages between the world and agents, and the news feed.

use ut_core::{EntityId, StructureKind, TeamId, Vec2I};

/// Messages delivered to an agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentMessage {
    /// Someone hurt us.
    Damaged { source: EntityId },
    /// The movement component arrived.
    DestinationReached,
    /// The movement component gave up on the current path.
    DestinationBlocked,
    /// Go to another sector; `focus` makes the move uninterruptible by threats.
    SectorHerd { dest: Vec2I, focus: bool },
    /// The domain's work queue changed; idle workers should look again.
    WorkQueueUpdated,
    /// An ally entered battle against these entities.
    Awareness { threats: Vec<EntityId> },
}

/// Everything the world reports back to the driver between frames.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    Spawned(EntityId),
    Despawned(EntityId),
    Message { to: EntityId, msg: AgentMessage },
    /// A building was destroyed (not deconstructed).
    BuildingLost {
        id:       EntityId,
        kind:     StructureKind,
        pos:      Vec2I,
        rotation: i32,
        team:     TeamId,
    },
}

// ── News ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NewsKind {
    PlotStart,
    PlotEvent,
    PlotEnd,
    SectorHerd,
    MoraleCrisis,
    Purchased,
    Built,
}

/// A headline for the UI.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewsEvent {
    pub kind:    NewsKind,
    pub text:    String,
    pub pos:     Option<Vec2I>,
    pub subject: Option<EntityId>,
}

impl NewsEvent {
    pub fn new(kind: NewsKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into(), pos: None, subject: None }
    }

    pub fn at(mut self, pos: Vec2I) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn about(mut self, subject: EntityId) -> Self {
        self.subject = Some(subject);
        self
    }
}

/// News collected during a frame, drained by the driver.
#[derive(Clone, Debug, Default)]
pub struct NewsLog {
    events: Vec<NewsEvent>,
}

impl NewsLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: NewsEvent) {
        tracing::debug!(kind = ?event.kind, text = %event.text, "news");
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<NewsEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NewsEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

//! One atomic, interruptible step of a plan.

use ut_core::{EntityId, Millis, StructureKind, Vec2F, Vec2I};

/// What the step does.  Only `Build`, `RemoveStructure` and `Flag` name a
/// cell that must not be claimed twice; see [`Task::cell`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskKind {
    Move(Vec2F),
    /// Wait in place for `timer` ms.
    Stand,
    Build { pos: Vec2I, structure: StructureKind, rotation: i32 },
    Repair(EntityId),
    Pickup(EntityId),
    /// Use the building whose porch the agent stands on.
    UseBuilding,
    RemoveStructure(Vec2I),
    /// Stand guard at a rally flag.
    Flag(Vec2I),
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    pub kind:    TaskKind,
    /// Countdown in ms, used by timed tasks.
    pub timer:   i32,
    /// Opaque link; for work orders, the id of the order that produced it
    /// (0 = none).
    pub payload: u32,
}

impl Task {
    #[inline]
    pub fn new(kind: TaskKind) -> Self {
        Self { kind, timer: 0, payload: 0 }
    }

    pub fn move_to(pos: Vec2F) -> Self {
        Self::new(TaskKind::Move(pos))
    }

    pub fn stand(ms: Millis) -> Self {
        Self::new(TaskKind::Stand).with_timer(ms)
    }

    pub fn build(pos: Vec2I, structure: StructureKind, rotation: i32) -> Self {
        Self::new(TaskKind::Build { pos, structure, rotation })
    }

    pub fn repair(building: EntityId) -> Self {
        Self::new(TaskKind::Repair(building))
    }

    pub fn pickup(item: EntityId) -> Self {
        Self::new(TaskKind::Pickup(item))
    }

    pub fn use_building() -> Self {
        Self::new(TaskKind::UseBuilding)
    }

    pub fn remove_structure(pos: Vec2I) -> Self {
        Self::new(TaskKind::RemoveStructure(pos))
    }

    pub fn flag(pos: Vec2I) -> Self {
        Self::new(TaskKind::Flag(pos))
    }

    pub fn with_timer(mut self, ms: Millis) -> Self {
        self.timer = ms.min(i32::MAX as u32) as i32;
        self
    }

    pub fn with_payload(mut self, payload: u32) -> Self {
        self.payload = payload;
        self
    }

    /// The cell this task reserves, if any.
    pub fn cell(&self) -> Option<Vec2I> {
        match self.kind {
            TaskKind::Build { pos, .. } | TaskKind::RemoveStructure(pos) | TaskKind::Flag(pos) => {
                Some(pos)
            }
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self.kind {
            TaskKind::Move(_) => "move",
            TaskKind::Stand => "stand",
            TaskKind::Build { .. } => "build",
            TaskKind::Repair(_) => "repair",
            TaskKind::Pickup(_) => "pickup",
            TaskKind::UseBuilding => "use-building",
            TaskKind::RemoveStructure(_) => "remove",
            TaskKind::Flag(_) => "flag",
        }
    }
}

//! Per-entity movers for the grid world.
//!
//! A mover walks a precomputed cell path at a fixed speed.  Unlike a
//! teleport-at-arrival model, position is updated continuously so perception
//! and cell-entry effects see the unit between cells.  The path is
//! re-checked one cell ahead: if that cell became impassable the move is
//! abandoned and the owner is told it was blocked.

use std::collections::VecDeque;

use ut_core::{Millis, Vec2F, Vec2I};

/// Cells walked per simulated second.
pub(crate) const CELLS_PER_SEC: f32 = 2.0;

/// Remaining walk for one entity.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Mover {
    /// Exact final position (inside the last cell).
    pub dest: Vec2F,
    /// Cell centres still to visit, front first.
    pub path: VecDeque<Vec2I>,
}

/// What one `advance` did to a mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    Moving,
    Arrived,
    Blocked,
}

impl Mover {
    pub fn new(dest: Vec2F, cells: Vec<Vec2I>) -> Self {
        Self { dest, path: cells.into() }
    }

    /// Walk for `delta` ms from `pos`, updating `pos` and `heading` in place.
    ///
    /// `passable` is consulted for the next cell before it is entered.
    pub fn advance(
        &mut self,
        pos: &mut Vec2F,
        heading: &mut Vec2F,
        delta: Millis,
        passable: impl Fn(Vec2I) -> bool,
    ) -> StepOutcome {
        let mut budget = CELLS_PER_SEC * delta as f32 * 0.001;

        while budget > 0.0 {
            let (target, entering) = match self.path.front() {
                Some(&cell) => (cell.center(), Some(cell)),
                None => (self.dest, None),
            };
            if let Some(cell) = entering {
                if cell != pos.to_cell() && !passable(cell) {
                    return StepOutcome::Blocked;
                }
            }

            let to_target = target - *pos;
            let dist = to_target.length();
            if dist > f32::EPSILON {
                *heading = to_target.normalized();
            }
            if dist > budget {
                *pos = *pos + to_target.normalized() * budget;
                return StepOutcome::Moving;
            }

            *pos = target;
            budget -= dist;
            if self.path.pop_front().is_none() {
                return StepOutcome::Arrived;
            }
        }
        StepOutcome::Moving
    }
}

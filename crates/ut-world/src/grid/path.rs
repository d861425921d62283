//! Dijkstra over grid cells.
//!
//! Costs are integer "thirds of a cell" so paved cells can be cheaper
//! without floating-point ties: an unpaved step costs 3, a paved step 2.
//! The heap's secondary key (cell index) makes tie-breaking deterministic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ut_core::Vec2I;

pub(crate) const STEP_COST: u32 = 3;
pub(crate) const PAVED_STEP_COST: u32 = 2;

/// Cells to walk, excluding the start, and the total cost.
#[derive(Debug, Clone)]
pub(crate) struct GridPath {
    pub cells: Vec<Vec2I>,
    pub cost:  u32,
}

impl GridPath {
    /// Cost in cell units.
    pub fn cells_cost(&self) -> f32 {
        self.cost as f32 / STEP_COST as f32
    }
}

/// Search from `from` until any cell satisfying `is_goal` is settled.
///
/// `step_cost` returns `None` for impassable cells.  The start cell is
/// always allowed, so an agent standing on a porch can still leave.
pub(crate) fn dijkstra(
    size: i32,
    from: Vec2I,
    is_goal: impl Fn(Vec2I) -> bool,
    step_cost: impl Fn(Vec2I) -> Option<u32>,
) -> Option<GridPath> {
    let in_bounds = |c: Vec2I| c.x >= 0 && c.y >= 0 && c.x < size && c.y < size;
    if !in_bounds(from) {
        return None;
    }
    if is_goal(from) {
        return Some(GridPath { cells: vec![], cost: 0 });
    }

    let n = (size * size) as usize;
    let idx = |c: Vec2I| (c.y * size + c.x) as usize;
    let cell = |i: u32| Vec2I::new(i as i32 % size, i as i32 / size);

    let mut dist = vec![u32::MAX; n];
    let mut prev = vec![u32::MAX; n];
    dist[idx(from)] = 0;

    let mut heap: BinaryHeap<Reverse<(u32, u32)>> = BinaryHeap::new();
    heap.push(Reverse((0, idx(from) as u32)));

    while let Some(Reverse((cost, i))) = heap.pop() {
        let here = cell(i);
        if cost > dist[i as usize] {
            continue;
        }
        if here != from && is_goal(here) {
            return Some(reconstruct(&prev, i, cost, size));
        }
        for next in here.neighbors4() {
            if !in_bounds(next) {
                continue;
            }
            let Some(step) = step_cost(next) else { continue };
            let new_cost = cost.saturating_add(step);
            let j = idx(next);
            if new_cost < dist[j] {
                dist[j] = new_cost;
                prev[j] = i;
                heap.push(Reverse((new_cost, j as u32)));
            }
        }
    }
    None
}

fn reconstruct(prev: &[u32], goal: u32, cost: u32, size: i32) -> GridPath {
    let mut cells = Vec::new();
    let mut cur = goal;
    while prev[cur as usize] != u32::MAX {
        cells.push(Vec2I::new(cur as i32 % size, cur as i32 / size));
        cur = prev[cur as usize];
    }
    cells.reverse();
    GridPath { cells, cost }
}

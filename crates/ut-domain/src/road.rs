//! Road and plaza topology of one sector, and the build zones along it.
//!
//! Roads are the port paths of the sector: each runs from just outside the
//! core to a port.  A build zone is the rectangle beside road cell `it`
//! where a building of a given size fits with its porch touching the road.
//! Zones are computed on both sides of every road.
//!
//! ```text
//!        porch   build
//!   road  |      |
//!   [h]  [p]  [b][b]     h = road[it], t = road[it-1]
//!   [t]  [p]  [b][b]     left = road direction rotated a quarter turn
//! ```

use rustc_hash::FxHashSet;

use ut_core::geo::world_rotation;
use ut_core::{Rect2I, Vec2I};
use ut_world::SectorInfo;

pub const MAX_ROADS: usize = 4;
pub const MAX_PLAZAS: usize = 4;
/// Zones returned per query.
pub const MAX_ZONES: usize = 8;
/// Radius of the grow area around a farm's solar cell.
pub const FARM_GROW_RAD: i32 = 2;

/// One candidate placement.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BuildZone {
    /// Facing of the building, toward the road.
    pub rotation: i32,
    /// Everything the placement uses: building, porch, grow area.
    pub full:     Rect2I,
    /// The building's footprint.
    pub build:    Rect2I,
    /// Cells between the footprint and the road.
    pub porch:    Rect2I,
}

#[derive(Clone, Debug, Default)]
pub struct RoadMap {
    roads:  Vec<Vec<Vec2I>>,
    plazas: Vec<Rect2I>,
    used:   FxHashSet<Vec2I>,
}

/// `dir` turned a quarter: `(x, y)` becomes `(y, -x)`.
#[inline]
fn left_of(dir: Vec2I) -> Vec2I {
    Vec2I::new(dir.y, -dir.x)
}

impl RoadMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roads from the sector's port paths and the 5×5 plaza around the core.
    pub fn from_sector(info: &SectorInfo) -> Self {
        let mut map = Self::new();
        for port in &info.ports {
            map.add_road(&port.path);
        }
        if let Some(core) = info.core {
            map.add_plaza(Rect2I::from_cell(core.pos).outset(2));
        }
        map
    }

    /// `false` once [`MAX_ROADS`] are stored.
    pub fn add_road(&mut self, path: &[Vec2I]) -> bool {
        if self.roads.len() >= MAX_ROADS || path.is_empty() {
            return false;
        }
        self.used.extend(path.iter().copied());
        self.roads.push(path.to_vec());
        true
    }

    pub fn add_plaza(&mut self, bounds: Rect2I) -> bool {
        if self.plazas.len() >= MAX_PLAZAS {
            return false;
        }
        self.used.extend(bounds.cells());
        self.plazas.push(bounds);
        true
    }

    pub fn roads(&self) -> &[Vec<Vec2I>] {
        &self.roads
    }

    pub fn road(&self, i: usize) -> Option<&[Vec2I]> {
        self.roads.get(i).map(Vec::as_slice)
    }

    pub fn plazas(&self) -> &[Rect2I] {
        &self.plazas
    }

    /// Length of the longest road.
    pub fn max_len(&self) -> usize {
        self.roads.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_used(&self, cell: Vec2I) -> bool {
        self.used.contains(&cell)
    }

    /// `true` if no cell of `bounds` is road, plaza, or a claimed zone.
    pub fn is_free(&self, bounds: Rect2I) -> bool {
        bounds.cells().all(|c| !self.used.contains(&c))
    }

    /// Claim a placed zone so later queries skip it.
    pub fn mark_used(&mut self, bounds: Rect2I) {
        self.used.extend(bounds.cells());
    }

    /// Index of the road and position along it for `cell`, if it is road.
    pub fn locate(&self, cell: Vec2I) -> Option<(usize, usize)> {
        self.roads
            .iter()
            .enumerate()
            .find_map(|(i, r)| r.iter().position(|&c| c == cell).map(|it| (i, it)))
    }

    /// Free zones for a `size`×`size` building with a `porch`-deep porch at
    /// distance `it` along every road, both sides.  Returns `(road, zone)`.
    pub fn build_zones(&self, it: usize, size: i32, porch: i32) -> Vec<(usize, BuildZone)> {
        let mut zones = Vec::new();
        if it == 0 {
            return zones;
        }
        for (r, road) in self.roads.iter().enumerate() {
            if it >= road.len() {
                continue;
            }
            let head = road[it];
            for pass in 0..2 {
                let tail = match pass {
                    0 => road[it - 1],
                    _ => match road.get(it + 1) {
                        Some(&t) => t,
                        None => continue,
                    },
                };
                let left = left_of(head - tail);
                let right = -left;
                let btail = if size == 2 { tail } else { head };

                let zone = BuildZone {
                    rotation: world_rotation(right),
                    full:     Rect2I::from_pair(head + left * (porch + size), btail + left),
                    build:    Rect2I::from_pair(
                        head + left * (porch + size),
                        btail + left * (1 + porch),
                    ),
                    porch:    Rect2I::from_pair(head + left, btail + left),
                };
                if self.is_free(zone.full) {
                    zones.push((r, zone));
                    if zones.len() == MAX_ZONES {
                        return zones;
                    }
                }
            }
        }
        zones
    }

    /// Free farm zones at distance `it`, one per road.  Farms alternate
    /// sides of the road with the parity of `it`.
    pub fn farm_zones(&self, it: usize) -> Vec<(usize, BuildZone)> {
        let mut zones = Vec::new();
        if it == 0 {
            return zones;
        }
        for (r, road) in self.roads.iter().enumerate() {
            if it >= road.len() {
                continue;
            }
            let (mut head, mut tail) = (road[it], road[it - 1]);
            if it % 2 == 1 {
                std::mem::swap(&mut head, &mut tail);
            }
            let left = left_of(head - tail);
            let right = -left;
            let solar = head + left * (FARM_GROW_RAD + 1);

            let zone = BuildZone {
                rotation: world_rotation(right),
                full:     Rect2I::from_cell(solar).outset(FARM_GROW_RAD),
                build:    Rect2I::from_cell(solar),
                porch:    Rect2I::from_pair(head + left * 2, head + left),
            };
            if self.is_free(zone.full) {
                zones.push((r, zone));
            }
        }
        zones
    }
}

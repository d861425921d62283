//! Grid geometry: integer cells, float positions, rectangles, and sectors.
//!
//! The map is a square grid of cells.  It is divided into `NUM_SECTORS²`
//! sectors of `SECTOR_SIZE²` cells; the outermost ring of cells in every
//! sector is a border that nothing is built on.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Cells along one side of a sector.
pub const SECTOR_SIZE: i32 = 64;
/// Sector cells excluding the border ring.
pub const INNER_SECTOR_SIZE: i32 = SECTOR_SIZE - 2;
/// Sectors along one side of the full map.
pub const NUM_SECTORS: i32 = 16;
/// Cells along one side of the full map.
pub const MAP_SIZE: i32 = SECTOR_SIZE * NUM_SECTORS;

// ── Vec2I ─────────────────────────────────────────────────────────────────────

/// An integer grid coordinate (a cell, or a sector coordinate).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2I {
    pub x: i32,
    pub y: i32,
}

impl Vec2I {
    pub const ZERO: Vec2I = Vec2I { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length_squared(self) -> i32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn manhattan(self, other: Vec2I) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev distance: number of king moves between the cells.
    #[inline]
    pub fn chebyshev(self, other: Vec2I) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Centre of this cell in world units.
    #[inline]
    pub fn center(self) -> Vec2F {
        Vec2F::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    /// Rotate 90° counter-clockwise: `(x, y) -> (-y, x)`.
    #[inline]
    pub fn rotate_ccw(self) -> Vec2I {
        Vec2I::new(-self.y, self.x)
    }

    /// The four orthogonal neighbours.
    pub fn neighbors4(self) -> [Vec2I; 4] {
        [
            Vec2I::new(self.x + 1, self.y),
            Vec2I::new(self.x - 1, self.y),
            Vec2I::new(self.x, self.y + 1),
            Vec2I::new(self.x, self.y - 1),
        ]
    }

    /// One unit step toward `target` along whichever axis has the larger
    /// separation.  Equal separations step along `y`.
    pub fn step_toward(self, target: Vec2I) -> Vec2I {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        if dx == 0 && dy == 0 {
            return self;
        }
        if dx.abs() > dy.abs() {
            Vec2I::new(self.x + dx.signum(), self.y)
        } else {
            Vec2I::new(self.x, self.y + dy.signum())
        }
    }
}

impl Add for Vec2I {
    type Output = Vec2I;
    #[inline]
    fn add(self, rhs: Vec2I) -> Vec2I {
        Vec2I::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2I {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2I) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2I {
    type Output = Vec2I;
    #[inline]
    fn sub(self, rhs: Vec2I) -> Vec2I {
        Vec2I::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Vec2I {
    type Output = Vec2I;
    #[inline]
    fn mul(self, rhs: i32) -> Vec2I {
        Vec2I::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2I {
    type Output = Vec2I;
    #[inline]
    fn neg(self) -> Vec2I {
        Vec2I::new(-self.x, -self.y)
    }
}

// ── Vec2F ─────────────────────────────────────────────────────────────────────

/// A continuous position or direction on the map plane.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2F {
    pub x: f32,
    pub y: f32,
}

impl Vec2F {
    pub const ZERO: Vec2F = Vec2F { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec2F) -> f32 {
        (self - other).length()
    }

    #[inline]
    pub fn dot(self, other: Vec2F) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Vec2F {
        let len = self.length();
        if len < f32::EPSILON {
            Vec2F::ZERO
        } else {
            Vec2F::new(self.x / len, self.y / len)
        }
    }

    /// The cell containing this position.
    #[inline]
    pub fn to_cell(self) -> Vec2I {
        Vec2I::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl Add for Vec2F {
    type Output = Vec2F;
    #[inline]
    fn add(self, rhs: Vec2F) -> Vec2F {
        Vec2F::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2F {
    type Output = Vec2F;
    #[inline]
    fn sub(self, rhs: Vec2F) -> Vec2F {
        Vec2F::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2F {
    type Output = Vec2F;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2F {
        Vec2F::new(self.x * rhs, self.y * rhs)
    }
}

// ── Rect2I ────────────────────────────────────────────────────────────────────

/// An axis-aligned rectangle of cells.  Both corners are inclusive.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect2I {
    pub min: Vec2I,
    pub max: Vec2I,
}

impl Rect2I {
    /// Rectangle spanning two arbitrary corners.
    pub fn from_pair(a: Vec2I, b: Vec2I) -> Self {
        Self {
            min: Vec2I::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2I::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A single cell.
    pub fn from_cell(p: Vec2I) -> Self {
        Self { min: p, max: p }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }

    #[inline]
    pub fn area(&self) -> i32 {
        self.width() * self.height()
    }

    #[inline]
    pub fn contains(&self, p: Vec2I) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn contains_rect(&self, other: &Rect2I) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    pub fn intersects(&self, other: &Rect2I) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Grow by `n` cells on every side (negative `n` shrinks).
    pub fn outset(&self, n: i32) -> Rect2I {
        Rect2I {
            min: Vec2I::new(self.min.x - n, self.min.y - n),
            max: Vec2I::new(self.max.x + n, self.max.y + n),
        }
    }

    pub fn center(&self) -> Vec2F {
        Vec2F::new(
            (self.min.x + self.max.x + 1) as f32 * 0.5,
            (self.min.y + self.max.y + 1) as f32 * 0.5,
        )
    }

    /// Every cell, row-major from `min`.
    pub fn cells(&self) -> impl Iterator<Item = Vec2I> + '_ {
        let (x0, x1) = (self.min.x, self.max.x);
        (self.min.y..=self.max.y).flat_map(move |y| (x0..=x1).map(move |x| Vec2I::new(x, y)))
    }
}

// ── Sectors ───────────────────────────────────────────────────────────────────

/// Sector coordinate containing `cell`.
#[inline]
pub fn to_sector(cell: Vec2I) -> Vec2I {
    Vec2I::new(cell.x.div_euclid(SECTOR_SIZE), cell.y.div_euclid(SECTOR_SIZE))
}

/// All cells of `sector`, border included.
pub fn sector_bounds(sector: Vec2I) -> Rect2I {
    let min = sector * SECTOR_SIZE;
    Rect2I {
        min,
        max: Vec2I::new(min.x + SECTOR_SIZE - 1, min.y + SECTOR_SIZE - 1),
    }
}

/// Cells of `sector` excluding the border ring.
pub fn inner_sector_bounds(sector: Vec2I) -> Rect2I {
    sector_bounds(sector).outset(-1)
}

/// Centre cell of `sector`.
pub fn sector_center(sector: Vec2I) -> Vec2I {
    sector * SECTOR_SIZE + Vec2I::new(SECTOR_SIZE / 2, SECTOR_SIZE / 2)
}

/// `true` if `sector` lies inside the map and off its outer ring.
pub fn is_interior_sector(sector: Vec2I) -> bool {
    sector.x >= 1 && sector.x <= NUM_SECTORS - 2 && sector.y >= 1 && sector.y <= NUM_SECTORS - 2
}

/// Facing, in degrees, of a unit grid direction: +y 0°, +x 90°, −y 180°, −x 270°.
pub fn world_rotation(dir: Vec2I) -> i32 {
    match (dir.x.signum(), dir.y.signum()) {
        (1, _) => 90,
        (-1, _) => 270,
        (_, -1) => 180,
        _ => 0,
    }
}

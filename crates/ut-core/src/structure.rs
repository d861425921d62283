//! Buildable things: structures, tile edits, and their static properties.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Neighbourhood character of a structure.  Industrial and natural zones may
/// not sit next to each other.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Zone {
    Industrial,
    Natural,
    Neutral,
}

impl Zone {
    pub fn conflicts_with(self, other: Zone) -> bool {
        matches!(
            (self, other),
            (Zone::Industrial, Zone::Natural) | (Zone::Natural, Zone::Industrial)
        )
    }
}

/// Everything a work order can ask a worker to do to a cell.
///
/// `Clear`, `Pave` and `Ice` are tile edits; the rest place a building.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StructureKind {
    Clear,
    Pave,
    Ice,
    Farm,
    Distillery,
    Bar,
    Market,
    Exchange,
    Factory,
    SleepTube,
    Vault,
    Temple,
    GuardPost,
    Kiosk,
    Forge,
}

impl StructureKind {
    pub const ALL: [StructureKind; 15] = [
        StructureKind::Clear,
        StructureKind::Pave,
        StructureKind::Ice,
        StructureKind::Farm,
        StructureKind::Distillery,
        StructureKind::Bar,
        StructureKind::Market,
        StructureKind::Exchange,
        StructureKind::Factory,
        StructureKind::SleepTube,
        StructureKind::Vault,
        StructureKind::Temple,
        StructureKind::GuardPost,
        StructureKind::Kiosk,
        StructureKind::Forge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StructureKind::Clear => "clear",
            StructureKind::Pave => "pave",
            StructureKind::Ice => "ice",
            StructureKind::Farm => "farm",
            StructureKind::Distillery => "distillery",
            StructureKind::Bar => "bar",
            StructureKind::Market => "market",
            StructureKind::Exchange => "exchange",
            StructureKind::Factory => "factory",
            StructureKind::SleepTube => "sleeptube",
            StructureKind::Vault => "vault",
            StructureKind::Temple => "temple",
            StructureKind::GuardPost => "guardpost",
            StructureKind::Kiosk => "kiosk",
            StructureKind::Forge => "forge",
        }
    }

    /// `false` for tile edits (clear, pave, ice).
    #[inline]
    pub fn is_building(self) -> bool {
        !matches!(self, StructureKind::Clear | StructureKind::Pave | StructureKind::Ice)
    }

    /// Footprint edge length in cells (1 or 2).
    pub fn size(self) -> i32 {
        match self {
            StructureKind::Bar
            | StructureKind::Market
            | StructureKind::Exchange
            | StructureKind::Factory
            | StructureKind::Vault
            | StructureKind::Temple
            | StructureKind::Forge => 2,
            _ => 1,
        }
    }

    /// Buildings are entered through a porch cell in front of the door.
    #[inline]
    pub fn has_porch(self) -> bool {
        self.is_building()
    }

    pub fn cost(self) -> u32 {
        match self {
            StructureKind::Clear => 0,
            StructureKind::Pave => 1,
            StructureKind::Ice => 2,
            StructureKind::Farm | StructureKind::SleepTube | StructureKind::Kiosk => 20,
            StructureKind::Distillery | StructureKind::GuardPost => 30,
            StructureKind::Bar | StructureKind::Market => 40,
            StructureKind::Vault | StructureKind::Forge => 50,
            StructureKind::Exchange | StructureKind::Factory => 60,
            StructureKind::Temple => 80,
        }
    }

    pub fn zone(self) -> Zone {
        match self {
            StructureKind::Factory
            | StructureKind::Forge
            | StructureKind::Distillery
            | StructureKind::Vault
            | StructureKind::Exchange => Zone::Industrial,
            StructureKind::Farm | StructureKind::Temple => Zone::Natural,
            _ => Zone::Neutral,
        }
    }

    /// Base `[food, energy, fun]` a visit can supply, before the visitor's
    /// circumstances are applied.
    pub fn need_values(self) -> [f64; 3] {
        match self {
            StructureKind::Bar => [0.6, 0.0, 0.3],
            StructureKind::Market => [0.0, 0.0, 0.4],
            StructureKind::Exchange => [0.0, 0.0, 0.3],
            StructureKind::Factory => [0.0, 0.0, 0.5],
            StructureKind::SleepTube => [0.0, 1.0, 0.0],
            StructureKind::Temple => [0.0, 0.2, 0.4],
            StructureKind::Kiosk => [0.0, 0.0, 0.2],
            _ => [0.0; 3],
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        StructureKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownStructure(s.to_string()))
    }
}

//! Typed integer handles.
//!
//! World entities (units, buildings, items, plants) are named by [`EntityId`],
//! which the external world hands out.  The scheduler's own arena uses
//! [`AgentId`] as a dense slot index, so an agent's sub-state is always
//! `store.field[agent.index()]` and never a pointer back into the world.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel for "no entity / no slot".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Handle of anything that exists in the world: a unit, a building, an
    /// item lying on the ground, a plant.
    pub struct EntityId(u32);
}

typed_id! {
    /// Dense slot in the scheduler's agent arena.
    pub struct AgentId(u32);
}

typed_id! {
    /// A faction.  Relationships between teams are owned by the world.
    pub struct TeamId(u16);
}

impl TeamId {
    /// Unaffiliated wildlife and rogue units.
    pub const ROGUE: TeamId = TeamId(0);
}

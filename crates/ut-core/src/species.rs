//! Species, their behavioural class, and individual personality.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Coarse behavioural class of a species.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MobClass {
    /// Domain citizens: have needs, visit buildings, guard.
    Denizen,
    /// Domain construction bots.
    Worker,
    /// Travellers passing through from sector to sector.
    Visitor,
    /// Common wildlife.
    Lesser,
    /// Large monsters that can clear a domain on their own.
    Greater,
}

/// Every species the scheduler knows how to drive.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Species {
    Human,
    Gob,
    Kamakiri,
    Worker,
    Visitor,
    Mantis,
    RedMantis,
    Trilobyte,
    Troll,
    Cyclops,
    FireCyclops,
}

impl Species {
    pub const ALL: [Species; 11] = [
        Species::Human,
        Species::Gob,
        Species::Kamakiri,
        Species::Worker,
        Species::Visitor,
        Species::Mantis,
        Species::RedMantis,
        Species::Trilobyte,
        Species::Troll,
        Species::Cyclops,
        Species::FireCyclops,
    ];

    pub fn mob_class(self) -> MobClass {
        match self {
            Species::Human | Species::Gob | Species::Kamakiri => MobClass::Denizen,
            Species::Worker => MobClass::Worker,
            Species::Visitor => MobClass::Visitor,
            Species::Mantis | Species::RedMantis | Species::Trilobyte => MobClass::Lesser,
            Species::Troll | Species::Cyclops | Species::FireCyclops => MobClass::Greater,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Species::Human => "human",
            Species::Gob => "gob",
            Species::Kamakiri => "kamakiri",
            Species::Worker => "worker",
            Species::Visitor => "visitor",
            Species::Mantis => "mantis",
            Species::RedMantis => "redMantis",
            Species::Trilobyte => "trilobyte",
            Species::Troll => "troll",
            Species::Cyclops => "cyclops",
            Species::FireCyclops => "fireCyclops",
        }
    }

    #[inline]
    pub fn has_needs(self) -> bool {
        self.mob_class() == MobClass::Denizen
    }

    #[inline]
    pub fn does_work(self) -> bool {
        self.mob_class() == MobClass::Worker
    }

    #[inline]
    pub fn guards(self) -> bool {
        self.mob_class() == MobClass::Denizen
    }

    #[inline]
    pub fn collects_fruit(self) -> bool {
        self.mob_class() == MobClass::Denizen
    }

    #[inline]
    pub fn can_rampage(self) -> bool {
        self.mob_class() == MobClass::Greater
    }

    /// Wanders toward its own kind rather than at random.
    #[inline]
    pub fn herds(self) -> bool {
        matches!(self, Species::Mantis | Species::RedMantis)
    }

    /// Wanders toward plants.
    #[inline]
    pub fn likes_plants(self) -> bool {
        matches!(self, Species::Trilobyte | Species::Troll)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Species::ALL
            .iter()
            .copied()
            .find(|sp| sp.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownSpecies(s.to_string()))
    }
}

// ── Personality ───────────────────────────────────────────────────────────────

/// Where an individual falls on one personality axis.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Preference {
    Likes,
    #[default]
    Indifferent,
    Dislikes,
}

/// Per-individual leanings that tilt needs and crisis resolution.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Personality {
    pub fighting:  Preference,
    pub crafting:  Preference,
    pub guarding:  Preference,
    pub botany:    Preference,
    pub spiritual: Preference,
}

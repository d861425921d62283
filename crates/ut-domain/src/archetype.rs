//! Faction archetypes and their fixed build orders.

use std::fmt;
use std::str::FromStr;

use ut_core::StructureKind;

use crate::DomainError;

/// What a faction builds, and in which order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Archetype {
    /// Guards, forges and factories before comforts.
    Industrial,
    /// Trade first: markets, an exchange, kiosks for visitors.
    Economic,
}

/// One entry of an archetype's priority list.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PlanStep {
    BuyWorkers,
    ClearDisconnected,
    Roads,
    Plaza,
    Build(StructureKind),
}

use PlanStep::{Build, BuyWorkers, ClearDisconnected, Plaza, Roads};
use StructureKind as S;

const INDUSTRIAL: &[PlanStep] = &[
    BuyWorkers,
    ClearDisconnected,
    Roads,
    Plaza,
    Build(S::Farm),
    Build(S::Distillery),
    Build(S::Factory),
    Build(S::Forge),
    Build(S::Vault),
    Build(S::GuardPost),
    Build(S::SleepTube),
];

const ECONOMIC: &[PlanStep] = &[
    BuyWorkers,
    ClearDisconnected,
    Roads,
    Plaza,
    Build(S::Farm),
    Build(S::Distillery),
    Build(S::Bar),
    Build(S::Market),
    Build(S::Exchange),
    Build(S::Kiosk),
    Build(S::Vault),
    Build(S::SleepTube),
    Build(S::Temple),
];

impl Archetype {
    pub const ALL: [Archetype; 2] = [Archetype::Industrial, Archetype::Economic];

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Industrial => "industrial",
            Archetype::Economic => "economic",
        }
    }

    /// Steps in priority order; the planner stops at the first that acts.
    pub fn priorities(self) -> &'static [PlanStep] {
        match self {
            Archetype::Industrial => INDUSTRIAL,
            Archetype::Economic => ECONOMIC,
        }
    }

    /// Buildings that wait until the team holds a stockpile of crystals.
    pub fn needs_stockpile(self, kind: StructureKind) -> bool {
        matches!((self, kind), (Archetype::Economic, StructureKind::Exchange))
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Archetype::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::Parse(format!("unknown archetype {s:?}")))
    }
}

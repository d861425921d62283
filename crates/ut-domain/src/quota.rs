//! Building quotas per archetype, with a CSV loader.
//!
//! # CSV format
//!
//! ```csv
//! archetype,structure,quota
//! industrial,worker,4
//! industrial,farm,2
//! economic,market,2
//! ```
//!
//! `structure` is any [`StructureKind`] name, or `worker` for the number of
//! worker bots the faction keeps.  Rows override the defaults; pairs absent
//! from the file keep their default quota.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ut_core::StructureKind;

use crate::{Archetype, DomainError, DomainResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct QuotaRecord {
    archetype: String,
    structure: String,
    quota:     u32,
}

// ── QuotaTable ────────────────────────────────────────────────────────────────

/// How many of each building (and how many workers) an archetype wants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotaTable {
    structures: BTreeMap<(Archetype, StructureKind), u32>,
    workers:    BTreeMap<Archetype, u32>,
}

impl QuotaTable {
    /// A table with every quota at zero.
    pub fn empty() -> Self {
        Self { structures: BTreeMap::new(), workers: BTreeMap::new() }
    }

    pub fn defaults() -> Self {
        use StructureKind as S;
        let mut t = Self::empty();

        t.set_workers(Archetype::Industrial, 4);
        for (kind, n) in [
            (S::Farm, 2),
            (S::Distillery, 1),
            (S::Factory, 1),
            (S::Forge, 1),
            (S::Vault, 1),
            (S::GuardPost, 2),
            (S::SleepTube, 2),
        ] {
            t.set(Archetype::Industrial, kind, n);
        }

        t.set_workers(Archetype::Economic, 3);
        for (kind, n) in [
            (S::Farm, 2),
            (S::Distillery, 2),
            (S::Bar, 1),
            (S::Market, 2),
            (S::Exchange, 1),
            (S::Kiosk, 3),
            (S::Vault, 1),
            (S::SleepTube, 2),
            (S::Temple, 1),
        ] {
            t.set(Archetype::Economic, kind, n);
        }
        t
    }

    pub fn get(&self, archetype: Archetype, kind: StructureKind) -> u32 {
        self.structures.get(&(archetype, kind)).copied().unwrap_or(0)
    }

    pub fn set(&mut self, archetype: Archetype, kind: StructureKind, quota: u32) {
        self.structures.insert((archetype, kind), quota);
    }

    pub fn workers(&self, archetype: Archetype) -> u32 {
        self.workers.get(&archetype).copied().unwrap_or(0)
    }

    pub fn set_workers(&mut self, archetype: Archetype, quota: u32) {
        self.workers.insert(archetype, quota);
    }
}

impl Default for QuotaTable {
    fn default() -> Self {
        Self::defaults()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load quotas from a CSV file, layered over [`QuotaTable::defaults`].
pub fn load_quotas_csv(path: &Path) -> DomainResult<QuotaTable> {
    let file = std::fs::File::open(path).map_err(DomainError::Io)?;
    load_quotas_reader(file)
}

/// Like [`load_quotas_csv`] but accepts any `Read` source.
pub fn load_quotas_reader<R: Read>(reader: R) -> DomainResult<QuotaTable> {
    let mut table = QuotaTable::defaults();
    let mut csv_reader = csv::Reader::from_reader(reader);

    for result in csv_reader.deserialize::<QuotaRecord>() {
        let row = result.map_err(|e| DomainError::Parse(e.to_string()))?;
        let archetype: Archetype = row.archetype.parse()?;
        match parse_structure(&row.structure)? {
            None => table.set_workers(archetype, row.quota),
            Some(kind) => table.set(archetype, kind, row.quota),
        }
    }
    Ok(table)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `None` for the `worker` sentinel.
fn parse_structure(s: &str) -> DomainResult<Option<StructureKind>> {
    if s.trim().eq_ignore_ascii_case("worker") {
        return Ok(None);
    }
    let kind: StructureKind = s.parse().map_err(|e| DomainError::Parse(format!("{e}")))?;
    if !kind.is_building() {
        return Err(DomainError::Parse(format!("{kind} is not a building")));
    }
    Ok(Some(kind))
}

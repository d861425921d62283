//! `ut-domain`: what a faction builds in the sector it holds.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`archetype`] | `Archetype`, `PlanStep`: fixed build orders                |
//! | [`planner`]   | `DomainPlanner`: the per-faction step list                 |
//! | [`road`]      | `RoadMap`, `BuildZone`: roads, plazas and zones beside them |
//! | [`rebuild`]   | `RebuildQueue`: destroyed buildings waiting to be re-queued |
//! | [`quota`]     | `QuotaTable`, `load_quotas_csv`, `load_quotas_reader`      |
//! | [`error`]     | `DomainError`, `DomainResult<T>`                           |
//!
//! # Design notes
//!
//! The planner never builds anything itself.  It places orders on the
//! world's work queue (`add_action`) and worker agents carry them out, so a
//! placement may still fail when a worker arrives; the worker's build task
//! re-validates and the planner simply tries again on a later tick.
//!
//! Road topology is read once, at creation, from the sector's port paths.
//! Each step returns whether it acted, and the planner stops at the first
//! step that did.

pub mod archetype;
pub mod error;
pub mod planner;
pub mod quota;
pub mod rebuild;
pub mod road;


pub use archetype::{Archetype, PlanStep};
pub use error::{DomainError, DomainResult};
pub use planner::{DomainPlanner, WORKER_COST};
pub use quota::{load_quotas_csv, load_quotas_reader, QuotaTable};
pub use rebuild::{RebuildItem, RebuildQueue};
pub use road::{BuildZone, RoadMap};

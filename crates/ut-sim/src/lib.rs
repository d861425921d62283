//! `ut-sim`: frame loop driver for the rust_ut framework.
//!
//! # Frame loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Events      Spawned → new agent, woken now
//!                 Despawned → agent retired, reservations released
//!                 Message → on_message, recipient woken now
//!                 BuildingLost → rebuild queues + director
//!   ② Director    ticked when its wake hint is due
//!   ③ Planners    every DomainPlanner ticks
//!   ④ Agents      drain WakeQueue; tick each; re-file at now + hint
//!   ⑤ World       world.advance(tick_ms)
//!   ⑥ News        flushed to SimObserver::on_news
//! ```
//!
//! Agents are ticked one at a time in wake order, each against the whole
//! world.  Nothing runs concurrently, so the reservation registry needs no
//! locking; it is sharded per sector so a parallel driver could later
//! partition agents by sector and merge at frame boundaries.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ut_behavior::AgentScheduler;
//! use ut_core::SimConfig;
//! use ut_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), world, AgentScheduler).build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod wake_queue;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NewsCollector, NoopObserver, SimObserver};
pub use sim::Sim;
pub use wake_queue::WakeQueue;

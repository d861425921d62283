//! `ut-director`: world-level scripted events.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`plot`]      | `Plot` (`SwarmPlot`, `BattlePlot`, `RisingPlot`)          |
//! | [`director`]  | `Director`: active plot, attack cadence, attraction       |
//! | [`error`]     | `PlotError`, `PlotResult<T>`                              |
//!
//! Plots and the director always derive `Serialize`/`Deserialize`; a plot is
//! written as its `type` tag followed by its fields.

pub mod director;
pub mod error;
pub mod plot;


pub use director::Director;
pub use error::{PlotError, PlotResult};
pub use plot::{BattlePlot, Plot, RisingPlot, RisingStage, SwarmPlot, TEMPLES_REPEL_GREATER};

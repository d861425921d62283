//! Simulation observer trait for progress reporting and news collection.

use ut_core::Tick;
use ut_world::NewsEvent;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// frame loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: news printer
///
/// ```rust,ignore
/// struct Printer;
///
/// impl SimObserver for Printer {
///     fn on_news(&mut self, tick: Tick, event: &NewsEvent) {
///         println!("{tick}: {}", event.text);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each frame, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each frame.  `woken` is the number of agents
    /// ticked this frame.
    fn on_tick_end(&mut self, _tick: Tick, _woken: usize) {}

    /// Called once per news event, in the order they were pushed.
    fn on_news(&mut self, _tick: Tick, _event: &NewsEvent) {}

    /// Called once after the final frame completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Keeps every news event with the frame it surfaced on.
#[derive(Default)]
pub struct NewsCollector {
    pub events: Vec<(Tick, NewsEvent)>,
    pub woken:  usize,
}

impl NewsCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimObserver for NewsCollector {
    fn on_tick_end(&mut self, _tick: Tick, woken: usize) {
        self.woken += woken;
    }

    fn on_news(&mut self, tick: Tick, event: &NewsEvent) {
        self.events.push((tick, event.clone()));
    }
}

//! Simulation: program loading, the run loop, and trace recording.
//!
//! A run is assembled in two steps. The loader fills a [`ProcessTable`](crate::ProcessTable)
//! from program text or random descriptions, then a [`Simulator`] takes ownership of the table
//! and advances it tick by tick, handing each [`TickRecord`] to a [`TickObserver`].

/// Program and random-description loading.
pub mod loader;
/// Tick-driven run loop and scheduling policies.
pub mod simulator;
/// Per-tick records and the collected trace.
pub mod trace;

pub use loader::{InstructionSource, SeededSource};
pub use simulator::Simulator;
pub use trace::{Executed, Slot, TickObserver, TickRecord, Trace};

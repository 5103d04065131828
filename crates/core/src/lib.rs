//! Single-CPU process scheduling simulator library.
//!
//! This crate models, one tick at a time, how a uniprocessor interleaves processes that
//! alternate between CPU work and I/O. It provides:
//! 1. **Processes:** Opcodes, process states, and the process table with checked transitions.
//! 2. **Configuration:** Switch and I/O-completion policies, I/O length, and the random seed.
//! 3. **Simulation:** The tick-driven run loop, program loading, and per-tick trace records.
//! 4. **Statistics:** CPU and I/O utilization aggregates and their report.
//!
//! Runs are fully deterministic: identical programs and configuration always produce
//! identical traces.

/// Common types (process ids, ticks) and error definitions.
pub mod common;
/// Simulator configuration (defaults, policy enums, JSON loading).
pub mod config;
/// Process model (opcodes, states, process table).
pub mod process;
/// Run loop, program loader, and trace recording.
pub mod sim;
/// Run statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Table of processes handed to the simulator at construction.
pub use crate::process::ProcessTable;
/// Top-level simulator; construct with `Simulator::new` and drive with `run` or `tick`.
pub use crate::sim::Simulator;
/// Aggregate counters returned at the end of a run.
pub use crate::stats::RunStats;

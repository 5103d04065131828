//! Run statistics collection and reporting.
//!
//! This module tracks the aggregate counters of a run:
//! 1. **Total time:** Ticks elapsed until every process was done.
//! 2. **CPU busy:** Ticks in which an instruction executed.
//! 3. **I/O busy:** Ticks in which at least one I/O was in flight.

use std::fmt;

use serde::Serialize;

use crate::common::types::Tick;

/// Aggregate counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Ticks in which an instruction was popped and executed.
    pub cpu_busy: u64,
    /// Ticks with at least one outstanding I/O.
    pub io_busy: u64,
    /// Total ticks elapsed.
    pub total_ticks: Tick,
}

impl RunStats {
    /// CPU busy time as a percentage of total time (0 for an empty run).
    pub fn cpu_utilization(&self) -> f64 {
        percent(self.cpu_busy, self.total_ticks)
    }

    /// I/O busy time as a percentage of total time (0 for an empty run).
    pub fn io_utilization(&self) -> f64 {
        percent(self.io_busy, self.total_ticks)
    }

    /// Prints the statistics block to stdout.
    pub fn print(&self) {
        println!("{self}");
    }
}

fn percent(part: u64, total: Tick) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * part as f64 / total as f64
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats: Total Time {}", self.total_ticks)?;
        writeln!(
            f,
            "Stats: CPU Busy {} ({:.2}%)",
            self.cpu_busy,
            self.cpu_utilization()
        )?;
        write!(
            f,
            "Stats: IO Busy  {} ({:.2}%)",
            self.io_busy,
            self.io_utilization()
        )
    }
}

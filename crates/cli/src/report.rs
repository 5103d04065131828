//! Human- and machine-readable output.
//!
//! This module renders the three things the CLI can print:
//! 1. **Listing:** Each process's instructions plus a summary of the active policies, for
//!    working the trace out by hand.
//! 2. **Trace table:** One row per tick with every process's slot, CPU activity, and I/Os in
//!    flight.
//! 3. **JSON report:** The configuration, the loaded programs, and optionally the trace and
//!    statistics.

use std::fmt;

use serde::Serialize;

use procsim_core::common::Pid;
use procsim_core::config::{IoDonePolicy, SwitchPolicy};
use procsim_core::process::Opcode;
use procsim_core::sim::{TickRecord, Trace};
use procsim_core::{Config, ProcessTable, RunStats};

/// Column width for every field after the tick number.
const COLUMN: usize = 14;

/// The problem statement shown when answers are not requested.
#[derive(Debug)]
pub struct Listing<'a> {
    /// Loaded processes.
    pub table: &'a ProcessTable,
    /// Policies in effect.
    pub config: &'a Config,
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Produce a trace of what would happen when you run these processes:"
        )?;
        for process in self.table.iter() {
            writeln!(f, "Process {}", process.pid())?;
            for opcode in process.instructions() {
                writeln!(f, "  {opcode}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Important behaviors:")?;
        let switch = match self.config.switch {
            SwitchPolicy::SwitchOnIo => "the current process is FINISHED or ISSUES AN IO",
            SwitchPolicy::SwitchOnEnd => "the current process is FINISHED",
        };
        writeln!(f, "  System will switch when {switch}")?;
        let io_done = match self.config.io_done {
            IoDonePolicy::IoRunImmediate => "run IMMEDIATELY",
            IoDonePolicy::IoRunLater => "run LATER (when it is its turn)",
        };
        write!(f, "  After IOs, the process issuing the IO will {io_done}")
    }
}

/// The per-tick answer table.
#[derive(Debug)]
pub struct TraceTable<'a> {
    /// Recorded run.
    pub trace: &'a Trace,
    /// Number of process columns.
    pub processes: usize,
}

impl TraceTable<'_> {
    fn header(&self) -> String {
        let mut line = String::from("Time");
        for pid in 0..self.processes {
            line.push_str(&format!("{:>COLUMN$}", format!("PID:{pid:>2}")));
        }
        line.push_str(&format!("{:>COLUMN$}{:>COLUMN$}", "CPU", "IOs"));
        line
    }

    fn row(record: &TickRecord) -> String {
        let marker = if record.io_completed() { '*' } else { ' ' };
        let mut line = format!("{:>3}{marker}", record.tick);
        for slot in &record.slots {
            line.push_str(&format!("{:>COLUMN$}", slot.to_string()));
        }
        let cpu = if record.cpu_busy() { "1" } else { "" };
        line.push_str(&format!("{cpu:>COLUMN$}"));
        if record.io_busy() {
            line.push_str(&format!("{:>COLUMN$}", record.ios_in_flight));
        }
        line.trim_end().to_string()
    }
}

impl fmt::Display for TraceTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())?;
        for record in self.trace.records() {
            write!(f, "\n{}", Self::row(record))?;
        }
        Ok(())
    }
}

/// One loaded process in the JSON report.
#[derive(Debug, Serialize)]
struct ProcessEntry {
    pid: Pid,
    instructions: Vec<Opcode>,
}

/// Everything `--format json` emits.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    config: &'a Config,
    processes: Vec<ProcessEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a Trace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<RunStats>,
}

impl<'a> JsonReport<'a> {
    /// Builds a report of the loaded programs, before any run.
    pub fn new(config: &'a Config, table: &ProcessTable) -> Self {
        let processes = table
            .iter()
            .map(|p| ProcessEntry {
                pid: p.pid(),
                instructions: p.instructions().iter().copied().collect(),
            })
            .collect();
        Self {
            config,
            processes,
            trace: None,
            stats: None,
        }
    }

    /// Attaches the outcome of a run.
    pub const fn with_run(mut self, trace: &'a Trace, stats: RunStats) -> Self {
        self.trace = Some(trace);
        self.stats = Some(stats);
        self
    }
}

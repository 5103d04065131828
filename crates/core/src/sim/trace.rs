//! Per-tick trace records.
//!
//! After every tick the simulator produces a [`TickRecord`]: what each process showed, whether
//! the CPU executed an instruction, and how many I/Os were outstanding. The run loop itself
//! never reads these back; they exist for reporting and for tests.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::common::types::{Pid, Tick};
use crate::process::{Opcode, ProcState};

/// What one process column shows for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The process is not executing; shows its state.
    State(ProcState),
    /// The process executed this opcode during the tick.
    Executing(Opcode),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(state) => write!(f, "{state}"),
            Self::Executing(op) => write!(f, "RUN:{op}"),
        }
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The instruction the CPU executed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Executed {
    /// Process that executed it.
    pub pid: Pid,
    /// The opcode popped from its stream.
    pub opcode: Opcode,
}

/// Observable state of the system at the end of one tick's execution step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickRecord {
    /// Tick number, starting at 1.
    pub tick: Tick,
    /// One slot per process, in pid order.
    pub slots: Vec<Slot>,
    /// The executed instruction, if the CPU was busy.
    pub executed: Option<Executed>,
    /// Outstanding I/Os whose completion tick is still in the future.
    pub ios_in_flight: usize,
    /// Processes whose I/O completed at the start of this tick, in pid order.
    pub completed_io: Vec<Pid>,
}

impl TickRecord {
    /// Whether an instruction executed this tick.
    pub const fn cpu_busy(&self) -> bool {
        self.executed.is_some()
    }

    /// Whether at least one I/O was in flight.
    pub const fn io_busy(&self) -> bool {
        self.ios_in_flight > 0
    }

    /// Whether any I/O completed this tick.
    pub fn io_completed(&self) -> bool {
        !self.completed_io.is_empty()
    }

    /// The slot shown for `pid`.
    pub fn slot(&self, pid: Pid) -> Option<Slot> {
        self.slots.get(pid.index()).copied()
    }

    /// The state `pid` was in, counting an executing process as `Running`.
    pub fn state_of(&self, pid: Pid) -> Option<ProcState> {
        self.slot(pid).map(|slot| match slot {
            Slot::State(state) => state,
            Slot::Executing(_) => ProcState::Running,
        })
    }
}

/// Receives each tick record as the simulator produces it.
pub trait TickObserver {
    /// Called once per tick, in tick order.
    fn on_tick(&mut self, record: &TickRecord);
}

impl TickObserver for () {
    fn on_tick(&mut self, _record: &TickRecord) {}
}

/// A complete run, one record per tick in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Trace {
    records: Vec<TickRecord>,
}

impl Trace {
    /// Creates an empty trace.
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// All records in tick order.
    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    /// Number of recorded ticks.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no tick was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for a given tick (ticks start at 1).
    pub fn at(&self, tick: Tick) -> Option<&TickRecord> {
        let index = usize::try_from(tick.checked_sub(1)?).ok()?;
        self.records.get(index)
    }

    /// Ticks during which `pid` executed an instruction.
    pub fn running_ticks(&self, pid: Pid) -> Vec<Tick> {
        self.records
            .iter()
            .filter(|r| r.executed.is_some_and(|e| e.pid == pid))
            .map(|r| r.tick)
            .collect()
    }

    /// Ticks at which `pid` executed `opcode`.
    pub fn opcode_ticks(&self, pid: Pid, opcode: Opcode) -> Vec<Tick> {
        self.records
            .iter()
            .filter(|r| r.executed == Some(Executed { pid, opcode }))
            .map(|r| r.tick)
            .collect()
    }

    /// Ticks whose slot for `pid` shows `state` (an executing process counts as `Running`).
    pub fn ticks_in_state(&self, pid: Pid, state: ProcState) -> Vec<Tick> {
        self.records
            .iter()
            .filter(|r| r.state_of(pid) == Some(state))
            .map(|r| r.tick)
            .collect()
    }

    /// Ticks at which an I/O for `pid` completed.
    pub fn io_completion_ticks(&self, pid: Pid) -> Vec<Tick> {
        self.records
            .iter()
            .filter(|r| r.completed_io.contains(&pid))
            .map(|r| r.tick)
            .collect()
    }
}

impl TickObserver for Trace {
    fn on_tick(&mut self, record: &TickRecord) {
        self.records.push(record.clone());
    }
}

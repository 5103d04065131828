//! Process model.
//!
//! This module defines what the simulator schedules:
//! 1. **Opcodes:** The three instruction kinds a process stream can contain.
//! 2. **States:** The four-state lifecycle and its legal edges.
//! 3. **Processes:** A fixed-shape record holding a pid, a consumable instruction stream, and a state.
//! 4. **Process table:** Creation, program loading, introspection, and checked state transitions.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::common::types::Pid;

/// Process table with checked state transitions.
pub mod table;

pub use table::ProcessTable;

/// One instruction in a process's stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Opcode {
    /// One tick of CPU-bound work.
    #[serde(rename = "cpu")]
    Compute,
    /// Issue an I/O; the issuing process blocks until the I/O completes.
    #[serde(rename = "io")]
    IoStart,
    /// One tick of CPU work handling a finished I/O. Always directly follows an `IoStart`.
    #[serde(rename = "io_done")]
    IoComplete,
}

impl Opcode {
    /// Short label used in listings and traces (`cpu`, `io`, `io_done`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compute => "cpu",
            Self::IoStart => "io",
            Self::IoComplete => "io_done",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of a simulated process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcState {
    /// Runnable, waiting for the CPU.
    Ready,
    /// Holding the CPU.
    Running,
    /// Waiting for an outstanding I/O to complete.
    Blocked,
    /// Instruction stream exhausted; terminal.
    Done,
}

impl ProcState {
    /// Whether `self -> target` is an edge of the lifecycle.
    ///
    /// `Running -> Ready` exists only for I/O-completion preemption.
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Ready, Self::Running)
                | (Self::Running, Self::Blocked | Self::Done | Self::Ready)
                | (Self::Blocked, Self::Ready)
        )
    }

    /// Ready or Running.
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }

    /// Upper-case name used in traces (`READY`, `RUNNING`, `BLOCKED`, `DONE`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Blocked => "BLOCKED",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for ProcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A simulated process.
///
/// The stream is consumed from the front as the process executes; there is no separate
/// program counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pid: Pid,
    instructions: VecDeque<Opcode>,
    state: ProcState,
}

impl Process {
    pub(crate) const fn new(pid: Pid) -> Self {
        Self {
            pid,
            instructions: VecDeque::new(),
            state: ProcState::Ready,
        }
    }

    /// Process identifier.
    pub const fn pid(&self) -> Pid {
        self.pid
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> ProcState {
        self.state
    }

    /// Remaining instructions, head first.
    pub const fn instructions(&self) -> &VecDeque<Opcode> {
        &self.instructions
    }

    /// True once every instruction has been executed.
    pub fn is_exhausted(&self) -> bool {
        self.instructions.is_empty()
    }
}

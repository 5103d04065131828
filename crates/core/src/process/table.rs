//! Process table.
//!
//! Owns every process of a run. Processes are created and loaded before the run; the
//! simulator then takes the table by value, so nothing outside the run loop can touch it.
//!
//! Every state change goes through [`ProcessTable::transition`], which checks both the
//! caller's expected prior state and that the edge exists in the lifecycle. A failed check
//! is an [`InvariantViolation`], never silently corrected.

use tracing::debug;

use super::{Opcode, ProcState, Process};
use crate::common::error::InvariantViolation;
use crate::common::types::Pid;

/// All processes of a simulation, indexed by pid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessTable {
    procs: Vec<Process>,
}

impl ProcessTable {
    /// Creates an empty table.
    pub const fn new() -> Self {
        Self { procs: Vec::new() }
    }

    /// Allocates a new `Ready` process with an empty stream.
    ///
    /// # Returns
    ///
    /// The new pid, equal to the number of processes created before it.
    pub fn create(&mut self) -> Pid {
        let pid = Pid(self.procs.len());
        self.procs.push(Process::new(pid));
        pid
    }

    /// Allocates a new `Ready` process already holding `opcodes`.
    pub fn create_with<I>(&mut self, opcodes: I) -> Pid
    where
        I: IntoIterator<Item = Opcode>,
    {
        let pid = Pid(self.procs.len());
        let mut process = Process::new(pid);
        process.instructions.extend(opcodes);
        self.procs.push(process);
        pid
    }

    /// Appends opcodes to the end of a process's stream.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::UnknownProcess`] if `pid` was never created.
    pub fn append_instructions<I>(&mut self, pid: Pid, opcodes: I) -> Result<(), InvariantViolation>
    where
        I: IntoIterator<Item = Opcode>,
    {
        self.get_mut(pid)?.instructions.extend(opcodes);
        Ok(())
    }

    /// Number of processes.
    pub fn len(&self) -> usize {
        self.procs.len()
    }

    /// True if no process was created.
    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    /// Looks up a process.
    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.procs.get(pid.index())
    }

    /// Iterates processes in pid order.
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.procs.iter()
    }

    /// Number of instructions still in a process's stream.
    pub fn instruction_count(&self, pid: Pid) -> Option<usize> {
        self.get(pid).map(|p| p.instructions.len())
    }

    /// The instruction at `index` in a process's remaining stream.
    pub fn instruction_at(&self, pid: Pid, index: usize) -> Option<Opcode> {
        self.get(pid)
            .and_then(|p| p.instructions.get(index))
            .copied()
    }

    /// Current state of a process.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::UnknownProcess`] if `pid` was never created.
    pub fn state(&self, pid: Pid) -> Result<ProcState, InvariantViolation> {
        self.get(pid)
            .map(Process::state)
            .ok_or(InvariantViolation::UnknownProcess(pid))
    }

    /// Processes not yet `Done`.
    pub fn active_count(&self) -> usize {
        self.procs
            .iter()
            .filter(|p| p.state != ProcState::Done)
            .count()
    }

    /// Processes that are `Ready` or `Running`.
    pub fn runnable_count(&self) -> usize {
        self.procs.iter().filter(|p| p.state.is_runnable()).count()
    }

    /// Processes currently `Running`.
    pub fn running_count(&self) -> usize {
        self.procs
            .iter()
            .filter(|p| p.state == ProcState::Running)
            .count()
    }

    /// `expected -> Ready`.
    ///
    /// # Errors
    ///
    /// See [`ProcessTable::transition`].
    pub fn move_to_ready(&mut self, pid: Pid, expected: ProcState) -> Result<(), InvariantViolation> {
        self.transition(pid, expected, ProcState::Ready)
    }

    /// `expected -> Running`.
    ///
    /// # Errors
    ///
    /// See [`ProcessTable::transition`].
    pub fn move_to_running(
        &mut self,
        pid: Pid,
        expected: ProcState,
    ) -> Result<(), InvariantViolation> {
        self.transition(pid, expected, ProcState::Running)
    }

    /// `expected -> Blocked`.
    ///
    /// # Errors
    ///
    /// See [`ProcessTable::transition`].
    pub fn move_to_blocked(
        &mut self,
        pid: Pid,
        expected: ProcState,
    ) -> Result<(), InvariantViolation> {
        self.transition(pid, expected, ProcState::Blocked)
    }

    /// `expected -> Done`.
    ///
    /// # Errors
    ///
    /// See [`ProcessTable::transition`].
    pub fn move_to_done(&mut self, pid: Pid, expected: ProcState) -> Result<(), InvariantViolation> {
        self.transition(pid, expected, ProcState::Done)
    }

    /// Moves `pid` from `expected` to `target`.
    ///
    /// # Errors
    ///
    /// * [`InvariantViolation::UnknownProcess`] if `pid` does not exist.
    /// * [`InvariantViolation::StateMismatch`] if the process is not in `expected`.
    /// * [`InvariantViolation::IllegalTransition`] if `expected -> target` is not a lifecycle edge.
    pub fn transition(
        &mut self,
        pid: Pid,
        expected: ProcState,
        target: ProcState,
    ) -> Result<(), InvariantViolation> {
        let proc = self.get_mut(pid)?;
        if proc.state != expected {
            return Err(InvariantViolation::StateMismatch {
                pid,
                expected,
                found: proc.state,
                target,
            });
        }
        if !expected.can_transition_to(target) {
            return Err(InvariantViolation::IllegalTransition {
                pid,
                from: expected,
                to: target,
            });
        }
        debug!(pid = pid.0, from = %expected, to = %target, "state transition");
        proc.state = target;
        Ok(())
    }

    /// Removes and returns the head of a process's stream.
    pub(crate) fn pop_instruction(&mut self, pid: Pid) -> Result<Option<Opcode>, InvariantViolation> {
        Ok(self.get_mut(pid)?.instructions.pop_front())
    }

    fn get_mut(&mut self, pid: Pid) -> Result<&mut Process, InvariantViolation> {
        self.procs
            .get_mut(pid.index())
            .ok_or(InvariantViolation::UnknownProcess(pid))
    }
}

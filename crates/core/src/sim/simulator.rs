//! Simulator: owns the process table and every piece of run state.
//!
//! Each tick runs these steps in a fixed order:
//! 1. **Clock:** Advance the tick counter.
//! 2. **I/O completion:** For every process (ascending pid) whose I/O is due now, unblock it
//!    and apply the I/O-completion policy, then check the current process for termination.
//! 3. **Execute:** Pop one instruction from the running process, if any.
//! 4. **Record:** Snapshot the per-process view and the number of I/Os still in flight.
//! 5. **Issue I/O:** If the instruction was `IoStart`, block the process, schedule its
//!    completion `io_length + 1` ticks later, and switch away under `SwitchOnIo`.
//! 6. **Termination:** Retire the current process if its stream is now empty.
//!
//! All state lives in one `Simulator`; independent instances share nothing.

use tracing::{debug, info, trace};

use crate::common::error::InvariantViolation;
use crate::common::types::{Pid, Tick};
use crate::config::{Config, IoDonePolicy, SwitchPolicy};
use crate::process::{Opcode, ProcState, ProcessTable};
use crate::sim::trace::{Executed, Slot, TickObserver, TickRecord, Trace};
use crate::stats::RunStats;

/// Top-level simulator: process table, policies, clock, and pending I/O.
#[derive(Debug, Clone)]
pub struct Simulator {
    table: ProcessTable,
    switch: SwitchPolicy,
    io_done: IoDonePolicy,
    io_length: u64,
    clock: Tick,
    /// The process that holds, or most recently held, the CPU.
    current: Pid,
    /// Completion ticks of outstanding I/Os, indexed by pid.
    pending_io: Vec<Vec<Tick>>,
    stats: RunStats,
    started: bool,
}

impl Simulator {
    /// Creates a simulator that will run `table` under `config`.
    ///
    /// The table is moved in; it cannot be modified from outside once the run begins.
    pub fn new(table: ProcessTable, config: &Config) -> Self {
        let pending_io = vec![Vec::new(); table.len()];
        Self {
            table,
            switch: config.switch,
            io_done: config.io_done,
            io_length: config.io_length,
            clock: 0,
            current: Pid(0),
            pending_io,
            stats: RunStats::default(),
            started: false,
        }
    }

    /// The process table in its current state.
    pub const fn table(&self) -> &ProcessTable {
        &self.table
    }

    /// Ticks elapsed so far.
    pub const fn clock(&self) -> Tick {
        self.clock
    }

    /// The process that holds or last held the CPU, once the run has started.
    pub const fn current(&self) -> Option<Pid> {
        if self.started { Some(self.current) } else { None }
    }

    /// Counters accumulated so far.
    pub const fn stats(&self) -> RunStats {
        self.stats
    }

    /// Outstanding I/O completion ticks for `pid`.
    pub fn pending_io(&self, pid: Pid) -> &[Tick] {
        self.pending_io.get(pid.index()).map_or(&[], Vec::as_slice)
    }

    /// True once every process is `Done` (immediately so for an empty table).
    pub fn is_finished(&self) -> bool {
        self.table.active_count() == 0
    }

    /// Runs to completion, handing each tick's record to `observer`.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] raised by a state transition; the run stops there.
    pub fn run<O>(&mut self, observer: &mut O) -> Result<RunStats, InvariantViolation>
    where
        O: TickObserver + ?Sized,
    {
        info!(
            processes = self.table.len(),
            switch = %self.switch,
            io_done = %self.io_done,
            io_length = self.io_length,
            "starting run"
        );
        while !self.is_finished() {
            let record = self.tick()?;
            observer.on_tick(&record);
        }
        info!(
            total_ticks = self.stats.total_ticks,
            cpu_busy = self.stats.cpu_busy,
            io_busy = self.stats.io_busy,
            "run complete"
        );
        Ok(self.stats)
    }

    /// Runs to completion and returns the full trace alongside the aggregate counters.
    ///
    /// # Errors
    ///
    /// See [`Simulator::run`].
    pub fn run_traced(&mut self) -> Result<(Trace, RunStats), InvariantViolation> {
        let mut trace = Trace::new();
        let stats = self.run(&mut trace)?;
        Ok((trace, stats))
    }

    /// Advances the simulation by one tick.
    ///
    /// The first call also puts process 0 on the CPU.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if a transition is requested from the wrong state.
    pub fn tick(&mut self) -> Result<TickRecord, InvariantViolation> {
        if !self.started {
            self.table.move_to_running(self.current, ProcState::Ready)?;
            self.started = true;
        }

        self.clock += 1;
        let now = self.clock;

        let completed_io = self.complete_io(now)?;

        let executed = self.execute()?;
        if executed.is_some() {
            self.stats.cpu_busy += 1;
        }

        let ios_in_flight = self.ios_in_flight(now);
        if ios_in_flight > 0 {
            self.stats.io_busy += 1;
        }
        self.stats.total_ticks = now;

        let record = TickRecord {
            tick: now,
            slots: self.snapshot(executed),
            executed,
            ios_in_flight,
            completed_io,
        };

        if matches!(executed, Some(Executed { opcode: Opcode::IoStart, .. })) {
            self.issue_io(now)?;
        }
        self.retire_if_done()?;

        Ok(record)
    }

    /// Unblocks every process whose I/O completes at `now` and applies the completion policy.
    fn complete_io(&mut self, now: Tick) -> Result<Vec<Pid>, InvariantViolation> {
        let mut completed = Vec::new();
        for index in 0..self.pending_io.len() {
            let pending = &mut self.pending_io[index];
            let Some(slot) = pending.iter().position(|&due| due == now) else {
                continue;
            };
            let _ = pending.swap_remove(slot);

            let pid = Pid(index);
            completed.push(pid);
            debug!(tick = now, pid = pid.0, "io complete");
            self.table.move_to_ready(pid, ProcState::Blocked)?;

            match self.io_done {
                IoDonePolicy::IoRunImmediate => {
                    if self.current != pid
                        && self.table.state(self.current)? == ProcState::Running
                    {
                        debug!(tick = now, preempted = self.current.0, by = pid.0, "preempt");
                        self.table.move_to_ready(self.current, ProcState::Running)?;
                    }
                    self.select(pid)?;
                }
                IoDonePolicy::IoRunLater => {
                    if self.switch == SwitchPolicy::SwitchOnEnd && self.table.runnable_count() > 1 {
                        self.select(pid)?;
                    }
                    // Sole runnable process: nothing else would ever pick it up.
                    if self.table.runnable_count() == 1 {
                        self.select(pid)?;
                    }
                }
            }

            self.retire_if_done()?;
        }
        Ok(completed)
    }

    /// Pops and returns one instruction from the current process if it is running.
    fn execute(&mut self) -> Result<Option<Executed>, InvariantViolation> {
        let pid = self.current;
        if self.table.state(pid)? != ProcState::Running {
            return Ok(None);
        }
        let executed = self
            .table
            .pop_instruction(pid)?
            .map(|opcode| Executed { pid, opcode });
        if let Some(e) = executed {
            trace!(tick = self.clock, pid = pid.0, opcode = %e.opcode, "execute");
        }
        Ok(executed)
    }

    /// Blocks the current process on a new I/O and schedules its completion.
    fn issue_io(&mut self, now: Tick) -> Result<(), InvariantViolation> {
        let pid = self.current;
        self.table.move_to_blocked(pid, ProcState::Running)?;
        let due = now + self.io_length + 1;
        self.pending_io
            .get_mut(pid.index())
            .ok_or(InvariantViolation::UnknownProcess(pid))?
            .push(due);
        debug!(tick = now, pid = pid.0, due, "io issued");
        if self.switch == SwitchPolicy::SwitchOnIo {
            self.select_next()?;
        }
        Ok(())
    }

    /// Moves the current process to `Done` if it is running with nothing left to execute.
    fn retire_if_done(&mut self) -> Result<(), InvariantViolation> {
        let pid = self.current;
        let Some(process) = self.table.get(pid) else {
            return Err(InvariantViolation::UnknownProcess(pid));
        };
        if process.is_exhausted() && process.state() == ProcState::Running {
            self.table.move_to_done(pid, ProcState::Running)?;
            debug!(tick = self.clock, pid = pid.0, "process done");
            self.select_next()?;
        }
        Ok(())
    }

    /// Directed selection: `pid` becomes current and moves `Ready -> Running`.
    fn select(&mut self, pid: Pid) -> Result<(), InvariantViolation> {
        self.current = pid;
        self.table.move_to_running(pid, ProcState::Ready)
    }

    /// Round-robin selection: the first `Ready` process after the current one, wrapping
    /// around and ending with the current process itself. No-op if none is ready.
    fn select_next(&mut self) -> Result<(), InvariantViolation> {
        let count = self.table.len();
        let start = self.current.index();
        let candidate = (start + 1..count)
            .chain(0..=start)
            .map(Pid)
            .find(|&pid| {
                self.table
                    .get(pid)
                    .is_some_and(|p| p.state() == ProcState::Ready)
            });
        match candidate {
            Some(pid) => self.select(pid),
            None => {
                debug!(tick = self.clock, "no ready process");
                Ok(())
            }
        }
    }

    /// I/Os whose completion tick lies strictly after `now`.
    fn ios_in_flight(&self, now: Tick) -> usize {
        self.pending_io
            .iter()
            .flatten()
            .filter(|&&due| due > now)
            .count()
    }

    fn snapshot(&self, executed: Option<Executed>) -> Vec<Slot> {
        self.table
            .iter()
            .map(|p| match executed {
                Some(e) if e.pid == p.pid() => Slot::Executing(e.opcode),
                _ => Slot::State(p.state()),
            })
            .collect()
    }
}

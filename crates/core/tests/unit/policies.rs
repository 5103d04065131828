//! Switch and I/O-completion policy behavior.

use pretty_assertions::assert_eq;

use procsim_core::common::Pid;
use procsim_core::config::{IoDonePolicy, SwitchPolicy};
use procsim_core::process::{Opcode, ProcState};

use crate::common::TestContext;

#[test]
fn switch_on_end_idles_cpu_while_current_waits() {
    let out = TestContext::new()
        .switch(SwitchPolicy::SwitchOnEnd)
        .io_done(IoDonePolicy::IoRunLater)
        .io_length(2)
        .programs("c1,i,c1:c2")
        .run();

    assert_eq!(
        out.column(Pid(0)),
        vec!["RUN:cpu", "RUN:io", "BLOCKED", "BLOCKED", "RUN:io_done", "RUN:cpu", "DONE", "DONE"]
    );
    assert_eq!(
        out.column(Pid(1)),
        vec!["READY", "READY", "READY", "READY", "READY", "READY", "RUN:cpu", "RUN:cpu"]
    );
    assert_eq!(out.totals(), (6, 2, 8));
}

#[test]
fn switch_on_io_overlaps_io_with_compute() {
    let out = TestContext::new()
        .switch(SwitchPolicy::SwitchOnIo)
        .io_done(IoDonePolicy::IoRunLater)
        .io_length(2)
        .programs("c1,i,c1:c2")
        .run();

    assert_eq!(
        out.column(Pid(0)),
        vec!["RUN:cpu", "RUN:io", "BLOCKED", "BLOCKED", "RUN:io_done", "RUN:cpu"]
    );
    assert_eq!(
        out.column(Pid(1)),
        vec!["READY", "READY", "RUN:cpu", "RUN:cpu", "DONE", "DONE"]
    );
    assert_eq!(out.totals(), (6, 2, 6));
}

#[test]
fn run_later_waits_for_runner_to_finish() {
    let out = TestContext::new()
        .switch(SwitchPolicy::SwitchOnIo)
        .io_done(IoDonePolicy::IoRunLater)
        .io_length(1)
        .programs("i:c5")
        .run();

    assert_eq!(out.trace.io_completion_ticks(Pid(0)), vec![3]);
    assert_eq!(
        out.trace.ticks_in_state(Pid(0), ProcState::Ready),
        vec![3, 4, 5, 6]
    );
    assert_eq!(out.trace.opcode_ticks(Pid(0), Opcode::IoComplete), vec![7]);
    assert_eq!(out.trace.running_ticks(Pid(1)), vec![2, 3, 4, 5, 6]);
    assert_eq!(out.totals(), (7, 1, 7));
}

#[test]
fn run_immediate_handles_completion_on_arrival() {
    let out = TestContext::new()
        .switch(SwitchPolicy::SwitchOnIo)
        .io_done(IoDonePolicy::IoRunImmediate)
        .io_length(1)
        .programs("i:c5")
        .run();

    assert_eq!(out.trace.opcode_ticks(Pid(0), Opcode::IoComplete), vec![3]);
    assert_eq!(out.trace.running_ticks(Pid(1)), vec![2, 4, 5, 6, 7]);
    assert_eq!(out.totals(), (7, 1, 7));
}

#[test]
fn run_later_selects_sole_runnable_process() {
    // p1 finishes while p0 is still blocked, leaving nothing to run until p0's I/O returns.
    let out = TestContext::new()
        .switch(SwitchPolicy::SwitchOnIo)
        .io_done(IoDonePolicy::IoRunLater)
        .io_length(4)
        .programs("i:c1")
        .run();

    assert_eq!(out.row(3), vec!["BLOCKED", "DONE"]);
    assert!(out.trace.at(3).is_some_and(|r| !r.cpu_busy()));
    assert_eq!(out.trace.io_completion_ticks(Pid(0)), vec![6]);
    assert_eq!(out.trace.opcode_ticks(Pid(0), Opcode::IoComplete), vec![6]);
    assert_eq!(out.totals(), (3, 4, 6));
}

#[test]
fn zero_length_io_completes_on_next_tick() {
    let out = TestContext::new()
        .switch(SwitchPolicy::SwitchOnIo)
        .io_done(IoDonePolicy::IoRunLater)
        .io_length(0)
        .programs("i:i")
        .run();

    assert_eq!(out.trace.io_completion_ticks(Pid(0)), vec![2]);
    assert_eq!(out.trace.opcode_ticks(Pid(1), Opcode::IoStart), vec![2]);
    assert_eq!(out.trace.io_completion_ticks(Pid(1)), vec![3]);
    // p1 switched away on its I/O, so p0 picks up its own completion at tick 3.
    assert_eq!(out.trace.opcode_ticks(Pid(0), Opcode::IoComplete), vec![3]);
    assert_eq!(out.trace.opcode_ticks(Pid(1), Opcode::IoComplete), vec![4]);
    assert_eq!(out.totals(), (4, 0, 4));
    assert!(out.all_done());
}

#[test]
fn run_immediate_demotes_runner_to_ready() {
    let sim_ctx = TestContext::new()
        .switch(SwitchPolicy::SwitchOnIo)
        .io_done(IoDonePolicy::IoRunImmediate)
        .io_length(1)
        .programs("i:c5");
    let mut sim = sim_ctx.simulator();

    let _ = sim.tick().unwrap();
    let _ = sim.tick().unwrap();
    assert_eq!(sim.table().state(Pid(1)), Ok(ProcState::Running));

    let record = sim.tick().unwrap();
    assert_eq!(record.completed_io, vec![Pid(0)]);
    assert_eq!(sim.current(), Some(Pid(1)));
    assert_eq!(sim.table().state(Pid(0)), Ok(ProcState::Done));
    assert_eq!(sim.table().state(Pid(1)), Ok(ProcState::Running));
    assert_eq!(record.state_of(Pid(1)), Some(ProcState::Ready));
}

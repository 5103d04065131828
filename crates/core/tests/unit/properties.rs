//! Randomized checks of run-loop invariants across all policy combinations.

use proptest::prelude::*;

use procsim_core::common::Pid;
use procsim_core::config::{Config, IoDonePolicy, SwitchPolicy};
use procsim_core::process::{Opcode, ProcState};

use crate::common::{Outcome, TestContext};

/// `None` is an I/O token, `Some(n)` is `c<n>`.
type Program = Vec<Option<u8>>;

fn token() -> impl Strategy<Value = Option<u8>> {
    prop_oneof![Just(None), (0u8..4).prop_map(Some)]
}

fn programs() -> impl Strategy<Value = Vec<Program>> {
    prop::collection::vec(prop::collection::vec(token(), 1..5), 1..5)
}

fn config() -> impl Strategy<Value = Config> {
    (any::<bool>(), any::<bool>(), 0u64..4).prop_map(|(on_end, immediate, io_length)| Config {
        switch: if on_end {
            SwitchPolicy::SwitchOnEnd
        } else {
            SwitchPolicy::SwitchOnIo
        },
        io_done: if immediate {
            IoDonePolicy::IoRunImmediate
        } else {
            IoDonePolicy::IoRunLater
        },
        io_length,
        seed: 0,
    })
}

fn program_text(programs: &[Program]) -> String {
    programs
        .iter()
        .map(|program| {
            program
                .iter()
                .map(|token| token.map_or_else(|| "i".to_string(), |n| format!("c{n}")))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(":")
}

fn instruction_count(programs: &[Program]) -> u64 {
    programs
        .iter()
        .flatten()
        .map(|token| token.map_or(2, u64::from))
        .sum()
}

fn io_count(programs: &[Program]) -> u64 {
    programs.iter().flatten().filter(|t| t.is_none()).count() as u64
}

fn simulate(programs: &[Program], config: &Config) -> Outcome {
    let mut ctx = TestContext::new().programs(&program_text(programs));
    ctx.config = config.clone();
    ctx.run()
}

proptest! {
    #[test]
    fn runs_are_deterministic(programs in programs(), config in config()) {
        let a = simulate(&programs, &config);
        let b = simulate(&programs, &config);
        prop_assert_eq!(a.trace, b.trace);
        prop_assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn every_instruction_executes_exactly_once(programs in programs(), config in config()) {
        let out = simulate(&programs, &config);
        prop_assert!(out.all_done());
        prop_assert_eq!(out.stats.cpu_busy, instruction_count(&programs));
        let busy = out.trace.records().iter().filter(|r| r.cpu_busy()).count() as u64;
        prop_assert_eq!(busy, out.stats.cpu_busy);
        prop_assert_eq!(out.trace.len() as u64, out.stats.total_ticks);
    }

    #[test]
    fn runs_terminate_within_bound(programs in programs(), config in config()) {
        let out = simulate(&programs, &config);
        let bound = instruction_count(&programs)
            + io_count(&programs) * (config.io_length + 1)
            + programs.len() as u64
            + 1;
        prop_assert!(out.stats.total_ticks <= bound);
        prop_assert!(out.stats.io_busy <= out.stats.total_ticks);
    }

    #[test]
    fn io_completes_exactly_after_its_length(programs in programs(), config in config()) {
        let out = simulate(&programs, &config);
        for index in 0..programs.len() {
            let pid = Pid(index);
            let expected: Vec<u64> = out
                .trace
                .opcode_ticks(pid, Opcode::IoStart)
                .into_iter()
                .map(|issued| issued + config.io_length + 1)
                .collect();
            let completions = out.trace.io_completion_ticks(pid);
            prop_assert_eq!(&completions, &expected);

            let handled = out.trace.opcode_ticks(pid, Opcode::IoComplete);
            prop_assert_eq!(handled.len(), completions.len());
            for (done, handled) in completions.iter().zip(&handled) {
                prop_assert!(handled >= done);
            }
        }
    }

    #[test]
    fn at_most_one_process_runs(programs in programs(), config in config()) {
        let out = simulate(&programs, &config);
        for record in out.trace.records() {
            let running = (0..programs.len())
                .filter(|&i| record.state_of(Pid(i)) == Some(ProcState::Running))
                .count();
            prop_assert!(running <= 1, "tick {}: {} running", record.tick, running);
        }
    }

    #[test]
    fn done_is_final(programs in programs(), config in config()) {
        let out = simulate(&programs, &config);
        for index in 0..programs.len() {
            let states: Vec<_> = out
                .trace
                .records()
                .iter()
                .filter_map(|r| r.state_of(Pid(index)))
                .collect();
            if let Some(first) = states.iter().position(|&s| s == ProcState::Done) {
                prop_assert!(states[first..].iter().all(|&s| s == ProcState::Done));
            }
        }
    }
}

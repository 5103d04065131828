//! Program text and random description loading.

use pretty_assertions::assert_eq;
use rstest::rstest;

use procsim_core::common::{InputError, Pid};
use procsim_core::process::{Opcode, ProcessTable};
use procsim_core::sim::{InstructionSource, SeededSource, loader};

fn stream(table: &ProcessTable, pid: Pid) -> Vec<Opcode> {
    table
        .get(pid)
        .map(|p| p.instructions().iter().copied().collect())
        .unwrap_or_default()
}

#[test]
fn program_tokens_expand_in_order() {
    let mut table = ProcessTable::new();
    let pid = loader::load_program(&mut table, "c2, i ,c1").unwrap();

    assert_eq!(
        stream(&table, pid),
        vec![
            Opcode::Compute,
            Opcode::Compute,
            Opcode::IoStart,
            Opcode::IoComplete,
            Opcode::Compute,
        ]
    );
}

#[test]
fn colon_separates_processes() {
    let mut table = ProcessTable::new();
    let pids = loader::load_programs(&mut table, "c1:i:c3").unwrap();

    assert_eq!(pids, vec![Pid(0), Pid(1), Pid(2)]);
    assert_eq!(table.instruction_count(Pid(1)), Some(2));
    assert_eq!(table.instruction_count(Pid(2)), Some(3));
}

#[rstest]
#[case::unknown_letter("x")]
#[case::io_with_count("i5")]
#[case::empty("")]
#[case::upper_case("C3")]
fn rejects_bad_opcodes(#[case] program: &str) {
    let err = loader::parse_program(program).unwrap_err();
    assert!(matches!(err, InputError::BadOpcode { .. }), "{err:?}");
}

#[rstest]
#[case::missing_count("c")]
#[case::word("cpu")]
#[case::negative("c-1")]
fn rejects_bad_counts(#[case] program: &str) {
    let err = loader::parse_program(program).unwrap_err();
    assert!(matches!(err, InputError::BadCount { .. }), "{err:?}");
}

#[test]
fn malformed_program_adds_nothing() {
    let mut table = ProcessTable::new();
    assert!(loader::load_programs(&mut table, "c1:c2,z:c3").is_err());
    assert!(table.is_empty());
}

#[rstest]
#[case::single_field("10")]
#[case::three_fields("1:2:3")]
fn rejects_description_shape(#[case] description: &str) {
    let err = loader::parse_description(description).unwrap_err();
    assert!(matches!(err, InputError::BadDescription { .. }));
}

#[test]
fn rejects_non_numeric_description_fields() {
    let err = loader::parse_description("a:50").unwrap_err();
    assert!(matches!(
        err,
        InputError::BadDescriptionField { field: "instruction count", .. }
    ));

    let err = loader::parse_description("5:half").unwrap_err();
    assert!(matches!(
        err,
        InputError::BadDescriptionField { field: "cpu percentage", .. }
    ));
}

#[test]
fn scripted_source_drives_generation() {
    let mut table = ProcessTable::new();
    let mut source = [true, false, true].into_iter();
    let pid = loader::load_description(&mut table, "3:50", &mut source).unwrap();

    assert_eq!(
        stream(&table, pid),
        vec![
            Opcode::Compute,
            Opcode::IoStart,
            Opcode::IoComplete,
            Opcode::Compute,
        ]
    );
}

#[test]
fn descriptions_share_one_source() {
    let mut table = ProcessTable::new();
    let mut source = [false, true, true].into_iter();
    let pids = loader::load_descriptions(&mut table, "1:0,2:0", &mut source).unwrap();

    assert_eq!(pids, vec![Pid(0), Pid(1)]);
    assert_eq!(stream(&table, Pid(0)), vec![Opcode::IoStart, Opcode::IoComplete]);
    assert_eq!(stream(&table, Pid(1)), vec![Opcode::Compute, Opcode::Compute]);
}

#[test]
fn same_seed_same_programs() {
    let load = |seed| {
        let mut table = ProcessTable::new();
        let mut source = SeededSource::new(seed);
        let _ = loader::load_descriptions(&mut table, "20:50,20:30", &mut source).unwrap();
        table
    };

    assert_eq!(load(7), load(7));
}

#[test]
fn certain_percentages_are_deterministic() {
    let mut source = SeededSource::new(3);
    assert!((0..100).all(|_| source.is_cpu(1.0)));
    assert!((0..100).all(|_| !source.is_cpu(0.0)));

    let mut table = ProcessTable::new();
    let pids = loader::load_descriptions(&mut table, "4:100,4:0", &mut source).unwrap();
    assert_eq!(table.instruction_count(pids[0]), Some(4));
    assert_eq!(table.instruction_count(pids[1]), Some(8));
}

#[test]
fn zero_instruction_description_is_empty() {
    let mut table = ProcessTable::new();
    let pid = loader::load_description(&mut table, "0:50", &mut SeededSource::new(0)).unwrap();
    assert_eq!(table.instruction_count(pid), Some(0));
}

//! Program loading.
//!
//! This module turns textual process descriptions into instruction streams. It supports:
//! 1. **Explicit programs:** Comma-separated tokens, `c<N>` for N compute instructions and `i`
//!    for one I/O (an `IoStart` followed by its `IoComplete`). Several programs are joined
//!    with `:`, e.g. `c5,i,c3:c2`.
//! 2. **Random descriptions:** `X:Y` draws X instructions, each CPU-bound with probability
//!    Y percent and otherwise an I/O. Several descriptions are joined with `,`.
//!
//! The randomness comes from an [`InstructionSource`], so a fixed boolean sequence can stand
//! in for the seeded generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::common::error::InputError;
use crate::common::types::Pid;
use crate::process::{Opcode, ProcessTable};

/// The two opcodes appended for every I/O.
const IO_PAIR: [Opcode; 2] = [Opcode::IoStart, Opcode::IoComplete];

/// Supplies the CPU-or-I/O decision for each randomly generated instruction.
pub trait InstructionSource {
    /// Returns true if the next instruction is CPU-bound.
    ///
    /// `cpu_chance` is the requested probability in `[0, 1]`; sources may ignore it.
    fn is_cpu(&mut self, cpu_chance: f64) -> bool;
}

/// Seeded pseudo-random source; the same seed always yields the same programs.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    /// Creates a source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl InstructionSource for SeededSource {
    fn is_cpu(&mut self, cpu_chance: f64) -> bool {
        self.rng.random::<f64>() < cpu_chance
    }
}

/// A scripted sequence of decisions. Once exhausted, every further draw is CPU-bound.
impl<I> InstructionSource for I
where
    I: Iterator<Item = bool>,
{
    fn is_cpu(&mut self, _cpu_chance: f64) -> bool {
        self.next().unwrap_or(true)
    }
}

/// Parses one program (`c5,i,c3`) into opcodes.
///
/// # Errors
///
/// * [`InputError::BadOpcode`] for a token that is empty or does not start with `c` or `i`.
/// * [`InputError::BadCount`] for a `c` token without a valid count.
pub fn parse_program(program: &str) -> Result<Vec<Opcode>, InputError> {
    let mut opcodes = Vec::new();
    for token in program.split(',').map(str::trim) {
        if token == "i" {
            opcodes.extend(IO_PAIR);
        } else if let Some(count) = token.strip_prefix('c') {
            let n: usize = count.parse().map_err(|source| InputError::BadCount {
                token: token.to_string(),
                source,
            })?;
            opcodes.extend(std::iter::repeat_n(Opcode::Compute, n));
        } else {
            return Err(InputError::BadOpcode {
                token: token.to_string(),
            });
        }
    }
    Ok(opcodes)
}

/// Parses one program and loads it as a new process.
///
/// # Errors
///
/// See [`parse_program`].
pub fn load_program(table: &mut ProcessTable, program: &str) -> Result<Pid, InputError> {
    let opcodes = parse_program(program)?;
    Ok(push_process(table, opcodes))
}

/// Loads every `:`-separated program as its own process, in order.
///
/// # Errors
///
/// See [`parse_program`]. Nothing is added to the table if any program is malformed.
pub fn load_programs(table: &mut ProcessTable, programs: &str) -> Result<Vec<Pid>, InputError> {
    let parsed = programs
        .split(':')
        .map(parse_program)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parsed
        .into_iter()
        .map(|opcodes| push_process(table, opcodes))
        .collect())
}

/// Parses a random description `X:Y` into an instruction count and a CPU probability.
///
/// # Errors
///
/// * [`InputError::BadDescription`] unless there are exactly two `:`-separated fields.
/// * [`InputError::BadDescriptionField`] if either field is not a number.
pub fn parse_description(description: &str) -> Result<(usize, f64), InputError> {
    let fields: Vec<&str> = description.split(':').map(str::trim).collect();
    let [count, chance] = fields.as_slice() else {
        return Err(InputError::BadDescription {
            description: description.to_string(),
        });
    };
    let bad_field = |field| InputError::BadDescriptionField {
        description: description.to_string(),
        field,
    };
    let count: usize = count.parse().map_err(|_| bad_field("instruction count"))?;
    let percent: f64 = chance.parse().map_err(|_| bad_field("cpu percentage"))?;
    Ok((count, percent / 100.0))
}

/// Generates a random program from a description and loads it as a new process.
///
/// # Errors
///
/// See [`parse_description`].
pub fn load_description<S>(
    table: &mut ProcessTable,
    description: &str,
    source: &mut S,
) -> Result<Pid, InputError>
where
    S: InstructionSource + ?Sized,
{
    let (count, cpu_chance) = parse_description(description)?;
    Ok(push_process(table, generate(count, cpu_chance, source)))
}

/// Loads every `,`-separated random description as its own process, in order.
///
/// # Errors
///
/// See [`parse_description`]. Nothing is added to the table if any description is malformed.
pub fn load_descriptions<S>(
    table: &mut ProcessTable,
    descriptions: &str,
    source: &mut S,
) -> Result<Vec<Pid>, InputError>
where
    S: InstructionSource + ?Sized,
{
    let parsed = descriptions
        .split(',')
        .map(parse_description)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parsed
        .into_iter()
        .map(|(count, cpu_chance)| push_process(table, generate(count, cpu_chance, source)))
        .collect())
}

fn generate<S>(count: usize, cpu_chance: f64, source: &mut S) -> Vec<Opcode>
where
    S: InstructionSource + ?Sized,
{
    let mut opcodes = Vec::with_capacity(count);
    for _ in 0..count {
        if source.is_cpu(cpu_chance) {
            opcodes.push(Opcode::Compute);
        } else {
            opcodes.extend(IO_PAIR);
        }
    }
    opcodes
}

fn push_process(table: &mut ProcessTable, opcodes: Vec<Opcode>) -> Pid {
    let count = opcodes.len();
    let pid = table.create_with(opcodes);
    debug!(pid = pid.0, instructions = count, "loaded process");
    pid
}

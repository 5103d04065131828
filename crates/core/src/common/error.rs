//! Error definitions for the simulator.
//!
//! Two kinds of failure are kept strictly apart:
//! 1. **Input errors:** Malformed programs, process descriptions, policy names, or config files.
//!    These are the caller's fault and are reported before any simulation starts.
//! 2. **Invariant violations:** A state transition requested from the wrong prior state, or a
//!    reference to a process that does not exist. These indicate a defect in the scheduling
//!    logic itself and abort the run on first detection.
//!
//! [`SimError`] wraps both for callers (such as the CLI) that handle them uniformly.

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::common::types::Pid;
use crate::process::ProcState;

/// Malformed user-supplied input.
#[derive(Debug, Error)]
pub enum InputError {
    /// A program token did not start with `c` or `i`, or was empty.
    #[error("bad opcode '{token}' (should be c or i)")]
    BadOpcode {
        /// The offending token.
        token: String,
    },

    /// A `c<N>` token whose count is not a non-negative integer.
    #[error("bad compute count in '{token}': {source}")]
    BadCount {
        /// The offending token.
        token: String,
        /// Underlying integer parse failure.
        source: ParseIntError,
    },

    /// A random process description that is not exactly two colon-separated fields.
    #[error(
        "bad description ({description}): must be <X:Y> where X is the number of instructions \
         and Y is the percent chance that an instruction is CPU not IO"
    )]
    BadDescription {
        /// The offending description.
        description: String,
    },

    /// A random process description field that is not a number.
    #[error("bad {field} in description ({description})")]
    BadDescriptionField {
        /// The offending description.
        description: String,
        /// Which field failed to parse.
        field: &'static str,
    },

    /// A switch policy name that is neither `SWITCH_ON_IO` nor `SWITCH_ON_END`.
    #[error("unknown switch policy '{0}' (expected SWITCH_ON_IO or SWITCH_ON_END)")]
    UnknownSwitchPolicy(String),

    /// An I/O completion policy name that is neither `IO_RUN_LATER` nor `IO_RUN_IMMEDIATE`.
    #[error("unknown io-done policy '{0}' (expected IO_RUN_LATER or IO_RUN_IMMEDIATE)")]
    UnknownIoDonePolicy(String),

    /// The configuration file could not be read.
    #[error("could not read config file '{}': {source}", path.display())]
    ConfigRead {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The configuration JSON did not match the expected shape.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// A scheduling-logic defect detected by the process table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A transition was requested while the process was not in the expected prior state.
    #[error("pid {pid}: cannot move to {target}: expected {expected}, found {found}")]
    StateMismatch {
        /// Process whose transition was rejected.
        pid: Pid,
        /// State the caller believed the process was in.
        expected: ProcState,
        /// State the process was actually in.
        found: ProcState,
        /// State the caller asked for.
        target: ProcState,
    },

    /// The requested edge does not exist in the process lifecycle.
    #[error("pid {pid}: illegal transition {from} -> {to}")]
    IllegalTransition {
        /// Process whose transition was rejected.
        pid: Pid,
        /// Prior state.
        from: ProcState,
        /// Requested state.
        to: ProcState,
    },

    /// A pid outside the process table was referenced.
    #[error("pid {0} does not exist")]
    UnknownProcess(Pid),
}

/// Any failure the simulator can report.
#[derive(Debug, Error)]
pub enum SimError {
    /// Rejected input; no simulation was attempted.
    #[error(transparent)]
    Input(#[from] InputError),

    /// Internal state-machine violation; the run was aborted.
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

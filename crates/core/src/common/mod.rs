//! Common types shared across the simulator.
//!
//! This module provides the small building blocks used by every other component:
//! 1. **Identifiers:** A strong type for process ids and the tick type for simulated time.
//! 2. **Error Handling:** Input errors, invariant violations, and the umbrella error type.

/// Error types for input validation and state-machine violations.
pub mod error;

/// Process identifiers and simulated time.
pub mod types;

pub use error::{InputError, InvariantViolation, SimError};
pub use types::{Pid, Tick};

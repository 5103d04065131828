//! Configuration system for the scheduling simulator.
//!
//! This module defines the configuration structure and enums used to parameterize a run.
//! It provides:
//! 1. **Defaults:** Baseline I/O length, seed, and policies.
//! 2. **Policies:** When to switch processes and what happens when an I/O completes.
//! 3. **Loading:** JSON deserialization and parsing of the classic policy names.
//!
//! Configuration is supplied as JSON (`--config`) or built from command-line flags on top of
//! `Config::default()`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::error::InputError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Ticks an I/O takes before its completion is scheduled.
    ///
    /// The completion becomes visible `IO_LENGTH + 1` ticks after issue.
    pub const IO_LENGTH: u64 = 5;

    /// Seed for random program generation.
    pub const SEED: u64 = 0;
}

/// When the running process gives up the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwitchPolicy {
    /// Switch as soon as the running process issues an I/O.
    #[default]
    #[serde(alias = "SWITCH_ON_IO")]
    SwitchOnIo,
    /// Keep the CPU until the running process's stream is exhausted.
    #[serde(alias = "SWITCH_ON_END")]
    SwitchOnEnd,
}

impl SwitchPolicy {
    /// Classic upper-case name (`SWITCH_ON_IO`, `SWITCH_ON_END`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::SwitchOnIo => "SWITCH_ON_IO",
            Self::SwitchOnEnd => "SWITCH_ON_END",
        }
    }
}

impl FromStr for SwitchPolicy {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SWITCH_ON_IO" | "SwitchOnIo" => Ok(Self::SwitchOnIo),
            "SWITCH_ON_END" | "SwitchOnEnd" => Ok(Self::SwitchOnEnd),
            other => Err(InputError::UnknownSwitchPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for SwitchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happens to a process whose I/O has just completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IoDonePolicy {
    /// The process becomes `Ready` and waits its turn.
    ///
    /// Exceptions: under `SwitchOnEnd` with other runnable work it is selected at once, and it
    /// is always selected when it is the only runnable process.
    #[default]
    #[serde(alias = "IO_RUN_LATER")]
    IoRunLater,
    /// The process preempts whatever is running and handles the completion immediately.
    #[serde(alias = "IO_RUN_IMMEDIATE")]
    IoRunImmediate,
}

impl IoDonePolicy {
    /// Classic upper-case name (`IO_RUN_LATER`, `IO_RUN_IMMEDIATE`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::IoRunLater => "IO_RUN_LATER",
            Self::IoRunImmediate => "IO_RUN_IMMEDIATE",
        }
    }
}

impl FromStr for IoDonePolicy {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IO_RUN_LATER" | "IoRunLater" => Ok(Self::IoRunLater),
            "IO_RUN_IMMEDIATE" | "IoRunImmediate" => Ok(Self::IoRunImmediate),
            other => Err(InputError::UnknownIoDonePolicy(other.to_string())),
        }
    }
}

impl fmt::Display for IoDonePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use procsim_core::config::{Config, IoDonePolicy, SwitchPolicy};
///
/// let config = Config::default();
/// assert_eq!(config.switch, SwitchPolicy::SwitchOnIo);
/// assert_eq!(config.io_done, IoDonePolicy::IoRunLater);
/// assert_eq!(config.io_length, 5);
/// ```
///
/// Deserializing from JSON, with the classic policy names:
///
/// ```
/// use procsim_core::config::{Config, IoDonePolicy, SwitchPolicy};
///
/// let json = r#"{
///     "switch": "SWITCH_ON_END",
///     "io_done": "IO_RUN_IMMEDIATE",
///     "io_length": 2
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.switch, SwitchPolicy::SwitchOnEnd);
/// assert_eq!(config.io_done, IoDonePolicy::IoRunImmediate);
/// assert_eq!(config.io_length, 2);
/// assert_eq!(config.seed, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// When to switch between processes
    #[serde(default)]
    pub switch: SwitchPolicy,

    /// Behavior when an I/O completes
    #[serde(default)]
    pub io_done: IoDonePolicy,

    /// Ticks an I/O takes before completion is scheduled
    #[serde(default = "Config::default_io_length")]
    pub io_length: u64,

    /// Seed for random program generation
    #[serde(default = "Config::default_seed")]
    pub seed: u64,
}

impl Config {
    /// Returns the default I/O length.
    const fn default_io_length() -> u64 {
        defaults::IO_LENGTH
    }

    /// Returns the default random seed.
    const fn default_seed() -> u64 {
        defaults::SEED
    }

    /// Parses a configuration from a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::ConfigParse`] if the document is not valid configuration JSON.
    pub fn from_json_str(json: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::ConfigRead`] if the file cannot be read, or
    /// [`InputError::ConfigParse`] if its contents are invalid.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| InputError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            switch: SwitchPolicy::default(),
            io_done: IoDonePolicy::default(),
            io_length: defaults::IO_LENGTH,
            seed: defaults::SEED,
        }
    }
}

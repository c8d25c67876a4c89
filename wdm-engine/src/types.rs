// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;

use wdm_track::tracker::TrackConfigError;

// Simulation errors

#[macro_export]
/// Build a [SimError::Task] from a message that supports `to_string`
macro_rules! sim_error {
    ($msg:expr) => {
        Err($crate::types::SimError::Task($msg.to_string()))
    };
}

/// The `SimError` is what should be returned in the case of an error.
///
/// All of these indicate either a bad configuration or a bug in the
/// arbitration algorithm. None of them are simulation outcomes, so a run that
/// hits one is aborted.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// An operation was given input it cannot act on.
    InvalidInput(String),

    /// A lock was requested on a slice that already holds one.
    AlreadyLocked(String),

    /// A lock was requested on a wavelength the last search did not see.
    NotVisible(String),

    /// A lock could not find a candidate to select.
    NoCandidate(String),

    /// An index was outside the valid range.
    IndexOutOfRange { index: usize, len: usize },

    /// The system could not be built from the configuration supplied.
    Config(String),

    /// Any other failure raised by a task.
    Task(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::InvalidInput(msg) => write!(f, "Error: invalid input: {msg}"),
            SimError::AlreadyLocked(msg) => write!(f, "Error: already locked: {msg}"),
            SimError::NotVisible(msg) => write!(f, "Error: not visible: {msg}"),
            SimError::NoCandidate(msg) => write!(f, "Error: no candidate: {msg}"),
            SimError::IndexOutOfRange { index, len } => {
                write!(f, "Error: index {index} out of range (len {len})")
            }
            SimError::Config(msg) => write!(f, "Error: config: {msg}"),
            SimError::Task(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl Error for SimError {}

impl From<TrackConfigError> for SimError {
    fn from(e: TrackConfigError) -> Self {
        SimError::Config(e.0)
    }
}

/// The SimResult is the return type for most simulation functions
pub type SimResult = Result<(), SimError>;

/// Check that `index` is valid for a collection of length `len`.
pub fn check_index(index: usize, len: usize) -> Result<usize, SimError> {
    if index < len {
        Ok(index)
    } else {
        Err(SimError::IndexOutOfRange { index, len })
    }
}

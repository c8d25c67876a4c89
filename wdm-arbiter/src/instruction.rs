// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The instructions an algorithm can issue.
//!
//! Each instruction acts on one slice and records what it did in the
//! [`AllocationMemory`]. Instructions are checked before anything is changed,
//! so a failing instruction leaves both the slice and the memory untouched.

use std::fmt;

use wdm_engine::types::{SimError, SimResult};
use wdm_models::bus::Bus;
use wdm_models::tuner::DAC_MID_SCALE;

use crate::memory::{AllocationMemory, TableEntry};

/// The interface to an instruction.
pub trait Instruction: fmt::Display {
    fn execute(&self, bus: &mut Bus, memory: &mut AllocationMemory) -> SimResult;
}

/// How a [`LockInst`] picks one candidate from the last search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// `select`-th lowest wavelength.
    #[default]
    LeastSignificant,

    /// `select`-th candidate in search order.
    ByIndex,

    /// `select`-th highest wavelength.
    MostSignificant,

    /// `select`-th closest DAC code to the slice's previous lock (or mid-scale
    /// if it has never locked).
    Nearest,

    /// `select`-th lowest DAC code, nearest the bottom of the window.
    Middle,
}

impl SelectionPolicy {
    /// Return the index into `entries` of the selected candidate.
    #[must_use]
    pub fn select(&self, entries: &[TableEntry], select: usize, reference_dac: u8) -> Option<usize> {
        let mut order: Vec<usize> = (0..entries.len()).collect();
        match self {
            SelectionPolicy::ByIndex => {}
            SelectionPolicy::LeastSignificant => {
                order.sort_by_key(|i| entries[*i].wavelength);
            }
            SelectionPolicy::MostSignificant => {
                order.sort_by_key(|i| std::cmp::Reverse(entries[*i].wavelength));
            }
            SelectionPolicy::Nearest => {
                order.sort_by_key(|i| entries[*i].dac_code.abs_diff(reference_dac));
            }
            SelectionPolicy::Middle => {
                order.sort_by_key(|i| entries[*i].dac_code);
            }
        }
        order.get(select).copied()
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SelectionPolicy::LeastSignificant => write!(f, "least_significant"),
            SelectionPolicy::ByIndex => write!(f, "by_index"),
            SelectionPolicy::MostSignificant => write!(f, "most_significant"),
            SelectionPolicy::Nearest => write!(f, "nearest"),
            SelectionPolicy::Middle => write!(f, "middle"),
        }
    }
}

/// Search the wavelengths reaching a slice and record the candidates.
#[derive(Clone, Copy, Debug)]
pub struct SearchInst {
    pub slice: usize,
}

impl SearchInst {
    #[must_use]
    pub fn new(slice: usize) -> Self {
        Self { slice }
    }
}

impl Instruction for SearchInst {
    fn execute(&self, bus: &mut Bus, memory: &mut AllocationMemory) -> SimResult {
        let candidates = bus.slice_mut(self.slice)?.search()?;
        memory.record_search(self.slice, &candidates)
    }
}

impl fmt::Display for SearchInst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "search slice{}", self.slice)
    }
}

/// Lock a slice to one of the candidates of its most recent search.
#[derive(Clone, Copy, Debug)]
pub struct LockInst {
    pub slice: usize,
    pub policy: SelectionPolicy,
    pub select: usize,
}

impl LockInst {
    #[must_use]
    pub fn new(slice: usize, policy: SelectionPolicy, select: usize) -> Self {
        Self {
            slice,
            policy,
            select,
        }
    }
}

impl Instruction for LockInst {
    fn execute(&self, bus: &mut Bus, memory: &mut AllocationMemory) -> SimResult {
        let slice = bus.slice_mut(self.slice)?;
        let Some(record) = memory.latest(self.slice)? else {
            return Err(SimError::NoCandidate(format!(
                "{}: lock before any search",
                slice.entity
            )));
        };
        if record.is_empty() {
            return Err(SimError::NoCandidate(format!(
                "{}: last search found nothing",
                slice.entity
            )));
        }

        let reference_dac = slice.last_lock_dac_code().unwrap_or(DAC_MID_SCALE);
        let Some(index) = self.policy.select(&record.entries, self.select, reference_dac) else {
            return Err(SimError::NoCandidate(format!(
                "{}: {} selection {} of {} candidates",
                slice.entity,
                self.policy,
                self.select,
                record.entries.len()
            )));
        };

        let entry = record.entries[index];
        slice.lock(entry.wavelength, entry.code)?;
        memory.record_lock(self.slice, index)
    }
}

impl fmt::Display for LockInst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "lock slice{} {}[{}]", self.slice, self.policy, self.select)
    }
}

/// Release the lock of a slice.
///
/// Unlocking a slice that holds no lock is reported but is not an error.
#[derive(Clone, Copy, Debug)]
pub struct UnlockInst {
    pub slice: usize,
}

impl UnlockInst {
    #[must_use]
    pub fn new(slice: usize) -> Self {
        Self { slice }
    }
}

impl Instruction for UnlockInst {
    fn execute(&self, bus: &mut Bus, memory: &mut AllocationMemory) -> SimResult {
        if bus.slice_mut(self.slice)?.unlock().is_some() {
            memory.record_unlock(self.slice)?;
        }
        Ok(())
    }
}

impl fmt::Display for UnlockInst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unlock slice{}", self.slice)
    }
}

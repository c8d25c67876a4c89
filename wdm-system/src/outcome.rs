// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Classification of the final lock state.

use std::fmt;

use itertools::Itertools;
use wdm_arbiter::memory::AllocationTable;
use wdm_models::wavelength::Wavelength;

/// The status of a run. The first matching failure is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockStatus {
    Success,
    ZeroLock,
    DuplicateLock,
    WrongLaneOrder,
    AlgorithmDeclared,
}

impl LockStatus {
    /// Integer status code, 0 for success.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            LockStatus::Success => 0,
            LockStatus::ZeroLock => 1,
            LockStatus::DuplicateLock => 2,
            LockStatus::WrongLaneOrder => 3,
            LockStatus::AlgorithmDeclared => 4,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        *self == LockStatus::Success
    }
}

impl fmt::Display for LockStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LockStatus::Success => write!(f, "success"),
            LockStatus::ZeroLock => write!(f, "zero-lock failure"),
            LockStatus::DuplicateLock => write!(f, "duplicate-lock failure"),
            LockStatus::WrongLaneOrder => write!(f, "wrong-lane-order failure"),
            LockStatus::AlgorithmDeclared => write!(f, "algorithm-declared failure"),
        }
    }
}

/// Everything produced by one run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult {
    pub status: LockStatus,

    /// Locked wavelength of each bus position.
    pub lock_wavelengths: Vec<Option<Wavelength>>,

    /// Spectral rank of each bus position, when every slice locked to a
    /// distinct wavelength.
    pub lane_order: Option<Vec<usize>>,

    pub ticks: u64,
    pub search_table: AllocationTable,
    pub lock_table: AllocationTable,
}

impl RunResult {
    /// The failure category, `None` on success.
    #[must_use]
    pub fn failure(&self) -> Option<LockStatus> {
        (!self.status.is_success()).then_some(self.status)
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let locks = self
            .lock_wavelengths
            .iter()
            .map(|w| w.map_or_else(|| "none".to_string(), |w| w.to_string()))
            .join(", ");
        writeln!(f, "status: {} ({})", self.status.code(), self.status)?;
        writeln!(f, "ticks: {}", self.ticks)?;
        write!(f, "locks: [{locks}]")
    }
}

/// Spectral rank of each wavelength, 0 being the shortest.
///
/// Returns `None` if any wavelength appears twice.
#[must_use]
pub fn spectral_ranks(locks: &[Wavelength]) -> Option<Vec<usize>> {
    let sorted: Vec<Wavelength> = locks.iter().copied().sorted().collect();
    if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
        return None;
    }
    Some(
        locks
            .iter()
            .map(|w| sorted.partition_point(|s| s < w))
            .collect(),
    )
}

/// Compare lane orders allowing a cyclic rotation of the ranks.
///
/// The laser grid repeats every FSR so an order shifted by a whole number of
/// lanes is equivalent.
#[must_use]
pub fn lane_order_matches(current: &[usize], target: &[usize]) -> bool {
    let num_lanes = target.len();
    current.len() == num_lanes
        && (0..num_lanes.max(1)).any(|rotation| {
            current
                .iter()
                .zip(target)
                .all(|(c, t)| *c == (t + rotation) % num_lanes)
        })
}

/// Classify the final locks of a run.
///
/// Order of precedence: algorithm-declared, zero-lock, duplicate-lock,
/// wrong-lane-order.
#[must_use]
pub fn classify(
    lock_error_state: bool,
    lock_wavelengths: &[Option<Wavelength>],
    target_lane_order: Option<&[usize]>,
) -> LockStatus {
    if lock_error_state {
        return LockStatus::AlgorithmDeclared;
    }
    let Some(locks) = lock_wavelengths.iter().copied().collect::<Option<Vec<_>>>() else {
        return LockStatus::ZeroLock;
    };
    let Some(ranks) = spectral_ranks(&locks) else {
        return LockStatus::DuplicateLock;
    };
    match target_lane_order {
        Some(target) if !lane_order_matches(&ranks, target) => LockStatus::WrongLaneOrder,
        _ => LockStatus::Success,
    }
}

// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Microring tuner.
//!
//! A ring can only be heated, so its resonance can be red-shifted by up to
//! `tuning_range` from its cold resonance. The resonance repeats every FSR so
//! the reachable wavelengths form a periodic set of windows:
//!
//! ```text
//!        k = -1            k = 0             k = 1
//!   ├──────┤         ├──────┤          ├──────┤
//!   r-FSR  r-FSR+T   r      r+T        r+FSR  r+FSR+T
//! ```
//!
//! The index of the window in the sweep is the _tuner code_. Within a window
//! the heater setting is an 8-bit _DAC code_.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use wdm_engine::types::{SimError, SimResult};
use wdm_track::entity::Entity;
use wdm_track::{debug, trace, warn};

use crate::wavelength::Wavelength;

/// Number of heater DAC steps across one tuning range.
pub const DAC_FULL_SCALE: u32 = 256;

/// DAC code used when a tuner has no previous lock to refer to.
pub const DAC_MID_SCALE: u8 = 128;

/// Physical parameters of one microring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingParams {
    /// Cold resonance wavelength in nm.
    pub resonance_nm: f64,

    /// Free spectral range in nm.
    pub fsr_nm: f64,

    /// Single-sided (red-shift) tuning range in nm.
    pub tuning_range_nm: f64,
}

impl RingParams {
    #[must_use]
    pub fn new(resonance_nm: f64, fsr_nm: f64, tuning_range_nm: f64) -> Self {
        Self {
            resonance_nm,
            fsr_nm,
            tuning_range_nm,
        }
    }

    /// Check the parameters describe non-overlapping sweep windows.
    pub fn validate(&self) -> SimResult {
        let all_finite = [self.resonance_nm, self.fsr_nm, self.tuning_range_nm]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(SimError::Config(format!("non-finite ring parameters {self:?}")));
        }
        if self.fsr_nm <= 0.0 || self.tuning_range_nm <= 0.0 {
            return Err(SimError::Config(format!(
                "FSR and tuning range must be positive {self:?}"
            )));
        }
        if self.tuning_range_nm >= self.fsr_nm {
            return Err(SimError::Config(format!(
                "tuning range {} must be smaller than the FSR {}",
                self.tuning_range_nm, self.fsr_nm
            )));
        }
        Ok(())
    }
}

/// One window of wavelengths reachable by the tuner (inclusive bounds).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepWindow {
    pub start: Wavelength,
    pub end: Wavelength,
}

impl SweepWindow {
    #[must_use]
    pub fn contains(&self, wavelength: Wavelength) -> bool {
        self.start <= wavelength && wavelength <= self.end
    }

    /// DAC code required to reach `wavelength` from the start of the window.
    #[must_use]
    pub fn dac_code(&self, wavelength: Wavelength) -> u8 {
        let span = self.end.nm() - self.start.nm();
        let fraction = (wavelength.nm() - self.start.nm()) / span;
        let code = (fraction * f64::from(DAC_FULL_SCALE)).floor();
        code.clamp(0.0, f64::from(DAC_FULL_SCALE - 1)) as u8
    }
}

/// A wavelength seen by a search along with the codes that reach it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub wavelength: Wavelength,

    /// Index of the sweep window the wavelength was found in.
    pub code: usize,

    pub dac_code: u8,
}

/// Lock state of a tuner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LockState {
    #[default]
    Unlocked,
    Locked(Candidate),
}

/// Compute the sweep windows of a ring for a given laser grid.
///
/// The windows cover the grid with one FSR of margin on each side and are
/// returned from lowest to highest.
#[must_use]
pub fn sweep_ranges(params: &RingParams, grid_lo: Wavelength, grid_hi: Wavelength) -> Vec<SweepWindow> {
    let fsr = params.fsr_nm;
    let tuning_range = params.tuning_range_nm;
    let resonance = params.resonance_nm;

    let k_first = ((grid_lo.nm() - fsr - tuning_range - resonance) / fsr).ceil() as i64;
    let k_last = ((grid_hi.nm() + fsr - resonance) / fsr).floor() as i64;

    (k_first..=k_last)
        .map(|k| {
            let start = resonance + k as f64 * fsr;
            SweepWindow {
                start: Wavelength::from_nm(start),
                end: Wavelength::from_nm(start + tuning_range),
            }
        })
        .collect()
}

/// Tuner of one microring.
///
/// The tuner keeps the result of its most recent search since only a
/// wavelength seen by that search can be locked.
pub struct Tuner {
    entity: Rc<Entity>,
    params: RingParams,
    windows: Vec<SweepWindow>,
    visible: Vec<Candidate>,
    lock: LockState,
    last_lock_dac_code: Option<u8>,
}

impl Tuner {
    /// Create a tuner whose sweep covers the laser `grid`.
    pub fn new(parent: &Rc<Entity>, params: RingParams, grid: &[Wavelength]) -> Result<Self, SimError> {
        params.validate()?;
        let (Some(grid_lo), Some(grid_hi)) = (grid.iter().min(), grid.iter().max()) else {
            return Err(SimError::Config("empty laser grid".to_string()));
        };
        if !grid_lo.nm().is_finite() || !grid_hi.nm().is_finite() {
            return Err(SimError::Config(format!(
                "laser grid [{}, {}] is not finite",
                grid_lo.nm(),
                grid_hi.nm()
            )));
        }

        let entity = Rc::new(Entity::new(parent, "tuner"));
        let windows = sweep_ranges(&params, *grid_lo, *grid_hi);
        for (code, window) in windows.iter().enumerate() {
            trace!(entity ; "window {code}: [{}, {}]", window.start, window.end);
        }

        Ok(Self {
            entity,
            params,
            windows,
            visible: Vec::new(),
            lock: LockState::Unlocked,
            last_lock_dac_code: None,
        })
    }

    #[must_use]
    pub fn params(&self) -> &RingParams {
        &self.params
    }

    #[must_use]
    pub fn sweep_ranges(&self) -> &[SweepWindow] {
        &self.windows
    }

    /// Sweep every window and report the `incoming` wavelengths it reaches.
    ///
    /// Candidates are ordered by window and then by wavelength. The lock state
    /// is not affected.
    pub fn search(&mut self, incoming: &[Wavelength]) -> Result<Vec<Candidate>, SimError> {
        if incoming.is_empty() {
            return Err(SimError::InvalidInput(format!(
                "{}: search with no incoming wavelengths",
                self.entity
            )));
        }

        let mut sorted = incoming.to_vec();
        sorted.sort();

        let candidates: Vec<Candidate> = self
            .windows
            .iter()
            .enumerate()
            .flat_map(|(code, window)| {
                sorted
                    .iter()
                    .filter(move |w| window.contains(**w))
                    .map(move |w| Candidate {
                        wavelength: *w,
                        code,
                        dac_code: window.dac_code(*w),
                    })
            })
            .collect();

        debug!(self.entity ; "search found {} candidates", candidates.len());
        self.visible = candidates.clone();
        Ok(candidates)
    }

    /// Lock onto `wavelength` using the window identified by `code`.
    pub fn lock(&mut self, wavelength: Wavelength, code: usize) -> SimResult {
        if let LockState::Locked(current) = self.lock {
            return Err(SimError::AlreadyLocked(format!(
                "{} is locked to {}",
                self.entity, current.wavelength
            )));
        }

        let Some(candidate) = self
            .visible
            .iter()
            .find(|c| c.wavelength == wavelength && c.code == code)
        else {
            return Err(SimError::NotVisible(format!(
                "{}: {wavelength} (code {code}) not seen by the last search",
                self.entity
            )));
        };

        debug!(self.entity ; "locked to {wavelength} (code {code}, dac {})", candidate.dac_code);
        self.last_lock_dac_code = Some(candidate.dac_code);
        self.lock = LockState::Locked(*candidate);
        Ok(())
    }

    /// Release the lock and return what was locked.
    ///
    /// Unlocking an unlocked tuner is reported but is not an error.
    pub fn unlock(&mut self) -> Option<Candidate> {
        match std::mem::take(&mut self.lock) {
            LockState::Locked(candidate) => {
                debug!(self.entity ; "unlocked from {}", candidate.wavelength);
                Some(candidate)
            }
            LockState::Unlocked => {
                warn!(self.entity ; "unlock when not locked");
                None
            }
        }
    }

    #[must_use]
    pub fn lock_state(&self) -> LockState {
        self.lock
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        matches!(self.lock, LockState::Locked(_))
    }

    /// DAC code of the most recent lock, which survives an unlock.
    #[must_use]
    pub fn last_lock_dac_code(&self) -> Option<u8> {
        self.last_lock_dac_code
    }
}

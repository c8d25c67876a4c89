// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A slice is one microring and its tuner at a fixed position on the bus.
//!
//! Position 0 is the slice nearest the laser.

use std::rc::Rc;

use wdm_engine::types::{SimError, SimResult};
use wdm_track::entity::Entity;

use crate::tuner::{Candidate, LockState, RingParams, SweepWindow, Tuner};
use crate::wavelength::Wavelength;

pub struct Slice {
    pub entity: Rc<Entity>,
    position: usize,
    tuner: Tuner,

    /// Wavelengths reaching this slice after the last bus propagation.
    incoming: Vec<Wavelength>,
}

impl Slice {
    pub fn new(
        parent: &Rc<Entity>,
        position: usize,
        params: RingParams,
        grid: &[Wavelength],
    ) -> Result<Self, SimError> {
        let entity = Rc::new(Entity::new(parent, &format!("slice{position}")));
        let tuner = Tuner::new(&entity, params, grid)?;
        Ok(Self {
            entity,
            position,
            tuner,
            incoming: grid.to_vec(),
        })
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn params(&self) -> &RingParams {
        self.tuner.params()
    }

    #[must_use]
    pub fn sweep_ranges(&self) -> &[SweepWindow] {
        self.tuner.sweep_ranges()
    }

    #[must_use]
    pub fn incoming(&self) -> &[Wavelength] {
        &self.incoming
    }

    pub(crate) fn set_incoming(&mut self, incoming: Vec<Wavelength>) {
        self.incoming = incoming;
    }

    /// Search the wavelengths currently reaching this slice.
    pub fn search(&mut self) -> Result<Vec<Candidate>, SimError> {
        self.tuner.search(&self.incoming)
    }

    pub fn lock(&mut self, wavelength: Wavelength, code: usize) -> SimResult {
        self.tuner.lock(wavelength, code)
    }

    pub fn unlock(&mut self) -> Option<Candidate> {
        self.tuner.unlock()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.tuner.is_locked()
    }

    #[must_use]
    pub fn locked_wavelength(&self) -> Option<Wavelength> {
        match self.tuner.lock_state() {
            LockState::Locked(candidate) => Some(candidate.wavelength),
            LockState::Unlocked => None,
        }
    }

    #[must_use]
    pub fn last_lock_dac_code(&self) -> Option<u8> {
        self.tuner.last_lock_dac_code()
    }
}

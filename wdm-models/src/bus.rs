// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The waveguide bus shared by a row of slices.
//!
//! Light enters at slice 0 and passes each slice in turn. A locked slice
//! extracts its wavelength, so every slice further along no longer sees it:
//!
//! ```text
//!   incoming(0) = laser grid
//!   incoming(i) = incoming(i-1) - { locked(i-1) }
//! ```

use std::rc::Rc;

use wdm_engine::types::{SimError, check_index};
use wdm_track::entity::Entity;
use wdm_track::trace;

use crate::slice::Slice;
use crate::tuner::RingParams;
use crate::wavelength::Wavelength;

pub struct Bus {
    pub entity: Rc<Entity>,
    slices: Vec<Slice>,
    laser: Vec<Wavelength>,
}

impl Bus {
    /// Build a bus with one slice per entry of `ring_params`, in bus order.
    ///
    /// Until the first [`propagate`](Bus::propagate) every slice sees the
    /// full laser grid.
    pub fn new(
        parent: &Rc<Entity>,
        ring_params: &[RingParams],
        laser: &[Wavelength],
    ) -> Result<Self, SimError> {
        let entity = Rc::new(Entity::new(parent, "bus"));
        let slices = ring_params
            .iter()
            .enumerate()
            .map(|(position, params)| Slice::new(&entity, position, *params, laser))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            entity,
            slices,
            laser: laser.to_vec(),
        })
    }

    /// Pass the laser grid along the bus, removing each locked wavelength
    /// from what the following slices receive.
    pub fn propagate(&mut self) {
        let mut carry = self.laser.clone();
        for slice in &mut self.slices {
            slice.set_incoming(carry.clone());
            if let Some(locked) = slice.locked_wavelength() {
                carry.retain(|w| *w != locked);
                trace!(self.entity ; "slice{} extracts {locked}", slice.position());
            }
        }
    }

    #[must_use]
    pub fn num_slices(&self) -> usize {
        self.slices.len()
    }

    #[must_use]
    pub fn laser(&self) -> &[Wavelength] {
        &self.laser
    }

    #[must_use]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn slice(&self, position: usize) -> Result<&Slice, SimError> {
        let position = check_index(position, self.slices.len())?;
        Ok(&self.slices[position])
    }

    pub fn slice_mut(&mut self, position: usize) -> Result<&mut Slice, SimError> {
        let position = check_index(position, self.slices.len())?;
        Ok(&mut self.slices[position])
    }

    /// Locked wavelength of every slice in bus order.
    #[must_use]
    pub fn lock_wavelengths(&self) -> Vec<Option<Wavelength>> {
        self.slices.iter().map(Slice::locked_wavelength).collect()
    }
}

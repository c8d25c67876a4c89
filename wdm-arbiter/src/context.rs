// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The handle through which an algorithm acts on the system.
//!
//! The context exposes instructions, memory queries, the tick boundary and
//! the termination flags. It deliberately offers no way to read a slice or
//! tuner directly: everything an algorithm knows comes from the allocation
//! memory.

use std::cell::RefCell;
use std::rc::Rc;

use wdm_engine::suspend::{Suspend, tick_boundary};
use wdm_engine::task::TaskFlags;
use wdm_engine::types::{SimError, SimResult};
use wdm_models::bus::Bus;
use wdm_track::entity::Entity;
use wdm_track::{debug, info, warn};

use crate::instruction::{Instruction, LockInst, SearchInst, SelectionPolicy, UnlockInst};
use crate::memory::{AllocationMemory, SearchRecord};

struct ArbiterSharedState {
    entity: Rc<Entity>,
    bus: Rc<RefCell<Bus>>,
    memory: Rc<RefCell<AllocationMemory>>,
    flags: Rc<TaskFlags>,
    target_lane_order: Option<Vec<usize>>,
}

/// Cheap to clone; all clones act on the same system.
#[derive(Clone)]
pub struct ArbiterContext {
    shared: Rc<ArbiterSharedState>,
}

impl ArbiterContext {
    pub fn new(
        parent: &Rc<Entity>,
        bus: Rc<RefCell<Bus>>,
        memory: Rc<RefCell<AllocationMemory>>,
        flags: Rc<TaskFlags>,
        target_lane_order: Option<Vec<usize>>,
    ) -> Self {
        Self {
            shared: Rc::new(ArbiterSharedState {
                entity: Rc::new(Entity::new(parent, "arbiter")),
                bus,
                memory,
                flags,
                target_lane_order,
            }),
        }
    }

    #[must_use]
    pub fn num_slices(&self) -> usize {
        self.shared.memory.borrow().num_slices()
    }

    /// Intended spectral rank of each bus position, if one was given.
    #[must_use]
    pub fn target_lane_order(&self) -> Option<&[usize]> {
        self.shared.target_lane_order.as_deref()
    }

    /// Execute an instruction immediately, within the current tick.
    pub fn issue(&self, instruction: impl Instruction) -> SimResult {
        debug!(self.shared.entity ; "{instruction}");
        let mut bus = self.shared.bus.borrow_mut();
        let mut memory = self.shared.memory.borrow_mut();
        instruction.execute(&mut bus, &mut memory)
    }

    pub fn search(&self, slice: usize) -> SimResult {
        self.issue(SearchInst::new(slice))
    }

    pub fn lock(&self, slice: usize, policy: SelectionPolicy, select: usize) -> SimResult {
        self.issue(LockInst::new(slice, policy, select))
    }

    pub fn unlock(&self, slice: usize) -> SimResult {
        self.issue(UnlockInst::new(slice))
    }

    pub fn check_lock_done(&self, slice: usize) -> Result<bool, SimError> {
        self.shared.memory.borrow().check_lock_done(slice)
    }

    pub fn check_zero_lock(&self, slice: usize) -> Result<bool, SimError> {
        self.shared.memory.borrow().check_zero_lock(slice)
    }

    /// Number of candidates seen by the most recent search of `slice`.
    pub fn num_candidates(&self, slice: usize) -> Result<usize, SimError> {
        Ok(self
            .shared
            .memory
            .borrow()
            .latest(slice)?
            .map_or(0, |record| record.entries.len()))
    }

    /// Copy of the most recent search of `slice`.
    pub fn latest_search(&self, slice: usize) -> Result<Option<SearchRecord>, SimError> {
        Ok(self.shared.memory.borrow().latest(slice)?.cloned())
    }

    /// Signal that the algorithm has finished.
    pub fn set_end_state(&self) {
        info!(self.shared.entity ; "end state");
        self.shared.flags.set_end_state();
    }

    /// Signal that the algorithm has given up.
    pub fn set_lock_error_state(&self) {
        warn!(self.shared.entity ; "lock error state");
        self.shared.flags.set_lock_error_state();
    }

    /// End the current tick. Must be `await`ed.
    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    pub fn tick(&self) -> Suspend {
        tick_boundary()
    }

    #[must_use]
    pub fn entity(&self) -> &Rc<Entity> {
        &self.shared.entity
    }
}

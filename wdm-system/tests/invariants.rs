// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Properties that must hold at every tick boundary, whatever the algorithm.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use wdm_arbiter::algorithm::AlgorithmRegistry;
use wdm_arbiter::context::ArbiterContext;
use wdm_arbiter::memory::AllocationMemory;
use wdm_engine::task::{ArbitrationTask, TaskFlags};
use wdm_engine::test_helpers::start_test;
use wdm_models::bus::Bus;
use wdm_models::tuner::RingParams;
use wdm_models::wavelength::Wavelength;

fn check_bus(bus: &Bus, memory: &AllocationMemory) {
    let mut upstream_locks: Vec<Wavelength> = Vec::new();
    for (position, slice) in bus.slices().iter().enumerate() {
        // No slice sees a wavelength taken by a slice nearer the laser
        for w in slice.incoming() {
            assert!(
                !upstream_locks.contains(w),
                "slice{position} sees {w} locked upstream"
            );
        }

        // At most one locked entry is recorded per slice, and it matches
        let locked: Vec<Wavelength> = memory
            .history(position)
            .unwrap()
            .iter()
            .flat_map(|record| record.entries.iter())
            .filter(|entry| entry.locked)
            .map(|entry| entry.wavelength)
            .collect();
        assert!(locked.len() <= 1);
        assert_eq!(locked.first().copied(), slice.locked_wavelength());

        upstream_locks.extend(slice.locked_wavelength());
    }
}

fn drive(rings: &[RingParams], laser: &[Wavelength], algorithm: &str) -> u64 {
    let top = start_test(file!());
    let algorithm = AlgorithmRegistry::with_builtins().create(algorithm).unwrap();
    let bus = Rc::new(RefCell::new(Bus::new(&top, rings, laser).unwrap()));
    let memory = Rc::new(RefCell::new(AllocationMemory::new(&top, rings.len())));
    let flags = Rc::new(TaskFlags::default());
    let ctx = ArbiterContext::new(&top, bus.clone(), memory.clone(), flags.clone(), None);
    let mut task = ArbitrationTask::new(&top, flags, async move { algorithm.run(ctx).await });

    check_bus(&bus.borrow(), &memory.borrow());
    while task.tick().unwrap() {
        bus.borrow_mut().propagate();
        check_bus(&bus.borrow(), &memory.borrow());
    }
    assert!(task.state().is_terminal());
    task.ticks()
}

#[test]
fn invariants_hold_for_sequential_algorithms() {
    for algorithm in ["one_by_one", "one_by_one_strict", "one_by_one_relock"] {
        for rings in [scenario_a_rings(), scenario_b_rings(), scenario_c_rings()] {
            drive(&rings, &laser_grid(), algorithm);
        }
    }
}

#[test]
fn invariants_hold_while_relocking() {
    let rings = [
        RingParams::new(1309.0, FSR, 4.0),
        RingParams::new(1309.5, FSR, 1.0),
    ];
    let ticks = drive(&rings, &nm(&[1310.0, 1312.0]), "one_by_one_relock");
    assert_eq!(ticks, 5);
}

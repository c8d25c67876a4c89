// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

mod common;

use std::rc::Rc;

use async_trait::async_trait;
use common::*;
use wdm_arbiter::algorithm::Algorithm;
use wdm_arbiter::context::ArbiterContext;
use wdm_arbiter::instruction::SelectionPolicy;
use wdm_engine::test_helpers::start_test;
use wdm_engine::types::{SimError, SimResult};
use wdm_models::tuner::RingParams;
use wdm_system::system_under_test::SystemUnderTest;

/// Locks slice 0 without searching it first.
struct LockWithoutSearch;

#[async_trait(?Send)]
impl Algorithm for LockWithoutSearch {
    fn name(&self) -> &str {
        "lock_without_search"
    }

    async fn run(&self, ctx: ArbiterContext) -> SimResult {
        ctx.tick().await;
        ctx.lock(0, SelectionPolicy::LeastSignificant, 0)?;
        ctx.set_end_state();
        ctx.tick().await;
        Ok(())
    }
}

/// Returns without touching anything.
struct DoNothing;

#[async_trait(?Send)]
impl Algorithm for DoNothing {
    fn name(&self) -> &str {
        "do_nothing"
    }

    async fn run(&self, _ctx: ArbiterContext) -> SimResult {
        Ok(())
    }
}

fn config_error(result: Result<SystemUnderTest, SimError>) -> String {
    match result {
        Err(SimError::Config(msg)) => msg,
        Err(e) => panic!("expected a config error, got {e}"),
        Ok(_) => panic!("expected a config error"),
    }
}

fn construct(
    rings: &[RingParams],
    laser: &[f64],
    init: Option<&[usize]>,
    target: Option<&[usize]>,
) -> Result<SystemUnderTest, SimError> {
    let top = start_test(file!());
    SystemUnderTest::construct(&top, rings, &nm(laser), init, target, Rc::new(DoNothing))
}

#[test]
fn count_mismatch() {
    let msg = config_error(construct(
        &scenario_a_rings(),
        &[1305.52, 1307.76, 1310.00],
        None,
        None,
    ));
    assert!(msg.contains("3 laser wavelengths"));
}

#[test]
fn empty_system() {
    let msg = config_error(construct(&[], &[], None, None));
    assert_eq!(msg, "no slices");
}

#[test]
fn duplicate_laser_wavelengths() {
    config_error(construct(
        &scenario_a_rings(),
        &[1305.52, 1307.76, 1307.76, 1312.24],
        None,
        None,
    ));
}

#[test]
fn non_finite_laser_wavelengths() {
    for bad in [f64::INFINITY, f64::NAN, f64::NEG_INFINITY, 0.0] {
        let msg = config_error(construct(
            &scenario_a_rings(),
            &[1305.52, 1307.76, 1310.00, bad],
            None,
            None,
        ));
        assert!(msg.starts_with("laser wavelength"), "{msg}");
    }
}

#[test]
fn bad_lane_orders() {
    let laser = [1305.52, 1307.76, 1310.00, 1312.24];
    let msg = config_error(construct(
        &scenario_a_rings(),
        &laser,
        Some(&[0, 0, 1, 2]),
        None,
    ));
    assert!(msg.starts_with("init_lane_order"));

    let msg = config_error(construct(
        &scenario_a_rings(),
        &laser,
        None,
        Some(&[0, 1, 2, 4]),
    ));
    assert!(msg.starts_with("target_lane_order"));

    let msg = config_error(construct(&scenario_a_rings(), &laser, None, Some(&[0, 1, 2])));
    assert!(msg.contains("3 entries for 4 slices"));
}

#[test]
fn init_lane_order_moves_resonances_only() {
    let top = start_test(file!());
    let rings = [
        RingParams::new(1297.86, FSR, 2.0),
        RingParams::new(1300.10, FSR, 3.0),
        RingParams::new(1302.34, FSR, 4.0),
        RingParams::new(1304.58, FSR, 5.0),
    ];
    let init = [2, 0, 3, 1];
    let sut = SystemUnderTest::construct(
        &top,
        &rings,
        &laser_grid(),
        Some(&init),
        None,
        Rc::new(DoNothing),
    )
    .unwrap();

    let bus = sut.bus().borrow();
    for (position, slice) in bus.slices().iter().enumerate() {
        let params = slice.params();
        assert_eq!(params.resonance_nm, rings[init[position]].resonance_nm);
        assert_eq!(params.tuning_range_nm, rings[position].tuning_range_nm);
        assert_eq!(params.fsr_nm, FSR);
    }
}

#[test]
fn tuning_range_must_be_below_fsr() {
    let mut rings = scenario_a_rings();
    rings[1] = RingParams::new(1297.86, FSR, FSR);
    let result = construct(&rings, &[1305.52, 1307.76, 1310.00, 1312.24], None, None);
    assert!(result.is_err());
}

#[test]
fn instruction_error_aborts_run() {
    let top = start_test(file!());
    let sut = SystemUnderTest::construct(
        &top,
        &scenario_a_rings(),
        &laser_grid(),
        None,
        None,
        Rc::new(LockWithoutSearch),
    )
    .unwrap();
    match sut.run() {
        Err(SimError::NoCandidate(_)) => {}
        other => panic!("expected NoCandidate, got {other:?}"),
    }
}

#[test]
fn returning_without_a_flag_aborts_run() {
    let top = start_test(file!());
    let sut = SystemUnderTest::construct(
        &top,
        &scenario_a_rings(),
        &laser_grid(),
        None,
        None,
        Rc::new(DoNothing),
    )
    .unwrap();
    assert!(matches!(sut.run(), Err(SimError::Task(_))));
}

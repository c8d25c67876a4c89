// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![allow(dead_code)]

use std::rc::Rc;

use wdm_arbiter::algorithm::AlgorithmRegistry;
use wdm_engine::types::SimError;
use wdm_models::tuner::RingParams;
use wdm_models::wavelength::Wavelength;
use wdm_system::outcome::RunResult;
use wdm_system::system_under_test::SystemUnderTest;
use wdm_track::entity::Entity;

pub const FSR: f64 = 8.96;

pub fn nm(values: &[f64]) -> Vec<Wavelength> {
    values.iter().copied().map(Wavelength::from_nm).collect()
}

pub fn some_nm(values: &[f64]) -> Vec<Option<Wavelength>> {
    values.iter().map(|v| Some(Wavelength::from_nm(*v))).collect()
}

pub fn laser_grid() -> Vec<Wavelength> {
    nm(&[1305.52, 1307.76, 1310.00, 1312.24])
}

/// Four rings with a tuning range of half the FSR.
pub fn scenario_a_rings() -> Vec<RingParams> {
    [1295.52, 1297.86, 1300.00, 1302.14]
        .into_iter()
        .map(|r| RingParams::new(r, FSR, FSR / 2.0))
        .collect()
}

/// As scenario A but the last ring can only reach the first laser line.
pub fn scenario_b_rings() -> Vec<RingParams> {
    let mut rings = scenario_a_rings();
    rings[3] = RingParams::new(1304.5, FSR, 2.0);
    rings
}

/// Each ring reaches exactly one laser line.
pub fn scenario_c_rings() -> Vec<RingParams> {
    laser_grid()
        .iter()
        .map(|w| RingParams::new(w.nm() - 1.0, FSR, 2.0))
        .collect()
}

pub fn run(
    top: &Rc<Entity>,
    rings: &[RingParams],
    laser: &[Wavelength],
    init_lane_order: Option<&[usize]>,
    target_lane_order: Option<&[usize]>,
    algorithm: &str,
) -> Result<RunResult, SimError> {
    let algorithm = AlgorithmRegistry::with_builtins().create(algorithm)?;
    SystemUnderTest::construct(
        top,
        rings,
        laser,
        init_lane_order,
        target_lane_order,
        algorithm,
    )?
    .run()
}

pub fn run_linear(top: &Rc<Entity>, rings: &[RingParams], algorithm: &str) -> RunResult {
    let linear = [0, 1, 2, 3];
    run(
        top,
        rings,
        &laser_grid(),
        Some(&linear),
        Some(&linear),
        algorithm,
    )
    .unwrap()
}

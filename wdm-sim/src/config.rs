// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Layered scenario configuration.

use std::path::Path;
use std::rc::Rc;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wdm_arbiter::algorithm::AlgorithmRegistry;
use wdm_engine::types::SimError;
use wdm_models::tuner::RingParams;
use wdm_models::wavelength::Wavelength;
use wdm_system::system_under_test::SystemUnderTest;
use wdm_track::entity::Entity;

/// Prefix of environment variables that override scenario values.
pub const ENV_PREFIX: &str = "WDM_";

/// Everything needed to build a [`SystemUnderTest`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Identifier of a registered algorithm.
    pub algorithm: String,

    /// The comb emitted by the laser.
    pub laser_wavelengths: Vec<Wavelength>,

    /// One ring per slice.
    pub rings: Vec<RingParams>,

    /// Bus position `p` is given the resonance of `rings[init_lane_order[p]]`.
    pub init_lane_order: Option<Vec<usize>>,

    /// Intended spectral rank of each bus position.
    pub target_lane_order: Option<Vec<usize>>,
}

impl Default for ScenarioConfig {
    /// Four rings on a 2.24nm grid, tuning range half the FSR.
    fn default() -> Self {
        let fsr_nm = 8.96;
        Self {
            algorithm: "one_by_one".to_string(),
            laser_wavelengths: [1305.52, 1307.76, 1310.00, 1312.24]
                .into_iter()
                .map(Wavelength::from_nm)
                .collect(),
            rings: [1295.52, 1297.86, 1300.00, 1302.14]
                .into_iter()
                .map(|r| RingParams::new(r, fsr_nm, fsr_nm / 2.0))
                .collect(),
            init_lane_order: None,
            target_lane_order: Some(vec![0, 1, 2, 3]),
        }
    }
}

impl ScenarioConfig {
    /// Layer the defaults, an optional TOML file and the environment.
    ///
    /// Unlike the environment, a file that is named must exist.
    pub fn load(file: Option<&Path>) -> Result<Self, SimError> {
        let mut figment = Figment::new().merge(Serialized::defaults(ScenarioConfig::default()));
        if let Some(path) = file {
            if !path.is_file() {
                return Err(SimError::Config(format!(
                    "config file '{}' not found",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file_exact(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| SimError::Config(e.to_string()))
    }

    /// Build the system described by this scenario under `parent`.
    pub fn build(
        &self,
        parent: &Rc<Entity>,
        registry: &AlgorithmRegistry,
    ) -> Result<SystemUnderTest, SimError> {
        SystemUnderTest::construct(
            parent,
            &self.rings,
            &self.laser_wavelengths,
            self.init_lane_order.as_deref(),
            self.target_lane_order.as_deref(),
            registry.create(&self.algorithm)?,
        )
    }
}

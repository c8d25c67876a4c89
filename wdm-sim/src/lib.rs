// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Run a wavelength arbitration scenario from the command line.
//!
//! A scenario is described by a [`ScenarioConfig`](crate::config::ScenarioConfig)
//! which is built from, in increasing priority:
//!  - the built-in four slice reference scenario,
//!  - an optional TOML file,
//!  - `WDM_` prefixed environment variables,
//!  - command-line flags.
//!
//! For example:
//!
//! ```text
//! WDM_ALGORITHM=all_at_once wdm-sim --config configs/scenario_b.toml --tables
//! ```
//!
//! The process exits with the status code of the run, so `0` means every
//! slice locked to a distinct wavelength in the intended lane order.

pub mod config;

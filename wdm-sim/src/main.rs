// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Run one wavelength arbitration scenario.
//!
//! See `lib.rs` for details.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use wdm_arbiter::algorithm::AlgorithmRegistry;
use wdm_engine::types::SimError;
use wdm_sim::config::ScenarioConfig;
use wdm_track::builder::{TrackerConfig, setup_trackers};
use wdm_track::entity::toplevel;
use wdm_track::{Track, Tracker, error, info};

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Microring wavelength arbitration")]
struct Cli {
    /// TOML scenario file. Values in it are overridden by `WDM_` environment
    /// variables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the arbitration algorithm.
    #[arg(long)]
    algorithm: Option<String>,

    /// Print the available algorithms and exit.
    #[arg(long)]
    list_algorithms: bool,

    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    stdout_level: log::Level,

    /// Set a regular expression for which entites should have logging level set
    /// to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    stdout_filter_regex: String,

    /// Print the search and lock tables.
    #[arg(long)]
    tables: bool,
}

fn setup_tracker(args: &Cli) -> Result<Tracker, SimError> {
    let config = TrackerConfig {
        enable: args.stdout,
        level: args.stdout_level,
        filter_regex: &args.stdout_filter_regex,
        file: None,
    };
    Ok(setup_trackers(&config)?)
}

fn main() -> Result<ExitCode, SimError> {
    let args = Cli::parse();
    let registry = AlgorithmRegistry::with_builtins();

    if args.list_algorithms {
        for id in registry.ids() {
            println!("{id}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut scenario = ScenarioConfig::load(args.config.as_deref())?;
    if let Some(algorithm) = &args.algorithm {
        scenario.algorithm.clone_from(algorithm);
    }

    let tracker = setup_tracker(&args)?;
    let top = toplevel(&tracker, "top");
    info!(top ; "{} slices, algorithm {}", scenario.rings.len(), scenario.algorithm);

    let result = match scenario.build(&top, &registry).and_then(|sut| sut.run()) {
        Ok(result) => result,
        Err(e) => {
            error!(top ; "{e}");
            tracker.shutdown();
            return Err(e);
        }
    };

    println!("{result}");
    if args.tables {
        println!("search table:\n{}", result.search_table);
        println!("lock table:\n{}", result.lock_table);
    }
    tracker.shutdown();

    Ok(ExitCode::from(
        u8::try_from(result.status.code()).unwrap_or(u8::MAX),
    ))
}

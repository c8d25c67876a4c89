// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::path::PathBuf;
use std::process::{Command, Output};

use serial_test::serial;

fn scenario_b() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configs/scenario_b.toml")
}

fn wdm_sim(args: &[&str], env: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wdm-sim"))
        .args(args)
        .envs(env.iter().copied())
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
#[serial(wdm_sim)]
fn default_scenario_succeeds() {
    let output = wdm_sim(&[], &[]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout(&output);
    assert!(stdout.starts_with("status: 0 (success)\n"));
    assert!(stdout.contains("locks: [1305.52, 1307.76, 1310.00, 1312.24]"));
}

#[test]
#[serial(wdm_sim)]
fn config_file_sets_scenario() {
    let output = wdm_sim(&["--config", scenario_b().to_str().unwrap()], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("locks: [1305.52, 1307.76, 1310.00, none]"));
}

#[test]
#[serial(wdm_sim)]
fn env_overrides_file_and_cli_overrides_env() {
    let config = scenario_b();
    let args = ["--config", config.to_str().unwrap()];
    let env = [("WDM_ALGORITHM", "one_by_one_strict")];

    let output = wdm_sim(&args, &env);
    assert_eq!(output.status.code(), Some(4));

    let output = wdm_sim(
        &[args[0], args[1], "--algorithm", "one_by_one"],
        &env,
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
#[serial(wdm_sim)]
fn tables_are_printed() {
    let output = wdm_sim(&["--tables"], &[]);
    let stdout = stdout(&output);
    assert!(stdout.contains("search table:"));
    assert!(stdout.contains("lock table:"));
}

#[test]
#[serial(wdm_sim)]
fn list_algorithms() {
    let output = wdm_sim(&["--list-algorithms"], &[]);
    assert_eq!(output.status.code(), Some(0));
    let ids: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(
        ids,
        ["all_at_once", "one_by_one", "one_by_one_relock", "one_by_one_strict"]
    );
}

#[test]
#[serial(wdm_sim)]
fn unknown_algorithm_is_an_error() {
    let output = wdm_sim(&["--algorithm", "round_robin"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("round_robin"));
}

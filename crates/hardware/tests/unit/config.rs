//! Configuration tests.

use std::io::Write;

use tempfile::NamedTempFile;

use gpgpu_core::config::Config;
use gpgpu_core::mem::ArbiterPolicy;

#[test]
fn defaults_validate() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.core.num_cores, 1);
    assert_eq!(config.lsu.num_banks, config.lsu.num_lanes);
    assert_eq!(config.memory.arbiter, ArbiterPolicy::RoundRobin);
}

#[test]
fn json_overrides_merge_with_defaults() {
    let json = r#"{
        "core": { "num_cores": 4, "num_warps": 8 },
        "lsu": { "num_blocks": 2, "num_lanes": 2, "num_banks": 2 },
        "memory": { "arbiter": "Priority" }
    }"#;
    let config = Config::from_json(json).expect("valid config");
    assert_eq!(config.core.num_cores, 4);
    assert_eq!(config.core.num_warps, 8);
    // untouched sections keep their defaults
    assert_eq!(config.core.issue_width, 2);
    assert_eq!(config.lsu.num_blocks, 2);
    assert_eq!(config.memory.arbiter, ArbiterPolicy::Priority);
}

#[test]
fn config_file_round_trip() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{ "general": {{ "cycle_budget": 5000 }}, "latency": {{ "dram": 80 }} }}"#
    )
    .expect("write config");

    let text = std::fs::read_to_string(file.path()).expect("read back");
    let config = Config::from_json(&text).expect("parse");
    assert_eq!(config.general.cycle_budget, 5000);
    assert_eq!(config.latency.dram, 80);
}

#[test]
fn rejects_malformed_json() {
    assert!(Config::from_json("{ not json").is_err());
}

#[test]
fn rejects_thread_lane_mismatch() {
    let json = r#"{ "core": { "num_threads": 6 }, "lsu": { "num_lanes": 4, "num_banks": 4 } }"#;
    assert!(Config::from_json(json).is_err());
}

#[test]
fn rejects_non_power_of_two_banks() {
    let json = r#"{ "lsu": { "num_lanes": 6, "num_banks": 3 } }"#;
    assert!(Config::from_json(json).is_err());
}

#[test]
fn rejects_zero_issue_width() {
    let json = r#"{ "core": { "issue_width": 0 } }"#;
    assert!(Config::from_json(json).is_err());
}

#[test]
fn rejects_zero_port_delays() {
    let json = r#"{ "memory": { "switch_delay": 0 } }"#;
    assert!(Config::from_json(json).is_err());
}

//! Integration tests for uqlt_runtime.
//!
//! Config-file tests use temporary directories for isolation.

use std::fs;
use std::path::PathBuf;

use proptest::prelude::*;

use uqlt_engine::{EngineError, State};
use uqlt_runtime::drift::{compare_snapshots, verify_determinism};
use uqlt_runtime::history::verify_entry;
use uqlt_runtime::replay;
use uqlt_runtime::{run, RunConfig, RunError, RunMode, SeedCell, Termination};

/// Create a temp directory for a test.
fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("uqlt_runtime_tests").join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir
}

fn unseeded(size: i64, ambient: f64, max_steps: u64) -> RunConfig {
    RunConfig {
        grid_size: size,
        ambient_energy: ambient,
        max_steps,
        helium_seed_radius: None,
        ..RunConfig::default()
    }
}

// ─────────────────────────────────────────────────────────────
// Test 1: default stage chain collapses the seeded center block
// ─────────────────────────────────────────────────────────────

#[test]
fn default_stage_chain_collapses_center_block() {
    let report = run(&RunConfig::default(), RunMode::StageChain).unwrap();

    assert_eq!(report.termination, Termination::Collapsed { count: 9 });
    assert!(report.collapsed());
    assert_eq!(report.steps, 1);
    assert_eq!(report.final_snapshot.size, 11);
    assert_eq!(report.final_snapshot.state_counts()[&State::Core], 9);
    for r in 4..=6 {
        for c in 4..=6 {
            assert_eq!(report.final_snapshot.state_at(r, c), Some(State::Core));
        }
    }

    let emission = report.emission.as_ref().expect("collapse step emits");
    assert_eq!(emission.cores, 9);
    assert_eq!(emission.receivers, 9 * 120);
    assert!(emission.total_emitted > 0.0);
    assert_eq!(report.demoted, Some(0));
    assert!(report.radial_profile.contains_key(&0));
}

// ─────────────────────────────────────────────────────────────
// Test 2: history holds pre-step copies that verify
// ─────────────────────────────────────────────────────────────

#[test]
fn history_entries_verify_and_do_not_alias() {
    let report = run(&RunConfig::default(), RunMode::StageChain).unwrap();

    assert_eq!(report.history.len(), 1);
    let first = &report.history.entries()[0];
    assert_eq!(first.step, 0);
    assert_eq!(first.snapshot.state_counts()[&State::Helium], 9);
    assert_eq!(first.snapshot.total_energy(), 0.0);
    assert!(verify_entry(first).unwrap());
    assert_ne!(first.hash, report.final_hash);

    let drift = compare_snapshots(&first.snapshot, &report.final_snapshot).unwrap();
    assert_eq!(drift.state_count_delta[&State::Helium], -9);
    assert_eq!(drift.state_count_delta[&State::Core], 9);
    assert_eq!(drift.state_changes.len(), 9);
    assert!(drift.total_energy_delta > 0.0);
}

// ─────────────────────────────────────────────────────────────
// Test 3: escalation without helium runs into the step limit
// ─────────────────────────────────────────────────────────────

#[test]
fn escalation_without_helium_hits_step_limit() {
    let report = run(&unseeded(3, 1.0, 2), RunMode::StageChain).unwrap();

    assert_eq!(report.termination, Termination::StepLimit);
    assert_eq!(report.steps, 2);
    assert!(report.emission.is_none());
    assert!(report.demoted.is_none());

    let steps: Vec<u64> = report.history.entries().iter().map(|e| e.step).collect();
    assert_eq!(steps, vec![0, 1]);

    // Center: 1.0 per step. Edges: 0.5. Corners: 1 / (1 + sqrt 2).
    let snap = &report.final_snapshot;
    assert_eq!(snap.state_at(1, 1), Some(State::Radio));
    assert_eq!(snap.energy_at(1, 1), Some(2.0));
    assert_eq!(snap.state_at(0, 1), Some(State::Static));
    assert_eq!(snap.state_at(0, 0), Some(State::Void));
}

#[test]
fn weak_input_leaves_grid_void() {
    let report = run(&unseeded(5, 0.1, 3), RunMode::StageChain).unwrap();
    assert_eq!(report.termination, Termination::StepLimit);
    assert_eq!(report.history.len(), 3);
    assert_eq!(report.final_snapshot.state_counts()[&State::Void], 25);
}

// ─────────────────────────────────────────────────────────────
// Test 4: collapse-only and EMN quantification
// ─────────────────────────────────────────────────────────────

#[test]
fn collapse_only_batches_explicit_seeds() {
    let mut config = unseeded(3, 0.0, 10);
    config.seeds = vec![
        SeedCell {
            row: 0,
            col: 0,
            state: State::Helium,
            energy: 0.0,
        },
        SeedCell {
            row: 0,
            col: 1,
            state: State::Static,
            energy: 1.5,
        },
    ];

    let report = run(&config, RunMode::CollapseOnly).unwrap();
    assert_eq!(report.termination, Termination::Collapsed { count: 2 });
    assert_eq!(report.final_snapshot.state_at(0, 1), Some(State::Core));
    assert!(report.emission.is_none());
    assert!(report.history.is_empty());
}

#[test]
fn emn_output_matches_stage_chain_emission() {
    let config = RunConfig::default();
    let emn = run(&config, RunMode::EmnQuantification).unwrap();
    let chain = run(&config, RunMode::StageChain).unwrap();

    assert_eq!(emn.termination, Termination::Collapsed { count: 9 });
    assert!(emn.emn_output().unwrap() > 0.0);
    assert_eq!(emn.demoted, None);
    // Same cores, same emission law; energy input does not enter it.
    assert_eq!(emn.emn_output(), chain.emn_output());
}

// ─────────────────────────────────────────────────────────────
// Test 5: determinism and replay
// ─────────────────────────────────────────────────────────────

#[test]
fn every_mode_is_deterministic() {
    let config = RunConfig::default();
    for mode in [
        RunMode::StageChain,
        RunMode::CollapseOnly,
        RunMode::EmnQuantification,
    ] {
        let report = run(&config, mode).unwrap();
        assert_eq!(verify_determinism(&config, mode).unwrap(), report.final_hash);

        let (snapshot, hash) = replay::rebuild_state(&config, mode).unwrap();
        assert_eq!(snapshot, report.final_snapshot);
        assert_eq!(hash, report.final_hash);
    }
}

#[test]
fn different_configs_produce_different_hashes() {
    let a = replay::rebuild_hash(&RunConfig::default(), RunMode::StageChain).unwrap();
    let b = replay::rebuild_hash(
        &RunConfig {
            helium_seed_radius: Some(2),
            ..RunConfig::default()
        },
        RunMode::StageChain,
    )
    .unwrap();
    assert_ne!(a, b);
}

// ─────────────────────────────────────────────────────────────
// Test 6: configuration files
// ─────────────────────────────────────────────────────────────

#[test]
fn config_file_round_trip() {
    let dir = temp_dir("config_round_trip");
    let path = dir.join("run.json");

    let config = RunConfig {
        grid_size: 7,
        max_steps: 40,
        ambient_energy: 0.25,
        ..RunConfig::default()
    };
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = RunConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);

    let report = run(&loaded, RunMode::StageChain).unwrap();
    assert_eq!(report.final_snapshot.size, 7);
}

#[test]
fn invalid_configs_rejected() {
    let dir = temp_dir("invalid_configs");

    let broken = dir.join("broken.json");
    fs::write(&broken, "{ \"grid_size\": ").unwrap();
    assert!(matches!(
        RunConfig::from_file(&broken),
        Err(RunError::Engine(EngineError::Serialization(_)))
    ));

    assert!(matches!(
        RunConfig::from_file(&dir.join("missing.json")),
        Err(RunError::Engine(EngineError::Io(_)))
    ));

    let even = dir.join("even.json");
    fs::write(&even, r#"{"grid_size": 4}"#).unwrap();
    assert!(matches!(
        RunConfig::from_file(&even),
        Err(RunError::Engine(EngineError::GridSize { size: 4 }))
    ));

    let bad_threshold = r#"{"constants": {
        "CORE_EMISSION_RATE": 4.0,
        "C_SQUARED_MAX_MOTION": 2.0,
        "COLLAPSE_HELIUM_THRESHOLD": 1.5,
        "MAX_UNIT_ENERGY": {
            "VOID": 1, "STATIC": 2, "RADIO": 4, "RADIANT": 8, "PLASMA": 16,
            "HELIUM": 32, "HELIUM_FRAGMENT": 24, "HYDROGEN": 12, "CORE": 100, "HEAVY": 64
        }
    }}"#;
    assert!(matches!(
        RunConfig::from_json_str(bad_threshold),
        Err(RunError::Engine(EngineError::InvalidConstant { .. }))
    ));
}

// ─────────────────────────────────────────────────────────────
// Test 7: any small run is deterministic and stays legal
// ─────────────────────────────────────────────────────────────

fn small_config() -> impl Strategy<Value = RunConfig> {
    (
        prop::sample::select(vec![1i64, 3, 5, 7]),
        0.0f64..2.0,
        prop::option::of(0usize..3),
        1u64..12,
    )
        .prop_map(|(grid_size, ambient_energy, helium_seed_radius, max_steps)| RunConfig {
            grid_size,
            ambient_energy,
            helium_seed_radius,
            max_steps,
            ..RunConfig::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn small_runs_are_deterministic_and_legal(config in small_config()) {
        let first = run(&config, RunMode::StageChain).unwrap();
        let second = run(&config, RunMode::StageChain).unwrap();
        prop_assert_eq!(&first.final_hash, &second.final_hash);
        prop_assert!(first.steps <= config.max_steps);
        prop_assert!(first.final_snapshot.energy.iter().all(|e| e.is_finite() && *e >= 0.0));
        for entry in first.history.entries() {
            prop_assert!(verify_entry(entry).unwrap());
        }
    }
}

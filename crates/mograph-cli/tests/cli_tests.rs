#![allow(missing_docs)]
use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;

const FRAMES: usize = 24;
const STRIDE: f32 = 0.125;

/// Two identical straight-walk clips whose spine swing repeats every 8
/// frames, so windows 8 frames apart match exactly and the pipeline
/// discovers transitions on its own.
fn dataset_json() -> String {
    let clip_frames: Vec<_> = (0..FRAMES)
        .map(|i| {
            let angle = 0.05 * (std::f32::consts::FRAC_PI_4 * (i % 8) as f32).sin();
            let half = angle / 2.0;
            json!({
                "translation": [STRIDE * i as f32, 1.0, 0.0],
                "rotation": [0.0, 0.0, 0.0, 1.0],
                "joints": { "spine": [0.0, half.sin(), 0.0, half.cos()] }
            })
        })
        .collect();

    json!({
        "skeleton": {
            "joints": [
                { "name": "spine", "offset": [0.0, 0.5, 0.0] },
                { "name": "head", "offset": [0.0, 0.9, 0.0] },
                { "name": "foot_l", "offset": [-0.15, -0.8, 0.0] },
                { "name": "foot_r", "offset": [0.15, -0.8, 0.0] }
            ]
        },
        "clips": [
            { "id": 0, "frames": clip_frames },
            { "id": 1, "frames": clip_frames }
        ]
    })
    .to_string()
}

fn write_fixtures(dir: &Path) -> (String, String) {
    let dataset = dir.join("dataset.json");
    fs::write(&dataset, dataset_json()).unwrap();

    let points: Vec<_> = (0..8).map(|i| json!([0.5 * i as f32, 0.0, 0.0])).collect();
    let path = dir.join("path.json");
    fs::write(&path, json!(points).to_string()).unwrap();

    (
        dataset.to_string_lossy().into_owned(),
        path.to_string_lossy().into_owned(),
    )
}

fn mograph() -> Command {
    Command::cargo_bin("mograph").unwrap()
}

#[test]
fn build_dumps_the_graph() {
    let dir = tempdir().unwrap();
    let (dataset, _) = write_fixtures(dir.path());
    let out = dir.path().join("graph.txt");
    let cache = dir.path().join("cache");

    mograph()
        .args([
            "build",
            &dataset,
            "--window",
            "4",
            "--threshold",
            "0",
            "--cache-dir",
        ])
        .arg(&cache)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("graph:"));

    let dump = fs::read_to_string(&out).unwrap();
    assert!(dump.contains("-->"), "graph dump has no edges:\n{dump}");

    // One cache file per clip pair, including self pairs.
    let cached: Vec<_> = fs::read_dir(&cache)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(cached.len(), 3);
    assert!(cached.iter().all(|name| name.ends_with("_w4_s1.dist")));
}

#[test]
fn build_reuses_the_cache() {
    let dir = tempdir().unwrap();
    let (dataset, _) = write_fixtures(dir.path());
    let cache = dir.path().join("cache");

    let run = |out: &Path| {
        mograph()
            .args(["build", &dataset, "--window", "4", "--threshold", "0"])
            .arg("--cache-dir")
            .arg(&cache)
            .arg("--out")
            .arg(out)
            .assert()
            .success();
    };

    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    run(&first);
    run(&second);
    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn walk_emits_frames_along_the_path() {
    let dir = tempdir().unwrap();
    let (dataset, path) = write_fixtures(dir.path());

    let output = mograph()
        .args([
            "walk", &dataset, "--window", "4", "--threshold", "0", "--path", &path,
            "--spacing", "0.5", "--fps", "4",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let frames: Vec<serde_json::Value> = serde_json::from_slice(&output).unwrap();
    // Covering 90% of a 4-unit path takes at least 28 strides.
    assert!(frames.len() >= 28, "only {} frames", frames.len());

    // The walk heads in the path's direction.
    let x0 = frames[0]["position"][0].as_f64().unwrap();
    let xn = frames[frames.len() - 1]["position"][0].as_f64().unwrap();
    assert!(xn > x0 + 2.0, "walk barely moved: {x0} -> {xn}");
}

#[test]
fn random_walks_are_reproducible_per_seed() {
    let dir = tempdir().unwrap();
    let (dataset, _) = write_fixtures(dir.path());

    let run = || {
        mograph()
            .args([
                "random", &dataset, "--window", "4", "--threshold", "0", "--seed", "7",
                "--count", "20",
            ])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn help_lists_the_subcommands() {
    mograph()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("build")
                .and(predicate::str::contains("walk"))
                .and(predicate::str::contains("random")),
        );
}

#[test]
fn missing_dataset_is_an_error() {
    mograph()
        .args(["build", "nope.json", "--window", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading dataset"));
}

#[test]
fn window_longer_than_a_clip_is_an_error() {
    let dir = tempdir().unwrap();
    let (dataset, _) = write_fixtures(dir.path());

    mograph()
        .args(["build", &dataset, "--window", "30", "--threshold", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("shorter"));
}

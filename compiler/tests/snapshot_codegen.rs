// Snapshot tests: lock generated procedure source to detect unintended
// behavior changes.
//
// Graphs are loaded from `compiler/tests/graphs/` and compiled through the
// library API. Snapshots are inline; run `cargo insta review` after
// intentional output changes to update them.

use std::path::PathBuf;

use ngc::codegen::{CompileOptions, ProcSignature, ReturnMode};
use ngc::graph::Graph;

fn load_graph(name: &str) -> Graph {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/graphs")
        .join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e));
    Graph::from_json(&text).unwrap_or_else(|d| panic!("{}: {}", name, d))
}

#[test]
fn snapshot_sine() {
    let src = ngc::compile(&load_graph("sine.json"), "evaluateGraph", &[]).unwrap();
    insta::assert_snapshot!(src, @r"
# Generated by ngc (node graph compiler)
# primitives: isin
import primitives

proc evaluateGraph(): int =
  let v0 = 45
  let v1 = isin(v0 mod 3600)
  return int(v1)
");
}

#[test]
fn snapshot_particle_all_outputs() {
    let mut options = CompileOptions::new(ProcSignature::kinematics());
    options.return_mode = ReturnMode::All;
    let generated = ngc::compile_with_options(&load_graph("particle.json"), &options).unwrap();
    insta::assert_snapshot!(generated.source, @r"
# Generated by ngc (node graph compiler)
# primitives: isin, clamp, polarDistance, waveAdd
import primitives
import std/math

proc updateParticle(x: float, y: float, vx: float, vy: float, age: float, life: float, time: float, dt: float): (int, int) =
  let v0 = isin((time + 900) mod 3600)
  let v1 = polarDistance(x, y, 40, 12)
  let v2 = waveAdd(v0, v1)
  let v3 = clamp(v2, -500, 1000)
  let v4 = v3  # unhandled math op: frobnicate
  return (int(v3), int(v4))
");
}

#[test]
fn snapshot_particle_preset() {
    let src = ngc::compile_kinematics(&load_graph("particle.json")).unwrap();
    assert!(src.contains("): int =\n"));
    assert!(src.trim_end().ends_with("return int(v3)"));
    assert!(!src.contains("7.0"), "unreachable constant must not be emitted");
}

#[test]
fn snapshot_degraded() {
    let src = ngc::compile(&load_graph("degraded.json"), "sketch", &[]).unwrap();
    insta::assert_snapshot!(src, @r"
# Generated by ngc (node graph compiler)
# primitives: none
import primitives

proc sketch(): int =
  let v0 = 0
  let v1 = 0  # unhandled node kind: noise
  let v2 = 0  # unhandled wave type: triangle
  let v3 = 0  # unhandled math op: add (got 0 inputs)
  let v4 = 0  # unhandled polar op: spiral
  return int(v0)
");
}

#[test]
fn cycle_fixture_is_rejected() {
    let err = ngc::compile(&load_graph("cycle.json"), "f", &[]).unwrap_err();
    assert_eq!(err.code, Some(ngc::diag::codes::E0103));
    assert!(err.to_string().starts_with("error[E0103]: cycle detected"));
}

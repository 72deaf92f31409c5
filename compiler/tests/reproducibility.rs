// Reproducibility and CLI tests.
//
// These run the `ngc` binary against the fixture graphs and verify that
// identical inputs produce byte-identical outputs and that failures map to
// the documented exit codes.

use std::path::PathBuf;
use std::process::{Command, Output};

fn ngc_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ngc"))
}

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/graphs")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn run_ngc_raw(args: &[&str]) -> Output {
    Command::new(ngc_binary())
        .args(args)
        .output()
        .expect("failed to run ngc")
}

fn run_ngc(args: &[&str]) -> String {
    let output = run_ngc_raw(args);
    assert!(
        output.status.success(),
        "ngc failed with args {:?}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("non-UTF8 output")
}

/// Compiling the same graph twice produces byte-identical source.
#[test]
fn same_graph_identical_source() {
    let sine = fixture("sine.json");
    let first = run_ngc(&[sine.as_str()]);
    let second = run_ngc(&[sine.as_str()]);
    assert_eq!(first, second, "source should be byte-identical across runs");
    assert!(first.contains("proc evaluateGraph(): int ="));
}

#[test]
fn params_and_name_flow_into_signature() {
    let sine = fixture("sine.json");
    let src = run_ngc(&[sine.as_str(), "--name", "glow", "-p", "t:int", "--param", "gain:float"]);
    assert!(src.contains("proc glow(t: int, gain: float): int ="), "{}", src);
}

#[test]
fn preset_and_all_outputs() {
    let particle = fixture("particle.json");
    let src = run_ngc(&[particle.as_str(), "--preset", "kinematics", "--all-outputs", "--no-header"]);
    assert!(src.starts_with("import primitives\nimport std/math\n"), "{}", src);
    assert!(src.contains("proc updateParticle("));
    assert!(src.contains("return (int(v3), int(v4))"));
}

#[test]
fn placeholders_warn_on_stderr() {
    let output = run_ngc_raw(&[fixture("particle.json").as_str()]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("warning[W0301]: unhandled math op: frobnicate"),
        "{}",
        stderr
    );
}

#[test]
fn build_info_is_stable() {
    let sine = fixture("sine.json");
    let first = run_ngc(&[sine.as_str(), "--emit", "build-info"]);
    let second = run_ngc(&[sine.as_str(), "--emit", "build-info"]);
    assert_eq!(first, second);
    let parsed: serde_json::Value = serde_json::from_str(&first).expect("build-info is JSON");
    assert_eq!(parsed["graph_hash"].as_str().map(str::len), Some(64));
}

#[test]
fn dot_and_graph_stages() {
    let particle = fixture("particle.json");
    let dot = run_ngc(&[particle.as_str(), "--emit", "dot"]);
    assert!(dot.starts_with("digraph ngc {"));
    let listing = run_ngc(&[particle.as_str(), "--emit", "graph"]);
    assert!(listing.starts_with("Graph (9 nodes, 2 outputs)"));
}

#[test]
fn cycle_exits_with_compile_error() {
    let output = run_ngc_raw(&[fixture("cycle.json").as_str()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error[E0103]"));
}

#[test]
fn missing_file_exits_with_io_error() {
    let output = run_ngc_raw(&["/nonexistent/graph.json"]);
    assert_eq!(output.status.code(), Some(2));
}

use assert_cmd::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

fn historian() -> Command {
    let exe = assert_cmd::cargo_bin!("allotax-bench");
    let mut cmd = Command::new(exe);
    cmd.env_remove("ALLOTAX_LOG");
    cmd
}

fn write_results(root: &Path, mean: f64) {
    let dir = root.join(".benchmarks").join("run");
    fs::create_dir_all(&dir).unwrap();
    let body = serde_json::json!({
        "benchmarks": [{
            "name": "test_generate_svg_performance[Small vs Medium (1895+1968)]",
            "stats": { "mean": mean, "min": mean, "rounds": 5 }
        }]
    });
    fs::write(dir.join("0001_results.json"), body.to_string()).unwrap();
}

#[test]
fn missing_benchmarks_exit_cleanly() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let output = historian()
        .args(["--root", tmp.path().to_string_lossy().as_ref()])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stdout)
            .contains("No .benchmarks directory found. Run benchmarks first.")
    );
}

#[test]
fn save_then_list_history() {
    let tmp = tempfile::tempdir().expect("tempdir");
    fs::write(
        tmp.path().join("Cargo.toml"),
        "[package]\nname = \"demo\"\nversion = \"0.4.2\"\n",
    )
    .unwrap();
    write_results(tmp.path(), 0.5);
    let root = tmp.path().to_string_lossy().to_string();

    let saved = historian().args(["--root", root.as_str()]).output().unwrap();
    assert!(saved.status.success());
    let text = String::from_utf8_lossy(&saved.stdout);
    assert!(text.contains("Summary saved to"));
    assert!(text.contains("Version: 0.4.2"));
    assert!(tmp.path().join(".benchmarks/summary_history.json").exists());

    let listed = historian()
        .args(["--root", root.as_str(), "history", "5"])
        .output()
        .unwrap();
    assert!(listed.status.success());
    let text = String::from_utf8_lossy(&listed.stdout);
    assert!(text.contains("RECENT BENCHMARK HISTORY (last 5 runs)"));
    assert!(text.contains("Small vs Medium (1895+1968)"));
}

#[test]
fn non_numeric_limit_is_a_usage_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    historian()
        .args(["--root", tmp.path().to_string_lossy().as_ref(), "history", "lots"])
        .assert()
        .code(2);
}

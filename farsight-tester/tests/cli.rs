use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "farsight-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_checks_writes_output() {
    let exe = env!("CARGO_BIN_EXE_farsight-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-checks", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available checks"));
    assert!(content.contains("session-walkthrough"));
}

#[test]
fn cli_runs_checks_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_farsight-tester");
    let output_path = temp_path("json");
    let output = Command::new(exe)
        .args([
            "--checks",
            "determinism,illusion-bias,scoring-scenarios",
            "--seeds",
            "7,7,42",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Farsight Automated Tester"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let results = report.as_array().expect("array of results");
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r["passed"] == true));
    assert!(results.iter().all(|r| r["seeds_run"] == 2));
}

#[test]
fn cli_markdown_includes_play_summary() {
    let exe = env!("CARGO_BIN_EXE_farsight-tester");
    let output_path = temp_path("markdown");
    let status = Command::new(exe)
        .args([
            "--checks",
            "session-walkthrough",
            "--report",
            "markdown",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.starts_with("# Farsight Check Results"));
    assert!(content.contains("| Perfect | Landmarks |"));
}

#[test]
fn cli_rejects_bad_seed() {
    let exe = env!("CARGO_BIN_EXE_farsight-tester");
    let output = Command::new(exe)
        .args(["--checks", "determinism", "--seeds", "not-a-seed"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unrecognized seed token"));
}

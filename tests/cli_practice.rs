use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_practice_cli"))
}

fn fixture_file(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout UTF-8");
    serde_json::from_str(stdout.trim()).expect("JSON report on stdout")
}

#[test]
fn assess_synthesized_scores_completes() {
    let output = cli()
        .args([
            "assess",
            "--text",
            "hello world",
            "--capture-ms",
            "10",
            "--scoring-ms",
            "10",
        ])
        .output()
        .expect("failed to run practice_cli assess");
    assert!(
        output.status.success(),
        "CLI exited with {:?}",
        output.status.code()
    );

    let json = stdout_json(&output);
    assert_eq!(json["outcome"], "completed");
    assert_eq!(json["reference_text"], "hello world");
    assert_eq!(json["words"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["words"][1]["word"], "world");
}

#[test]
fn assess_fixture_reports_word_details() {
    let output = cli()
        .args([
            "assess",
            "--text",
            "they were looking for a good book",
            "--fixture",
            &fixture_file("sample_assessment.json"),
            "--capture-ms",
            "5",
            "--scoring-ms",
            "5",
        ])
        .output()
        .expect("failed to run fixture assess");
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["overall_score"], 89.0);
    assert_eq!(json["overall_band"], "good");
    assert_eq!(json["words"][0]["phonetic"], "/TH.EY/");
    assert_eq!(json["words"][6]["word"], "book");
    assert_eq!(json["words"][6]["score"], 83.0);
    assert_eq!(json["words"][6]["band"], "good");
}

#[test]
fn assess_denied_permission_exits_with_failure() {
    let output = cli()
        .args(["assess", "--text", "hello", "--deny-permission"])
        .output()
        .expect("failed to run denied assess");
    assert_eq!(output.status.code(), Some(3));

    let json = stdout_json(&output);
    assert_eq!(json["outcome"], "failed");
    assert_eq!(json["reason"], "permission denied");
    assert!(json["words"].as_array().is_some_and(|words| words.is_empty()));
}

#[test]
fn assess_transport_failure_reports_message() {
    let output = cli()
        .args([
            "assess",
            "--text",
            "hello",
            "--fail",
            "network down",
            "--capture-ms",
            "5",
            "--scoring-ms",
            "5",
        ])
        .output()
        .expect("failed to run failing assess");
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stdout_json(&output)["reason"], "network down");
}

#[test]
fn assess_without_result_reports_no_result() {
    let output = cli()
        .args([
            "assess",
            "--text",
            "hello",
            "--no-result",
            "--capture-ms",
            "5",
            "--scoring-ms",
            "5",
        ])
        .output()
        .expect("failed to run no-result assess");
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stdout_json(&output)["reason"], "no pronunciation result");
}

#[test]
fn assess_blank_text_is_an_error() {
    let output = cli()
        .args(["assess", "--text", "   "])
        .output()
        .expect("failed to run blank assess");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("starting assessment"),
        "expected start context in stderr, got {stderr}"
    );
}

#[test]
fn band_reports_feedback() {
    let output = cli()
        .args(["band", "90"])
        .output()
        .expect("failed to run band");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["band"], "excellent");
    assert_eq!(json["feedback"], "Awesome!");
    assert_eq!(json["color"], "green");

    let output = cli()
        .args(["band", "-5"])
        .output()
        .expect("failed to run negative band");
    assert_eq!(stdout_json(&output)["band"], "poor");
}

#[test]
fn languages_lists_catalogue() {
    let output = cli()
        .arg("languages")
        .output()
        .expect("failed to run languages");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert_eq!(stdout.lines().count(), 16);
    assert!(stdout.contains("pl-PL"));
    assert!(stdout.contains("en-US"));
}

#[test]
fn drill_is_reproducible_with_seed() {
    let run = || {
        let output = cli()
            .args(["drill", "--seed", "42", "--count", "3"])
            .output()
            .expect("failed to run drill");
        assert!(output.status.success());
        String::from_utf8(output.stdout).expect("stdout UTF-8")
    };

    let first = run();
    assert_eq!(first.lines().count(), 3);
    assert!(first.lines().all(|line| !line.trim().is_empty()));
    assert_eq!(first, run());
}

#[test]
fn onboarding_flag_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("onboarding.json");
    let path_arg = path.to_string_lossy().into_owned();

    let output = cli()
        .args(["onboarding", "--path", &path_arg])
        .output()
        .expect("failed to read onboarding flag");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["onboarding_complete"], false);

    let output = cli()
        .args(["onboarding", "--path", &path_arg, "--complete"])
        .output()
        .expect("failed to set onboarding flag");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["onboarding_complete"], true);
    assert!(path.exists());
}

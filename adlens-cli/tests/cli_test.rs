#![allow(deprecated)] // Command::cargo_bin

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

fn adlens_cmd() -> Command {
    let mut cmd = Command::cargo_bin("adlens").unwrap();
    cmd.env_remove("ADLENS_DATA")
        .env_remove("ADLENS_CONFIG")
        .env("RUST_LOG", "warn");
    cmd
}

fn row(day: u32, campaign: &str, platform: &str, creative: &str, ctr: f64, roas: f64) -> Value {
    let message = if ctr < 0.013 {
        "Hurry, this week only: everything in store is discounted"
    } else {
        "Buy now"
    };
    let audience = if day % 2 == 0 { "Broad" } else { "Lookalike" };
    json!({
        "date": format!("2025-05-{day:02}"),
        "campaign_name": campaign,
        "adset_name": format!("{campaign} - Broad"),
        "platform": platform,
        "country": "US",
        "creative_type": creative,
        "creative_message": message,
        "audience_type": audience,
        "spend": 100.0,
        "revenue": 100.0 * roas,
        "impressions": 10000,
        "clicks": (10000.0 * ctr) as u64,
        "purchases": 2,
        "ctr": ctr,
        "roas": roas
    })
}

fn dataset_file() -> NamedTempFile {
    let mut rows = Vec::new();
    for day in 1..=10 {
        rows.push(row(day, "Fading", "Facebook", "Video", 0.02, 8.0 - 0.5 * day as f64));
        rows.push(row(day, "Steady", "Instagram", "Image", 0.01, 2.5));
    }
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{}", Value::Array(rows)).unwrap();
    file
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn analyze_prints_report() {
    let data = dataset_file();
    let output = adlens_cmd()
        .arg("--data")
        .arg(data.path())
        .arg("analyze")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(
        report["query"],
        "Analyze ROAS fluctuations and recommend creative improvements"
    );
    let hypotheses = report["hypotheses"].as_array().unwrap();
    let validations = report["validations"].as_array().unwrap();
    assert_eq!(hypotheses.len(), validations.len());
    assert_eq!(hypotheses[0]["id"], "H1");
    assert_eq!(validations[0]["method"], "linear_regression");
}

#[test]
fn data_path_from_env() {
    let data = dataset_file();
    let output = adlens_cmd()
        .env("ADLENS_DATA", data.path())
        .args(["hypotheses", "--prioritize"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let hypotheses = stdout_json(&output);
    let priorities: Vec<&str> = hypotheses
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["priority"].as_str().unwrap())
        .collect();
    let first_medium = priorities.iter().position(|p| *p == "MEDIUM").unwrap();
    assert!(priorities[first_medium..].iter().all(|p| *p != "HIGH"));
}

#[test]
fn plan_needs_no_dataset() {
    let output = adlens_cmd()
        .args(["plan", "Compare", "Facebook", "vs", "Instagram"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let plan = stdout_json(&output);
    assert_eq!(plan[0]["task"]["kind"], "platform_comparison");
    assert_eq!(plan[0]["execution_order"], json!(["data", "hypotheses"]));
}

#[test]
fn missing_data_flag_is_config_error() {
    adlens_cmd()
        .arg("analyze")
        .assert()
        .code(78)
        .stderr(contains("ERROR:"))
        .stderr(contains("--data"));
}

#[test]
fn empty_dataset_is_data_error() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "[]").unwrap();
    adlens_cmd()
        .arg("--data")
        .arg(file.path())
        .arg("analyze")
        .assert()
        .code(65)
        .stderr(contains("ERROR: Empty dataset"));
}

#[test]
fn invalid_config_is_rejected() {
    let data = dataset_file();
    let mut config = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(config, "confidence_min: 1.5").unwrap();
    adlens_cmd()
        .arg("--data")
        .arg(data.path())
        .arg("--config")
        .arg(config.path())
        .arg("analyze")
        .assert()
        .code(78)
        .stderr(contains("confidence_min"));
}

#[test]
fn malformed_json_config_is_config_error() {
    let data = dataset_file();
    let mut config = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(config, r#"{{"confidence_min": "#).unwrap();
    adlens_cmd()
        .arg("--data")
        .arg(data.path())
        .arg("--config")
        .arg(config.path())
        .arg("analyze")
        .assert()
        .code(78)
        .stderr(contains("ERROR: Configuration error"));
}

#[test]
fn pretty_output_is_indented() {
    let output = adlens_cmd()
        .args(["--pretty", "plan", "audience", "review"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("\n  "));
}

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn mapkit() -> Command {
    Command::cargo_bin("mapkit").unwrap()
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

#[test]
fn list_shows_bundled_providers() {
    let assert = mapkit().args(["list", "--format", "json"]).assert().success();
    let out: serde_json::Value = serde_json::from_str(stdout_of(&assert).trim()).unwrap();
    let providers: Vec<&str> = out
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["provider"].as_str())
        .collect();
    assert_eq!(providers, vec!["address-validation", "weather"]);
    assert_eq!(out[1]["use_cases"][1], "ListWeatherStations");
}

#[test]
fn clean_address_with_empty_yaml_input_fails() {
    let tmp_dir = TempDir::new().unwrap();
    let input_path = tmp_dir.path().join("input.yaml");
    fs::write(
        &input_path,
        "street: \"\"\ncity: \"\"\nstate: \"\"\nzipcode: \"\"\n",
    )
    .unwrap();

    let assert = mapkit()
        .args([
            "run",
            "address-validation",
            "CleanAddress",
            "--input",
            input_path.to_str().unwrap(),
            "--format",
            "json",
        ])
        .assert()
        .code(3); // FAILURE_REPORT
    let out: serde_json::Value = serde_json::from_str(stdout_of(&assert).trim()).unwrap();
    assert_eq!(out, serde_json::json!({"failure": {"title": "Bad request"}}));
}

#[test]
fn missing_city_fails_before_any_request() {
    mapkit()
        .args(["run", "weather", "GetCurrentWeather", "--set", "city="])
        .assert()
        .code(3);
}

#[test]
fn unknown_use_case_is_a_runtime_error() {
    mapkit()
        .args(["run", "weather", "GetForecast"])
        .assert()
        .failure()
        .code(4); // FAULT
}

#[test]
fn unknown_provider_is_rejected() {
    mapkit()
        .args(["run", "nope", "Anything"])
        .assert()
        .code(2); // INVALID_INPUT
}

#[test]
fn malformed_inputs_are_rejected() {
    let tmp_dir = TempDir::new().unwrap();
    let input_path = tmp_dir.path().join("input.json");
    fs::write(&input_path, "{ not: [valid").unwrap();

    mapkit()
        .args([
            "run",
            "weather",
            "GetCurrentWeather",
            "--input",
            input_path.to_str().unwrap(),
        ])
        .assert()
        .code(2);

    mapkit()
        .args([
            "run",
            "weather",
            "GetCurrentWeather",
            "--service",
            "no-equals-sign",
        ])
        .assert()
        .code(2);
}

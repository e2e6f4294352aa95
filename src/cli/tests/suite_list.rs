mod common;
use common::{assert_json_subset, fixture_workspace, probe_cmd};
use serde_json::json;

fn source() -> String {
    fixture_workspace().to_string_lossy().to_string()
}

#[test]
fn test_suite_list_json() -> Result<(), Box<dyn std::error::Error>> {
    let output = probe_cmd()
        .args(["suite", "list", "-s", &source(), "-o", "json"])
        .output()?;
    assert!(output.status.success());

    let expected = json!([
        {"id": "empty", "name": "Empty", "items": 1},
        {"id": "regression", "name": "Regression", "items": 2},
        {"id": "smoke", "name": "Smoke", "items": 3}
    ]);
    assert_json_subset(&String::from_utf8_lossy(&output.stdout), &expected)?;
    Ok(())
}

#[test]
fn test_suite_list_text() -> Result<(), Box<dyn std::error::Error>> {
    let output = probe_cmd().args(["suite", "list", "-s", &source()]).output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Suites found:\n"), "got: {stdout}");
    assert!(stdout.contains("  name: Regression"), "got: {stdout}");
    Ok(())
}

#[test]
fn test_suite_list_empty_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = std::env::temp_dir().join(format!("probe_test_no_suites_{}", std::process::id()));
    std::fs::create_dir_all(&temp_dir)?;

    let output = probe_cmd()
        .args(["suite", "list", "-s", temp_dir.to_str().unwrap()])
        .output()?;
    let _ = std::fs::remove_dir_all(&temp_dir);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No suites found"));
    Ok(())
}

#[test]
fn test_suite_show_by_name() -> Result<(), Box<dyn std::error::Error>> {
    let output = probe_cmd()
        .args(["suite", "show", "-s", &source(), "-n", "smoke", "-o", "json"])
        .output()?;
    assert!(output.status.success());

    let expected = json!({
        "id": "smoke",
        "name": "Smoke",
        "defaultEnvId": "env-local",
        "defaultAuthId": "service-key",
        "settings": {"concurrentCalls": 2, "delayBetweenCalls": 0, "stopOnFailure": false},
        "items": [
            {"order": 0, "id": "item-list", "type": "request", "referenceId": "users:list-users", "enabled": true},
            {"order": 1, "id": "item-user", "type": "request", "testCases": 3},
            {"order": 2, "id": "item-onboarding", "type": "flow", "referenceId": "onboarding"}
        ]
    });
    assert_json_subset(&String::from_utf8_lossy(&output.stdout), &expected)?;
    Ok(())
}

#[test]
fn test_suite_show_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let output = probe_cmd()
        .args(["suite", "show", "-s", &source(), "-n", "nightly"])
        .output()?;

    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Suite not found: nightly"), "got: {stderr}");
    Ok(())
}

#[test]
fn test_suite_list_source_not_a_directory() -> Result<(), Box<dyn std::error::Error>> {
    let file = fixture_workspace().join("suites/smoke.json");
    let output = probe_cmd()
        .args(["suite", "list", "-s", file.to_str().unwrap()])
        .output()?;

    assert_eq!(output.status.code(), Some(4));
    Ok(())
}

#[test]
fn test_suite_list_missing_source() -> Result<(), Box<dyn std::error::Error>> {
    let output = probe_cmd()
        .args(["suite", "list", "-s", "tests/nonexistent_dir_12345"])
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Path does not exist"));
    Ok(())
}

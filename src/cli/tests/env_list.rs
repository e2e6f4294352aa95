mod common;
use common::{assert_json_subset, fixture_workspace, probe_cmd};
use serde_json::json;

#[test]
fn test_env_list_json() -> Result<(), Box<dyn std::error::Error>> {
    let source = fixture_workspace();
    let output = probe_cmd()
        .args(["env", "list", "-s", source.to_str().unwrap(), "-o", "json"])
        .output()?;
    assert!(output.status.success());

    // disabled variables are not counted
    let expected = json!([
        {"id": "env-global", "name": "global", "variables": 1},
        {"id": "env-local", "name": "Local", "variables": 1},
        {"id": "env-offline", "name": "Offline", "variables": 1}
    ]);
    assert_json_subset(&String::from_utf8_lossy(&output.stdout), &expected)?;
    Ok(())
}

#[test]
fn test_env_list_empty_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = std::env::temp_dir().join(format!("probe_test_no_envs_{}", std::process::id()));
    std::fs::create_dir_all(&temp_dir)?;

    let output = probe_cmd()
        .args(["env", "list", "-s", temp_dir.to_str().unwrap()])
        .output()?;
    let _ = std::fs::remove_dir_all(&temp_dir);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No environments found"), "got: {stdout}");
    Ok(())
}

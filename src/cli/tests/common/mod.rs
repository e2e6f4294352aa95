#![allow(dead_code)]
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const FIXTURE_WORKSPACE: &str = "tests/fixtures/workspace";

pub fn probe_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_probe"))
}

pub fn fixture_workspace() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(FIXTURE_WORKSPACE)
}

/// Copies the fixture workspace into a fresh temp directory, replacing
/// `{{MOCK_URL}}` in every file with `mock_url`.
pub fn workspace_with_mock(name: &str, mock_url: &str) -> PathBuf {
    let target = std::env::temp_dir().join(format!("probe_test_{name}_{}", std::process::id()));
    if target.exists() {
        fs::remove_dir_all(&target).unwrap();
    }
    copy_templated(&fixture_workspace(), &target, mock_url);
    target
}

fn copy_templated(from: &Path, to: &Path, mock_url: &str) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let path = entry.unwrap().path();
        let dest = to.join(path.file_name().unwrap());
        if path.is_dir() {
            copy_templated(&path, &dest, mock_url);
        } else {
            let content = fs::read_to_string(&path).unwrap();
            fs::write(dest, content.replace("{{MOCK_URL}}", mock_url)).unwrap();
        }
    }
}

pub fn json_subset(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(exp_map), Value::Object(act_map)) => {
            for (k, v) in exp_map {
                if let Some(act_v) = act_map.get(k) {
                    if !json_subset(v, act_v) {
                        return false;
                    }
                } else {
                    return false;
                }
            }
            true
        }
        (Value::Array(exp_arr), Value::Array(act_arr)) => {
            if exp_arr.len() != act_arr.len() {
                return false;
            }
            exp_arr
                .iter()
                .zip(act_arr.iter())
                .all(|(e, a)| json_subset(e, a))
        }
        (Value::String(s), _) if s == "{{*}}" => true,
        (Value::String(s), Value::String(a)) if s.starts_with("{{regex:") && s.ends_with("}}") => {
            let pattern = &s[8..s.len() - 2];
            regex::Regex::new(pattern).is_ok_and(|re| re.is_match(a))
        }
        _ => expected == actual,
    }
}

pub fn assert_json_subset(stdout: &str, expected: &Value) -> Result<(), String> {
    let actual: Value = serde_json::from_str(stdout)
        .map_err(|e| format!("Failed to parse actual JSON response: {e}\n{stdout}"))?;

    if !json_subset(expected, &actual) {
        return Err(format!(
            "JSON mismatch!\nExpected subset:\n{}\nActual:\n{}",
            serde_json::to_string_pretty(expected).unwrap(),
            serde_json::to_string_pretty(&actual).unwrap()
        ));
    }

    Ok(())
}

use probe_lib::client::Storage;
use probe_lib::core::error::EngineError;
use probe_lib::debug_log;
use probe_lib::model::{Auth, Collection, Environment, Flow, Suite, ValidationRule};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const COLLECTIONS_DIR: &str = "collections";
pub const FLOWS_DIR: &str = "flows";
pub const SUITES_DIR: &str = "suites";
pub const ENVIRONMENTS_DIR: &str = "environments";
pub const AUTHS_DIR: &str = "auths";
pub const RULES_DIR: &str = "rules";

/// A rules file holds either one rule or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum RulesFile {
    Many(Vec<ValidationRule>),
    One(ValidationRule),
}

/// Workspace directory with one JSON entity per `.json` file, grouped into
/// per-kind subdirectories that are searched recursively.
pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load_dir<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>, EngineError> {
        let mut files = Vec::new();
        collect_json_files(&self.root.join(kind), &mut files)?;
        files.sort();

        let mut entities = Vec::with_capacity(files.len());
        for path in files {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<T>(&content) {
                Ok(entity) => entities.push(entity),
                Err(e) => eprintln!("Warning: Failed to parse {}: {e}", path.display()),
            }
        }
        debug_log!("Loaded {} {kind} from {}", entities.len(), self.root.display());
        Ok(entities)
    }

    /// File currently holding the suite with `suite_id`, if any.
    fn find_suite_file(&self, suite_id: &str) -> Result<Option<PathBuf>, EngineError> {
        let mut files = Vec::new();
        collect_json_files(&self.root.join(SUITES_DIR), &mut files)?;
        for path in files {
            let content = fs::read_to_string(&path)?;
            if let Ok(suite) = serde_json::from_str::<Suite>(&content) {
                if suite.id == suite_id {
                    return Ok(Some(path));
                }
            }
        }
        Ok(None)
    }
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), EngineError> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path);
        }
    }
    Ok(())
}

impl Storage for JsonFileStorage {
    fn load_collections(&self) -> Result<Vec<Collection>, EngineError> {
        self.load_dir(COLLECTIONS_DIR)
    }

    fn load_flows(&self) -> Result<Vec<Flow>, EngineError> {
        self.load_dir(FLOWS_DIR)
    }

    fn load_test_suites(&self) -> Result<Vec<Suite>, EngineError> {
        self.load_dir(SUITES_DIR)
    }

    fn load_environments(&self) -> Result<Vec<Environment>, EngineError> {
        self.load_dir(ENVIRONMENTS_DIR)
    }

    fn load_auths(&self) -> Result<Vec<Auth>, EngineError> {
        self.load_dir(AUTHS_DIR)
    }

    fn load_global_rules(&self) -> Result<Vec<ValidationRule>, EngineError> {
        let files: Vec<RulesFile> = self.load_dir(RULES_DIR)?;
        Ok(files
            .into_iter()
            .flat_map(|file| match file {
                RulesFile::Many(rules) => rules,
                RulesFile::One(rule) => vec![rule],
            })
            .collect())
    }

    fn save_test_suite(&self, suite: &Suite) -> Result<(), EngineError> {
        let path = match self.find_suite_file(&suite.id)? {
            Some(path) => path,
            None => {
                let dir = self.root.join(SUITES_DIR);
                fs::create_dir_all(&dir)?;
                dir.join(format!("{}.json", suite.id))
            }
        };
        let json = serde_json::to_string_pretty(suite)?;
        fs::write(&path, json)?;
        debug_log!("Saved suite '{}' to {}", suite.id, path.display());
        Ok(())
    }

    fn delete_test_suite(&self, suite_id: &str) -> Result<(), EngineError> {
        let path = self
            .find_suite_file(suite_id)?
            .ok_or_else(|| EngineError::SuiteNotFound(suite_id.to_string()))?;
        fs::remove_file(&path)?;
        debug_log!("Deleted suite '{suite_id}' ({})", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_lib::model::{RequestTestItem, TestItem};

    fn temp_workspace(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("probe_storage_{name}_{}", std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).unwrap();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_directories_load_empty() {
        let root = temp_workspace("empty");
        let storage = JsonFileStorage::new(&root);
        assert!(storage.load_collections().unwrap().is_empty());
        assert!(storage.load_global_rules().unwrap().is_empty());
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_loads_nested_files_and_skips_bad_ones() {
        let root = temp_workspace("nested");
        write(&root, "environments/dev.json", r#"{"id": "e1", "name": "dev"}"#);
        write(
            &root,
            "environments/team/global.json",
            r#"{"id": "g", "name": "global", "variables": [{"key": "HOST", "value": "x"}]}"#,
        );
        write(&root, "environments/broken.json", "{ not json");
        write(&root, "environments/notes.txt", "ignored");

        let envs = JsonFileStorage::new(&root).load_environments().unwrap();
        let ids: Vec<&str> = envs.iter().map(|env| env.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "g"]);
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_rules_file_single_or_list() {
        let root = temp_workspace("rules");
        write(
            &root,
            "rules/one.json",
            r#"{"category": "status", "id": "ok", "operator": "is_success"}"#,
        );
        write(
            &root,
            "rules/many.json",
            r#"[{"category": "time", "id": "fast", "operator": "less_than", "value": 500},
                {"category": "header", "id": "json", "operator": "exists", "headerName": "Content-Type"}]"#,
        );

        let rules = JsonFileStorage::new(&root).load_global_rules().unwrap();
        let ids: Vec<&str> = rules.iter().map(|rule| rule.id()).collect();
        assert_eq!(ids, vec!["fast", "json", "ok"]);
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_save_and_delete_suite() {
        let root = temp_workspace("save");
        write(&root, "suites/nested/smoke.json", r#"{"id": "smoke", "name": "Smoke"}"#);
        let storage = JsonFileStorage::new(&root);

        let mut suite = storage.load_test_suites().unwrap().remove(0);
        suite.items.push(TestItem::Request(RequestTestItem::new("i1", "c1:r1", 0)));
        storage.save_test_suite(&suite).unwrap();
        assert!(!root.join("suites/smoke.json").exists());
        assert_eq!(storage.load_test_suites().unwrap()[0].items.len(), 1);

        storage.save_test_suite(&Suite::new("fresh", Vec::new())).unwrap();
        assert!(root.join("suites/fresh.json").exists());

        storage.delete_test_suite("smoke").unwrap();
        let ids: Vec<String> = storage
            .load_test_suites()
            .unwrap()
            .into_iter()
            .map(|suite| suite.id)
            .collect();
        assert_eq!(ids, vec!["fresh"]);
        assert!(matches!(
            storage.delete_test_suite("smoke"),
            Err(EngineError::SuiteNotFound(_))
        ));
        fs::remove_dir_all(root).ok();
    }
}

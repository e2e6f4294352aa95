use super::probe_client_models::{
    AuthListEntry, EnvListEntry, RunConfig, SuiteDetails, SuiteItemEntry, SuiteListEntry,
};
use super::storage::JsonFileStorage;
use crate::core::error::CliError;
use probe_lib::client::Storage;
use probe_lib::debug_log;
use probe_lib::model::{Suite, TestItem};
use probe_lib::runner::RunInput;
use std::path::Path;

fn matches_id_or_name(id: &str, name: &str, wanted: &str) -> bool {
    id == wanted || name.eq_ignore_ascii_case(wanted)
}

/// Read side of the CLI: lookups by id or name over a [`Storage`].
pub struct ProbeClient<S = JsonFileStorage> {
    storage: S,
}

impl ProbeClient<JsonFileStorage> {
    pub fn open(source_path: &Path) -> Result<Self, CliError> {
        if !source_path.exists() {
            return Err(CliError::DirectoryNotFound(source_path.display().to_string()));
        }
        if !source_path.is_dir() {
            return Err(CliError::NotADirectory(source_path.display().to_string()));
        }
        Ok(Self::new(JsonFileStorage::new(source_path)))
    }
}

impl<S: Storage> ProbeClient<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn list_suites(&self) -> Result<Vec<SuiteListEntry>, CliError> {
        let mut suites: Vec<SuiteListEntry> = self
            .storage
            .load_test_suites()?
            .into_iter()
            .map(|suite| SuiteListEntry {
                items: suite.items.len(),
                id: suite.id,
                name: suite.name,
            })
            .collect();
        suites.sort();
        Ok(suites)
    }

    fn find_suite(&self, wanted: &str) -> Result<Suite, CliError> {
        self.storage
            .load_test_suites()?
            .into_iter()
            .find(|suite| matches_id_or_name(&suite.id, &suite.name, wanted))
            .ok_or_else(|| CliError::SuiteNotFound(wanted.to_string()))
    }

    pub fn suite_details(&self, wanted: &str) -> Result<SuiteDetails, CliError> {
        let suite = self.find_suite(wanted)?;
        let items = suite
            .sorted_items()
            .into_iter()
            .map(|item| SuiteItemEntry {
                order: item.order(),
                id: item.id().to_string(),
                name: item.name().to_string(),
                item_type: item.as_str().to_string(),
                reference_id: item.reference_id().to_string(),
                enabled: item.enabled(),
                test_cases: match item {
                    TestItem::Request(request) => request.test_cases.as_ref().map(Vec::len),
                    TestItem::Flow(_) => None,
                },
            })
            .collect();

        Ok(SuiteDetails {
            id: suite.id,
            name: suite.name,
            default_env_id: suite.default_env_id,
            default_auth_id: suite.default_auth_id,
            settings: suite.settings,
            items,
        })
    }

    pub fn list_environments(&self) -> Result<Vec<EnvListEntry>, CliError> {
        let mut environments: Vec<EnvListEntry> = self
            .storage
            .load_environments()?
            .into_iter()
            .map(|env| EnvListEntry {
                variables: env.enabled_variables().count(),
                id: env.id,
                name: env.name,
            })
            .collect();
        environments.sort();
        Ok(environments)
    }

    pub fn list_auths(&self) -> Result<Vec<AuthListEntry>, CliError> {
        let mut auths: Vec<AuthListEntry> = self
            .storage
            .load_auths()?
            .iter()
            .map(|auth| AuthListEntry {
                id: auth.id().to_string(),
                name: auth.common().name.clone(),
                auth_type: auth.as_str().to_string(),
                enabled: auth.common().enabled,
                problem: auth.provider().validate().err().map(|e| e.to_string()),
            })
            .collect();
        auths.sort();
        Ok(auths)
    }

    /// Loads the suite and everything it can reference, resolving the
    /// environment and auth arguments from id or name to id.
    pub fn prepare_run(&self, config: &RunConfig) -> Result<RunInput, CliError> {
        let suite = self.find_suite(&config.suite)?;
        let environments = self.storage.load_environments()?;
        let auths = self.storage.load_auths()?;

        let env_id = match &config.environment {
            Some(wanted) => Some(
                environments
                    .iter()
                    .find(|env| matches_id_or_name(&env.id, &env.name, wanted))
                    .map(|env| env.id.clone())
                    .ok_or_else(|| CliError::EnvironmentNotFound(wanted.clone()))?,
            ),
            None => None,
        };
        let auth_id = match &config.auth {
            Some(wanted) => Some(
                auths
                    .iter()
                    .find(|auth| matches_id_or_name(auth.id(), &auth.common().name, wanted))
                    .map(|auth| auth.id().to_string())
                    .ok_or_else(|| CliError::AuthNotFound(wanted.clone()))?,
            ),
            None => None,
        };

        let mut input = RunInput::new(suite);
        input.collections = self.storage.load_collections()?;
        input.flows = self.storage.load_flows()?;
        input.global_rules = self.storage.load_global_rules()?;
        input.environments = environments;
        input.auths = auths;
        input.env_id = env_id;
        input.auth_id = auth_id;
        input.overrides = config.overrides.clone();

        debug_log!(
            "Prepared suite '{}' with {} collections, {} flows, {} environments, {} auths",
            input.suite.id,
            input.collections.len(),
            input.flows.len(),
            input.environments.len(),
            input.auths.len()
        );
        Ok(input)
    }
}

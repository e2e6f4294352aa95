use probe_lib::model::{
    Progress, RequestItemResult, RunOverrides, RunStatus, SuiteSettings, TestCaseResult,
    TestItemResult, TestSuiteRunResult, ValidationResult,
};
use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SuiteListEntry {
    pub id: String,
    pub name: String,
    pub items: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EnvListEntry {
    pub id: String,
    pub name: String,
    pub variables: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AuthListEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub auth_type: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SuiteItemEntry {
    pub order: u32,
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub reference_id: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<usize>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SuiteDetails {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_env_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_auth_id: Option<String>,
    pub settings: SuiteSettings,
    pub items: Vec<SuiteItemEntry>,
}

pub struct RunConfig {
    pub source_path: String,
    pub suite: String,
    pub environment: Option<String>,
    pub auth: Option<String>,
    pub overrides: RunOverrides,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CaseReport {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_rules: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_rules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test_cases: Vec<CaseReport>,
}

/// What `suite run` prints: the run tree without response bodies.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub suite: String,
    pub status: RunStatus,
    pub progress: Progress,
    pub average_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub items: Vec<ItemReport>,
}

fn failed_rules(validation: Option<&ValidationResult>) -> Vec<String> {
    validation
        .map(|validation| {
            validation
                .results
                .iter()
                .filter(|result| !result.passed)
                .map(|result| format!("{}: {}", result.rule_id, result.message))
                .collect()
        })
        .unwrap_or_default()
}

impl From<&TestCaseResult> for CaseReport {
    fn from(case: &TestCaseResult) -> Self {
        CaseReport {
            id: case.test_case_id.clone(),
            name: case.name.clone(),
            status: case.status.as_str().to_string(),
            validation: case.validation_status.map(|v| v.as_str().to_string()),
            http_status: case.response.as_ref().map(|r| r.status),
            elapsed_ms: case.response.as_ref().map(|r| r.elapsed_time),
            error: case.error.clone(),
            failed_rules: failed_rules(case.validation.as_ref()),
        }
    }
}

fn request_report(item: &RequestItemResult) -> ItemReport {
    ItemReport {
        id: item.item_id.clone(),
        name: item.name.clone(),
        item_type: "request".to_string(),
        status: item.status.as_str().to_string(),
        validation: item.validation_status.map(|v| v.as_str().to_string()),
        http_status: item.response.as_ref().map(|r| r.status),
        elapsed_ms: item.response.as_ref().map(|r| r.elapsed_time),
        error: item.error.clone(),
        failed_rules: failed_rules(item.validation.as_ref()),
        test_cases: item.test_case_results.values().map(CaseReport::from).collect(),
    }
}

impl From<&TestItemResult> for ItemReport {
    fn from(result: &TestItemResult) -> Self {
        match result {
            TestItemResult::Request(item) => request_report(item),
            TestItemResult::Flow(flow) => ItemReport {
                id: flow.item_id.clone(),
                name: flow.name.clone(),
                item_type: "flow".to_string(),
                status: flow.status.as_str().to_string(),
                validation: None,
                http_status: None,
                elapsed_ms: flow.flow_result.as_ref().map(|r| r.elapsed_time()),
                error: flow.error.clone(),
                failed_rules: Vec::new(),
                test_cases: Vec::new(),
            },
        }
    }
}

impl RunReport {
    pub fn new(suite_name: &str, result: &TestSuiteRunResult) -> Self {
        RunReport {
            run_id: result.run_id.clone(),
            suite: suite_name.to_string(),
            status: result.status,
            progress: result.progress,
            average_time_ms: (result.average_time * 100.0).round() / 100.0,
            error: result.error.clone(),
            items: result.item_results.values().map(ItemReport::from).collect(),
        }
    }
}

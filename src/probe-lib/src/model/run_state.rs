use super::flow::FlowRunResult;
use super::response::ResponseRecord;
use super::validation::ValidationResult;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Success,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            RunStatus::Success | RunStatus::Failed | RunStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

impl ItemStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ItemStatus::Success | ItemStatus::Failed | ItemStatus::Skipped
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Running => "running",
            ItemStatus::Success => "success",
            ItemStatus::Failed => "failed",
            ItemStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Pass,
    Fail,
}

impl ValidationStatus {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pass => "pass",
            ValidationStatus::Fail => "fail",
        }
    }
}

/// Counts invocations, not items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Whether an outcome counts against the run: a transport/build failure or a
/// failed validation.
pub fn is_failure(status: ItemStatus, validation_status: Option<ValidationStatus>) -> bool {
    status == ItemStatus::Failed || validation_status == Some(ValidationStatus::Fail)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub test_case_id: String,
    pub name: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_status: Option<ValidationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestCaseResult {
    pub fn is_failure(&self) -> bool {
        is_failure(self.status, self.validation_status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItemResult {
    pub item_id: String,
    pub name: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_status: Option<ValidationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub test_case_results: IndexMap<String, TestCaseResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowItemResult {
    pub item_id: String,
    pub name: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_result: Option<FlowRunResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TestItemResult {
    Request(RequestItemResult),
    Flow(FlowItemResult),
}

impl TestItemResult {
    pub fn status(&self) -> ItemStatus {
        match self {
            TestItemResult::Request(result) => result.status,
            TestItemResult::Flow(result) => result.status,
        }
    }

    pub fn validation_status(&self) -> Option<ValidationStatus> {
        match self {
            TestItemResult::Request(result) => result.validation_status,
            TestItemResult::Flow(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TestItemResult::Request(result) => result.error.as_deref(),
            TestItemResult::Flow(result) => result.error.as_deref(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TestItemResult::Request(result) => &result.name,
            TestItemResult::Flow(result) => &result.name,
        }
    }
}

/// Running sum behind `average_time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    pub total_ms: u64,
    pub samples: u64,
}

impl Timing {
    pub fn record(&mut self, elapsed_ms: u64) {
        self.total_ms += elapsed_ms;
        self.samples += 1;
    }

    pub fn average(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total_ms as f64 / self.samples as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteRunResult {
    pub run_id: String,
    pub suite_id: String,
    pub status: RunStatus,
    pub item_results: IndexMap<String, TestItemResult>,
    pub progress: Progress,
    pub average_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub timing: Timing,
}

impl TestSuiteRunResult {
    pub fn idle() -> Self {
        Self::default()
    }
}

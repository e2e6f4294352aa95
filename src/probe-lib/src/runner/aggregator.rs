use super::expander::{PlannedItem, PlannedKind};
use crate::model::{
    run_state::is_failure, FlowItemResult, FlowRunResult, ItemStatus, Progress, RequestItemResult,
    ResponseRecord, RunStatus, TestCaseResult, TestItemResult, TestSuiteRunResult,
    ValidationResult, ValidationStatus,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Outcome of one request invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub item_id: String,
    pub test_case_id: Option<String>,
    pub status: ItemStatus,
    pub validation_status: Option<ValidationStatus>,
    pub response: Option<ResponseRecord>,
    pub validation: Option<ValidationResult>,
    pub error: Option<String>,
}

impl RequestOutcome {
    pub fn failed(item_id: &str, test_case_id: Option<&str>, error: impl Into<String>) -> Self {
        RequestOutcome {
            item_id: item_id.to_string(),
            test_case_id: test_case_id.map(String::from),
            status: ItemStatus::Failed,
            validation_status: None,
            response: None,
            validation: None,
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        is_failure(self.status, self.validation_status)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowOutcome {
    pub item_id: String,
    pub status: ItemStatus,
    pub flow_result: Option<FlowRunResult>,
    pub error: Option<String>,
}

impl FlowOutcome {
    pub fn is_failure(&self) -> bool {
        self.status == ItemStatus::Failed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Started {
        run_id: String,
        suite_id: String,
        items: Vec<PlannedItem>,
        total: usize,
        at: DateTime<Utc>,
    },
    InvocationStarted {
        item_id: String,
        test_case_id: Option<String>,
    },
    RequestFinished(RequestOutcome),
    FlowFinished(FlowOutcome),
    /// Never dispatched: stop-on-failure or cancellation came first.
    InvocationSkipped {
        item_id: String,
        test_case_id: Option<String>,
    },
    Finished {
        status: RunStatus,
        at: DateTime<Utc>,
    },
    /// The run could not start.
    Aborted {
        error: String,
        at: DateTime<Utc>,
    },
    Reset,
}

/// Pure transition: the next run state after `event`.
pub fn reduce(mut state: TestSuiteRunResult, event: RunEvent) -> TestSuiteRunResult {
    apply(&mut state, event);
    state
}

/// In-place form of [`reduce`]; the only code that mutates run state.
pub fn apply(state: &mut TestSuiteRunResult, event: RunEvent) {
    match event {
        RunEvent::Started {
            run_id,
            suite_id,
            items,
            total,
            at,
        } => {
            *state = TestSuiteRunResult {
                run_id,
                suite_id,
                status: RunStatus::Running,
                item_results: items.iter().map(seed_item).collect(),
                progress: Progress {
                    total,
                    ..Default::default()
                },
                started_at: Some(at),
                ..Default::default()
            };
        }
        RunEvent::InvocationStarted {
            item_id,
            test_case_id,
        } => match state.item_results.get_mut(&item_id) {
            Some(TestItemResult::Request(item)) => {
                set_request_status(item, test_case_id.as_deref(), ItemStatus::Running)
            }
            Some(TestItemResult::Flow(item)) => item.status = ItemStatus::Running,
            None => {}
        },
        RunEvent::RequestFinished(outcome) => {
            state.progress.completed += 1;
            if outcome.is_failure() {
                state.progress.failed += 1;
            } else {
                state.progress.passed += 1;
            }
            if let Some(response) = &outcome.response {
                state.timing.record(response.elapsed_time);
                state.average_time = state.timing.average();
            }
            if let Some(TestItemResult::Request(item)) = state.item_results.get_mut(&outcome.item_id)
            {
                record_request(item, outcome);
            }
        }
        RunEvent::FlowFinished(outcome) => {
            state.progress.completed += 1;
            if outcome.is_failure() {
                state.progress.failed += 1;
            } else {
                state.progress.passed += 1;
            }
            if let Some(flow_result) = &outcome.flow_result {
                if flow_result.node_results.values().any(|n| n.elapsed_time.is_some()) {
                    state.timing.record(flow_result.elapsed_time());
                    state.average_time = state.timing.average();
                }
            }
            if let Some(TestItemResult::Flow(item)) = state.item_results.get_mut(&outcome.item_id) {
                item.status = outcome.status;
                item.flow_result = outcome.flow_result;
                item.error = outcome.error;
            }
        }
        RunEvent::InvocationSkipped {
            item_id,
            test_case_id,
        } => {
            state.progress.completed += 1;
            state.progress.skipped += 1;
            match state.item_results.get_mut(&item_id) {
                Some(TestItemResult::Request(item)) => {
                    set_request_status(item, test_case_id.as_deref(), ItemStatus::Skipped)
                }
                Some(TestItemResult::Flow(item)) => item.status = ItemStatus::Skipped,
                None => {}
            }
        }
        RunEvent::Finished { status, at } => {
            state.status = status;
            state.finished_at = Some(at);
        }
        RunEvent::Aborted { error, at } => {
            state.status = RunStatus::Failed;
            state.error = Some(error);
            state.finished_at = Some(at);
        }
        RunEvent::Reset => *state = TestSuiteRunResult::idle(),
    }
}

fn seed_item(planned: &PlannedItem) -> (String, TestItemResult) {
    let status = if planned.skipped {
        ItemStatus::Skipped
    } else {
        ItemStatus::Pending
    };
    let result = match planned.kind {
        PlannedKind::Request => TestItemResult::Request(RequestItemResult {
            item_id: planned.item_id.clone(),
            name: planned.name.clone(),
            status,
            test_case_results: planned
                .test_cases
                .iter()
                .map(|(id, name)| {
                    (
                        id.clone(),
                        TestCaseResult {
                            test_case_id: id.clone(),
                            name: name.clone(),
                            ..Default::default()
                        },
                    )
                })
                .collect::<IndexMap<_, _>>(),
            ..Default::default()
        }),
        PlannedKind::Flow => TestItemResult::Flow(FlowItemResult {
            item_id: planned.item_id.clone(),
            name: planned.name.clone(),
            status,
            ..Default::default()
        }),
    };
    (planned.item_id.clone(), result)
}

fn set_request_status(item: &mut RequestItemResult, test_case_id: Option<&str>, status: ItemStatus) {
    match test_case_id {
        Some(case_id) => {
            if let Some(case) = item.test_case_results.get_mut(case_id) {
                case.status = status;
            }
            recompute_item(item);
        }
        None => item.status = status,
    }
}

fn record_request(item: &mut RequestItemResult, outcome: RequestOutcome) {
    match outcome.test_case_id {
        Some(case_id) => {
            let case = item
                .test_case_results
                .entry(case_id.clone())
                .or_insert_with(|| TestCaseResult {
                    test_case_id: case_id,
                    ..Default::default()
                });
            case.status = outcome.status;
            case.validation_status = outcome.validation_status;
            case.response = outcome.response;
            case.validation = outcome.validation;
            case.error = outcome.error;
            recompute_item(item);
        }
        None => {
            item.status = outcome.status;
            item.validation_status = outcome.validation_status;
            item.response = outcome.response;
            item.validation = outcome.validation;
            item.error = outcome.error;
        }
    }
}

/// Derives the item's status from its cases: failed if any case failed,
/// running while any case is unfinished, skipped only if every case was.
fn recompute_item(item: &mut RequestItemResult) {
    let cases = || item.test_case_results.values();
    if cases().next().is_none() {
        return;
    }

    let status = if cases().any(|c| c.status == ItemStatus::Failed) {
        ItemStatus::Failed
    } else if cases().all(|c| c.status.is_terminal()) {
        if cases().all(|c| c.status == ItemStatus::Skipped) {
            ItemStatus::Skipped
        } else {
            ItemStatus::Success
        }
    } else if cases().all(|c| c.status == ItemStatus::Pending) {
        ItemStatus::Pending
    } else {
        ItemStatus::Running
    };

    let validation_status = if cases().any(|c| c.validation_status == Some(ValidationStatus::Fail))
    {
        Some(ValidationStatus::Fail)
    } else if cases().any(|c| c.validation_status == Some(ValidationStatus::Pass)) {
        Some(ValidationStatus::Pass)
    } else {
        None
    };

    item.status = status;
    item.validation_status = validation_status;
}

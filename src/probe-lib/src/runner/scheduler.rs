use super::aggregator::{apply, FlowOutcome, RequestOutcome, RunEvent};
use super::cancel::CancelToken;
use super::expander::{plan, Invocation, WorkUnit};
use crate::auth::select;
use crate::client::{FlowContext, FlowExecutor, HttpExecutor};
use crate::core::error::EngineError;
use crate::debug_log;
use crate::model::{
    Auth, Collection, Environment, Flow, ItemStatus, Progress, ResponseRecord, RunOverrides,
    RunStatus, Suite, SuiteSettings, TestSuiteRunResult, ValidationResult, ValidationRule,
    ValidationStatus,
};
use crate::request::{build, preview_url};
use crate::resolve::{find_flow, find_request, resolve, VariableTable};
use crate::validation::{evaluate, global_rules_by_id, GlobalRules};
use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// Live summary published after every state change.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunProgress {
    pub status: RunStatus,
    pub progress: Progress,
    pub average_time: f64,
}

/// A suite together with everything it references.
#[derive(Debug, Clone)]
pub struct RunInput {
    pub suite: Suite,
    pub collections: Vec<Collection>,
    pub flows: Vec<Flow>,
    pub environments: Vec<Environment>,
    pub auths: Vec<Auth>,
    pub global_rules: Vec<ValidationRule>,
    /// Falls back to the suite's `defaultEnvId`.
    pub env_id: Option<String>,
    /// Falls back to the suite's `defaultAuthId`.
    pub auth_id: Option<String>,
    pub overrides: RunOverrides,
}

impl RunInput {
    pub fn new(suite: Suite) -> Self {
        RunInput {
            suite,
            collections: Vec::new(),
            flows: Vec::new(),
            environments: Vec::new(),
            auths: Vec::new(),
            global_rules: Vec::new(),
            env_id: None,
            auth_id: None,
            overrides: RunOverrides::default(),
        }
    }
}

struct RunContext<'a> {
    input: &'a RunInput,
    settings: SuiteSettings,
    env_id: Option<&'a str>,
    default_auth_id: Option<&'a str>,
    global_rules: GlobalRules<'a>,
}

/// Runs suites batch by batch and owns the run state.
///
/// All state changes go through the aggregator reducer; `subscribe` exposes a
/// progress snapshot after each one and `snapshot` the full result tree.
pub struct SuiteRunner<H, F> {
    http: H,
    flows: F,
    state: Mutex<TestSuiteRunResult>,
    progress: watch::Sender<RunProgress>,
    cancel: CancelToken,
    refreshed: tokio::sync::Mutex<HashMap<String, Auth>>,
}

impl<H: HttpExecutor, F: FlowExecutor> SuiteRunner<H, F> {
    pub fn new(http: H, flows: F) -> Self {
        let (progress, _) = watch::channel(RunProgress::default());
        SuiteRunner {
            http,
            flows,
            state: Mutex::new(TestSuiteRunResult::idle()),
            progress,
            cancel: CancelToken::new(),
            refreshed: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Shares an externally owned token, e.g. one a signal handler holds.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<RunProgress> {
        self.progress.subscribe()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Stops the run at the next batch boundary.
    pub fn cancel(&self) {
        debug_log!("Cancellation requested");
        self.cancel.cancel();
    }

    pub fn reset(&self) {
        self.cancel.reset();
        self.dispatch(RunEvent::Reset);
    }

    pub fn snapshot(&self) -> TestSuiteRunResult {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn dispatch(&self, event: RunEvent) {
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            apply(&mut state, event);
            RunProgress {
                status: state.status,
                progress: state.progress,
                average_time: state.average_time,
            }
        };
        self.progress.send_replace(snapshot);
    }

    pub async fn run_suite(&self, input: &RunInput) -> TestSuiteRunResult {
        self.cancel.reset();
        self.refreshed.lock().await.clear();

        let suite = &input.suite;
        let settings = suite.settings.with_overrides(&input.overrides);
        let plan = plan(suite);
        let batch_size = settings.batch_size();

        self.dispatch(RunEvent::Started {
            run_id: Uuid::new_v4().to_string(),
            suite_id: suite.id.clone(),
            items: plan.items.clone(),
            total: plan.units.len(),
            at: Utc::now(),
        });

        if plan.units.is_empty() {
            debug_log!("Suite '{}' has nothing to run", suite.id);
            self.dispatch(RunEvent::Aborted {
                error: EngineError::NothingToRun(suite.id.clone()).to_string(),
                at: Utc::now(),
            });
            return self.snapshot();
        }

        let batch_count = plan.batch_count(batch_size);
        debug_log!(
            "Running suite '{}': {} invocations in {} batches",
            suite.id,
            plan.units.len(),
            batch_count
        );

        let context = RunContext {
            input,
            env_id: input.env_id.as_deref().or(suite.default_env_id.as_deref()),
            default_auth_id: input.auth_id.as_deref().or(suite.default_auth_id.as_deref()),
            global_rules: global_rules_by_id(&input.global_rules),
            settings,
        };

        let mut dispatched = 0;
        for (index, batch) in plan.units.chunks(batch_size).enumerate() {
            if index > 0 {
                if self.cancel.is_cancelled() {
                    break;
                }
                if context.settings.delay_between_calls > 0 {
                    tokio::time::sleep(Duration::from_millis(context.settings.delay_between_calls))
                        .await;
                }
            }
            if self.cancel.is_cancelled() {
                break;
            }

            debug_log!(
                "Dispatching batch {}/{} ({} invocations)",
                index + 1,
                batch_count,
                batch.len()
            );
            let failures = join_all(batch.iter().map(|unit| self.run_guarded(&context, unit))).await;
            dispatched += batch.len();

            if context.settings.stop_on_failure && failures.into_iter().any(|failed| failed) {
                debug_log!("Stop on failure: batch {} had a failure", index + 1);
                break;
            }
        }

        // a cancel that lands during the last batch leaves nothing to stop
        let cancelled = self.cancel.is_cancelled() && dispatched < plan.units.len();
        if cancelled {
            debug_log!(
                "Run cancelled with {} invocations left",
                plan.units.len() - dispatched
            );
        }
        for unit in &plan.units[dispatched..] {
            self.dispatch(RunEvent::InvocationSkipped {
                item_id: unit.item_id().to_string(),
                test_case_id: unit.test_case_id().map(String::from),
            });
        }

        let status = if cancelled {
            RunStatus::Cancelled
        } else if self.snapshot().progress.failed > 0 {
            RunStatus::Failed
        } else {
            RunStatus::Success
        };
        self.dispatch(RunEvent::Finished {
            status,
            at: Utc::now(),
        });
        self.snapshot()
    }

    /// Runs one unit and records its outcome. A panic inside the unit becomes
    /// a failed result for that unit only. Returns whether the unit failed.
    async fn run_guarded(&self, context: &RunContext<'_>, unit: &WorkUnit) -> bool {
        self.dispatch(RunEvent::InvocationStarted {
            item_id: unit.item_id().to_string(),
            test_case_id: unit.test_case_id().map(String::from),
        });

        let event = match AssertUnwindSafe(self.run_unit(context, unit))
            .catch_unwind()
            .await
        {
            Ok(event) => event,
            Err(panic) => {
                let error = format!("Internal error: {}", panic_message(panic.as_ref()));
                debug_log!("Invocation of '{}' panicked: {error}", unit.item_id());
                match unit {
                    WorkUnit::Request(invocation) => RunEvent::RequestFinished(RequestOutcome::failed(
                        &invocation.item_id,
                        invocation.test_case_id.as_deref(),
                        error,
                    )),
                    WorkUnit::Flow { item_id, .. } => RunEvent::FlowFinished(FlowOutcome {
                        item_id: item_id.clone(),
                        status: ItemStatus::Failed,
                        flow_result: None,
                        error: Some(error),
                    }),
                }
            }
        };

        let failed = match &event {
            RunEvent::RequestFinished(outcome) => outcome.is_failure(),
            RunEvent::FlowFinished(outcome) => outcome.is_failure(),
            _ => false,
        };
        self.dispatch(event);
        failed
    }

    async fn run_unit(&self, context: &RunContext<'_>, unit: &WorkUnit) -> RunEvent {
        match unit {
            WorkUnit::Request(invocation) => {
                RunEvent::RequestFinished(self.run_request(context, invocation).await)
            }
            WorkUnit::Flow {
                item_id,
                reference_id,
                ..
            } => RunEvent::FlowFinished(self.run_flow(context, item_id, reference_id).await),
        }
    }

    async fn run_request(&self, context: &RunContext<'_>, invocation: &Invocation) -> RequestOutcome {
        let test_case_id = invocation.test_case_id.as_deref();
        let label = match &invocation.test_case_name {
            Some(case) => format!("{} [{case}]", invocation.item_name),
            None => invocation.item_name.clone(),
        };

        match self.execute_request(context, invocation).await {
            Ok((response, validation)) => {
                let validation_status = ValidationStatus::from_passed(validation.all_passed);
                debug_log!(
                    "{label}: {} in {}ms, validation {:?}",
                    response.status,
                    response.elapsed_time,
                    validation_status
                );
                RequestOutcome {
                    item_id: invocation.item_id.clone(),
                    test_case_id: test_case_id.map(String::from),
                    status: ItemStatus::Success,
                    validation_status: Some(validation_status),
                    response: Some(response),
                    validation: Some(validation),
                    error: None,
                }
            }
            Err(e) => {
                debug_log!("{label}: failed: {e}");
                RequestOutcome::failed(&invocation.item_id, test_case_id, e.to_string())
            }
        }
    }

    async fn execute_request(
        &self,
        context: &RunContext<'_>,
        invocation: &Invocation,
    ) -> Result<(ResponseRecord, ValidationResult), EngineError> {
        let input = context.input;
        let template = find_request(&input.collections, &invocation.reference_id)?;
        let overrides = invocation.override_data.as_ref();

        let table = resolve(
            &input.environments,
            context.env_id,
            overrides.and_then(|data| data.variables.as_ref()),
        );
        let selected = select(
            template.auth_id.as_deref(),
            context.default_auth_id,
            overrides.and_then(|data| data.auth_id.as_deref()),
            &input.auths,
            &preview_url(template, &table),
        );
        let auth = self.fresh_auth(selected, &table).await;

        let mut request = build(template, overrides, &table, auth.as_ref())?;
        request.timeout_ms = context.settings.request_timeout_ms;

        let response = self
            .http
            .execute(&request)
            .await
            .map_err(EngineError::Transport)?;
        let validation = evaluate(
            &invocation.effective_validation,
            &response,
            &context.global_rules,
            &table,
        );
        Ok((response, validation))
    }

    /// The selected auth, with an OAuth2 token refreshed first when it has
    /// expired. Refreshes happen once per auth per run; a failed refresh keeps
    /// the stored token.
    async fn fresh_auth(&self, selected: Option<&Auth>, table: &VariableTable) -> Option<Auth> {
        let auth = selected?;
        let Auth::OAuth2Refresh(oauth) = auth else {
            return Some(auth.clone());
        };
        let now = Utc::now();
        if !oauth.needs_refresh(now) {
            return Some(auth.clone());
        }

        let mut refreshed = self.refreshed.lock().await;
        if let Some(cached) = refreshed.get(auth.id()) {
            return Some(cached.clone());
        }
        let fresh = match oauth.refresh(&self.http, table, now).await {
            Ok(fresh) => {
                debug_log!("Refreshed token for auth '{}'", auth.id());
                Auth::OAuth2Refresh(fresh)
            }
            Err(e) => {
                debug_log!("Token refresh for auth '{}' failed: {e}", auth.id());
                auth.clone()
            }
        };
        refreshed.insert(auth.id().to_string(), fresh.clone());
        Some(fresh)
    }

    async fn run_flow(&self, context: &RunContext<'_>, item_id: &str, reference_id: &str) -> FlowOutcome {
        let input = context.input;
        let flow = match find_flow(&input.flows, reference_id) {
            Ok(flow) => flow,
            Err(e) => {
                debug_log!("Flow item '{item_id}': {e}");
                return FlowOutcome {
                    item_id: item_id.to_string(),
                    status: ItemStatus::Failed,
                    flow_result: None,
                    error: Some(e.to_string()),
                };
            }
        };

        let table = resolve(&input.environments, context.env_id, None);
        let result = self
            .flows
            .run(
                flow,
                FlowContext {
                    collections: &input.collections,
                    auths: &input.auths,
                    variables: &table,
                    default_auth_id: context.default_auth_id,
                    timeout_ms: context.settings.request_timeout_ms,
                },
            )
            .await;

        let status = if result.status == RunStatus::Success {
            ItemStatus::Success
        } else {
            ItemStatus::Failed
        };
        debug_log!("Flow '{}': {}", flow.id, result.status.as_str());
        FlowOutcome {
            item_id: item_id.to_string(),
            status,
            error: result.error.clone(),
            flow_result: Some(result),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "panic"
    }
}

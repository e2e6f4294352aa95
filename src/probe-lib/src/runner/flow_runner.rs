use crate::auth::select;
use crate::client::{FlowContext, FlowExecutor, FlowFuture, HttpExecutor};
use crate::core::error::EngineError;
use crate::debug_log;
use crate::model::{
    Flow, FlowNode, FlowNodeResult, FlowRunResult, ItemStatus, Progress, ResponseRecord, RunStatus,
};
use crate::request::{build, preview_url};
use crate::resolve::find_request;
use std::collections::{HashMap, VecDeque};

/// Runs a flow's nodes one at a time in dependency order.
pub struct SequentialFlowRunner<H> {
    http: H,
}

impl<H: HttpExecutor> SequentialFlowRunner<H> {
    pub fn new(http: H) -> Self {
        SequentialFlowRunner { http }
    }

    async fn run_flow(&self, flow: &Flow, context: FlowContext<'_>) -> FlowRunResult {
        let order = match execution_order(flow) {
            Ok(order) => order,
            Err(e) => {
                debug_log!("Flow '{}' not runnable: {e}", flow.id);
                return FlowRunResult::failed(&flow.id, e);
            }
        };

        let mut result = FlowRunResult {
            flow_id: flow.id.clone(),
            status: RunStatus::Running,
            node_results: flow
                .nodes
                .iter()
                .map(|node| {
                    (
                        node.id.clone(),
                        FlowNodeResult {
                            node_id: node.id.clone(),
                            ..Default::default()
                        },
                    )
                })
                .collect(),
            progress: Progress {
                total: flow.nodes.len(),
                ..Default::default()
            },
            error: None,
        };

        for node in order {
            let upstream_ok = flow
                .connections
                .iter()
                .filter(|connection| connection.to == node.id)
                .all(|connection| {
                    result
                        .node_results
                        .get(&connection.from)
                        .is_some_and(|upstream| upstream.status == ItemStatus::Success)
                });

            let node_result = if upstream_ok {
                self.run_node(node, context).await
            } else {
                debug_log!("Skipping node '{}': upstream did not succeed", node.id);
                FlowNodeResult {
                    node_id: node.id.clone(),
                    status: ItemStatus::Skipped,
                    ..Default::default()
                }
            };

            result.progress.completed += 1;
            match node_result.status {
                ItemStatus::Success => result.progress.passed += 1,
                ItemStatus::Skipped => result.progress.skipped += 1,
                _ => result.progress.failed += 1,
            }
            result.node_results.insert(node.id.clone(), node_result);
        }

        if result.progress.failed > 0 || result.progress.skipped > 0 {
            result.status = RunStatus::Failed;
            result.error = Some(format!(
                "{} of {} nodes did not succeed",
                result.progress.failed + result.progress.skipped,
                result.progress.total
            ));
        } else {
            result.status = RunStatus::Success;
        }
        result
    }

    async fn run_node(&self, node: &FlowNode, context: FlowContext<'_>) -> FlowNodeResult {
        match self.execute_node(node, context).await {
            Ok(response) => {
                let status = if response.status < 400 {
                    ItemStatus::Success
                } else {
                    ItemStatus::Failed
                };
                FlowNodeResult {
                    node_id: node.id.clone(),
                    status,
                    status_code: Some(response.status),
                    elapsed_time: Some(response.elapsed_time),
                    error: (status == ItemStatus::Failed)
                        .then(|| format!("{} {}", response.status, response.status_text)),
                }
            }
            Err(e) => FlowNodeResult {
                node_id: node.id.clone(),
                status: ItemStatus::Failed,
                error: Some(e.to_string()),
                ..Default::default()
            },
        }
    }

    async fn execute_node(
        &self,
        node: &FlowNode,
        context: FlowContext<'_>,
    ) -> Result<ResponseRecord, EngineError> {
        let template = find_request(context.collections, &node.reference_id)?;
        let auth = select(
            template.auth_id.as_deref(),
            context.default_auth_id,
            None,
            context.auths,
            &preview_url(template, context.variables),
        );
        let mut request = build(template, None, context.variables, auth)?;
        request.timeout_ms = context.timeout_ms;

        debug_log!("Flow node '{}' -> {} {}", node.id, request.method, request.url);
        self.http
            .execute(&request)
            .await
            .map_err(EngineError::Transport)
    }
}

impl<H: HttpExecutor> FlowExecutor for SequentialFlowRunner<H> {
    fn run<'a>(&'a self, flow: &'a Flow, context: FlowContext<'a>) -> FlowFuture<'a> {
        Box::pin(self.run_flow(flow, context))
    }
}

/// Kahn's algorithm over the flow graph. Nodes that become ready together run
/// in declaration order.
fn execution_order(flow: &Flow) -> Result<Vec<&FlowNode>, String> {
    let position: HashMap<&str, usize> = flow
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect();

    let mut in_degree = vec![0usize; flow.nodes.len()];
    let mut downstream: Vec<Vec<usize>> = vec![Vec::new(); flow.nodes.len()];
    for connection in &flow.connections {
        let (Some(&from), Some(&to)) = (
            position.get(connection.from.as_str()),
            position.get(connection.to.as_str()),
        ) else {
            return Err(format!(
                "Connection {} -> {} references an unknown node",
                connection.from, connection.to
            ));
        };
        downstream[from].push(to);
        in_degree[to] += 1;
    }

    let mut ready: VecDeque<usize> = (0..flow.nodes.len())
        .filter(|index| in_degree[*index] == 0)
        .collect();
    let mut order = Vec::with_capacity(flow.nodes.len());
    while let Some(index) = ready.pop_front() {
        order.push(&flow.nodes[index]);
        let mut released = Vec::new();
        for &next in &downstream[index] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                released.push(next);
            }
        }
        released.sort_unstable();
        ready.extend(released);
    }

    if order.len() != flow.nodes.len() {
        return Err(format!("Flow '{}' contains a cycle", flow.id));
    }
    Ok(order)
}

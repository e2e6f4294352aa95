use super::run_state::{ItemStatus, Progress, RunStatus};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Request template this node executes, in `referenceId` form.
    pub reference_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConnection {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub connections: Vec<FlowConnection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodeResult {
    pub node_id: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRunResult {
    pub flow_id: String,
    pub status: RunStatus,
    pub node_results: IndexMap<String, FlowNodeResult>,
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FlowRunResult {
    pub fn failed(flow_id: &str, error: impl Into<String>) -> Self {
        FlowRunResult {
            flow_id: flow_id.to_string(),
            status: RunStatus::Failed,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Sum of node response times.
    pub fn elapsed_time(&self) -> u64 {
        self.node_results
            .values()
            .filter_map(|node| node.elapsed_time)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_flow() {
        let json = r#"{"id": "f1", "name": "Login then fetch",
            "nodes": [{"id": "n1", "referenceId": "c1:login"}, {"id": "n2", "referenceId": "c1:me"}],
            "connections": [{"from": "n1", "to": "n2"}]}"#;
        let flow: Flow = serde_json::from_str(json).unwrap();
        assert_eq!(flow.nodes.len(), 2);
        assert_eq!(flow.connections[0].to, "n2");
    }

    #[test]
    fn test_failed_result() {
        let result = FlowRunResult::failed("f1", "cycle detected");
        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.elapsed_time(), 0);
    }
}

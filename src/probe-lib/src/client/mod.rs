pub mod http;

pub use http::ReqwestExecutor;

use crate::core::error::EngineError;
use crate::model::{
    Auth, Collection, Environment, Flow, FlowRunResult, ResponseRecord, Suite, ValidationRule,
};
use crate::request::ResolvedRequest;
use crate::resolve::VariableTable;
use std::future::Future;
use std::pin::Pin;

pub type ExecFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ResponseRecord, String>> + Send + 'a>>;

pub type FlowFuture<'a> = Pin<Box<dyn Future<Output = FlowRunResult> + Send + 'a>>;

/// Sends one fully resolved request. Transport failures come back as `Err`
/// with a readable message; implementations must not panic.
pub trait HttpExecutor: Send + Sync {
    fn execute<'a>(&'a self, request: &'a ResolvedRequest) -> ExecFuture<'a>;
}

/// Everything a flow needs to run its nodes.
#[derive(Clone, Copy)]
pub struct FlowContext<'a> {
    pub collections: &'a [Collection],
    pub auths: &'a [Auth],
    pub variables: &'a VariableTable,
    pub default_auth_id: Option<&'a str>,
    pub timeout_ms: Option<u64>,
}

pub trait FlowExecutor: Send + Sync {
    fn run<'a>(&'a self, flow: &'a Flow, context: FlowContext<'a>) -> FlowFuture<'a>;
}

/// Where suites and the entities they reference are kept.
pub trait Storage {
    fn load_collections(&self) -> Result<Vec<Collection>, EngineError>;
    fn load_flows(&self) -> Result<Vec<Flow>, EngineError>;
    fn load_test_suites(&self) -> Result<Vec<Suite>, EngineError>;
    fn load_environments(&self) -> Result<Vec<Environment>, EngineError>;
    fn load_auths(&self) -> Result<Vec<Auth>, EngineError>;
    fn load_global_rules(&self) -> Result<Vec<ValidationRule>, EngineError>;
    fn save_test_suite(&self, suite: &Suite) -> Result<(), EngineError>;
    fn delete_test_suite(&self, suite_id: &str) -> Result<(), EngineError>;
}

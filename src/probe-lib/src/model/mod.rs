pub mod auth;
pub mod collection;
pub mod environment;
pub mod flow;
pub mod http_method;
pub mod response;
pub mod run_state;
pub mod suite;
pub mod validation;

pub use auth::{
    ApiKeyAuth, ApiKeyLocation, Auth, AuthCommon, BasicAuth, DigestAuth, OAuth2RefreshAuth,
};
pub use collection::{Collection, CollectionItem, KeyValue, RawLanguage, RequestBody, RequestTemplate};
pub use environment::{EnvVariable, Environment};
pub use flow::{Flow, FlowConnection, FlowNode, FlowNodeResult, FlowRunResult};
pub use http_method::HttpMethod;
pub use response::ResponseRecord;
pub use run_state::{
    FlowItemResult, ItemStatus, Progress, RequestItemResult, RunStatus, TestCaseResult,
    TestItemResult, TestSuiteRunResult, ValidationStatus,
};
pub use suite::{
    FlowTestItem, RequestTestItem, RunOverrides, Suite, SuiteSettings, TestCase, TestCaseData,
    TestItem,
};
pub use validation::{
    BodyOperator, BodyRule, HeaderOperator, HeaderRule, RequestValidation, RuleCategory,
    RuleEntry, RuleResult, StatusOperator, StatusRule, TimeOperator, TimeRule, ValidationResult,
    ValidationRule,
};

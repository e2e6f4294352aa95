pub mod aggregator;
pub mod cancel;
pub mod expander;
pub mod flow_runner;
pub mod scheduler;

pub use aggregator::{reduce, FlowOutcome, RequestOutcome, RunEvent};
pub use cancel::CancelToken;
pub use expander::{expand, plan, Expansion, Invocation, RunPlan, WorkUnit};
pub use flow_runner::SequentialFlowRunner;
pub use scheduler::{RunInput, RunProgress, SuiteRunner};

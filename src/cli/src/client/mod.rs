mod probe_client;
mod probe_client_models;
mod storage;

pub use probe_client::ProbeClient;
pub use probe_client_models::{RunConfig, RunReport};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Suite '{0}' has nothing to run: no enabled items or test cases")]
    NothingToRun(String),
    #[error("Suite not found: {0}")]
    SuiteNotFound(String),
    #[error("Environment not found: {0}")]
    EnvironmentNotFound(String),
    #[error("Request not found: {0}")]
    RequestNotFound(String),
    #[error("Flow not found: {0}")]
    FlowNotFound(String),
    #[error("{0}")]
    InvalidAuth(String),
    #[error("Unresolved variables: {}", .0.join(", "))]
    UnresolvedVariables(Vec<String>),
    #[error("HTTP Error: {0}")]
    Transport(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Names carried by an unresolved-variable error, empty for every other kind.
    pub fn unresolved_names(&self) -> &[String] {
        match self {
            EngineError::UnresolvedVariables(names) => names,
            _ => &[],
        }
    }
}

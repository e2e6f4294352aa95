use probe_lib::core::error::EngineError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Suite not found: {0}")]
    SuiteNotFound(String),
    #[error("Environment not found: {0}")]
    EnvironmentNotFound(String),
    #[error("Auth not found: {0}")]
    AuthNotFound(String),
    #[error("Run aborted: {0}")]
    RunAborted(String),
    #[error("{0}")]
    TestFailure(String),
    #[error("{0}")]
    Cancelled(String),
    #[error("{0}")]
    Generic(String),
}

impl From<String> for CliError {
    fn from(msg: String) -> Self {
        CliError::Generic(msg)
    }
}

impl From<&str> for CliError {
    fn from(msg: &str) -> Self {
        CliError::Generic(msg.to_string())
    }
}

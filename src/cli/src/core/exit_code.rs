use crate::core::error::CliError;
use probe_lib::core::error::EngineError;

/// Exit codes for the probe CLI
/// Following standard Unix/POSIX conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General/unspecified error
    GeneralError = 1,
    /// Invalid arguments (reported by clap)
    UsageError = 2,
    /// Configuration error (auth, environment, suite settings)
    ConfigError = 3,
    /// File not found, IO or storage error
    FileError = 4,
    /// Suite, request or flow not found
    NotFoundError = 5,
    /// Network or HTTP error
    NetworkError = 6,
    /// Variable resolution error
    VariableError = 8,
    /// The suite ran and at least one invocation failed
    TestFailure = 9,
    /// The run was cancelled
    Cancelled = 10,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl From<&EngineError> for ExitCode {
    fn from(error: &EngineError) -> Self {
        match error {
            EngineError::NothingToRun(_) => ExitCode::ConfigError,
            EngineError::SuiteNotFound(_)
            | EngineError::RequestNotFound(_)
            | EngineError::FlowNotFound(_) => ExitCode::NotFoundError,
            EngineError::EnvironmentNotFound(_) | EngineError::InvalidAuth(_) => {
                ExitCode::ConfigError
            }
            EngineError::UnresolvedVariables(_) => ExitCode::VariableError,
            EngineError::Transport(_) => ExitCode::NetworkError,
            EngineError::Storage(_) | EngineError::Json(_) | EngineError::Io(_) => {
                ExitCode::FileError
            }
        }
    }
}

impl From<&CliError> for ExitCode {
    fn from(error: &CliError) -> Self {
        match error {
            CliError::Io(_) => ExitCode::FileError,
            CliError::Engine(e) => ExitCode::from(e),
            CliError::DirectoryNotFound(_) | CliError::NotADirectory(_) => ExitCode::FileError,
            CliError::SuiteNotFound(_) => ExitCode::NotFoundError,
            CliError::EnvironmentNotFound(_) | CliError::AuthNotFound(_) => ExitCode::ConfigError,
            CliError::RunAborted(_) => ExitCode::ConfigError,
            CliError::TestFailure(_) => ExitCode::TestFailure,
            CliError::Cancelled(_) => ExitCode::Cancelled,
            CliError::Generic(_) => ExitCode::GeneralError,
        }
    }
}

impl From<&Box<dyn std::error::Error>> for ExitCode {
    fn from(error: &Box<dyn std::error::Error>) -> Self {
        if let Some(cli_error) = error.downcast_ref::<CliError>() {
            ExitCode::from(cli_error)
        } else if let Some(engine_error) = error.downcast_ref::<EngineError>() {
            ExitCode::from(engine_error)
        } else if error.downcast_ref::<std::io::Error>().is_some() {
            ExitCode::FileError
        } else {
            ExitCode::GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_map_to_codes() {
        assert_eq!(
            ExitCode::from(&EngineError::UnresolvedVariables(vec!["TOKEN".into()])).code(),
            8
        );
        assert_eq!(
            ExitCode::from(&EngineError::Transport("refused".into())),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from(&EngineError::RequestNotFound("c1:r1".into())),
            ExitCode::NotFoundError
        );
    }

    #[test]
    fn test_boxed_errors_are_downcast() {
        let boxed: Box<dyn std::error::Error> = Box::new(CliError::TestFailure("x".into()));
        assert_eq!(ExitCode::from(&boxed).code(), 9);

        let boxed: Box<dyn std::error::Error> =
            Box::new(CliError::Engine(EngineError::Storage("bad".into())));
        assert_eq!(ExitCode::from(&boxed), ExitCode::FileError);

        let boxed: Box<dyn std::error::Error> = "plain".into();
        assert_eq!(ExitCode::from(&boxed), ExitCode::GeneralError);
    }

    #[test]
    fn test_cancelled_code() {
        assert_eq!(ExitCode::from(&CliError::Cancelled("stop".into())).code(), 10);
    }
}

//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use crate::exitcode;

        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Config { .. } => exitcode::CONFIG,
                ApplicationError::Tokens { .. } => exitcode::DATAERR,
                ApplicationError::MissingAsset(_) => exitcode::NOINPUT,
                ApplicationError::DuplicateOutputs(_) => exitcode::CANTCREAT,
                ApplicationError::OperationFailed { .. } => exitcode::IOERR,
                ApplicationError::Domain(DomainError::UnknownStructuralMacro(_)) => {
                    exitcode::CONFIG
                }
                ApplicationError::Domain(DomainError::Condition { .. }) => exitcode::DATAERR,
                ApplicationError::Domain(_) => exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_missing_asset_when_exit_code_then_noinput() {
        let err: CliError = ApplicationError::MissingAsset(PathBuf::from("a.png")).into();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn given_bad_condition_when_exit_code_then_dataerr() {
        let err: CliError =
            ApplicationError::from(DomainError::condition("1 +", "unexpected character")).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_io_failure_when_exit_code_then_ioerr() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CliError = InfraError::io("write ast.dot", io).into();
        assert_eq!(err.exit_code(), crate::exitcode::IOERR);
        assert!(err.to_string().contains("write ast.dot"));
    }
}

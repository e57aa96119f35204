use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Unable to resolve cluster credentials: {0}")]
    CredentialsError(String),

    #[error("No instance has been created for team {team_id}")]
    UnknownTeam { team_id: String },

    #[error("Instance for team {team_id} is still being torn down")]
    TeardownInProgress { team_id: String },

    #[error("Cluster call timed out: {operation} after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Invalid resource descriptor: {resource_type} - {reason}")]
    DescriptorError {
        resource_type: String,
        reason: String,
    },
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::ConfigError(e.to_string())
    }
}

impl Error {
    /// Determine if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::KubeError(_) | Error::Timeout { .. } | Error::TeardownInProgress { .. }
        )
    }

    /// Errors caused by the request itself; retrying will not help
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::UnknownTeam { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let unknown = Error::UnknownTeam {
            team_id: "T-100".to_string(),
        };
        assert!(unknown.is_caller_error());
        assert!(!unknown.is_retryable());

        let timeout = Error::Timeout {
            operation: "delete namespace".to_string(),
            seconds: 30,
        };
        assert!(timeout.is_retryable());
        assert!(!timeout.is_caller_error());

        let busy = Error::TeardownInProgress {
            team_id: "T-100".to_string(),
        };
        assert!(busy.is_retryable());

        assert!(!Error::ConfigError("bad".to_string()).is_retryable());
    }
}

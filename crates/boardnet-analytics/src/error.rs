use boardnet_core::{ConfigError, ErrorCode, GraphError};

/// Fatal failures of [`crate::analyze`].
///
/// Layout timeouts are not errors here: the pipeline keeps the partial
/// layout and flags it with `timed_out`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl AnalysisError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Graph(err) => err.code(),
            Self::Config(err) => err.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_wrapped_error() {
        let err = AnalysisError::from(GraphError::EmptyGraph);
        assert_eq!(err.code(), ErrorCode::EmptyGraph);
        assert_eq!(err.code().code(), "E2001");

        let err = AnalysisError::from(ConfigError::Empty("clustering.strategy.key"));
        assert_eq!(err.code(), ErrorCode::InvalidConfig);
        assert!(err.to_string().contains("clustering.strategy.key"));
    }
}

use std::time::Duration;

use boardnet_core::{ConfigError, ErrorCode};

use crate::solver::LayoutResult;

/// The layout time budget ran out before the iteration budget did.
///
/// Recoverable: `partial` holds the best layout reached so far, with
/// `timed_out` set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("layout stopped after {completed_iterations} iterations ({elapsed:?} elapsed)")]
pub struct ComputationTimeout {
    pub elapsed: Duration,
    pub completed_iterations: usize,
    pub partial: Box<LayoutResult>,
}

/// Errors from [`crate::solve`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid layout config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Timeout(#[from] ComputationTimeout),
}

impl LayoutError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Config(_) => ErrorCode::InvalidConfig,
            Self::Timeout(_) => ErrorCode::ComputationTimeout,
        }
    }

    /// The partial layout carried by a timeout, if any.
    #[must_use]
    pub fn into_partial(self) -> Option<LayoutResult> {
        match self {
            Self::Timeout(timeout) => Some(*timeout.partial),
            Self::Config(_) => None,
        }
    }
}

//! Error types for perigee-deploy.

use perigee_plan::{PlanError, StepId};

use crate::environment::EnvironmentError;
use crate::report::DeployedContract;

/// Result type alias using [`DeployError`].
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors that can occur while running a migration plan.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The plan failed validation; nothing was dispatched.
    #[error("invalid migration plan: {0}")]
    Plan(#[from] PlanError),

    /// A step was dispatched and the environment reported failure.
    ///
    /// The run aborts at the failing step. Contracts deployed by earlier
    /// steps remain live on the ledger; their records are carried here so
    /// the caller can see exactly what the failed run left behind.
    #[error("step {index} ({step}) failed: {source}")]
    Step {
        /// Zero-based index of the failing step.
        index: usize,
        /// Id of the failing step.
        step: StepId,
        /// The underlying environment failure.
        #[source]
        source: EnvironmentError,
        /// Contracts deployed before the failure, in creation order.
        deployed: Vec<DeployedContract>,
    },

    /// Configuration loading or plan/catalogue I/O failure.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DeployError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

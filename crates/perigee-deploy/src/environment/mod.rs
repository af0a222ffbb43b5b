//! Execution environment abstraction.
//!
//! The environment is the external system that actually performs contract
//! creation and method invocation: a ledger node reached over some network
//! protocol. The orchestrator only ever sees the trait — it submits an
//! action, suspends until the environment confirms or rejects it, and never
//! learns anything about transactions, accounts, or fees.

mod mock;

pub use mock::{Dispatch, MockLedger};

use async_trait::async_trait;

use perigee_plan::{Address, ArgValue, ContractArtifact};

/// Errors reported by an execution environment.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    /// The environment refused the action (e.g. a rejected transaction).
    #[error("action rejected by the environment: {0}")]
    Rejected(String),

    /// The environment could not be reached or answered incoherently.
    #[error("environment unavailable: {0}")]
    Unavailable(String),

    /// The action was submitted but never confirmed within the bound.
    ///
    /// From the orchestrator's standpoint this is indistinguishable from
    /// the action failing; the run aborts either way.
    #[error("no confirmation after {after_secs}s")]
    Timeout {
        /// Configured confirmation bound, in seconds.
        after_secs: u64,
    },
}

impl EnvironmentError {
    /// Create a rejection error.
    #[must_use]
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create an unavailability error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Trait for ledger execution environments.
///
/// Both calls are synchronous to the caller even when the underlying
/// protocol is asynchronous: the future resolves only once the environment
/// has confirmed or rejected the action. Submitted actions are not
/// abortable — dropping the future does not undo the submission.
#[async_trait]
pub trait ExecutionEnvironment: Send + Sync {
    /// Deploy a contract instance from an artifact.
    ///
    /// Arguments are fully resolved: identity references have already been
    /// substituted with concrete addresses. Returns the address assigned to
    /// the new instance once creation is confirmed.
    async fn create(
        &self,
        artifact: &ContractArtifact,
        args: &[ArgValue],
    ) -> Result<Address, EnvironmentError>;

    /// Call a method on an already-deployed contract.
    ///
    /// Resolves once the call is confirmed; produces no value.
    async fn invoke(
        &self,
        target: &Address,
        method: &str,
        args: &[ArgValue],
    ) -> Result<(), EnvironmentError>;
}

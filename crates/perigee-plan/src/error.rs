//! Plan validation errors.

use crate::types::StepId;

/// Errors detected while validating a migration plan.
///
/// All of these are configuration errors: they are reported before any
/// action is dispatched to the execution environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The plan contains no steps.
    #[error("migration plan contains no steps")]
    Empty,

    /// Two steps share the same id.
    #[error("duplicate step id: {0}")]
    DuplicateStep(StepId),

    /// A step references another step that is not in the plan.
    #[error("step {step} references unknown step {referenced}")]
    UnknownReference {
        /// Step holding the reference.
        step: StepId,
        /// The referenced step id.
        referenced: StepId,
    },

    /// A step references a step that does not complete strictly earlier.
    ///
    /// Self-references count as forward references.
    #[error("step {step} references step {referenced} before it has completed")]
    ForwardReference {
        /// Step holding the reference.
        step: StepId,
        /// The referenced step id.
        referenced: StepId,
    },

    /// A step references a step that does not deploy a contract.
    #[error("step {step} references {referenced}, which does not deploy a contract")]
    NotACreateStep {
        /// Step holding the reference.
        step: StepId,
        /// The referenced step id.
        referenced: StepId,
    },

    /// A create step names an artifact missing from the catalogue.
    #[error("step {step} uses unknown artifact {artifact}")]
    UnknownArtifact {
        /// The create step.
        step: StepId,
        /// The missing artifact name.
        artifact: String,
    },

    /// An invoke step names a method the target artifact does not declare.
    #[error("artifact {artifact} declares no method {method} (step {step})")]
    UnknownMethod {
        /// The invoke step.
        step: StepId,
        /// The target's artifact name.
        artifact: String,
        /// The missing method name.
        method: String,
    },

    /// A step's argument count does not match the declared arity.
    #[error("step {step} passes {actual} argument(s) where {expected} are expected")]
    ArityMismatch {
        /// The offending step.
        step: StepId,
        /// Arity declared by the artifact.
        expected: usize,
        /// Number of arguments in the plan.
        actual: usize,
    },
}

//! Provisioning steps and their arguments.

use serde::{Deserialize, Serialize};

use crate::types::{Address, StepId};

/// A literal argument value, passed through to the environment unmodified.
///
/// Large numeric values (token amounts in base units) are carried as exact
/// decimal strings so they survive round-trips without precision loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArgValue {
    /// Unsigned integer.
    Uint(u64),
    /// Boolean flag.
    Bool(bool),
    /// Large numeric amount as an exact decimal string.
    Amount(String),
    /// Contract address.
    Address(Address),
}

impl ArgValue {
    /// Get the value kind as a static string, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Uint(_) => "uint",
            Self::Bool(_) => "bool",
            Self::Amount(_) => "amount",
            Self::Address(_) => "address",
        }
    }
}

/// One argument position of a provisioning step.
///
/// Either a literal value or a reference to the address produced by an
/// earlier create step. References are resolved at dispatch time from the
/// run-local address map; plan validation guarantees the referenced step
/// completes strictly earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepArg {
    /// A literal constant.
    Literal {
        /// The literal value.
        value: ArgValue,
    },
    /// The address of the contract deployed by an earlier step.
    Identity {
        /// Id of the create step that produced the address.
        step: StepId,
    },
}

impl StepArg {
    /// Create a literal argument.
    #[must_use]
    pub const fn literal(value: ArgValue) -> Self {
        Self::Literal { value }
    }

    /// Create a reference to the address produced by an earlier step.
    #[must_use]
    pub fn identity(step: impl Into<String>) -> Self {
        Self::Identity {
            step: StepId::new(step),
        }
    }

    /// The step referenced by this argument, if any.
    #[must_use]
    pub const fn referenced_step(&self) -> Option<&StepId> {
        match self {
            Self::Literal { .. } => None,
            Self::Identity { step } => Some(step),
        }
    }
}

/// The action a provisioning step performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    /// Deploy a new contract instance from an artifact.
    Create {
        /// Name of the artifact to instantiate.
        artifact: String,
        /// Constructor arguments, in order.
        args: Vec<StepArg>,
    },
    /// Call a method on a contract deployed by an earlier step.
    Invoke {
        /// Id of the create step whose contract is called.
        target: StepId,
        /// Method name.
        method: String,
        /// Method arguments, in order.
        args: Vec<StepArg>,
    },
}

impl StepAction {
    /// Arguments of this action, in declared order.
    #[must_use]
    pub fn args(&self) -> &[StepArg] {
        match self {
            Self::Create { args, .. } | Self::Invoke { args, .. } => args,
        }
    }

    /// Whether this action deploys a contract.
    #[must_use]
    pub const fn is_create(&self) -> bool {
        matches!(self, Self::Create { .. })
    }
}

/// One step in a migration plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningStep {
    /// Step id, unique within the plan.
    pub id: StepId,
    /// The create or invoke action to perform.
    #[serde(flatten)]
    pub action: StepAction,
}

impl ProvisioningStep {
    /// Create a step that deploys a contract.
    #[must_use]
    pub fn create(id: impl Into<String>, artifact: impl Into<String>, args: Vec<StepArg>) -> Self {
        Self {
            id: StepId::new(id),
            action: StepAction::Create {
                artifact: artifact.into(),
                args,
            },
        }
    }

    /// Create a step that invokes a method on an earlier contract.
    #[must_use]
    pub fn invoke(
        id: impl Into<String>,
        target: impl Into<String>,
        method: impl Into<String>,
        args: Vec<StepArg>,
    ) -> Self {
        Self {
            id: StepId::new(id),
            action: StepAction::Invoke {
                target: StepId::new(target),
                method: method.into(),
                args,
            },
        }
    }
}

//! Migration plan model for the Perigee deployer.
//!
//! A [`MigrationPlan`] is a short, statically known, linear chain of
//! provisioning steps executed against a ledger. Each step either deploys a
//! contract from an externally supplied [`ContractArtifact`] or invokes a
//! method on a contract deployed by an earlier step. Arguments are literal
//! values or references to the address assigned to an earlier create step.
//!
//! Plans are plain data: this crate performs no I/O and dispatches nothing.
//! [`MigrationPlan::validate`] checks the whole plan against an
//! [`ArtifactCatalogue`] before a run starts, so a malformed plan is rejected
//! before the first transaction is submitted.

#![forbid(unsafe_code)]

pub mod artifact;
pub mod error;
pub mod plan;
pub mod step;
pub mod types;

pub use artifact::{ArtifactCatalogue, ContractArtifact, MethodSig};
pub use error::PlanError;
pub use plan::MigrationPlan;
pub use step::{ArgValue, ProvisioningStep, StepAction, StepArg};
pub use types::{Address, StepId};

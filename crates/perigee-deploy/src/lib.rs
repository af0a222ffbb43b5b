//! Perigee deployment orchestrator.
//!
//! This crate executes [`MigrationPlan`](perigee_plan::MigrationPlan)s: short,
//! statically known, linear chains of create and invoke steps run against a
//! ledger. The orchestrator owns the ordering, the propagation of assigned
//! addresses into later steps, and the fail-fast semantics; the contracts
//! themselves are opaque artifacts, and the ledger is reached only through
//! the [`ExecutionEnvironment`] trait.
//!
//! # Execution model
//!
//! Steps run strictly sequentially: step *i+1* is never dispatched before
//! step *i* has confirmed, because step *i+1* may need the address step *i*
//! produced. Each dispatch is a suspension point bounded by a confirmation
//! timeout; a timed-out action is treated as a failed one. Every action is a
//! real, irreversible mutation of the environment, so there is no rollback
//! and no internal retry — a failed run leaves earlier contracts live and
//! reports which step failed, together with the records of everything
//! created before it.
//!
//! # State machine
//!
//! Each run moves through a strict state machine enforced at compile time
//! using the typestate pattern:
//!
//! ```text
//! NotStarted ──▶ Running ──▶ Completed
//!                   │
//!                   ▼
//!                 Failed
//! ```
//!
//! Terminal states are never re-entered; invalid transitions do not compile.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use perigee_deploy::{config::DeploymentConfig, Deployer, MockLedger};
//! use perigee_plan::{ArtifactCatalogue, ContractArtifact, MigrationPlan, ProvisioningStep};
//!
//! let catalogue = ArtifactCatalogue::from_artifacts(vec![
//!     ContractArtifact::new("ReserveToken", 0).with_method("approve", 2),
//! ]);
//! let plan = MigrationPlan::new(
//!     "bootstrap",
//!     vec![ProvisioningStep::create("reserve", "ReserveToken", vec![])],
//! );
//!
//! let deployer = Deployer::new(
//!     Arc::new(MockLedger::new()),
//!     catalogue,
//!     &DeploymentConfig::default(),
//! );
//! let report = deployer.run(&plan).await?;
//! assert_eq!(report.contracts.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod deployer;
pub mod environment;
pub mod error;
pub mod report;
pub mod state;

// Re-export commonly used types at the crate root
pub use config::DeployConfig;
pub use deployer::Deployer;
pub use environment::{Dispatch, EnvironmentError, ExecutionEnvironment, MockLedger};
pub use error::{DeployError, DeployResult};
pub use report::{DeployedContract, RunReport};
pub use state::{
    Completed, Failed, MigrationRun, NotStarted, RunData, RunId, RunState, RunStatus, Running,
};

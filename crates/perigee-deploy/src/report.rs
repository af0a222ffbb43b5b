//! Run reports and deployed-contract records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use perigee_plan::{Address, StepId};

use crate::state::RunId;

/// Record of a contract deployed by a create step.
///
/// Created exactly once per confirmed create action and immutable
/// thereafter. The orchestrator holds these only for the duration of a run;
/// the contract itself lives on the ledger independently of this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    /// Id of the create step that deployed the contract.
    pub step: StepId,
    /// Name of the artifact it was instantiated from.
    pub artifact: String,
    /// Address assigned by the environment.
    pub address: Address,
}

/// Outcome of a fully successful migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier.
    pub run_id: RunId,
    /// Name of the executed plan.
    pub plan: String,
    /// Contracts deployed during the run, in creation order.
    pub contracts: Vec<DeployedContract>,
    /// Number of confirmed invoke steps.
    pub invocations: usize,
    /// When dispatching began.
    pub started_at: DateTime<Utc>,
    /// When the final step confirmed.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Look up a deployed contract by the id of the step that created it.
    #[must_use]
    pub fn contract(&self, step: &str) -> Option<&DeployedContract> {
        self.contracts.iter().find(|c| c.step.as_str() == step)
    }
}

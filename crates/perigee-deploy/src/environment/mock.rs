//! In-memory ledger environment for testing and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use perigee_plan::{Address, ArgValue, ContractArtifact};

use super::{EnvironmentError, ExecutionEnvironment};

/// One action submitted to the environment, with its resolved arguments.
///
/// The mock records every dispatch in submission order so tests can assert
/// on ordering and on exact argument substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A contract creation.
    Create {
        /// Artifact name.
        artifact: String,
        /// Resolved constructor arguments.
        args: Vec<ArgValue>,
    },
    /// A method invocation.
    Invoke {
        /// Address the call was made against.
        target: Address,
        /// Method name.
        method: String,
        /// Resolved method arguments.
        args: Vec<ArgValue>,
    },
}

/// Failure injection rule for the mock ledger.
#[derive(Debug, Clone)]
enum FailureRule {
    /// Reject creates of the named artifact.
    Create(String),
    /// Reject invocations of the named method.
    Invoke(String),
}

/// In-memory ledger environment.
///
/// Not a ledger at all: contract state lives in a process-local map and is
/// lost when the instance drops. Used by the test suite and by the
/// `perigee-deploy` binary for dry runs. Actions are recorded (including
/// rejected ones — a rejected action was still dispatched) and failures can
/// be injected per artifact or per method.
#[derive(Debug)]
pub struct MockLedger {
    contracts: RwLock<HashMap<Address, String>>,
    dispatches: RwLock<Vec<Dispatch>>,
    failures: Vec<FailureRule>,
    sequence: AtomicU64,
    base: u128,
}

impl MockLedger {
    /// Create an empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            contracts: RwLock::new(HashMap::new()),
            dispatches: RwLock::new(Vec::new()),
            failures: Vec::new(),
            sequence: AtomicU64::new(0),
            base: address_base(),
        }
    }

    /// Reject any create of the named artifact.
    #[must_use]
    pub fn fail_on_create(mut self, artifact: impl Into<String>) -> Self {
        self.failures.push(FailureRule::Create(artifact.into()));
        self
    }

    /// Reject any invocation of the named method.
    #[must_use]
    pub fn fail_on_invoke(mut self, method: impl Into<String>) -> Self {
        self.failures.push(FailureRule::Invoke(method.into()));
        self
    }

    /// All dispatches recorded so far, in submission order.
    pub fn dispatches(&self) -> Vec<Dispatch> {
        self.dispatches
            .read()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    /// Number of contracts currently deployed.
    pub fn deployed_count(&self) -> usize {
        self.contracts.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Check whether a contract exists at the given address.
    pub fn is_deployed(&self, address: &Address) -> bool {
        self.contracts
            .read()
            .map(|c| c.contains_key(address))
            .unwrap_or(false)
    }

    fn next_address(&self) -> Address {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        Address::new(format!("0x{:040x}", self.base.wrapping_add(u128::from(n))))
    }

    fn record(&self, dispatch: Dispatch) -> Result<(), EnvironmentError> {
        let mut dispatches = self
            .dispatches
            .write()
            .map_err(|_| EnvironmentError::unavailable("lock poisoned"))?;
        dispatches.push(dispatch);
        Ok(())
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionEnvironment for MockLedger {
    async fn create(
        &self,
        artifact: &ContractArtifact,
        args: &[ArgValue],
    ) -> Result<Address, EnvironmentError> {
        self.record(Dispatch::Create {
            artifact: artifact.name.clone(),
            args: args.to_vec(),
        })?;

        for rule in &self.failures {
            if let FailureRule::Create(name) = rule {
                if *name == artifact.name {
                    return Err(EnvironmentError::rejected(format!(
                        "simulated rejection deploying {name}"
                    )));
                }
            }
        }

        let address = self.next_address();

        let mut contracts = self
            .contracts
            .write()
            .map_err(|_| EnvironmentError::unavailable("lock poisoned"))?;
        contracts.insert(address.clone(), artifact.name.clone());

        Ok(address)
    }

    async fn invoke(
        &self,
        target: &Address,
        method: &str,
        args: &[ArgValue],
    ) -> Result<(), EnvironmentError> {
        self.record(Dispatch::Invoke {
            target: target.clone(),
            method: method.to_owned(),
            args: args.to_vec(),
        })?;

        for rule in &self.failures {
            if let FailureRule::Invoke(name) = rule {
                if name == method {
                    return Err(EnvironmentError::rejected(format!(
                        "simulated rejection invoking {name}"
                    )));
                }
            }
        }

        let contracts = self
            .contracts
            .read()
            .map_err(|_| EnvironmentError::unavailable("lock poisoned"))?;
        if !contracts.contains_key(target) {
            return Err(EnvironmentError::rejected(format!(
                "no contract deployed at {target}"
            )));
        }

        Ok(())
    }
}

/// Instance-local base so addresses differ between ledger instances.
fn address_base() -> u128 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    nanos << 24
}

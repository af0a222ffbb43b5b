//! Shared helpers for deployer integration tests.

pub mod fixtures;

use std::sync::Arc;

use perigee_deploy::config::DeploymentConfig;
use perigee_deploy::{Deployer, MockLedger};

/// A deployer wired to an in-memory ledger, with handles to both.
pub struct TestDeployer {
    /// The ledger the deployer dispatches to.
    pub ledger: Arc<MockLedger>,
    /// The deployer under test.
    pub deployer: Deployer,
}

impl TestDeployer {
    /// Create a deployer over a fresh ledger and the reference catalogue.
    pub fn new() -> Self {
        Self::with_ledger(MockLedger::new())
    }

    /// Create a deployer over a pre-configured ledger (e.g. with injected
    /// failures).
    pub fn with_ledger(ledger: MockLedger) -> Self {
        let ledger = Arc::new(ledger);
        let deployer = Deployer::new(
            ledger.clone(),
            fixtures::catalogue(),
            &DeploymentConfig::default(),
        );
        Self { ledger, deployer }
    }
}

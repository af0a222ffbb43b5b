//! Perigee deployer binary.
//!
//! Loads a migration plan and artifact catalogue, dry-runs the plan against
//! the in-memory ledger, and prints the run report as JSON. Real ledger
//! environments are supplied through the library API by embedding callers.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use perigee_deploy::{DeployConfig, Deployer, MockLedger};
use perigee_plan::{ArtifactCatalogue, ContractArtifact, MigrationPlan};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("perigee_deploy=info".parse()?),
        )
        .init();

    let config = DeployConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        DeployConfig::default()
    });

    let raw = tokio::fs::read_to_string(&config.artifacts.catalogue).await?;
    let artifacts: Vec<ContractArtifact> = serde_json::from_str(&raw)?;
    let catalogue = ArtifactCatalogue::from_artifacts(artifacts);

    let raw = tokio::fs::read_to_string(&config.plan.path).await?;
    let plan: MigrationPlan = serde_json::from_str(&raw)?;

    info!(
        plan = %plan.name,
        steps = plan.len(),
        artifacts = catalogue.len(),
        "plan loaded"
    );

    let ledger = Arc::new(MockLedger::new());
    let deployer = Deployer::new(ledger, catalogue, &config.deployment);

    match deployer.run(&plan).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "migration run failed");
            Err(e.into())
        }
    }
}

//! Core migration run orchestration.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use perigee_plan::{
    Address, ArgValue, ArtifactCatalogue, MigrationPlan, PlanError, ProvisioningStep, StepAction,
    StepArg, StepId,
};

use crate::config::DeploymentConfig;
use crate::environment::{EnvironmentError, ExecutionEnvironment};
use crate::error::{DeployError, DeployResult};
use crate::report::{DeployedContract, RunReport};
use crate::state::{MigrationRun, NotStarted, Running};

/// Executes migration plans against an execution environment.
///
/// The deployer owns nothing but the orchestration: steps run exactly once,
/// in declared order, and step *i+1* is never dispatched before step *i*
/// confirms. Addresses produced by create steps are held in a run-local map
/// and substituted into later steps' arguments at dispatch time. On the
/// first failure the run aborts; contracts deployed by earlier steps remain
/// live, since the ledger has no undo primitive.
pub struct Deployer {
    env: Arc<dyn ExecutionEnvironment>,
    catalogue: ArtifactCatalogue,
    confirmation_timeout: Duration,
}

impl Deployer {
    /// Create a deployer for the given environment and artifact catalogue.
    #[must_use]
    pub fn new(
        env: Arc<dyn ExecutionEnvironment>,
        catalogue: ArtifactCatalogue,
        config: &DeploymentConfig,
    ) -> Self {
        Self {
            env,
            catalogue,
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
        }
    }

    /// Run a migration plan to completion.
    ///
    /// The plan is validated eagerly: any configuration error surfaces as
    /// [`DeployError::Plan`] before a single action is dispatched. On
    /// success the report lists every deployed contract in creation order.
    /// On the first failing step the run aborts with [`DeployError::Step`],
    /// which identifies the step and carries the records of contracts
    /// already created. No step is ever submitted twice.
    pub async fn run(&self, plan: &MigrationPlan) -> DeployResult<RunReport> {
        plan.validate(&self.catalogue)?;

        let mut run = MigrationRun::<NotStarted>::create(plan.name.clone()).begin();
        info!(
            run_id = %run.run_id(),
            plan = %plan.name,
            steps = plan.len(),
            "starting migration run"
        );

        let mut addresses: HashMap<StepId, Address> = HashMap::new();
        let mut deployed: Vec<DeployedContract> = Vec::new();
        let mut invocations = 0usize;

        for (index, step) in plan.steps().iter().enumerate() {
            run.enter_step(index);

            match &step.action {
                StepAction::Create { artifact, args } => {
                    let descriptor =
                        self.catalogue
                            .get(artifact)
                            .ok_or_else(|| PlanError::UnknownArtifact {
                                step: step.id.clone(),
                                artifact: artifact.clone(),
                            })?;
                    let resolved = resolve_args(&step.id, args, &addresses)?;

                    debug!(step = %step.id, artifact = %artifact, "dispatching create");
                    let address = match self
                        .confirm(self.env.create(descriptor, &resolved))
                        .await
                    {
                        Ok(address) => address,
                        Err(source) => {
                            return Err(step_failure(run, index, step, source, deployed));
                        }
                    };

                    info!(step = %step.id, artifact = %artifact, %address, "contract deployed");
                    addresses.insert(step.id.clone(), address.clone());
                    deployed.push(DeployedContract {
                        step: step.id.clone(),
                        artifact: artifact.clone(),
                        address,
                    });
                }
                StepAction::Invoke {
                    target,
                    method,
                    args,
                } => {
                    let target_address = addresses.get(target).cloned().ok_or_else(|| {
                        PlanError::UnknownReference {
                            step: step.id.clone(),
                            referenced: target.clone(),
                        }
                    })?;
                    let resolved = resolve_args(&step.id, args, &addresses)?;

                    debug!(step = %step.id, target = %target_address, method = %method, "dispatching invoke");
                    if let Err(source) = self
                        .confirm(self.env.invoke(&target_address, method, &resolved))
                        .await
                    {
                        return Err(step_failure(run, index, step, source, deployed));
                    }

                    info!(step = %step.id, method = %method, "invocation confirmed");
                    invocations += 1;
                }
            }
        }

        let data = run.complete().into_data();
        let finished_at = data.finished_at.unwrap_or_else(Utc::now);
        let started_at = data.started_at.unwrap_or(finished_at);

        info!(
            run_id = %data.run_id,
            contracts = deployed.len(),
            invocations,
            "migration run completed"
        );

        Ok(RunReport {
            run_id: data.run_id,
            plan: data.plan,
            contracts: deployed,
            invocations,
            started_at,
            finished_at,
        })
    }

    /// Await an action under the confirmation timeout.
    ///
    /// An action that produces no confirmation within the bound is treated
    /// as failed; the submission itself cannot be aborted.
    async fn confirm<T>(
        &self,
        action: impl Future<Output = Result<T, EnvironmentError>>,
    ) -> Result<T, EnvironmentError> {
        match tokio::time::timeout(self.confirmation_timeout, action).await {
            Ok(result) => result,
            Err(_) => Err(EnvironmentError::Timeout {
                after_secs: self.confirmation_timeout.as_secs(),
            }),
        }
    }
}

impl std::fmt::Debug for Deployer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployer")
            .field("confirmation_timeout", &self.confirmation_timeout)
            .finish_non_exhaustive()
    }
}

/// Substitute identity references with the addresses recorded for earlier
/// create steps. Literals pass through unmodified.
fn resolve_args(
    step: &StepId,
    args: &[StepArg],
    addresses: &HashMap<StepId, Address>,
) -> Result<Vec<ArgValue>, PlanError> {
    args.iter()
        .map(|arg| match arg {
            StepArg::Literal { value } => Ok(value.clone()),
            StepArg::Identity { step: referenced } => addresses
                .get(referenced)
                .cloned()
                .map(ArgValue::Address)
                .ok_or_else(|| PlanError::UnknownReference {
                    step: step.clone(),
                    referenced: referenced.clone(),
                }),
        })
        .collect()
}

/// Mark the run failed and build the step error, logging what was left live.
fn step_failure(
    run: MigrationRun<Running>,
    index: usize,
    step: &ProvisioningStep,
    source: EnvironmentError,
    deployed: Vec<DeployedContract>,
) -> DeployError {
    let failed = run.fail(source.to_string());
    error!(
        run_id = %failed.run_id(),
        index,
        step = %step.id,
        live_contracts = deployed.len(),
        error = %source,
        "migration run failed; contracts from earlier steps remain live"
    );
    DeployError::Step {
        index,
        step: step.id.clone(),
        source,
        deployed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::MockLedger;
    use async_trait::async_trait;
    use perigee_plan::ContractArtifact;

    fn catalogue() -> ArtifactCatalogue {
        ArtifactCatalogue::from_artifacts(vec![
            ContractArtifact::new("ReserveToken", 0).with_method("approve", 2)
        ])
    }

    fn deployer(env: Arc<dyn ExecutionEnvironment>) -> Deployer {
        Deployer::new(env, catalogue(), &DeploymentConfig::default())
    }

    #[test]
    fn resolve_args_substitutes_identities() {
        let mut addresses = HashMap::new();
        addresses.insert(StepId::new("reserve"), Address::new("0xaa"));

        let resolved = resolve_args(
            &StepId::new("coverage"),
            &[
                StepArg::identity("reserve"),
                StepArg::literal(ArgValue::Uint(0)),
            ],
            &addresses,
        )
        .unwrap();

        assert_eq!(
            resolved,
            vec![
                ArgValue::Address(Address::new("0xaa")),
                ArgValue::Uint(0),
            ]
        );
    }

    #[test]
    fn resolve_args_missing_reference() {
        let result = resolve_args(
            &StepId::new("coverage"),
            &[StepArg::identity("reserve")],
            &HashMap::new(),
        );
        assert!(matches!(result, Err(PlanError::UnknownReference { .. })));
    }

    #[tokio::test]
    async fn single_create_plan_completes() {
        let ledger = Arc::new(MockLedger::new());
        let deployer = deployer(ledger.clone());

        let plan = MigrationPlan::new(
            "bootstrap",
            vec![ProvisioningStep::create("reserve", "ReserveToken", vec![])],
        );

        let report = deployer.run(&plan).await.unwrap();
        assert_eq!(report.contracts.len(), 1);
        assert_eq!(report.invocations, 0);
        assert!(ledger.is_deployed(&report.contracts[0].address));
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn invalid_plan_never_dispatches() {
        let ledger = Arc::new(MockLedger::new());
        let deployer = deployer(ledger.clone());

        let plan = MigrationPlan::new("empty", vec![]);
        let result = deployer.run(&plan).await;

        assert!(matches!(
            result,
            Err(DeployError::Plan(PlanError::Empty))
        ));
        assert!(ledger.dispatches().is_empty());
    }

    /// Environment whose actions never confirm.
    struct StalledLedger;

    #[async_trait]
    impl ExecutionEnvironment for StalledLedger {
        async fn create(
            &self,
            _artifact: &ContractArtifact,
            _args: &[ArgValue],
        ) -> Result<Address, EnvironmentError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(EnvironmentError::unavailable("unreachable"))
        }

        async fn invoke(
            &self,
            _target: &Address,
            _method: &str,
            _args: &[ArgValue],
        ) -> Result<(), EnvironmentError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(EnvironmentError::unavailable("unreachable"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unconfirmed_action_times_out() {
        let config = DeploymentConfig {
            confirmation_timeout_secs: 5,
        };
        let deployer = Deployer::new(Arc::new(StalledLedger), catalogue(), &config);

        let plan = MigrationPlan::new(
            "stalled",
            vec![ProvisioningStep::create("reserve", "ReserveToken", vec![])],
        );

        match deployer.run(&plan).await {
            Err(DeployError::Step { index, source, .. }) => {
                assert_eq!(index, 0);
                assert!(matches!(
                    source,
                    EnvironmentError::Timeout { after_secs: 5 }
                ));
            }
            other => panic!("expected step timeout, got {other:?}"),
        }
    }
}

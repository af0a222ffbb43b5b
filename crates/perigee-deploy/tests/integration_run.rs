//! Integration tests for full migration runs against the in-memory ledger.

mod common;

use common::{fixtures, TestDeployer};
use perigee_deploy::{DeployError, Dispatch, EnvironmentError, MockLedger};
use perigee_plan::{ArgValue, MigrationPlan, PlanError, ProvisioningStep, StepArg};

#[tokio::test]
async fn reference_plan_deploys_contracts_in_order() {
    let harness = TestDeployer::new();

    let report = harness
        .deployer
        .run(&fixtures::reference_plan())
        .await
        .expect("run should complete");

    // Two contracts, in creation order.
    assert_eq!(report.contracts.len(), 2);
    assert_eq!(report.contracts[0].step.as_str(), "reserve");
    assert_eq!(report.contracts[0].artifact, "ReserveToken");
    assert_eq!(report.contracts[1].step.as_str(), "coverage");
    assert_eq!(report.contracts[1].artifact, "CoveragePool");
    assert_eq!(report.invocations, 1);

    let reserve = report.contract("reserve").unwrap().address.clone();
    let coverage = report.contract("coverage").unwrap().address.clone();
    assert!(harness.ledger.is_deployed(&reserve));
    assert!(harness.ledger.is_deployed(&coverage));

    // Dispatch order matches declaration order exactly.
    let dispatches = harness.ledger.dispatches();
    assert_eq!(dispatches.len(), 3);

    match &dispatches[0] {
        Dispatch::Create { artifact, args } => {
            assert_eq!(artifact, "ReserveToken");
            assert!(args.is_empty());
        }
        other => panic!("expected create, got {other:?}"),
    }

    // The pool's first constructor argument is the reserve's address.
    match &dispatches[1] {
        Dispatch::Create { artifact, args } => {
            assert_eq!(artifact, "CoveragePool");
            assert_eq!(args[0], ArgValue::Address(reserve.clone()));
        }
        other => panic!("expected create, got {other:?}"),
    }

    // The approve call targets the reserve and names the pool.
    match &dispatches[2] {
        Dispatch::Invoke {
            target,
            method,
            args,
        } => {
            assert_eq!(target, &reserve);
            assert_eq!(method, "approve");
            assert_eq!(args[0], ArgValue::Address(coverage));
        }
        other => panic!("expected invoke, got {other:?}"),
    }
}

#[tokio::test]
async fn literal_arguments_pass_through_unmodified() {
    let harness = TestDeployer::new();

    harness
        .deployer
        .run(&fixtures::reference_plan())
        .await
        .expect("run should complete");

    let dispatches = harness.ledger.dispatches();

    match &dispatches[1] {
        Dispatch::Create { args, .. } => {
            assert_eq!(
                &args[1..],
                &[
                    ArgValue::Uint(0),
                    ArgValue::Bool(false),
                    ArgValue::Uint(0),
                ]
            );
        }
        other => panic!("expected create, got {other:?}"),
    }

    match &dispatches[2] {
        Dispatch::Invoke { args, .. } => {
            assert_eq!(
                args[1],
                ArgValue::Amount("300000000000000000".to_owned())
            );
        }
        other => panic!("expected invoke, got {other:?}"),
    }
}

#[tokio::test]
async fn failing_create_aborts_run_and_reports_step() {
    let harness = TestDeployer::with_ledger(MockLedger::new().fail_on_create("CoveragePool"));

    let result = harness.deployer.run(&fixtures::reference_plan()).await;

    match result {
        Err(DeployError::Step {
            index,
            step,
            source,
            deployed,
        }) => {
            assert_eq!(index, 1);
            assert_eq!(step.as_str(), "coverage");
            assert!(matches!(source, EnvironmentError::Rejected(_)));

            // Only the reserve was created; it remains live.
            assert_eq!(deployed.len(), 1);
            assert_eq!(deployed[0].step.as_str(), "reserve");
            assert!(harness.ledger.is_deployed(&deployed[0].address));
        }
        other => panic!("expected step failure, got {other:?}"),
    }

    // Step 3 was never dispatched.
    let dispatches = harness.ledger.dispatches();
    assert_eq!(dispatches.len(), 2);
    assert!(!dispatches
        .iter()
        .any(|d| matches!(d, Dispatch::Invoke { .. })));
}

#[tokio::test]
async fn failing_invoke_reports_final_step() {
    let harness = TestDeployer::with_ledger(MockLedger::new().fail_on_invoke("approve"));

    let result = harness.deployer.run(&fixtures::reference_plan()).await;

    match result {
        Err(DeployError::Step {
            index,
            step,
            deployed,
            ..
        }) => {
            assert_eq!(index, 2);
            assert_eq!(step.as_str(), "fund-allowance");
            // Both creates confirmed before the invoke failed.
            assert_eq!(deployed.len(), 2);
        }
        other => panic!("expected step failure, got {other:?}"),
    }
}

#[tokio::test]
async fn forward_reference_rejected_before_any_dispatch() {
    let harness = TestDeployer::new();

    let result = harness
        .deployer
        .run(&fixtures::forward_reference_plan())
        .await;

    assert!(matches!(
        result,
        Err(DeployError::Plan(PlanError::ForwardReference { .. }))
    ));
    assert!(harness.ledger.dispatches().is_empty());
}

#[tokio::test]
async fn empty_plan_rejected_before_any_dispatch() {
    let harness = TestDeployer::new();

    let result = harness.deployer.run(&MigrationPlan::new("empty", vec![])).await;

    assert!(matches!(
        result,
        Err(DeployError::Plan(PlanError::Empty))
    ));
    assert!(harness.ledger.dispatches().is_empty());
}

#[tokio::test]
async fn reruns_dispatch_identically_up_to_addresses() {
    let first = TestDeployer::new();
    let second = TestDeployer::new();

    first
        .deployer
        .run(&fixtures::reference_plan())
        .await
        .expect("first run should complete");
    second
        .deployer
        .run(&fixtures::reference_plan())
        .await
        .expect("second run should complete");

    let a = first.ledger.dispatches();
    let b = second.ledger.dispatches();
    assert_eq!(a.len(), b.len());

    for (left, right) in a.iter().zip(&b) {
        assert!(
            same_shape(left, right),
            "dispatch shapes differ: {left:?} vs {right:?}"
        );
    }
}

#[tokio::test]
async fn single_step_plan_only_invokes_nothing() {
    let harness = TestDeployer::new();

    let plan = MigrationPlan::new(
        "reserve-only",
        vec![ProvisioningStep::create("reserve", "ReserveToken", vec![])],
    );

    let report = harness.deployer.run(&plan).await.expect("run should complete");
    assert_eq!(report.contracts.len(), 1);
    assert_eq!(report.invocations, 0);
    assert_eq!(harness.ledger.dispatches().len(), 1);
}

#[tokio::test]
async fn literal_address_arguments_are_allowed() {
    let harness = TestDeployer::new();

    // An externally owned address passed as a literal, not a reference.
    let plan = MigrationPlan::new(
        "external-owner",
        vec![
            ProvisioningStep::create("reserve", "ReserveToken", vec![]),
            ProvisioningStep::create(
                "coverage",
                "CoveragePool",
                vec![
                    StepArg::literal(ArgValue::Address(perigee_plan::Address::new(
                        "0x00000000000000000000000000000000000000ff",
                    ))),
                    StepArg::literal(ArgValue::Uint(0)),
                    StepArg::literal(ArgValue::Bool(false)),
                    StepArg::literal(ArgValue::Uint(0)),
                ],
            ),
        ],
    );

    let report = harness.deployer.run(&plan).await.expect("run should complete");
    assert_eq!(report.contracts.len(), 2);

    match &harness.ledger.dispatches()[1] {
        Dispatch::Create { args, .. } => {
            assert_eq!(
                args[0],
                ArgValue::Address(perigee_plan::Address::new(
                    "0x00000000000000000000000000000000000000ff"
                ))
            );
        }
        other => panic!("expected create, got {other:?}"),
    }
}

/// Compare two dispatches structurally, ignoring concrete addresses (which
/// legitimately differ between runs).
fn same_shape(left: &Dispatch, right: &Dispatch) -> bool {
    match (left, right) {
        (
            Dispatch::Create {
                artifact: a,
                args: x,
            },
            Dispatch::Create {
                artifact: b,
                args: y,
            },
        ) => a == b && same_args(x, y),
        (
            Dispatch::Invoke {
                method: a, args: x, ..
            },
            Dispatch::Invoke {
                method: b, args: y, ..
            },
        ) => a == b && same_args(x, y),
        _ => false,
    }
}

fn same_args(left: &[ArgValue], right: &[ArgValue]) -> bool {
    left.len() == right.len()
        && left.iter().zip(right).all(|(l, r)| match (l, r) {
            (ArgValue::Address(_), ArgValue::Address(_)) => true,
            _ => l == r,
        })
}

//! Test fixtures for deployer integration tests.

use perigee_plan::{
    ArgValue, ArtifactCatalogue, ContractArtifact, MigrationPlan, ProvisioningStep, StepArg,
};

/// The reference artifact catalogue: a token-like reserve contract and a
/// coverage pool parameterised by it.
pub fn catalogue() -> ArtifactCatalogue {
    ArtifactCatalogue::from_artifacts(vec![
        ContractArtifact::new("ReserveToken", 0).with_method("approve", 2),
        ContractArtifact::new("CoveragePool", 4),
    ])
}

/// The reference three-step plan: deploy the reserve, deploy the pool wired
/// to it, then approve the pool's allowance on the reserve.
pub fn reference_plan() -> MigrationPlan {
    MigrationPlan::new(
        "travel",
        vec![
            ProvisioningStep::create("reserve", "ReserveToken", vec![]),
            ProvisioningStep::create(
                "coverage",
                "CoveragePool",
                vec![
                    StepArg::identity("reserve"),
                    StepArg::literal(ArgValue::Uint(0)),
                    StepArg::literal(ArgValue::Bool(false)),
                    StepArg::literal(ArgValue::Uint(0)),
                ],
            ),
            ProvisioningStep::invoke(
                "fund-allowance",
                "reserve",
                "approve",
                vec![
                    StepArg::identity("coverage"),
                    StepArg::literal(ArgValue::Amount("300000000000000000".to_owned())),
                ],
            ),
        ],
    )
}

/// A plan whose second step references a step declared after it.
pub fn forward_reference_plan() -> MigrationPlan {
    MigrationPlan::new(
        "forward",
        vec![
            ProvisioningStep::create(
                "coverage",
                "CoveragePool",
                vec![
                    StepArg::identity("reserve"),
                    StepArg::literal(ArgValue::Uint(0)),
                    StepArg::literal(ArgValue::Bool(false)),
                    StepArg::literal(ArgValue::Uint(0)),
                ],
            ),
            ProvisioningStep::create("reserve", "ReserveToken", vec![]),
        ],
    )
}

//! Migration plans and eager validation.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactCatalogue;
use crate::error::PlanError;
use crate::step::{ProvisioningStep, StepAction};
use crate::types::StepId;

/// An ordered, fixed list of provisioning steps.
///
/// Plans are static configuration: they are fully defined before a run
/// starts and never change during one. A valid plan forms a strict linear
/// dependency chain, where every reference points at a create step that
/// completes strictly earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// Plan name, used in logs and run reports.
    pub name: String,
    /// Steps in execution order.
    pub steps: Vec<ProvisioningStep>,
}

impl MigrationPlan {
    /// Create a plan from an ordered list of steps.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<ProvisioningStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[ProvisioningStep] {
        &self.steps
    }

    /// Number of steps in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check whether the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Validate the whole plan against an artifact catalogue.
    ///
    /// Checks, in order of discovery:
    ///
    /// - the plan is non-empty and step ids are unique;
    /// - every reference (identity arguments and invoke targets) points at
    ///   a create step that appears strictly earlier in the plan;
    /// - every create names a catalogued artifact and matches its
    ///   constructor arity;
    /// - every invoke names a declared method on the target's artifact and
    ///   matches its arity.
    ///
    /// Validation succeeds or fails without dispatching anything, so a
    /// rejected plan leaves the environment untouched.
    pub fn validate(&self, catalogue: &ArtifactCatalogue) -> Result<(), PlanError> {
        if self.steps.is_empty() {
            return Err(PlanError::Empty);
        }

        let mut all_ids: HashSet<&StepId> = HashSet::new();
        for step in &self.steps {
            if !all_ids.insert(&step.id) {
                return Err(PlanError::DuplicateStep(step.id.clone()));
            }
        }

        // Artifact name per completed create step, and the set of completed
        // invoke steps, built up as the walk advances.
        let mut created: HashMap<&StepId, &str> = HashMap::new();
        let mut invoked: HashSet<&StepId> = HashSet::new();

        for step in &self.steps {
            for arg in step.action.args() {
                if let Some(referenced) = arg.referenced_step() {
                    check_reference(&step.id, referenced, &created, &invoked, &all_ids)?;
                }
            }

            match &step.action {
                StepAction::Create { artifact, args } => {
                    let descriptor =
                        catalogue
                            .get(artifact)
                            .ok_or_else(|| PlanError::UnknownArtifact {
                                step: step.id.clone(),
                                artifact: artifact.clone(),
                            })?;

                    if args.len() != descriptor.constructor_arity {
                        return Err(PlanError::ArityMismatch {
                            step: step.id.clone(),
                            expected: descriptor.constructor_arity,
                            actual: args.len(),
                        });
                    }

                    created.insert(&step.id, artifact.as_str());
                }
                StepAction::Invoke {
                    target,
                    method,
                    args,
                } => {
                    check_reference(&step.id, target, &created, &invoked, &all_ids)?;

                    let artifact_name = created.get(target).copied().unwrap_or_default();
                    let descriptor = catalogue.get(artifact_name).ok_or_else(|| {
                        PlanError::UnknownArtifact {
                            step: step.id.clone(),
                            artifact: artifact_name.to_owned(),
                        }
                    })?;

                    let signature =
                        descriptor
                            .method(method)
                            .ok_or_else(|| PlanError::UnknownMethod {
                                step: step.id.clone(),
                                artifact: artifact_name.to_owned(),
                                method: method.clone(),
                            })?;

                    if args.len() != signature.arity {
                        return Err(PlanError::ArityMismatch {
                            step: step.id.clone(),
                            expected: signature.arity,
                            actual: args.len(),
                        });
                    }

                    invoked.insert(&step.id);
                }
            }
        }

        Ok(())
    }
}

/// Check that `referenced` names a create step completed strictly earlier.
fn check_reference(
    step: &StepId,
    referenced: &StepId,
    created: &HashMap<&StepId, &str>,
    invoked: &HashSet<&StepId>,
    all_ids: &HashSet<&StepId>,
) -> Result<(), PlanError> {
    if created.contains_key(referenced) {
        return Ok(());
    }
    if invoked.contains(referenced) {
        return Err(PlanError::NotACreateStep {
            step: step.clone(),
            referenced: referenced.clone(),
        });
    }
    if all_ids.contains(referenced) {
        // Exists in the plan but has not completed yet: a forward (or self)
        // reference.
        return Err(PlanError::ForwardReference {
            step: step.clone(),
            referenced: referenced.clone(),
        });
    }
    Err(PlanError::UnknownReference {
        step: step.clone(),
        referenced: referenced.clone(),
    })
}

//! Contract artifact descriptors.
//!
//! Artifacts are supplied fully formed by an external build collaborator
//! (the contract compiler). The deployer treats them as opaque templates:
//! the only parts it reads are the constructor arity and the declared
//! method signatures, which plan validation checks arguments against.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Signature of a callable method on a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSig {
    /// Method name.
    pub name: String,
    /// Number of arguments the method takes.
    pub arity: usize,
}

/// Template describing how to instantiate a contract.
///
/// Owned by the external artifact build; the deployer only reads the
/// declared arities and never inspects artifact internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractArtifact {
    /// Artifact name, unique within a catalogue.
    pub name: String,
    /// Number of arguments the constructor takes.
    pub constructor_arity: usize,
    /// Methods callable on instances of this artifact.
    #[serde(default)]
    pub methods: Vec<MethodSig>,
}

impl ContractArtifact {
    /// Create an artifact with the given constructor arity and no methods.
    #[must_use]
    pub fn new(name: impl Into<String>, constructor_arity: usize) -> Self {
        Self {
            name: name.into(),
            constructor_arity,
            methods: Vec::new(),
        }
    }

    /// Declare a callable method on this artifact.
    #[must_use]
    pub fn with_method(mut self, name: impl Into<String>, arity: usize) -> Self {
        self.methods.push(MethodSig {
            name: name.into(),
            arity,
        });
        self
    }

    /// Look up a declared method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodSig> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Name-keyed collection of contract artifacts available to a plan.
#[derive(Debug, Clone, Default)]
pub struct ArtifactCatalogue {
    artifacts: HashMap<String, ContractArtifact>,
}

impl ArtifactCatalogue {
    /// Create an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalogue from a list of artifacts.
    ///
    /// Later artifacts replace earlier ones with the same name.
    #[must_use]
    pub fn from_artifacts(artifacts: Vec<ContractArtifact>) -> Self {
        let mut catalogue = Self::new();
        for artifact in artifacts {
            catalogue.insert(artifact);
        }
        catalogue
    }

    /// Insert an artifact, keyed by its name.
    pub fn insert(&mut self, artifact: ContractArtifact) {
        self.artifacts.insert(artifact.name.clone(), artifact);
    }

    /// Look up an artifact by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ContractArtifact> {
        self.artifacts.get(name)
    }

    /// Check whether an artifact with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.artifacts.contains_key(name)
    }

    /// Number of artifacts in the catalogue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Check whether the catalogue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

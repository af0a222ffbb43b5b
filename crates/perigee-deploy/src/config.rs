//! Configuration for perigee-deploy.

use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{DeployError, DeployResult};

/// Top-level configuration for the deployer binary.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeployConfig {
    /// Migration plan location.
    #[serde(default)]
    pub plan: PlanConfig,

    /// Artifact catalogue location.
    #[serde(default)]
    pub artifacts: ArtifactConfig,

    /// Run behaviour configuration.
    #[serde(default)]
    pub deployment: DeploymentConfig,
}

impl DeployConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources
    /// override earlier):
    /// 1. Default values
    /// 2. `perigee.toml` in the current directory (if present)
    /// 3. Environment variables with `PERIGEE_DEPLOY_` prefix
    pub fn load() -> DeployResult<Self> {
        Figment::new()
            .merge(Toml::file("perigee.toml"))
            .merge(Env::prefixed("PERIGEE_DEPLOY_").split("__"))
            .extract()
            .map_err(|e| DeployError::Config(e.to_string()))
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DeployResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PERIGEE_DEPLOY_").split("__"))
            .extract()
            .map_err(|e| DeployError::Config(e.to_string()))
    }
}

/// Migration plan location.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanConfig {
    /// Path to the plan JSON document.
    #[serde(default = "default_plan_path")]
    pub path: PathBuf,
}

fn default_plan_path() -> PathBuf {
    PathBuf::from("migrations/plan.json")
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            path: default_plan_path(),
        }
    }
}

/// Artifact catalogue location.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    /// Path to the catalogue JSON document (a list of artifacts).
    #[serde(default = "default_catalogue_path")]
    pub catalogue: PathBuf,
}

fn default_catalogue_path() -> PathBuf {
    PathBuf::from("artifacts/catalogue.json")
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            catalogue: default_catalogue_path(),
        }
    }
}

/// Run behaviour configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
    /// How long to wait for each action to confirm, in seconds.
    ///
    /// An action still pending at the bound is treated as failed; the run
    /// aborts at that step.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
}

const fn default_confirmation_timeout_secs() -> u64 {
    120
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::{Flag, ModelError, ModelResult};

/// Sandboxing and resource parameters applied to every job the runner executes.
///
/// The profile is declarative and fixed per deployment. [`Default`] yields the
/// stock Docker-in-Docker profile; a JSON document can replace it at startup,
/// with omitted fields falling back to the stock values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorProfile {
    /// Executor backend (`docker`).
    pub executor: String,
    /// Pinned image reference used for jobs that do not name one.
    pub image: String,
    /// Run job containers privileged (required for nested dockerd).
    pub privileged: Flag,
    /// Volume bindings mounted into every job container.
    pub volumes: Vec<String>,
    /// Docker network the job containers join.
    pub network_mode: String,
    /// Hard memory cap, docker notation (`4g`, `512m`).
    pub memory: String,
    /// Memory plus swap cap, docker notation.
    pub memory_swap: String,
    /// CPU cap, fractional cores (`2`, `1.5`).
    pub cpus: String,
    /// Image pull policy.
    pub pull_policy: String,
    /// Seconds to wait for service containers before a job starts.
    pub wait_for_services_timeout_secs: u64,
}

impl Default for ExecutorProfile {
    fn default() -> Self {
        Self {
            executor: "docker".into(),
            image: "docker:24.0.5".into(),
            privileged: Flag::enabled(),
            volumes: vec![
                "/certs/client".into(),
                "/cache".into(),
                "/var/run/docker.sock:/var/run/docker.sock".into(),
            ],
            network_mode: "dind-network".into(),
            memory: "4g".into(),
            memory_swap: "4g".into(),
            cpus: "2".into(),
            pull_policy: "if-not-present".into(),
            wait_for_services_timeout_secs: 120,
        }
    }
}

impl ExecutorProfile {
    /// Parse a profile from its JSON form and validate it.
    pub fn from_json(raw: &str) -> ModelResult<Self> {
        let profile: Self = serde_json::from_str(raw)
            .map_err(|e| ModelError::InvalidProfile(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Validate the profile before it reaches the runner CLI.
    ///
    /// Rules:
    /// - `executor`, `image`, `network_mode`, `memory`, `memory_swap`, `pull_policy` are not blank;
    /// - no volume entry is blank;
    /// - `cpus` is a positive number.
    pub fn validate(&self) -> ModelResult<()> {
        let required = [
            ("executor", &self.executor),
            ("image", &self.image),
            ("network_mode", &self.network_mode),
            ("memory", &self.memory),
            ("memory_swap", &self.memory_swap),
            ("pull_policy", &self.pull_policy),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ModelError::InvalidProfile(format!("{field} is empty")));
            }
        }
        if self.volumes.iter().any(|v| v.trim().is_empty()) {
            return Err(ModelError::InvalidProfile("volume entry is empty".into()));
        }
        match self.cpus.trim().parse::<f64>() {
            Ok(c) if c > 0.0 && c.is_finite() => Ok(()),
            _ => Err(ModelError::InvalidProfile(format!(
                "cpus must be a positive number, got {:?}",
                self.cpus
            ))),
        }
    }
}

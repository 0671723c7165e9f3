use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_CONFIG_PATH, DEFAULT_DESCRIPTION, DEFAULT_RUNNER_BINARY, DEFAULT_RUNNER_USER,
    DEFAULT_WORKING_DIRECTORY, ExecutorProfile, Flag, ModelError, ModelResult, RegisterRequest,
    Secret, TokenPredicate, WorkerSpec,
};

/// Environment variable names recognized by the entrypoint.
pub mod vars {
    pub const CI_SERVER_URL: &str = "CI_SERVER_URL";
    pub const REGISTRATION_TOKEN: &str = "REGISTRATION_TOKEN";
    pub const RUNNER_DESCRIPTION: &str = "RUNNER_DESCRIPTION";
    pub const RUNNER_TAG_LIST: &str = "RUNNER_TAG_LIST";
    pub const RUNNER_RUN_UNTAGGED: &str = "RUNNER_RUN_UNTAGGED";
    pub const RUNNER_LOCKED: &str = "RUNNER_LOCKED";
    pub const RUNNER_CONFIG_PATH: &str = "RUNNER_CONFIG_PATH";
    pub const RUNNER_BINARY: &str = "RUNNER_BINARY";
    pub const RUNNER_USER: &str = "RUNNER_USER";
    pub const RUNNER_WORKING_DIRECTORY: &str = "RUNNER_WORKING_DIRECTORY";
    pub const RUNNER_PROFILE_FILE: &str = "RUNNER_PROFILE_FILE";
    pub const RUNNER_TOKEN_CHECK: &str = "RUNNER_TOKEN_CHECK";
    pub const RUNNER_HANDOFF: &str = "RUNNER_HANDOFF";
}

/// How control is transferred to the worker process.
///
/// - `Exec`: replace the current process image (unix only).
/// - `Spawn`: launch the worker as a child, forward signals, adopt its exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffMode {
    #[default]
    Exec,
    Spawn,
}

impl FromStr for HandoffMode {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exec" => Ok(Self::Exec),
            "spawn" => Ok(Self::Spawn),
            _ => Err(ModelError::UnknownHandoffMode(s.to_string())),
        }
    }
}

impl fmt::Display for HandoffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandoffMode::Exec => "exec",
            HandoffMode::Spawn => "spawn",
        })
    }
}

/// Immutable entrypoint configuration, read once at startup.
///
/// Registration inputs stay optional here: their absence only matters when the
/// identity record is missing, see [`Settings::register_request`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: Option<String>,
    pub registration_token: Option<Secret>,
    pub description: String,
    pub tags: Vec<String>,
    pub run_untagged: Flag,
    pub locked: Flag,
    /// Identity record location, shared by the store and the runner CLI.
    pub config_path: PathBuf,
    pub runner_binary: PathBuf,
    pub worker: WorkerSpec,
    /// Optional JSON document replacing the stock executor profile.
    pub profile_file: Option<PathBuf>,
    pub profile: ExecutorProfile,
    pub token_check: TokenPredicate,
    pub handoff: HandoffMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: None,
            registration_token: None,
            description: DEFAULT_DESCRIPTION.into(),
            tags: Vec::new(),
            run_untagged: Flag::enabled(),
            locked: Flag::disabled(),
            config_path: DEFAULT_CONFIG_PATH.into(),
            runner_binary: DEFAULT_RUNNER_BINARY.into(),
            worker: WorkerSpec {
                user: DEFAULT_RUNNER_USER.into(),
                working_directory: DEFAULT_WORKING_DIRECTORY.into(),
            },
            profile_file: None,
            profile: ExecutorProfile::default(),
            token_check: TokenPredicate::default(),
            handoff: HandoffMode::default(),
        }
    }
}

impl Settings {
    /// Build settings from a variable lookup.
    ///
    /// Blank values count as unset. The binary passes `std::env::var`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> ModelResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut s = Self::default();

        s.server_url = get(vars::CI_SERVER_URL);
        s.registration_token = get(vars::REGISTRATION_TOKEN).map(Secret::from);

        if let Some(v) = get(vars::RUNNER_DESCRIPTION) {
            s.description = v;
        }
        if let Some(v) = get(vars::RUNNER_TAG_LIST) {
            s.tags = v
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = get(vars::RUNNER_RUN_UNTAGGED) {
            s.run_untagged = parse_var(vars::RUNNER_RUN_UNTAGGED, &v)?;
        }
        if let Some(v) = get(vars::RUNNER_LOCKED) {
            s.locked = parse_var(vars::RUNNER_LOCKED, &v)?;
        }
        if let Some(v) = get(vars::RUNNER_CONFIG_PATH) {
            s.config_path = v.into();
        }
        if let Some(v) = get(vars::RUNNER_BINARY) {
            s.runner_binary = v.into();
        }
        if let Some(v) = get(vars::RUNNER_USER) {
            s.worker.user = v;
        }
        if let Some(v) = get(vars::RUNNER_WORKING_DIRECTORY) {
            s.worker.working_directory = v.into();
        }
        s.profile_file = get(vars::RUNNER_PROFILE_FILE).map(PathBuf::from);
        if let Some(v) = get(vars::RUNNER_TOKEN_CHECK) {
            s.token_check = parse_var(vars::RUNNER_TOKEN_CHECK, &v)?;
        }
        if let Some(v) = get(vars::RUNNER_HANDOFF) {
            s.handoff = parse_var(vars::RUNNER_HANDOFF, &v)?;
        }
        Ok(s)
    }

    /// Replace the executor profile.
    pub fn with_profile(mut self, profile: ExecutorProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Assemble and validate the registration inputs.
    ///
    /// Fails with [`ModelError::MissingVariable`] naming the first absent input.
    pub fn register_request(&self) -> ModelResult<RegisterRequest> {
        let req = RegisterRequest {
            url: self.server_url.clone().unwrap_or_default(),
            token: self.registration_token.clone().unwrap_or_else(|| Secret::new("")),
            description: self.description.clone(),
            tags: self.tags.clone(),
            run_untagged: self.run_untagged,
            locked: self.locked,
            profile: self.profile.clone(),
        };
        req.validate()?;
        Ok(req)
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> ModelResult<T>
where
    T: FromStr<Err = ModelError>,
{
    value.parse().map_err(|e: ModelError| ModelError::InvalidValue {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> ModelResult<Settings> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let s = settings(&[]).unwrap();
        assert!(s.server_url.is_none());
        assert!(s.registration_token.is_none());
        assert_eq!(s.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(s.runner_binary, PathBuf::from(DEFAULT_RUNNER_BINARY));
        assert_eq!(s.worker.user, DEFAULT_RUNNER_USER);
        assert_eq!(s.worker.working_directory, PathBuf::from(DEFAULT_WORKING_DIRECTORY));
        assert_eq!(s.token_check, TokenPredicate::Substring);
        assert_eq!(s.handoff, HandoffMode::Exec);
        assert!(s.run_untagged.is_enabled());
        assert!(s.locked.is_disabled());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let s = settings(&[(vars::CI_SERVER_URL, "   "), (vars::REGISTRATION_TOKEN, "")]).unwrap();
        assert!(s.server_url.is_none());
        assert!(s.registration_token.is_none());
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            (vars::CI_SERVER_URL, "https://ci.example.com"),
            (vars::REGISTRATION_TOKEN, "abc123"),
            (vars::RUNNER_TAG_LIST, "docker, dind,,linux "),
            (vars::RUNNER_LOCKED, "yes"),
            (vars::RUNNER_CONFIG_PATH, "/srv/runner/config.toml"),
            (vars::RUNNER_TOKEN_CHECK, "structured"),
            (vars::RUNNER_HANDOFF, "spawn"),
            (vars::RUNNER_USER, "ci"),
        ])
        .unwrap();

        assert_eq!(s.server_url.as_deref(), Some("https://ci.example.com"));
        assert_eq!(s.registration_token.as_ref().map(Secret::expose), Some("abc123"));
        assert_eq!(s.tags, vec!["docker", "dind", "linux"]);
        assert!(s.locked.is_enabled());
        assert_eq!(s.config_path, PathBuf::from("/srv/runner/config.toml"));
        assert_eq!(s.token_check, TokenPredicate::Structured);
        assert_eq!(s.handoff, HandoffMode::Spawn);
        assert_eq!(s.worker.user, "ci");
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = settings(&[(vars::RUNNER_HANDOFF, "fork")]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidValue { var, .. } if var == vars::RUNNER_HANDOFF));

        let err = settings(&[(vars::RUNNER_LOCKED, "perhaps")]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidValue { var, .. } if var == vars::RUNNER_LOCKED));
    }

    #[test]
    fn register_request_requires_url_and_token() {
        let s = settings(&[(vars::REGISTRATION_TOKEN, "abc123")]).unwrap();
        assert!(matches!(
            s.register_request(),
            Err(ModelError::MissingVariable(v)) if v == vars::CI_SERVER_URL
        ));

        let s = settings(&[(vars::CI_SERVER_URL, "https://ci.example.com")]).unwrap();
        assert!(matches!(
            s.register_request(),
            Err(ModelError::MissingVariable(v)) if v == vars::REGISTRATION_TOKEN
        ));
    }

    #[test]
    fn register_request_carries_profile() {
        let profile = ExecutorProfile {
            image: "docker:27.1".into(),
            ..Default::default()
        };
        let s = settings(&[
            (vars::CI_SERVER_URL, "https://ci.example.com"),
            (vars::REGISTRATION_TOKEN, "abc123"),
        ])
        .unwrap()
        .with_profile(profile);

        let req = s.register_request().unwrap();
        assert_eq!(req.url, "https://ci.example.com");
        assert_eq!(req.token.expose(), "abc123");
        assert_eq!(req.profile.image, "docker:27.1");
        assert_eq!(req.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn handoff_mode_roundtrips_names() {
        for mode in [HandoffMode::Exec, HandoffMode::Spawn] {
            assert_eq!(mode.to_string().parse::<HandoffMode>().unwrap(), mode);
        }
    }
}

use std::fmt;

use crate::{ExecutorProfile, Flag, ModelError, ModelResult, Secret, vars};

/// Everything one `register` call needs.
///
/// Built from [`crate::Settings`] only when the identity record is missing, so
/// an unset URL or token is reported at the moment registration is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Control-plane endpoint.
    pub url: String,
    /// One-time registration credential.
    pub token: Secret,
    pub description: String,
    /// Job tags; empty means none are sent.
    pub tags: Vec<String>,
    pub run_untagged: Flag,
    pub locked: Flag,
    pub profile: ExecutorProfile,
}

impl RegisterRequest {
    /// Check the preconditions of a registration attempt.
    ///
    /// The URL is checked first, so with both inputs missing the error names
    /// the URL variable.
    pub fn validate(&self) -> ModelResult<()> {
        if self.url.trim().is_empty() {
            return Err(ModelError::MissingVariable(vars::CI_SERVER_URL));
        }
        if self.token.expose().trim().is_empty() {
            return Err(ModelError::MissingVariable(vars::REGISTRATION_TOKEN));
        }
        self.profile.validate()
    }
}

impl fmt::Display for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RegisterRequest(url='{}', token={}, executor='{}', image='{}', tags={})",
            self.url,
            self.token,
            self.profile.executor,
            self.profile.image,
            self.tags.len(),
        )
    }
}

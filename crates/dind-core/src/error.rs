use thiserror::Error;

use dind_model::ModelError;

use crate::collab::CallError;

/// Exit status for every fatal startup error.
pub const FATAL_EXIT_CODE: i32 = 1;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Registration required but its inputs are missing or invalid.
    #[error("fatal configuration error: {0}")]
    FatalConfiguration(#[from] ModelError),

    /// The external registration call failed. Never retried.
    #[error("fatal registration error: {0}")]
    FatalRegistration(#[source] CallError),

    #[error("worker handoff failed: {0}")]
    Handoff(#[source] CallError),
}

impl CoreError {
    pub fn exit_code(&self) -> i32 {
        FATAL_EXIT_CODE
    }
}

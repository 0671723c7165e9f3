//! External collaborators of the supervisor.
//!
//! The supervisor never spawns anything itself. It drives a [`RunnerCli`]
//! (registration and verification) and a [`Handoff`] (transfer of control to
//! the worker); concrete process-backed implementations live in `dind-exec`.
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use dind_model::{RegisterRequest, WorkerSpec};

/// Failure of an external call.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("failed to start '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("'{program}' exited with code {code}")]
    Exit { program: String, code: i32 },

    #[error("'{program}' terminated by signal")]
    Signaled { program: String },

    #[error("io error: {0}")]
    Io(String),
}

/// Result of a verification call; never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Success,
    Failure,
}

/// Registration and verification endpoints of the runner CLI.
#[async_trait]
pub trait RunnerCli: Send + Sync {
    /// Register a new runner identity.
    ///
    /// A successful call leaves the identity record on disk; the supervisor
    /// does not write it.
    async fn register(&self, req: &RegisterRequest) -> Result<(), CallError>;

    /// Check the persisted identity against the control plane.
    async fn verify(&self) -> Result<(), CallError>;
}

/// Terminal transfer of control to the worker process.
#[async_trait]
pub trait Handoff: Send + Sync {
    /// Hand control to the worker.
    ///
    /// A process-replacing implementation only returns on failure. A spawning
    /// implementation returns the worker's exit code once it terminates.
    async fn handoff(&self, worker: &WorkerSpec) -> Result<i32, CallError>;
}

#[async_trait]
impl<T: RunnerCli + ?Sized> RunnerCli for Arc<T> {
    async fn register(&self, req: &RegisterRequest) -> Result<(), CallError> {
        (**self).register(req).await
    }

    async fn verify(&self) -> Result<(), CallError> {
        (**self).verify().await
    }
}

#[async_trait]
impl<T: Handoff + ?Sized> Handoff for Arc<T> {
    async fn handoff(&self, worker: &WorkerSpec) -> Result<i32, CallError> {
        (**self).handoff(worker).await
    }
}

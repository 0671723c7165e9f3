//! Idempotent registration followed by handoff to the worker.
//!
//! ```text
//! Start -> CheckRegistration -+- unregistered -> Register -+-> Verify -> Run
//!                             +- registered ---------------+
//! ```
//!
//! `Register` is the only step that can end the workflow early: missing inputs
//! and a failed external call are both fatal. `Verify` always proceeds. `Run`
//! is terminal.
use tracing::{info, instrument, warn};

use dind_model::Settings;

use crate::{
    collab::{Handoff, RunnerCli, VerificationOutcome},
    error::CoreError,
    store::IdentityStore,
};

/// Drives one entrypoint lifecycle against a single identity record.
pub struct RegistrationSupervisor<C, H> {
    settings: Settings,
    store: IdentityStore,
    cli: C,
    handoff: H,
}

impl<C, H> RegistrationSupervisor<C, H>
where
    C: RunnerCli,
    H: Handoff,
{
    /// The identity record path and predicate are taken from `settings`.
    pub fn new(settings: Settings, cli: C, handoff: H) -> Self {
        let store = IdentityStore::new(settings.config_path.clone(), settings.token_check);
        Self {
            settings,
            store,
            cli,
            handoff,
        }
    }

    pub fn store(&self) -> &IdentityStore {
        &self.store
    }

    pub fn is_registered(&self) -> bool {
        self.store.is_registered()
    }

    /// Register the runner once.
    ///
    /// Inputs are validated before the CLI is touched, so a missing URL or
    /// token never reaches the control plane.
    #[instrument(level = "debug", skip(self), fields(record = %self.store.path().display()))]
    pub async fn register(&self) -> Result<(), CoreError> {
        let req = self.settings.register_request()?;

        info!(
            url = %req.url,
            executor = %req.profile.executor,
            image = %req.profile.image,
            "registering runner",
        );
        self.cli
            .register(&req)
            .await
            .map_err(CoreError::FatalRegistration)?;

        info!("runner registered");
        Ok(())
    }

    /// Verify the persisted identity. Failures only produce a warning.
    pub async fn verify(&self) -> VerificationOutcome {
        match self.cli.verify().await {
            Ok(()) => {
                info!("runner verification succeeded");
                VerificationOutcome::Success
            }
            Err(e) => {
                warn!(error = %e, "runner verification failed; starting worker anyway");
                VerificationOutcome::Failure
            }
        }
    }

    /// Transfer control to the worker.
    ///
    /// Returns the worker's exit code when the handoff spawns instead of
    /// replacing the process.
    pub async fn run(&self) -> Result<i32, CoreError> {
        let worker = &self.settings.worker;
        info!(
            user = %worker.user,
            working_directory = %worker.working_directory.display(),
            mode = %self.settings.handoff,
            "handing off to runner worker",
        );
        self.handoff.handoff(worker).await.map_err(CoreError::Handoff)
    }

    /// Full workflow: check, register if needed, verify, run.
    pub async fn supervise(&self) -> Result<i32, CoreError> {
        if self.is_registered() {
            info!(
                record = %self.store.path().display(),
                "runner already registered; skipping registration",
            );
        } else {
            self.register().await?;
        }
        self.verify().await;
        self.run().await
    }
}

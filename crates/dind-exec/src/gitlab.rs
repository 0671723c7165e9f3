use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, instrument};

use dind_core::{CallError, RunnerCli};
use dind_model::{RegisterRequest, Settings, WorkerSpec};

use crate::{CommandSpec, OutputLogConfig, run_to_completion};

const SECRET_FLAGS: &[&str] = &["--registration-token"];

/// `gitlab-runner` CLI adapter.
///
/// Every subcommand is pointed at the same `--config` file so the CLI writes
/// the identity record exactly where the supervisor looks for it.
#[derive(Debug, Clone)]
pub struct GitlabRunner {
    binary: PathBuf,
    config_path: PathBuf,
    log: OutputLogConfig,
}

impl GitlabRunner {
    pub fn new(binary: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config_path: config_path.into(),
            log: OutputLogConfig::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.runner_binary, &settings.config_path)
    }

    fn config_arg(&self) -> String {
        self.config_path.display().to_string()
    }

    /// `gitlab-runner register --non-interactive ...` with the full executor profile.
    pub fn register_command(&self, req: &RegisterRequest) -> CommandSpec {
        let p = &req.profile;
        let mut cmd = CommandSpec::new(&self.binary)
            .with_secret_flags(SECRET_FLAGS)
            .args(["register", "--non-interactive"])
            .args(["--config".to_string(), self.config_arg()])
            .args(["--url", req.url.as_str()])
            .args(["--registration-token", req.token.expose()])
            .args(["--description", req.description.as_str()]);

        if !req.tags.is_empty() {
            cmd = cmd.args(["--tag-list".to_string(), req.tags.join(",")]);
        }
        cmd = cmd
            .arg(format!("--run-untagged={}", req.run_untagged.as_str()))
            .arg(format!("--locked={}", req.locked.as_str()))
            .args(["--executor", p.executor.as_str()])
            .args(["--docker-image", p.image.as_str()]);

        cmd = if p.privileged.is_enabled() {
            cmd.arg("--docker-privileged")
        } else {
            cmd.arg("--docker-privileged=false")
        };
        for volume in &p.volumes {
            cmd = cmd.args(["--docker-volumes", volume.as_str()]);
        }
        cmd.args(["--docker-network-mode", p.network_mode.as_str()])
            .args(["--docker-memory", p.memory.as_str()])
            .args(["--docker-memory-swap", p.memory_swap.as_str()])
            .args(["--docker-cpus", p.cpus.as_str()])
            .args(["--docker-pull-policy", p.pull_policy.as_str()])
            .args([
                "--docker-wait-for-services-timeout".to_string(),
                p.wait_for_services_timeout_secs.to_string(),
            ])
    }

    pub fn verify_command(&self) -> CommandSpec {
        CommandSpec::new(&self.binary)
            .arg("verify")
            .args(["--config".to_string(), self.config_arg()])
    }

    /// Long-running worker invocation.
    pub fn run_command(&self, worker: &WorkerSpec) -> CommandSpec {
        CommandSpec::new(&self.binary)
            .arg("run")
            .args(["--user", worker.user.as_str()])
            .args([
                "--working-directory".to_string(),
                worker.working_directory.display().to_string(),
            ])
            .args(["--config".to_string(), self.config_arg()])
    }
}

#[async_trait]
impl RunnerCli for GitlabRunner {
    #[instrument(level = "debug", skip_all)]
    async fn register(&self, req: &RegisterRequest) -> Result<(), CallError> {
        let cmd = self.register_command(req);
        debug!(command = %cmd, "invoking runner registration");
        run_to_completion(&cmd, self.log).await.map_err(Into::into)
    }

    async fn verify(&self) -> Result<(), CallError> {
        let cmd = self.verify_command();
        debug!(command = %cmd, "invoking runner verification");
        run_to_completion(&cmd, self.log).await.map_err(Into::into)
    }
}

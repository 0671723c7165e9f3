//! Terminal transfer of control to `gitlab-runner run`.
//!
//! In [`HandoffMode::Exec`] the entrypoint process image is replaced, so the
//! worker inherits the PID (usually 1 in a container), the signals and the
//! exit status directly. [`HandoffMode::Spawn`] keeps the entrypoint as parent:
//! the worker runs as a child, catchable signals are forwarded to it, and its
//! exit code is returned for the entrypoint to exit with.
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use dind_core::{CallError, Handoff};
use dind_model::{HandoffMode, Settings, WorkerSpec};

use crate::{CommandSpec, ExecError, GitlabRunner, exit_code_of};

/// Process-backed [`Handoff`].
#[derive(Debug, Clone)]
pub struct ProcessHandoff {
    runner: GitlabRunner,
    mode: HandoffMode,
}

impl ProcessHandoff {
    pub fn new(runner: GitlabRunner, mode: HandoffMode) -> Self {
        Self { runner, mode }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(GitlabRunner::from_settings(settings), settings.handoff)
    }

    pub fn mode(&self) -> HandoffMode {
        self.mode
    }

    async fn dispatch(&self, spec: &CommandSpec) -> Result<i32, ExecError> {
        spec.validate()?;
        match self.mode {
            #[cfg(unix)]
            HandoffMode::Exec => replace_process(spec),
            #[cfg(not(unix))]
            HandoffMode::Exec => {
                warn!("process replacement is unavailable on this platform; spawning worker instead");
                spawn_and_wait(spec).await
            }
            HandoffMode::Spawn => spawn_and_wait(spec).await,
        }
    }
}

#[async_trait]
impl Handoff for ProcessHandoff {
    async fn handoff(&self, worker: &WorkerSpec) -> Result<i32, CallError> {
        let spec = self.runner.run_command(worker);
        info!(command = %spec, mode = %self.mode, "starting runner worker");
        self.dispatch(&spec).await.map_err(Into::into)
    }
}

/// Replace the current process image. Returns only if `execvp` failed.
#[cfg(unix)]
fn replace_process(spec: &CommandSpec) -> Result<i32, ExecError> {
    use std::os::unix::process::CommandExt;

    let source = std::process::Command::new(spec.program())
        .args(spec.raw_args())
        .exec();
    Err(ExecError::Exec {
        program: spec.program_name(),
        source,
    })
}

/// Launch the worker as a child and wait for it, forwarding signals.
///
/// Signal streams are registered before the child exists, so a signal that
/// arrives right after spawn is still forwarded.
async fn spawn_and_wait(spec: &CommandSpec) -> Result<i32, ExecError> {
    let program = spec.program_name();
    let mut signals = ForwardedSignals::install()?;
    let mut child = Command::new(spec.program())
        .args(spec.raw_args())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;
    debug!(pid = ?child.id(), "runner worker spawned");

    let status = loop {
        let signo = tokio::select! {
            status = child.wait() => break status?,
            signo = signals.recv() => signo,
        };
        forward_signal(&child, signo);
    };
    let code = exit_code_of(status);
    info!(program = %program, code, "runner worker exited");
    Ok(code)
}

/// Termination and control signals relayed to the worker.
#[cfg(unix)]
struct ForwardedSignals {
    term: tokio::signal::unix::Signal,
    int: tokio::signal::unix::Signal,
    hup: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
    usr1: tokio::signal::unix::Signal,
    usr2: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ForwardedSignals {
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            term: signal(SignalKind::terminate())?,
            int: signal(SignalKind::interrupt())?,
            hup: signal(SignalKind::hangup())?,
            quit: signal(SignalKind::quit())?,
            usr1: signal(SignalKind::user_defined1())?,
            usr2: signal(SignalKind::user_defined2())?,
        })
    }

    async fn recv(&mut self) -> libc::c_int {
        tokio::select! {
            _ = self.term.recv() => libc::SIGTERM,
            _ = self.int.recv() => libc::SIGINT,
            _ = self.hup.recv() => libc::SIGHUP,
            _ = self.quit.recv() => libc::SIGQUIT,
            _ = self.usr1.recv() => libc::SIGUSR1,
            _ = self.usr2.recv() => libc::SIGUSR2,
        }
    }
}

#[cfg(not(unix))]
struct ForwardedSignals;

#[cfg(not(unix))]
impl ForwardedSignals {
    fn install() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> i32 {
        std::future::pending().await
    }
}

#[cfg(not(unix))]
fn forward_signal(_child: &Child, _signo: i32) {}

#[cfg(unix)]
fn forward_signal(child: &Child, signo: libc::c_int) {
    let Some(pid) = child.id() else {
        // Already reaped; the next wait() returns the status.
        return;
    };
    debug!(pid, signal = signo, "forwarding signal to runner worker");
    // SAFETY: plain kill(2) on the pid of a child we have not reaped yet.
    let rc = unsafe { libc::kill(pid as libc::pid_t, signo) };
    if rc != 0 {
        warn!(
            pid,
            signal = signo,
            error = %std::io::Error::last_os_error(),
            "failed to forward signal to runner worker",
        );
    }
}

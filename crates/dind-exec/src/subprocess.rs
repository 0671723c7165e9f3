use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, trace};

use crate::{
    CommandSpec, ExecError, OutputLogConfig,
    output::{Stream, forward_lines},
};

/// Run a command to completion, mirroring its output into the log.
///
/// Succeeds only on a zero exit status. No retry and no timeout: the caller
/// decides what a failure means.
pub async fn run_to_completion(spec: &CommandSpec, log: OutputLogConfig) -> Result<(), ExecError> {
    spec.validate()?;
    let program = spec.program_name();
    trace!(command = %spec, "spawning subprocess");

    let mut cmd = Command::new(spec.program());
    cmd.args(spec.raw_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
        program: program.clone(),
        source,
    })?;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (status, (), ()) = tokio::join!(
        child.wait(),
        forward_lines(stdout, Stream::Stdout, log, &program),
        forward_lines(stderr, Stream::Stderr, log, &program),
    );
    check_status(&program, status?)
}

fn check_status(program: &str, status: ExitStatus) -> Result<(), ExecError> {
    if status.success() {
        debug!(program, "subprocess exited successfully");
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(ExecError::NonZeroExit {
            program: program.to_string(),
            code,
        }),
        None => Err(ExecError::Signaled {
            program: program.to_string(),
        }),
    }
}

/// Exit code a shell would report for `status`: the code itself, or
/// `128 + signal` when the process was killed.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").args(["-c", script])
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let res = run_to_completion(&sh("echo out; echo err >&2"), OutputLogConfig::default()).await;
        assert!(res.is_ok(), "{res:?}");
    }

    #[tokio::test]
    async fn non_zero_exit_reports_code() {
        let err = run_to_completion(&sh("exit 3"), OutputLogConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::NonZeroExit { code: 3, .. }));
    }

    #[tokio::test]
    async fn killed_child_reports_signal() {
        let err = run_to_completion(&sh("kill -9 $$"), OutputLogConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Signaled { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let spec = CommandSpec::new("/nonexistent/gitlab-runner").arg("verify");
        let err = run_to_completion(&spec, OutputLogConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[test]
    fn exit_code_of_maps_signals() {
        let status = std::process::Command::new("sh")
            .args(["-c", "kill -15 $$"])
            .status()
            .unwrap();
        assert_eq!(exit_code_of(status), 143);

        let status = std::process::Command::new("sh")
            .args(["-c", "exit 5"])
            .status()
            .unwrap();
        assert_eq!(exit_code_of(status), 5);
    }
}

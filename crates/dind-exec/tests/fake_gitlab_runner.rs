//! End-to-end supervisor run against a shell stand-in for `gitlab-runner`.
//!
//! Kept to a single test so no other test in this binary forks while the
//! script is being written (avoids ETXTBSY on exec).
#![cfg(unix)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use dind_core::{CoreError, RegistrationSupervisor};
use dind_exec::{GitlabRunner, ProcessHandoff};
use dind_model::{HandoffMode, Secret, Settings};

/// Appends `$*` to `calls`; `register` writes a record into the `--config`
/// path, `verify` fails when `verify_fails` exists, `run` exits 7.
fn write_fake_runner(dir: &Path, calls: &Path) -> PathBuf {
    let script = dir.join("gitlab-runner");
    let verify_flag = dir.join("verify_fails");
    let body = format!(
        r#"#!/bin/sh
echo "$*" >> '{calls}'
cmd="$1"
cfg=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--config" ]; then cfg="$2"; fi
  shift
done
case "$cmd" in
  register)
    printf 'concurrent = 1\n[[runners]]\n  token = "glrt-fake"\n' > "$cfg"
    echo "Runner registered successfully"
    exit 0 ;;
  verify)
    if [ -e '{verify_flag}' ]; then echo "ERROR: Verifying runner... is not valid" >&2; exit 1; fi
    echo "Verifying runner... is valid" >&2
    exit 0 ;;
  run)
    exit 7 ;;
esac
exit 2
"#,
        calls = calls.display(),
        verify_flag = verify_flag.display(),
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn supervisor(settings: Settings) -> RegistrationSupervisor<GitlabRunner, ProcessHandoff> {
    RegistrationSupervisor::new(
        settings.clone(),
        GitlabRunner::from_settings(&settings),
        ProcessHandoff::from_settings(&settings),
    )
}

fn calls(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

#[tokio::test]
async fn supervisor_drives_runner_cli() {
    let dir = tempfile::tempdir().unwrap();
    let calls_log = dir.path().join("calls.log");
    let binary = write_fake_runner(dir.path(), &calls_log);
    let record = dir.path().join("config.toml");

    let settings = Settings {
        server_url: Some("https://ci.example.com".into()),
        registration_token: Some(Secret::from("abc123")),
        config_path: record.clone(),
        runner_binary: binary,
        handoff: HandoffMode::Spawn,
        ..Default::default()
    };

    // First start: register, verify, run; worker exit code is propagated.
    let code = supervisor(settings.clone()).supervise().await.unwrap();
    assert_eq!(code, 7);
    assert!(record.exists());

    let log = calls(&calls_log);
    assert_eq!(log.len(), 3, "{log:?}");
    assert!(log[0].starts_with("register --non-interactive"));
    assert!(log[0].contains("--url https://ci.example.com"));
    assert!(log[0].contains("--registration-token abc123"));
    assert!(log[0].contains("--docker-privileged"));
    assert!(log[1].starts_with("verify"));
    assert!(log[2].starts_with("run --user gitlab-runner --working-directory /home/gitlab-runner"));

    // Restart with credentials gone and verification failing: no second
    // registration, worker still started.
    fs::write(dir.path().join("verify_fails"), "").unwrap();
    let restarted = Settings {
        server_url: None,
        registration_token: None,
        ..settings.clone()
    };
    let code = supervisor(restarted).supervise().await.unwrap();
    assert_eq!(code, 7);

    let log = calls(&calls_log);
    assert_eq!(log.iter().filter(|l| l.starts_with("register")).count(), 1);
    assert_eq!(log.len(), 5, "{log:?}");

    // Fresh store with a failing registration: fatal, nothing else runs.
    fs::remove_file(&record).unwrap();
    let broken = Settings {
        runner_binary: dir.path().join("missing-runner"),
        ..settings
    };
    let err = supervisor(broken).supervise().await.unwrap_err();
    assert!(matches!(err, CoreError::FatalRegistration(_)), "{err:?}");
    assert_eq!(err.exit_code(), 1);
    assert_eq!(calls(&calls_log).len(), 5);
}

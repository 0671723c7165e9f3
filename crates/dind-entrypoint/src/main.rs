use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info};

use dind_core::{FATAL_EXIT_CODE, RegistrationSupervisor};
use dind_exec::{GitlabRunner, ProcessHandoff};
use dind_model::{ExecutorProfile, Settings};
use dind_observe::{LoggerConfig, init_local_offset, init_logger};

fn main() -> ExitCode {
    // Offset detection must run before any thread exists.
    init_local_offset();

    // 1) logger
    let log_cfg = match LoggerConfig::from_lookup(env) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("invalid logger configuration: {e}");
            return ExitCode::from(FATAL_EXIT_CODE as u8);
        }
    };
    if let Err(e) = init_logger(&log_cfg) {
        eprintln!("failed to initialize logger: {e}");
        return ExitCode::from(FATAL_EXIT_CODE as u8);
    }

    // 2) settings, read once
    let settings = match load_settings() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %format!("{e:#}"), "invalid entrypoint configuration");
            return ExitCode::from(FATAL_EXIT_CODE as u8);
        }
    };

    // 3) supervise on a single-threaded runtime
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build runtime");
            return ExitCode::from(FATAL_EXIT_CODE as u8);
        }
    };
    match runtime.block_on(supervise(settings)) {
        Ok(code) => ExitCode::from(worker_exit_status(code)),
        Err(e) => {
            error!(error = %e, "runner startup aborted");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn supervise(settings: Settings) -> Result<i32, dind_core::CoreError> {
    info!(
        record = %settings.config_path.display(),
        binary = %settings.runner_binary.display(),
        check = %settings.token_check,
        handoff = %settings.handoff,
        "runner entrypoint starting",
    );
    let cli = GitlabRunner::from_settings(&settings);
    let handoff = ProcessHandoff::from_settings(&settings);
    RegistrationSupervisor::new(settings, cli, handoff)
        .supervise()
        .await
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Settings from the process environment, with the optional profile file applied.
fn load_settings() -> anyhow::Result<Settings> {
    let settings = Settings::from_lookup(env)?;
    let Some(path) = settings.profile_file.clone() else {
        return Ok(settings);
    };
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading executor profile {}", path.display()))?;
    let profile = ExecutorProfile::from_json(&raw)
        .with_context(|| format!("parsing executor profile {}", path.display()))?;
    info!(path = %path.display(), image = %profile.image, "executor profile loaded");
    Ok(settings.with_profile(profile))
}

/// Map a worker exit code onto the byte range a process can report.
fn worker_exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(FATAL_EXIT_CODE as u8)
}

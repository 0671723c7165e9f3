//! Process-backed collaborators for the registration supervisor.
//!
//! - [`GitlabRunner`] implements `dind_core::RunnerCli` by running
//!   `gitlab-runner register` / `verify` as child processes.
//! - [`ProcessHandoff`] implements `dind_core::Handoff` by exec-ing (or
//!   spawning) `gitlab-runner run`.
mod error;
pub use error::ExecError;

mod command;
pub use command::CommandSpec;

mod output;
pub use output::OutputLogConfig;

mod subprocess;
pub use subprocess::{exit_code_of, run_to_completion};

mod gitlab;
pub use gitlab::GitlabRunner;

mod handoff;
pub use handoff::ProcessHandoff;

//! Well-known paths and names of a stock runner container.
//!
//! Every value here can be overridden through [`crate::Settings`].

/// Location of the runner identity record written by `gitlab-runner register`.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/gitlab-runner/config.toml";

/// Runner CLI executable, resolved through `PATH`.
pub const DEFAULT_RUNNER_BINARY: &str = "gitlab-runner";

/// Account the worker process runs jobs as.
pub const DEFAULT_RUNNER_USER: &str = "gitlab-runner";

/// Working directory of the worker process.
pub const DEFAULT_WORKING_DIRECTORY: &str = "/home/gitlab-runner";

/// Description attached to a freshly registered runner.
pub const DEFAULT_DESCRIPTION: &str = "docker-in-docker runner";

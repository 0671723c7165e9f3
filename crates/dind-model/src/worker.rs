use std::path::PathBuf;

/// Identity and location of the long-running worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSpec {
    /// Account jobs run as.
    pub user: String,
    /// Working directory of the worker.
    pub working_directory: PathBuf,
}

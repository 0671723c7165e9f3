use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use dind_model::TokenPredicate;

/// Read-only view of the runner identity record.
///
/// The record is created by the runner CLI and removed only by an operator;
/// this type never writes it.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
    predicate: TokenPredicate,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>, predicate: TokenPredicate) -> Self {
        Self {
            path: path.into(),
            predicate,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` iff the record exists and its content satisfies the token predicate.
    ///
    /// Missing, unreadable and malformed records all count as unregistered.
    pub fn is_registered(&self) -> bool {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "identity record not found");
                return false;
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "identity record unreadable; treating runner as unregistered",
                );
                return false;
            }
        };

        let registered = self.predicate.matches(&String::from_utf8_lossy(&bytes));
        debug!(
            path = %self.path.display(),
            check = %self.predicate,
            registered,
            "identity record inspected",
        );
        registered
    }
}

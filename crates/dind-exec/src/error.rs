use std::io;

use thiserror::Error;

use dind_core::CallError;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid command: {0}")]
    InvalidSpec(String),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to exec '{program}': {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with non-zero code: {code}")]
    NonZeroExit { program: String, code: i32 },

    #[error("'{program}' terminated by signal")]
    Signaled { program: String },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<ExecError> for CallError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::Spawn { program, source } | ExecError::Exec { program, source } => {
                CallError::Spawn {
                    program,
                    reason: source.to_string(),
                }
            }
            ExecError::NonZeroExit { program, code } => CallError::Exit { program, code },
            ExecError::Signaled { program } => CallError::Signaled { program },
            ExecError::InvalidSpec(reason) => CallError::InvalidCommand(reason),
            ExecError::Io(e) => CallError::Io(e.to_string()),
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("required variable {0} is not set")]
    MissingVariable(&'static str),

    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown handoff mode: {0}")]
    UnknownHandoffMode(String),

    #[error("unknown token check: {0}")]
    UnknownTokenPredicate(String),

    #[error("invalid executor profile: {0}")]
    InvalidProfile(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

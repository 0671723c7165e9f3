mod domain;
pub use domain::{DEFAULT_CONFIG_PATH, DEFAULT_RUNNER_BINARY, DEFAULT_RUNNER_USER};
pub use domain::{DEFAULT_DESCRIPTION, DEFAULT_WORKING_DIRECTORY};
pub use domain::{Flag, Secret};

mod error;
pub use error::{ModelError, ModelResult};

mod predicate;
pub use predicate::TokenPredicate;

mod profile;
pub use profile::ExecutorProfile;

mod request;
pub use request::RegisterRequest;

mod settings;
pub use settings::{HandoffMode, Settings, vars};

mod worker;
pub use worker::WorkerSpec;

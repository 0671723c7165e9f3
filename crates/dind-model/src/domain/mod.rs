mod flag;
pub use flag::Flag;

mod secret;
pub use secret::Secret;

mod constants;
pub use constants::{DEFAULT_CONFIG_PATH, DEFAULT_RUNNER_BINARY, DEFAULT_RUNNER_USER};
pub use constants::{DEFAULT_DESCRIPTION, DEFAULT_WORKING_DIRECTORY};

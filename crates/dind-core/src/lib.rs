pub mod collab;
pub mod error;
pub mod store;
pub mod supervisor;

pub mod prelude {
    pub use crate::collab::{CallError, Handoff, RunnerCli, VerificationOutcome};
    pub use crate::error::{CoreError, FATAL_EXIT_CODE};
    pub use crate::store::IdentityStore;
    pub use crate::supervisor::RegistrationSupervisor;
}

pub use prelude::*;

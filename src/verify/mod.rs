pub mod command;
pub mod controller;
pub mod executor;
pub mod summary;
pub mod verifier;

pub use command::CommandVerifier;
pub use controller::{Controller, ControllerConfig, ControllerError, DEFAULT_VERIFIER_TIMEOUT};
pub use executor::{run_command, CommandOutcome, DEFAULT_COMMAND_TIMEOUT};
pub use summary::compute_summary;
pub use verifier::Verifier;

//! CLI command implementations, one module per subcommand

pub mod cleanup;
pub mod common;
pub mod compare;
pub mod completions;
pub mod dashboard;
pub mod export;
pub mod init;
pub mod list;
pub mod run;
pub mod show;
pub mod trends;

pub use common::CommandContext;

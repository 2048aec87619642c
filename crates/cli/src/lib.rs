//! `segctl`: inspect segment placement and exercise the orchestrator.
//!
//! Provides commands for:
//! - Looking up replica nodes for a key
//! - Showing how keys spread across nodes
//! - Previewing how many keys move when a node joins
//! - Running the full store/read path against in-memory collaborators

pub mod commands;
pub mod config;
pub mod telemetry;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;

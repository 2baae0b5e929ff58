//! CLI module
//!
//! Command-line interface over [`ApiClient`](crate::api::ApiClient).
//!
//! # Commands
//!
//! - `groups` - List the groups of the account
//! - `connectors` - List the connectors of one group
//! - `lineage` - Print source-to-destination table mappings for one group

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

//! `ralph` command-line adapter.
//!
//! Runs agent processes under the supervisor, tails and pages log files, and
//! shows the persisted settings. `main.rs` only parses arguments, sets up
//! tracing and dispatches to [`handlers`].

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary entry point only.
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;

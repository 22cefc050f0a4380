//! Command-line front end for the adaptadocx documentation builder.
//!
//! The build pipeline lives in `adaptadocx-core`; this crate only resolves
//! configuration, dispatches subcommands and reports results.

pub mod cli;
pub mod load_config;

pub use cli::{exit_code, run, Cli, Commands};

//! `uipo` command-line client: argument parsing, dispatch and output.
//!
//! Session state, authentication and HTTP plumbing live in the `uipo` core
//! library; this crate wires them to the six user-facing commands.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

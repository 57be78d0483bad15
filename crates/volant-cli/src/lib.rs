//! Command implementations for the `volant` CLI.
//!
//! Each module owns one group of subcommands; `main.rs` only parses
//! arguments and dispatches.

// The terminal is the product surface — command results go to stdout.
#![allow(clippy::print_stdout)]

pub mod auth;
pub mod context;
pub mod nodes;
pub mod vpn;

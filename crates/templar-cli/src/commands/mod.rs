//! Command handlers.
//!
//! Each submodule implements one subcommand: translate CLI arguments into
//! core service calls and display results. No rendering logic lives here.

pub mod render;
pub mod tags;

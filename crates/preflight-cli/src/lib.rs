//! Command-line runner for preflight table validation.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;

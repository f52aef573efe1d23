//! Shared utilities for the preflight crates.
//!
//! This crate provides the Polars `AnyValue` helpers every other crate uses to
//! stringify cells, coerce them to numbers, and decide whether a cell is
//! missing.

pub mod polars;

pub use polars::{any_to_f64, any_to_string, format_numeric, is_missing, parse_f64};

//! # Configuration Module
//!
//! Benchmark configuration and validation shared by the CLI and the library.

pub mod config;

pub use config::{BenchConfig, DEFAULT_TRIALS, MAX_WIDTHS, leading_widths, parse_widths};

//! Command-line interface components
//!
//! This module contains CLI-specific code for the listing proxy: argument
//! parsing and logging setup.

pub mod args;
pub mod logging;

pub use args::Cli;
pub use logging::{init_logging, log_filter};

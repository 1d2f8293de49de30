//! Listing Proxy Library
//!
//! A caching HTTP proxy in front of a real-estate listing catalog. The
//! catalog is fetched once per cache lifetime, split into per-channel buckets
//! by each channel's eligibility rules and served a page at a time.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod server;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

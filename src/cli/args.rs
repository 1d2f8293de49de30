//! Command-line argument parsing for the listing proxy
//!
//! Every flag is optional: the upstream URL and bind address normally come
//! from the environment, and the flags only override it.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigOverrides;

/// Listing proxy - serve channel-filtered, paginated real-estate listings
#[derive(Parser, Debug)]
#[command(
    name = "listing_proxy",
    version,
    about = "Serve channel-filtered, paginated real-estate listings from a cached upstream catalog",
    long_about = "An HTTP proxy in front of a real-estate listing catalog.
Listings are filtered by each channel's eligibility rules, cached for a fixed time and served a page at a time."
)]
pub struct Cli {
    /// Upstream catalog URL (overrides ZAP_PROPERTIES_ENDPOINT)
    #[arg(long, value_name = "URL")]
    pub upstream: Option<String>,

    /// Address to listen on, e.g. ":8080" (overrides HOST)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Logging level requested by flags, if any
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.quiet {
            Some(tracing::Level::ERROR)
        } else if self.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }

    /// Configuration values given on the command line
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            upstream_url: self.upstream.clone(),
            bind_address: self.bind.clone(),
        }
    }
}

//! Application constants for the listing proxy
//!
//! Centralizes the constants used throughout the application, organized by
//! functional domain.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Upstream catalog URL
    pub const UPSTREAM_URL: &str = "ZAP_PROPERTIES_ENDPOINT";

    /// Address the HTTP server binds to
    pub const BIND_ADDRESS: &str = "HOST";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for upstream requests
    pub const USER_AGENT: &str = concat!("listing-proxy/", env!("CARGO_PKG_VERSION"));

    /// Upstream request timeout; the first uncached catalog download is slow
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;
}

/// Cache timing
pub mod cache {
    use super::Duration;

    /// Time a populated bucket stays valid
    pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

    /// Interval of the expired-entry sweep
    pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);
}

/// Channel names as sent in the `source` header
pub mod channels {
    /// Zap channel
    pub const ZAP: &str = "zap";

    /// Viva Real channel
    pub const VIVAREAL: &str = "vivareal";
}

/// Eligibility thresholds and price adjustments
pub mod rules {
    /// Minimum sale price for zap
    pub const ZAP_MIN_SALE_PRICE: f64 = 600_000.0;

    /// Minimum rental price for zap
    pub const ZAP_MIN_RENTAL_PRICE: f64 = 3_500.0;

    /// Rental price per usable square meter must exceed this for zap
    pub const ZAP_MIN_RENTAL_PRICE_PER_SQM: f64 = 3_500.0;

    /// Discount applied to zap sales inside the geofence
    pub const ZAP_GEOFENCE_SALE_FACTOR: f64 = 0.9;

    /// Minimum sale price for vivareal
    pub const VIVAREAL_MIN_SALE_PRICE: f64 = 700_000.0;

    /// Minimum rental price for vivareal
    pub const VIVAREAL_MIN_RENTAL_PRICE: f64 = 4_000.0;

    /// Monthly condo fee must stay below this share of the rental price
    pub const VIVAREAL_MAX_CONDO_FEE_RATIO: f64 = 0.3;

    /// Markup applied to vivareal rentals inside the geofence
    pub const VIVAREAL_GEOFENCE_RENTAL_FACTOR: f64 = 1.5;
}

/// Geofenced trade region
pub mod geofence {
    pub const MIN_LON: f64 = -46.693419;
    pub const MIN_LAT: f64 = -23.568704;
    pub const MAX_LON: f64 = -46.641146;
    pub const MAX_LAT: f64 = -23.546686;

    /// Products in the area computation are rounded to multiples of this
    pub const ROUNDING_STEP: f64 = 0.000_000_5;

    /// Allowed gap between the candidate sum and the box area
    pub const AREA_TOLERANCE: f64 = 2.5 * ROUNDING_STEP;
}

/// Pagination defaults
pub mod pagination {
    pub const DEFAULT_OFFSET: usize = 0;
    pub const DEFAULT_LIMIT: usize = 10;
}

/// Fixed response messages
pub mod responses {
    pub const SOURCE_NOT_ACCEPTED: &str = "Source not accepted.";
}

/// Server defaults
pub mod server {
    /// Route serving paginated listings
    pub const PROPERTIES_ROUTE: &str = "/properties";

    /// Header carrying the channel name
    pub const SOURCE_HEADER: &str = "source";
}

/// Configuration file names
pub mod config_files {
    /// Project-local configuration file
    pub const LOCAL_FILE: &str = "./listing-proxy.toml";

    /// Directory under the user config dir
    pub const APP_DIR: &str = "listing-proxy";

    /// File name under [`APP_DIR`]
    pub const FILE_NAME: &str = "config.toml";
}

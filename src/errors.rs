//! Error types for the listing proxy
//!
//! Each concern gets its own error enum; [`AppError`] wraps them for the
//! binary edge. Request-level failures are [`ServiceError`]s, which know the
//! status code and message the HTTP layer must answer with.

use std::path::PathBuf;

use thiserror::Error;

use crate::constants::responses;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Missing required configuration field
    #[error("Missing required configuration field: {field}. Set {env_var} or pass it on the command line")]
    MissingField { field: String, env_var: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Could not locate the user configuration directory
    #[error("Could not determine user config directory")]
    NoConfigDir,
}

/// Failures contacting or decoding the upstream listing catalog
///
/// Cloneable because a single population outcome is shared by every request
/// waiting on it. The display text is the underlying error text, which is what
/// clients see in the `error` field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Network error or timeout
    #[error("{message}")]
    Request { message: String },

    /// Upstream answered with a non-success status
    #[error("upstream responded with HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body is not the expected JSON array of listings
    #[error("{message}")]
    Decode { message: String },

    /// The HTTP client could not be constructed
    #[error("failed to build upstream HTTP client: {message}")]
    ClientBuild { message: String },
}

impl UpstreamError {
    /// Wrap a transport error
    pub fn request(error: &reqwest::Error) -> Self {
        Self::Request {
            message: error.to_string(),
        }
    }

    /// Wrap a body decoding error
    pub fn decode(error: impl std::fmt::Display) -> Self {
        Self::Decode {
            message: error.to_string(),
        }
    }
}

/// Request-level failures surfaced to the HTTP layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested channel is not one of the configured datasources
    #[error("{}", responses::SOURCE_NOT_ACCEPTED)]
    InvalidChannel { requested: String },

    /// Upstream fetch or decode failed while populating the cache
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ServiceError {
    /// HTTP status code for this failure
    ///
    /// Every request failure is reported as 404, matching the public contract.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidChannel { .. } => 404,
            ServiceError::Upstream(_) => 404,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ServiceError::InvalidChannel { .. } => "channel",
            ServiceError::Upstream(UpstreamError::Decode { .. }) => "upstream_decode",
            ServiceError::Upstream(_) => "upstream_fetch",
        }
    }
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Upstream error
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Request-level error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Upstream(_) => "upstream",
            AppError::Service(e) => e.category(),
            AppError::Io(_) => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Upstream result type alias
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// Service result type alias
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

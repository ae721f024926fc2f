//! Error types for the directory service.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for directory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for configuration loading and live queries
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read a configuration file
    #[error("failed to read configuration '{path}': {source}")]
    ConfigRead {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON for its schema
    #[error("failed to parse configuration '{path}': {source}")]
    ConfigParse {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Could not reach the server
    #[error("failed to connect to {server}: {source}")]
    Network {
        /// Display name of the server
        server: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The server rejected the login or a query
    #[error("query against {server} failed: {source}")]
    Sql {
        /// Display name of the server
        server: String,
        /// Underlying driver error
        #[source]
        source: tiberius::error::Error,
    },

    /// A query that must return a row returned none
    #[error("query against {server} returned no rows")]
    EmptyResult {
        /// Display name of the server
        server: String,
    },

    /// The configured authentication mode is not available on this platform
    #[error("integrated authentication for {server} is not supported on this platform")]
    UnsupportedAuth {
        /// Display name of the server
        server: String,
    },
}

impl Error {
    /// Creates a new configuration read error
    pub fn config_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new configuration parse error
    pub fn config_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ConfigParse {
            path: path.into(),
            source,
        }
    }

    /// Creates a new network error
    pub fn network(server: impl Into<String>, source: std::io::Error) -> Self {
        Self::Network {
            server: server.into(),
            source,
        }
    }

    /// Creates a new driver error
    pub fn sql(server: impl Into<String>, source: tiberius::error::Error) -> Self {
        Self::Sql {
            server: server.into(),
            source,
        }
    }

    /// Creates a new empty result error
    pub fn empty_result(server: impl Into<String>) -> Self {
        Self::EmptyResult {
            server: server.into(),
        }
    }

    /// Creates a new unsupported authentication error
    pub fn unsupported_auth(server: impl Into<String>) -> Self {
        Self::UnsupportedAuth {
            server: server.into(),
        }
    }
}

//! Live metadata queries against configured servers.
//!
//! The [`Catalog`] trait is the seam between the directory and a running
//! engine. [`MssqlCatalog`] talks TDS; tests substitute an in-memory catalog.

mod mssql;

use crate::config::ServerConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

pub use mssql::MssqlCatalog;

/// Version metadata reported by a running server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerMetadata {
    /// Full `@@VERSION` banner
    pub version_description: String,
    /// `SERVERPROPERTY('ProductVersion')`, e.g. `14.0.3465.1`
    pub version: String,
    /// `SERVERPROPERTY('ProductLevel')`, e.g. `RTM` or `SP2`
    pub level: String,
    /// `SERVERPROPERTY('Edition')`
    pub edition: String,
}

/// Source of live server information
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Query version, level and edition of a server
    async fn server_metadata(&self, server: &ServerConfig) -> Result<ServerMetadata>;

    /// List the names of all databases on a server, in server order
    async fn databases(&self, server: &ServerConfig) -> Result<Vec<String>>;
}

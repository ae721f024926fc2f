//! Immutable snapshot of configured servers and file shares.

use crate::catalog::{Catalog, ServerMetadata};
use crate::config::{Configuration, FileShare, ServerConfig};
use crate::error::Result;
use serde::Serialize;
use tracing::info;

/// A configured server together with the metadata queried at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerRecord {
    /// Connection settings from `servers.json`
    #[serde(flatten)]
    pub config: ServerConfig,
    /// Live metadata gathered during enrichment
    #[serde(flatten)]
    pub metadata: ServerMetadata,
}

/// Everything the service exposes, fixed once enrichment has finished
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    servers: Vec<ServerRecord>,
    files: Vec<FileShare>,
}

impl Directory {
    /// Query every configured server, one after the other, and build the
    /// snapshot.
    ///
    /// Servers are enriched strictly in configuration order and the first
    /// failure aborts the whole step.
    pub async fn enrich(config: Configuration, catalog: &dyn Catalog) -> Result<Self> {
        let mut servers = Vec::with_capacity(config.servers.len());

        for (index, server) in config.servers.into_iter().enumerate() {
            let metadata = catalog.server_metadata(&server).await?;
            info!(
                "{}: {} version {} ({}), {}",
                index,
                server.display_name(),
                metadata.version,
                metadata.level,
                metadata.edition
            );
            servers.push(ServerRecord {
                config: server,
                metadata,
            });
        }

        Ok(Self {
            servers,
            files: config.files,
        })
    }

    /// Build a snapshot from records that are already enriched
    pub fn from_parts(servers: Vec<ServerRecord>, files: Vec<FileShare>) -> Self {
        Self { servers, files }
    }

    /// All servers, in configuration order
    pub fn servers(&self) -> &[ServerRecord] {
        &self.servers
    }

    /// All file shares, in configuration order
    pub fn files(&self) -> &[FileShare] {
        &self.files
    }

    /// Server at `index`, if any
    pub fn server(&self, index: usize) -> Option<&ServerRecord> {
        self.servers.get(index)
    }

    /// File share at `index`, if any
    pub fn file(&self, index: usize) -> Option<&FileShare> {
        self.files.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::StaticCatalog;
    use crate::config::FileType;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn server(host: &str) -> ServerConfig {
        ServerConfig {
            host: host.to_string(),
            instance: String::new(),
            user: "backup".to_string(),
            password: "secret".to_string(),
            integrated_authentication: false,
        }
    }

    fn configuration(hosts: &[&str]) -> Configuration {
        Configuration {
            servers: hosts.iter().map(|h| server(h)).collect(),
            files: vec![FileShare {
                path: "/srv/backups".to_string(),
                file_type: FileType::Local,
            }],
        }
    }

    #[tokio::test]
    async fn test_enrich_in_configuration_order() {
        let catalog = StaticCatalog::default()
            .with_server("db02", "13.0.5026.0", &[])
            .with_server("db01", "14.0.3465.1", &[]);

        let directory = Directory::enrich(configuration(&["db01", "db02"]), &catalog)
            .await
            .unwrap();

        assert_eq!(*catalog.queried.lock().unwrap(), vec!["db01", "db02"]);
        assert_eq!(directory.servers().len(), 2);
        assert_eq!(directory.server(0).unwrap().metadata.version, "14.0.3465.1");
        assert_eq!(directory.server(1).unwrap().metadata.version, "13.0.5026.0");
        assert_eq!(directory.files().len(), 1);
        assert!(directory.server(2).is_none());
    }

    #[tokio::test]
    async fn test_enrich_stops_at_first_failure() {
        let catalog = StaticCatalog::default().with_server("db01", "14.0.3465.1", &[]);

        let err = Directory::enrich(configuration(&["db09", "db01"]), &catalog)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EmptyResult { ref server } if server == "db09"));
        assert_eq!(*catalog.queried.lock().unwrap(), vec!["db09"]);
    }

    #[test]
    fn test_record_json_shape() {
        let record = ServerRecord {
            config: server("db01"),
            metadata: ServerMetadata {
                version_description: "Microsoft SQL Server 2017".to_string(),
                version: "14.0.3465.1".to_string(),
                level: "RTM".to_string(),
                edition: "Standard Edition (64-bit)".to_string(),
            },
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Host"], "db01");
        assert_eq!(json["Version"], "14.0.3465.1");
        assert_eq!(json["Level"], "RTM");
        assert_eq!(json["Edition"], "Standard Edition (64-bit)");
        assert!(json.get("Password").is_none());
    }
}

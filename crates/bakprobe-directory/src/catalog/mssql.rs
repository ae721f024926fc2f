//! [`Catalog`] backed by a live TDS connection.

use super::{Catalog, ServerMetadata};
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config, Row, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, trace};

/// Application name reported to the server at login
const APPLICATION_NAME: &str = "SQL Backup";

/// `SERVERPROPERTY` returns `sql_variant`, so every column is cast to text.
const METADATA_QUERY: &str = "SELECT \
    CAST(@@VERSION AS nvarchar(4000)) AS VersionDescription, \
    CAST(SERVERPROPERTY('ProductLevel') AS nvarchar(128)) AS ProductLevel, \
    CAST(SERVERPROPERTY('Edition') AS nvarchar(128)) AS Edition, \
    CAST(SERVERPROPERTY('ProductVersion') AS nvarchar(128)) AS ProductVersion";

const DATABASES_QUERY: &str = "SELECT name FROM master.sys.databases";

type Connection = Client<Compat<TcpStream>>;

/// Catalog that opens one connection per query
#[derive(Debug, Clone, Default)]
pub struct MssqlCatalog {
    trust_cert: bool,
}

impl MssqlCatalog {
    /// Creates a catalog that validates server certificates
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept any server certificate (self-signed lab servers)
    pub fn trust_cert(mut self, trust: bool) -> Self {
        self.trust_cert = trust;
        self
    }

    fn client_config(&self, server: &ServerConfig) -> Result<Config> {
        let mut config = Config::new();

        let (host, port) = split_host_port(&server.host);
        config.host(host);
        if let Some(port) = port {
            config.port(port);
        }
        if !server.instance.is_empty() {
            config.instance_name(&server.instance);
        }

        config.application_name(APPLICATION_NAME);
        config.authentication(auth_method(server)?);
        if self.trust_cert {
            config.trust_cert();
        }

        Ok(config)
    }

    async fn connect(&self, server: &ServerConfig) -> Result<Connection> {
        let name = server.display_name();
        let config = self.client_config(server)?;

        debug!("Connecting to {}", name);

        // Named instances resolve their port through the SQL Browser service
        let tcp = if server.instance.is_empty() {
            TcpStream::connect(config.get_addr())
                .await
                .map_err(|e| Error::network(&name, e))?
        } else {
            TcpStream::connect_named(&config)
                .await
                .map_err(|e| Error::sql(&name, e))?
        };
        tcp.set_nodelay(true).map_err(|e| Error::network(&name, e))?;

        Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| Error::sql(&name, e))
    }
}

#[async_trait]
impl Catalog for MssqlCatalog {
    async fn server_metadata(&self, server: &ServerConfig) -> Result<ServerMetadata> {
        let name = server.display_name();
        let mut client = self.connect(server).await?;

        let row = client
            .simple_query(METADATA_QUERY)
            .await
            .map_err(|e| Error::sql(&name, e))?
            .into_row()
            .await
            .map_err(|e| Error::sql(&name, e))?
            .ok_or_else(|| Error::empty_result(&name))?;

        let metadata = ServerMetadata {
            version_description: text_column(&row, 0, &name)?,
            level: text_column(&row, 1, &name)?,
            edition: text_column(&row, 2, &name)?,
            version: text_column(&row, 3, &name)?,
        };

        trace!("{} reports {:?}", name, metadata);
        Ok(metadata)
    }

    async fn databases(&self, server: &ServerConfig) -> Result<Vec<String>> {
        let name = server.display_name();
        let mut client = self.connect(server).await?;

        let rows = client
            .simple_query(DATABASES_QUERY)
            .await
            .map_err(|e| Error::sql(&name, e))?
            .into_first_result()
            .await
            .map_err(|e| Error::sql(&name, e))?;

        rows.iter().map(|row| text_column(row, 0, &name)).collect()
    }
}

/// Read a nullable text column, mapping NULL to an empty string
fn text_column(row: &Row, index: usize, server: &str) -> Result<String> {
    let value: Option<&str> = row.try_get(index).map_err(|e| Error::sql(server, e))?;
    Ok(value.unwrap_or_default().to_string())
}

fn auth_method(server: &ServerConfig) -> Result<AuthMethod> {
    if server.integrated_authentication {
        integrated_auth(server)
    } else {
        Ok(AuthMethod::sql_server(&server.user, &server.password))
    }
}

#[cfg(windows)]
fn integrated_auth(_server: &ServerConfig) -> Result<AuthMethod> {
    Ok(AuthMethod::Integrated)
}

#[cfg(not(windows))]
fn integrated_auth(server: &ServerConfig) -> Result<AuthMethod> {
    Err(Error::unsupported_auth(server.display_name()))
}

/// Split an optional `:port` suffix off a configured host
fn split_host_port(host: &str) -> (&str, Option<u16>) {
    match host.rsplit_once(':') {
        Some((name, port)) if !name.is_empty() => match port.parse() {
            Ok(port) => (name, Some(port)),
            Err(_) => (host, None),
        },
        _ => (host, None),
    }
}

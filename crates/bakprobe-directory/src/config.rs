//! JSON configuration for the directory service.
//!
//! The configuration directory holds two documents, both JSON arrays with
//! PascalCase keys:
//!
//! - `servers.json`: `Host`, `Instance`, `User`, `Password`,
//!   `IntegratedAuthentication`
//! - `fileshares.json`: `Path`, `Type` (`"Public"`/`"Local"`, or the legacy
//!   numeric codes `1`/`2`)

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// File name of the server list inside the configuration directory
pub const SERVERS_FILE: &str = "servers.json";

/// File name of the file share list inside the configuration directory
pub const FILESHARES_FILE: &str = "fileshares.json";

/// A configured SQL Server instance
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConfig {
    /// Host name, optionally with an explicit `:port`
    pub host: String,
    /// Named instance, empty for the default instance
    #[serde(default)]
    pub instance: String,
    /// SQL login name
    #[serde(default)]
    pub user: String,
    /// SQL login password; never serialized back out
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Log in with the service account instead of `User`/`Password`
    #[serde(default)]
    pub integrated_authentication: bool,
}

impl ServerConfig {
    /// Returns `host\instance`, or just the host for a default instance
    pub fn display_name(&self) -> String {
        if self.instance.is_empty() {
            self.host.clone()
        } else {
            format!("{}\\{}", self.host, self.instance)
        }
    }
}

/// Classification of a backup file share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFileType")]
pub enum FileType {
    /// Share reachable from every server
    Public,
    /// Path local to the machine running the service
    Local,
}

/// Accepted spellings of [`FileType`]
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFileType {
    Code(u64),
    Name(String),
}

impl TryFrom<RawFileType> for FileType {
    type Error = String;

    fn try_from(raw: RawFileType) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawFileType::Code(1) => Ok(FileType::Public),
            RawFileType::Code(2) => Ok(FileType::Local),
            RawFileType::Name(name) if name.eq_ignore_ascii_case("public") => Ok(FileType::Public),
            RawFileType::Name(name) if name.eq_ignore_ascii_case("local") => Ok(FileType::Local),
            RawFileType::Code(code) => Err(format!("unknown file share type {code}")),
            RawFileType::Name(name) => Err(format!("unknown file share type '{name}'")),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Public => f.write_str("Public"),
            FileType::Local => f.write_str("Local"),
        }
    }
}

/// A configured location holding backup files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileShare {
    /// Directory or UNC path
    pub path: String,
    /// Share classification
    #[serde(rename = "Type")]
    pub file_type: FileType,
}

/// Everything loaded from the configuration directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    /// Configured servers, in file order
    pub servers: Vec<ServerConfig>,
    /// Configured file shares, in file order
    pub files: Vec<FileShare>,
}

impl Configuration {
    /// Load `servers.json` and `fileshares.json` from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let servers: Vec<ServerConfig> = read_json(&dir.join(SERVERS_FILE))?;
        let files: Vec<FileShare> = read_json(&dir.join(FILESHARES_FILE))?;

        debug!(
            "Loaded {} servers and {} file shares from {}",
            servers.len(),
            files.len(),
            dir.display()
        );

        Ok(Self { servers, files })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read(path).map_err(|e| Error::config_read(path, e))?;
    serde_json::from_slice(&data).map_err(|e| Error::config_parse(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SERVERS: &str = r#"[
        {
            "Host": "db01",
            "Instance": "SALES",
            "User": "backup",
            "Password": "hunter2",
            "IntegratedAuthentication": false
        },
        { "Host": "db02:1533", "IntegratedAuthentication": true }
    ]"#;

    const FILESHARES: &str = r#"[
        { "Path": "\\\\filer\\backups", "Type": "Public" },
        { "Path": "D:\\Backups", "Type": 2 }
    ]"#;

    fn config_dir(servers: &str, files: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SERVERS_FILE), servers).unwrap();
        fs::write(dir.path().join(FILESHARES_FILE), files).unwrap();
        dir
    }

    #[test]
    fn test_load_configuration() {
        let dir = config_dir(SERVERS, FILESHARES);
        let config = Configuration::load(dir.path()).unwrap();

        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.servers[0].display_name(), r"db01\SALES");
        assert_eq!(config.servers[0].password, "hunter2");
        assert_eq!(config.servers[1].display_name(), "db02:1533");
        assert!(config.servers[1].integrated_authentication);
        assert_eq!(config.servers[1].user, "");

        assert_eq!(
            config.files,
            vec![
                FileShare {
                    path: r"\\filer\backups".to_string(),
                    file_type: FileType::Public,
                },
                FileShare {
                    path: r"D:\Backups".to_string(),
                    file_type: FileType::Local,
                },
            ]
        );
    }

    #[test]
    fn test_password_is_not_serialized() {
        let dir = config_dir(SERVERS, FILESHARES);
        let config = Configuration::load(dir.path()).unwrap();

        let json = serde_json::to_value(&config.servers[0]).unwrap();
        assert_eq!(json["Host"], "db01");
        assert_eq!(json["User"], "backup");
        assert!(json.get("Password").is_none());
    }

    #[test]
    fn test_file_type_names() {
        let share: FileShare =
            serde_json::from_str(r#"{"Path": "/srv", "Type": "local"}"#).unwrap();
        assert_eq!(share.file_type, FileType::Local);
        assert_eq!(
            serde_json::to_string(&share).unwrap(),
            r#"{"Path":"/srv","Type":"Local"}"#
        );

        let bad = serde_json::from_str::<FileShare>(r#"{"Path": "/srv", "Type": 3}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Configuration::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { ref path, .. } if path.ends_with(SERVERS_FILE)));
    }

    #[test]
    fn test_malformed_file() {
        let dir = config_dir(SERVERS, "{ not json");
        let err = Configuration::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigParse { ref path, .. } if path.ends_with(FILESHARES_FILE)
        ));
    }
}

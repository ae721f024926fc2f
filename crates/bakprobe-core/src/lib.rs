//! # bakprobe-core
//!
//! A library for identifying which SQL Server release produced a backup file,
//! without access to the server that wrote it.
//!
//! This crate provides the core functionality for:
//! - Locating the `MSCI` signature block inside a backup stream
//! - Extracting the internal version code stored in that block
//! - Resolving the code to a product name and major version
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`scanner`]: Signature block search and field extraction
//! - [`version`]: Release table and version-code resolution
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use bakprobe_core::inspect_file;
//!
//! let backup = inspect_file("./backups/sales.bak")?;
//! println!("Internal Version: {}", backup.code);
//! println!("{}", backup.info);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Streams that are already open can be inspected with [`inspect`], and the
//! individual steps are available as [`locate_signature`] and
//! [`read_version_code`].

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod error;
pub mod scanner;
pub mod version;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use scanner::{
    inspect, inspect_file, inspect_file_with_config, locate_signature, read_version_code,
    BackupVersion, ScannerConfig,
};
pub use version::{releases, resolve_major, resolve_name, Release, VersionCode, VersionInfo};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

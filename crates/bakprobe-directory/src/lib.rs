//! # bakprobe-directory
//!
//! A read-only HTTP directory of the SQL Server instances and backup file
//! shares an operator has configured.
//!
//! Startup happens in three sequential steps:
//!
//! 1. [`Configuration::load`] reads `servers.json` and `fileshares.json`
//! 2. [`Directory::enrich`] queries every server once for its version,
//!    product level and edition, producing an immutable snapshot
//! 3. [`router`] serves the snapshot, plus live database listings, as JSON
//!
//! The snapshot is complete before the listener is bound, so request
//! handlers only ever read shared state.
//!
//! Live queries go through the [`Catalog`] trait; [`MssqlCatalog`] is the
//! implementation backed by a TDS connection.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod router;

pub use catalog::{Catalog, MssqlCatalog, ServerMetadata};
pub use config::{Configuration, FileShare, FileType, ServerConfig};
pub use directory::{Directory, ServerRecord};
pub use error::{Error, Result};
pub use router::{router, Reply, Service};

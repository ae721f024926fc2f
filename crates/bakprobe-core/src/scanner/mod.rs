//! Signature block scanning for SQL Server backup files.
//!
//! This module locates the `MSCI` block inside a backup stream and extracts
//! the internal version code stored in it.
//!
//! ## Algorithm Overview
//!
//! 1. Probe the stream at every `block_size` boundary, starting at the
//!    second block (offset 0 is never a candidate)
//! 2. Compare the first 4 bytes of each probed block against the signature
//! 3. Stop at the first match, or after `max_attempts` blocks
//! 4. Read the little-endian `u16` stored at `field_offset` inside that block
//!
//! The search never runs past its stride budget and never skips over I/O
//! errors: a failed seek or a read past end-of-stream aborts the scan with
//! [`Error::Io`], which is distinct from [`Error::BlockNotFound`].

mod field;

use crate::error::{Error, Result};
use crate::version::{VersionCode, VersionInfo};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

pub use field::{read_version_code, VERSION_FIELD_LEN};

/// Marker at the start of the block holding the backup's version metadata
pub const MSCI_SIGNATURE: [u8; 4] = *b"MSCI";

/// Alignment of the blocks probed for the signature
pub const BLOCK_SIZE: u64 = 0x200;

/// Number of blocks probed before giving up
pub const MAX_ATTEMPTS: usize = 100;

/// Offset of the version code relative to the signature block start
pub const VERSION_FIELD_OFFSET: u64 = 0xAC;

/// Result of inspecting a backup stream
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BackupVersion {
    /// Byte offset of the signature block
    pub block_offset: u64,
    /// The raw internal version code
    pub code: VersionCode,
    /// The resolved product name and major version
    pub info: VersionInfo,
}

/// Configuration for the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Marker identifying the signature block
    pub signature: [u8; 4],
    /// Stride between probed offsets, must be non-zero
    pub block_size: u64,
    /// Maximum number of blocks to probe
    pub max_attempts: usize,
    /// Offset of the version code inside the signature block
    pub field_offset: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            signature: MSCI_SIGNATURE,
            block_size: BLOCK_SIZE,
            max_attempts: MAX_ATTEMPTS,
            field_offset: VERSION_FIELD_OFFSET,
        }
    }
}

impl ScannerConfig {
    /// Creates a new scanner config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signature to search for
    pub fn signature(mut self, signature: [u8; 4]) -> Self {
        self.signature = signature;
        self
    }

    /// Sets the block size
    pub fn block_size(mut self, size: u64) -> Self {
        self.block_size = size;
        self
    }

    /// Sets the maximum number of blocks to probe
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the version field offset
    pub fn field_offset(mut self, offset: u64) -> Self {
        self.field_offset = offset;
        self
    }
}

/// Find the first block starting with `signature`.
///
/// Probes offsets `block_size`, `2 * block_size`, ... up to `max_attempts`
/// blocks and returns the offset of the first match.
///
/// # Errors
///
/// - [`Error::Io`] if a seek fails or fewer than 4 bytes can be read at a
///   probed offset, including when the stream ends before the budget is spent
/// - [`Error::BlockNotFound`] if every probed block was readable and none
///   matched
/// - [`Error::Io`] with [`io::ErrorKind::InvalidInput`] if `block_size` is zero
pub fn locate_signature<R>(
    stream: &mut R,
    signature: [u8; 4],
    block_size: u64,
    max_attempts: usize,
) -> Result<u64>
where
    R: Read + Seek + ?Sized,
{
    if block_size == 0 {
        return Err(Error::io(
            0,
            io::Error::new(io::ErrorKind::InvalidInput, "block size must be non-zero"),
        ));
    }

    debug!(
        "Searching for {:?} in {} blocks of {} bytes",
        String::from_utf8_lossy(&signature),
        max_attempts,
        block_size
    );

    let mut header = [0u8; 4];
    let mut offset = 0u64;

    for _ in 0..max_attempts {
        let Some(next) = offset.checked_add(block_size) else {
            break;
        };
        offset = next;

        trace!("Probing block at offset {}", offset);
        stream
            .seek(SeekFrom::Start(offset))
            .map_err(|e| Error::io(offset, e))?;
        stream
            .read_exact(&mut header)
            .map_err(|e| Error::io(offset, e))?;

        if header == signature {
            debug!("Found signature block at offset {}", offset);
            return Ok(offset);
        }
    }

    Err(Error::block_not_found(signature, max_attempts))
}

/// Locate the signature block, read its version code and resolve it.
pub fn inspect<R>(stream: &mut R, config: &ScannerConfig) -> Result<BackupVersion>
where
    R: Read + Seek + ?Sized,
{
    let block_offset = locate_signature(
        stream,
        config.signature,
        config.block_size,
        config.max_attempts,
    )?;
    let code = read_version_code(stream, block_offset, config.field_offset)?;
    let info = VersionInfo::from(code);

    debug!("Version code {} resolves to {}", code, info);

    Ok(BackupVersion {
        block_offset,
        code,
        info,
    })
}

/// Inspect a backup file on disk
///
/// The file is opened for the duration of this call only.
pub fn inspect_file(path: impl AsRef<Path>) -> Result<BackupVersion> {
    inspect_file_with_config(path, &ScannerConfig::default())
}

/// Inspect a backup file with custom configuration
pub fn inspect_file_with_config(
    path: impl AsRef<Path>,
    config: &ScannerConfig,
) -> Result<BackupVersion> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| Error::file_open(path, e))?;
    inspect(&mut file, config)
}

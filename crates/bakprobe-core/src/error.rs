//! Error types for the bakprobe-core library.
//!
//! This module provides error handling using the `thiserror` crate. The
//! variants separate genuine I/O failures from the legitimate "no signature
//! in this file" outcome, so callers can tell the two apart.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bakprobe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all bakprobe operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to open the backup file
    #[error("failed to open file '{path}': {source}")]
    FileOpen {
        /// Path to the file that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Seek or read failure while probing the stream
    #[error("I/O failure at offset {offset}: {source}")]
    Io {
        /// Byte offset the operation was targeting
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The signature was not found within the stride budget
    #[error(
        "could not find {} block within {attempts} blocks",
        String::from_utf8_lossy(.signature)
    )]
    BlockNotFound {
        /// The signature that was searched for
        signature: [u8; 4],
        /// Number of blocks probed
        attempts: usize,
    },

    /// Fewer bytes were available than a fixed-width field requires
    #[error("short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Byte offset of the field
        offset: u64,
        /// Width of the field in bytes
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },
}

impl Error {
    /// Creates a new file open error
    pub fn file_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            source,
        }
    }

    /// Creates a new I/O error at the given offset
    pub fn io(offset: u64, source: std::io::Error) -> Self {
        Self::Io { offset, source }
    }

    /// Creates a new block-not-found error
    pub fn block_not_found(signature: [u8; 4], attempts: usize) -> Self {
        Self::BlockNotFound {
            signature,
            attempts,
        }
    }

    /// Creates a new short read error
    pub fn short_read(offset: u64, expected: usize, actual: usize) -> Self {
        Self::ShortRead {
            offset,
            expected,
            actual,
        }
    }

    /// Returns true if this error came from opening, seeking or reading
    pub fn is_io_failure(&self) -> bool {
        matches!(self, Self::FileOpen { .. } | Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = Error::block_not_found(*b"MSCI", 100);
        assert_eq!(err.to_string(), "could not find MSCI block within 100 blocks");

        let err = Error::short_read(2732, 2, 1);
        assert!(err.to_string().contains("2732"));
        assert!(err.to_string().contains("expected 2 bytes, got 1"));
    }

    #[test]
    fn test_is_io_failure() {
        let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
        assert!(Error::io(512, eof).is_io_failure());

        let missing = io::Error::from(io::ErrorKind::NotFound);
        assert!(Error::file_open("/missing.bak", missing).is_io_failure());

        assert!(!Error::block_not_found(*b"MSCI", 100).is_io_failure());
        assert!(!Error::short_read(0, 2, 0).is_io_failure());
    }
}

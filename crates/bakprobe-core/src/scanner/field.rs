//! Fixed-width field extraction from a located signature block.

use crate::error::{Error, Result};
use crate::version::VersionCode;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::trace;

/// Width of the version code field in bytes
pub const VERSION_FIELD_LEN: usize = 2;

/// Read the internal version code stored at `block_offset + field_offset`.
///
/// The field is an unsigned 16-bit little-endian integer. There is no
/// fallback: a failed seek or read is reported as [`Error::Io`], and a stream
/// that ends before both bytes are available yields [`Error::ShortRead`].
pub fn read_version_code<R>(
    stream: &mut R,
    block_offset: u64,
    field_offset: u64,
) -> Result<VersionCode>
where
    R: Read + Seek + ?Sized,
{
    let offset = block_offset.checked_add(field_offset).ok_or_else(|| {
        Error::io(
            block_offset,
            io::Error::new(io::ErrorKind::InvalidInput, "field offset overflows u64"),
        )
    })?;

    stream
        .seek(SeekFrom::Start(offset))
        .map_err(|e| Error::io(offset, e))?;

    let mut raw = [0u8; VERSION_FIELD_LEN];
    let read = read_up_to(stream, &mut raw).map_err(|e| Error::io(offset, e))?;
    if read < VERSION_FIELD_LEN {
        return Err(Error::short_read(offset, VERSION_FIELD_LEN, read));
    }

    let code = u16::from_le_bytes(raw);
    trace!("Read version code {} at offset {}", code, offset);
    Ok(VersionCode::new(code))
}

/// Fill as much of `buf` as the stream allows, returning the byte count.
fn read_up_to<R: Read + ?Sized>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::tests::backup_image;
    use std::io::Cursor;

    /// Hands out one byte per read call
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    impl Seek for Trickle {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.0.seek(pos)
        }
    }

    #[test]
    fn test_little_endian_decode() {
        let mut image = vec![0u8; 1024];
        image[512 + 0xAC] = 0x65;
        image[512 + 0xAD] = 0x03;

        let code = read_version_code(&mut Cursor::new(image), 512, 0xAC).unwrap();
        assert_eq!(code.get(), 869);
    }

    #[test]
    fn test_partial_reads_are_completed() {
        let image = backup_image(4096, Some(512), Some(782));
        let code = read_version_code(&mut Trickle(Cursor::new(image)), 512, 0xAC).unwrap();
        assert_eq!(code.get(), 782);
    }

    #[test]
    fn test_one_byte_available() {
        let image = vec![0u8; 512 + 0xAC + 1];
        let err = read_version_code(&mut Cursor::new(image), 512, 0xAC).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortRead {
                offset: 684,
                expected: 2,
                actual: 1,
            }
        ));
    }

    /// Seeks succeed, reads fail
    struct FailingRead;

    impl Read for FailingRead {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "bad sector"))
        }
    }

    impl Seek for FailingRead {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            match pos {
                SeekFrom::Start(offset) => Ok(offset),
                _ => Err(io::Error::from(io::ErrorKind::Unsupported)),
            }
        }
    }

    /// Every seek fails
    struct FailingSeek;

    impl Read for FailingSeek {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Seek for FailingSeek {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_read_failure_is_io_not_short_read() {
        let err = read_version_code(&mut FailingRead, 2560, 0xAC).unwrap_err();
        match err {
            Error::Io { offset, source } => {
                assert_eq!(offset, 2560 + 0xAC);
                assert_eq!(source.to_string(), "bad sector");
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_seek_failure_is_io() {
        let err = read_version_code(&mut FailingSeek, 512, 0xAC).unwrap_err();
        assert!(matches!(err, Error::Io { offset: 684, .. }));
        assert!(err.is_io_failure());
    }

    #[test]
    fn test_field_offset_overflow() {
        let err = read_version_code(&mut Cursor::new(Vec::new()), u64::MAX, 0xAC).unwrap_err();
        assert!(err.is_io_failure());
    }
}

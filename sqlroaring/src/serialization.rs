//! Serialization formats and the byte-level helpers shared by their codecs
//!
//! All integers are little-endian. Both bitmap types start with the same
//! 12-byte header:
//!
//! ```text
//! offset  size  field
//! 0       2     cookie
//! 2       2     version
//! 4       4     record count
//! 8       4     CRC-32 of every byte after the header
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::DecodeError;

/// The `Portable` format is a versioned, endian-stable layout that is checked
/// in full before any of it is trusted.
///
/// It is the format used by the SQL call surface and is available for both
/// [`Bitmap`](crate::Bitmap) and [`Bitmap64`](crate::Bitmap64).
pub enum Portable {}

/// The `Native` format can sometimes be more space efficient than [`Portable`],
///
/// e.g. when the data is sparse: it stores a plain list of values whenever
/// that is smaller than the container layout. It is only defined for
/// [`Bitmap`](crate::Bitmap).
pub enum Native {}

/// Cookie identifying a portable 32-bit bitmap
pub const BITMAP_COOKIE: u16 = 0x3B3A;

/// Cookie identifying a portable 64-bit bitmap
pub const BITMAP64_COOKIE: u16 = 0x3B3B;

/// Version written into, and required of, every portable header
pub const FORMAT_VERSION: u16 = 1;

pub(crate) const HEADER_LEN: usize = 12;

/// Bounds-checked little-endian reader over a borrowed buffer
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.buf.len() {
            return Err(DecodeError::Truncated {
                needed: len,
                available: self.buf.len(),
            });
        }
        let (head, rest) = self.buf.split_at(len);
        self.buf = rest;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    /// Fails unless every byte has been consumed
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.buf.len() {
            0 => Ok(()),
            trailing => Err(DecodeError::TrailingBytes(trailing)),
        }
    }
}

/// Little-endian writer over a buffer that was sized up front
pub(crate) struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// The next `len` bytes, advancing past them
    pub fn claim(&mut self, len: usize) -> &mut [u8] {
        let start = self.pos;
        self.pos += len;
        &mut self.buf[start..self.pos]
    }

    pub fn write_u8(&mut self, value: u8) {
        self.claim(1)[0] = value;
    }

    pub fn write_u16(&mut self, value: u16) {
        LittleEndian::write_u16(self.claim(2), value);
    }

    pub fn write_u32(&mut self, value: u32) {
        LittleEndian::write_u32(self.claim(4), value);
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Writes a portable header with a zero checksum; see [`seal`]
pub(crate) fn write_header(writer: &mut Writer<'_>, cookie: u16, count: u32) {
    writer.write_u16(cookie);
    writer.write_u16(FORMAT_VERSION);
    writer.write_u32(count);
    writer.write_u32(0);
}

/// Stores the checksum of the body into a fully written portable buffer
pub(crate) fn seal(buf: &mut [u8]) {
    let checksum = crc32fast::hash(&buf[HEADER_LEN..]);
    LittleEndian::write_u32(&mut buf[8..HEADER_LEN], checksum);
}

/// Validates a portable header and returns the declared record count along
/// with a reader positioned at the first record
///
/// `min_record_len` is the smallest number of bytes one record can occupy; a
/// count that cannot fit the remaining bytes is rejected before any record is
/// read.
pub(crate) fn read_header(
    buffer: &[u8],
    cookie: u16,
    min_record_len: usize,
) -> Result<(u32, Reader<'_>), DecodeError> {
    let mut reader = Reader::new(buffer);
    let found_cookie = reader.read_u16()?;
    if found_cookie != cookie {
        return Err(DecodeError::BadCookie(found_cookie));
    }
    let version = reader.read_u16()?;
    if version != FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let count = reader.read_u32()?;
    let expected = reader.read_u32()?;
    let actual = crc32fast::hash(&buffer[HEADER_LEN..]);
    if expected != actual {
        return Err(DecodeError::ChecksumMismatch { expected, actual });
    }
    let needed = (count as usize).checked_mul(min_record_len);
    if needed.map_or(true, |needed| needed > reader.remaining()) {
        return Err(DecodeError::ImplausibleCount {
            count,
            available: reader.remaining(),
        });
    }
    Ok((count, reader))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed(count: u32, body: &[u8]) -> Vec<u8> {
        let mut buf = vec![0; HEADER_LEN + body.len()];
        let mut writer = Writer::new(&mut buf);
        write_header(&mut writer, BITMAP_COOKIE, count);
        writer.claim(body.len()).copy_from_slice(body);
        seal(&mut buf);
        buf
    }

    #[test]
    fn header_round_trip() {
        let buf = sealed(2, &[0; 16]);
        let (count, reader) = read_header(&buf, BITMAP_COOKIE, 8).unwrap();
        assert_eq!(count, 2);
        assert_eq!(reader.remaining(), 16);
    }

    #[test]
    fn header_rejections() {
        let buf = sealed(2, &[0; 16]);
        assert!(matches!(
            read_header(&buf[..7], BITMAP_COOKIE, 8),
            Err(DecodeError::Truncated { .. })
        ));
        assert_eq!(
            read_header(&buf, BITMAP64_COOKIE, 8).err(),
            Some(DecodeError::BadCookie(BITMAP_COOKIE))
        );
        assert!(matches!(
            read_header(&buf, BITMAP_COOKIE, 9),
            Err(DecodeError::ImplausibleCount { count: 2, available: 16 })
        ));

        let mut corrupt = buf.clone();
        corrupt[20] ^= 1;
        assert!(matches!(
            read_header(&corrupt, BITMAP_COOKIE, 8),
            Err(DecodeError::ChecksumMismatch { .. })
        ));

        let mut future = buf;
        future[2] = 2;
        assert_eq!(
            read_header(&future, BITMAP_COOKIE, 8).err(),
            Some(DecodeError::UnsupportedVersion(2))
        );
    }

    #[test]
    fn reader_never_overreads() {
        let mut reader = Reader::new(&[1, 2, 3]);
        assert_eq!(reader.read_u16().unwrap(), 0x0201);
        assert_eq!(
            reader.read_u32(),
            Err(DecodeError::Truncated {
                needed: 4,
                available: 1
            })
        );
        assert_eq!(reader.finish(), Err(DecodeError::TrailingBytes(1)));
    }
}

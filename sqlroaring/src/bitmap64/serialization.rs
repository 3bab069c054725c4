use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::bitmap::{decode_portable, Serializer as BitmapSerializer};
use crate::serialization::{
    read_header, seal, write_header, Writer, BITMAP64_COOKIE, HEADER_LEN,
};
use crate::{DecodeError, Portable};

use super::Bitmap64;

/// A format a [`Bitmap64`] can be written in
pub trait Serializer: crate::sealed::Sealed {
    /// Computes the serialized size in bytes of the bitmap in this format.
    fn get_serialized_size_in_bytes(bitmap: &Bitmap64) -> usize;

    /// Writes the bitmap into `dst`, which must be exactly
    /// [`Serializer::get_serialized_size_in_bytes`] long.
    fn write(bitmap: &Bitmap64, dst: &mut [u8]);
}

/// A format a [`Bitmap64`] can be read from
pub trait Deserializer: crate::sealed::Sealed {
    /// Given a serialized bitmap as slice of bytes, returns a `Bitmap64`
    /// instance. See [`Bitmap64::try_deserialize`] for examples.
    fn try_deserialize(buffer: &[u8]) -> Result<Bitmap64, DecodeError>;
}

/// key u32, payload length u32
const RECORD_HEADER_LEN: usize = 8;

/// Smallest portable 32-bit bitmap that holds a value: a header and one
/// single-value array record
const MIN_PAYLOAD_LEN: usize = HEADER_LEN + 9;

const MIN_RECORD_LEN: usize = RECORD_HEADER_LEN + MIN_PAYLOAD_LEN;

impl Serializer for Portable {
    fn get_serialized_size_in_bytes(bitmap: &Bitmap64) -> usize {
        HEADER_LEN
            + bitmap
                .buckets()
                .values()
                .map(|inner| {
                    RECORD_HEADER_LEN
                        + <Portable as BitmapSerializer>::get_serialized_size_in_bytes(inner)
                })
                .sum::<usize>()
    }

    fn write(bitmap: &Bitmap64, dst: &mut [u8]) {
        let buckets = bitmap.buckets();
        let mut writer = Writer::new(dst);
        write_header(&mut writer, BITMAP64_COOKIE, buckets.len() as u32);
        for (&key, inner) in buckets {
            let len = <Portable as BitmapSerializer>::get_serialized_size_in_bytes(inner);
            writer.write_u32(key);
            writer.write_u32(len as u32);
            <Portable as BitmapSerializer>::write(inner, writer.claim(len));
        }
        let written = writer.position();
        debug_assert_eq!(written, dst.len());
        seal(dst);
    }
}

impl Deserializer for Portable {
    fn try_deserialize(buffer: &[u8]) -> Result<Bitmap64, DecodeError> {
        decode(buffer).map_err(|err| {
            debug!(%err, len = buffer.len(), "rejected serialized bitmap64");
            err
        })
    }
}

fn decode(buffer: &[u8]) -> Result<Bitmap64, DecodeError> {
    let (count, mut reader) = read_header(buffer, BITMAP64_COOKIE, MIN_RECORD_LEN)?;
    let mut map = BTreeMap::new();
    let mut previous: Option<u32> = None;
    for _ in 0..count {
        let key = reader.read_u32()?;
        if let Some(previous) = previous.filter(|&previous| previous >= key) {
            return Err(DecodeError::KeyOrder { previous, key });
        }
        previous = Some(key);
        let len = reader.read_u32()? as usize;
        let inner = decode_portable(reader.take(len)?)?;
        if inner.is_empty() {
            return Err(DecodeError::EmptyContainer { key });
        }
        map.insert(key, inner);
    }
    reader.finish()?;
    trace!(buckets = map.len(), "decoded bitmap64");
    Ok(Bitmap64::from_map(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bitmap;

    fn framed(records: &[(u32, Vec<u8>)]) -> Vec<u8> {
        let body: Vec<u8> = records
            .iter()
            .flat_map(|(key, payload)| {
                let mut record = key.to_le_bytes().to_vec();
                record.extend_from_slice(&(payload.len() as u32).to_le_bytes());
                record.extend_from_slice(payload);
                record
            })
            .collect();
        let mut buf = vec![0; HEADER_LEN + body.len()];
        let mut writer = Writer::new(&mut buf);
        write_header(&mut writer, BITMAP64_COOKIE, records.len() as u32);
        writer.claim(body.len()).copy_from_slice(&body);
        seal(&mut buf);
        buf
    }

    fn inner(values: &[u32]) -> Vec<u8> {
        Bitmap::of(values).serialize::<Portable>()
    }

    #[test]
    fn hand_built_buffer_decodes() {
        let buf = framed(&[(0, inner(&[1])), (7, inner(&[2, 3]))]);
        let bitmap = Portable::try_deserialize(&buf).unwrap();
        assert_eq!(bitmap.to_vec(), [1, 7 << 32 | 2, 7 << 32 | 3]);
        assert_eq!(bitmap.serialize::<Portable>(), buf);
    }

    #[test]
    fn smallest_record_is_accepted() {
        assert_eq!(inner(&[9]).len(), MIN_PAYLOAD_LEN);
        let buf = framed(&[(u32::MAX, inner(&[u32::MAX]))]);
        assert_eq!(buf.len(), HEADER_LEN + MIN_RECORD_LEN);
        assert_eq!(
            Portable::try_deserialize(&buf).unwrap().to_vec(),
            [u64::MAX]
        );
    }

    #[test]
    fn structural_rejections() {
        let ten: Vec<u32> = (1..=10).collect();
        let cases = [
            (
                framed(&[(4, inner(&[1])), (4, inner(&[2]))]),
                DecodeError::KeyOrder { previous: 4, key: 4 },
            ),
            (
                framed(&[(3, inner(&[])), (4, inner(&ten))]),
                DecodeError::EmptyContainer { key: 3 },
            ),
            (
                framed(&[(0, inner(&[1])), (1, inner(&[]))]),
                DecodeError::ImplausibleCount {
                    count: 2,
                    available: 49,
                },
            ),
        ];
        for (buf, expected) in cases {
            assert_eq!(Portable::try_deserialize(&buf).err(), Some(expected));
        }
    }

    #[test]
    fn inner_errors_surface() {
        let mut payload = inner(&[1, 2]);
        payload[HEADER_LEN] ^= 0xFF;
        let buf = framed(&[(0, payload)]);
        assert!(matches!(
            Portable::try_deserialize(&buf),
            Err(DecodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn rejects_32_bit_cookie() {
        let buf = inner(&[1, 2, 3]);
        assert!(matches!(
            Portable::try_deserialize(&buf),
            Err(DecodeError::BadCookie(_))
        ));
    }
}

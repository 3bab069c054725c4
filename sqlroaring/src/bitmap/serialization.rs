use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, trace};

use crate::container::{
    ArrayStore, BitmapStore, Container, Interval, RunStore, ARRAY_MAX_CARDINALITY, BITMAP_BYTES,
    BITMAP_WORDS,
};
use crate::serialization::{
    read_header, seal, write_header, Reader, Writer, BITMAP_COOKIE, HEADER_LEN,
};
use crate::{DecodeError, Native, Portable};

use super::Bitmap;

/// A format a [`Bitmap`] can be written in
pub trait Serializer: crate::sealed::Sealed {
    /// Computes the serialized size in bytes of the bitmap in this format.
    fn get_serialized_size_in_bytes(bitmap: &Bitmap) -> usize;

    /// Writes the bitmap into `dst`, which must be exactly
    /// [`Serializer::get_serialized_size_in_bytes`] long.
    ///
    /// See [`Bitmap::serialize_into`] for the usual entry point.
    fn write(bitmap: &Bitmap, dst: &mut [u8]);
}

/// A format a [`Bitmap`] can be read from
pub trait Deserializer: crate::sealed::Sealed {
    /// Given a serialized bitmap as slice of bytes, returns a `Bitmap` instance.
    /// See [`Bitmap::try_deserialize`] for examples.
    fn try_deserialize(buffer: &[u8]) -> Result<Bitmap, DecodeError>;
}

/// key u16, type u8, payload length u32
const RECORD_HEADER_LEN: usize = 7;

/// A record with the smallest possible payload, a single-value array
const MIN_RECORD_LEN: usize = RECORD_HEADER_LEN + 2;

const ARRAY_TAG: u8 = 0;
const BITMAP_TAG: u8 = 1;
const RUN_TAG: u8 = 2;

impl Serializer for Portable {
    fn get_serialized_size_in_bytes(bitmap: &Bitmap) -> usize {
        HEADER_LEN
            + bitmap
                .containers()
                .iter()
                .map(|(_, container)| RECORD_HEADER_LEN + container.serialized_size())
                .sum::<usize>()
    }

    fn write(bitmap: &Bitmap, dst: &mut [u8]) {
        let containers = bitmap.containers();
        let mut writer = Writer::new(dst);
        write_header(&mut writer, BITMAP_COOKIE, containers.len() as u32);
        for (key, container) in containers {
            writer.write_u16(*key);
            writer.write_u8(match container {
                Container::Array(_) => ARRAY_TAG,
                Container::Bitmap(_) => BITMAP_TAG,
                Container::Run(_) => RUN_TAG,
            });
            writer.write_u32(container.serialized_size() as u32);
            write_payload(container, &mut writer);
        }
        let written = writer.position();
        debug_assert_eq!(written, dst.len());
        seal(dst);
    }
}

fn write_payload(container: &Container, writer: &mut Writer<'_>) {
    match container {
        Container::Array(store) => {
            let values = store.as_slice();
            LittleEndian::write_u16_into(values, writer.claim(values.len() * 2));
        }
        Container::Bitmap(store) => {
            LittleEndian::write_u64_into(&store.words()[..], writer.claim(BITMAP_BYTES));
        }
        Container::Run(store) => {
            for interval in store.intervals() {
                writer.write_u16(interval.start);
                writer.write_u16(interval.end - interval.start);
            }
        }
    }
}

impl Deserializer for Portable {
    fn try_deserialize(buffer: &[u8]) -> Result<Bitmap, DecodeError> {
        decode_portable(buffer).map_err(|err| {
            debug!(%err, len = buffer.len(), "rejected serialized bitmap");
            err
        })
    }
}

/// Decodes a portable buffer without logging, for callers that report errors
/// themselves
pub(crate) fn decode_portable(buffer: &[u8]) -> Result<Bitmap, DecodeError> {
    let (count, mut reader) = read_header(buffer, BITMAP_COOKIE, MIN_RECORD_LEN)?;
    let mut containers = Vec::with_capacity(count as usize);
    let mut previous: Option<u16> = None;
    for _ in 0..count {
        let key = reader.read_u16()?;
        if let Some(previous) = previous.filter(|&previous| previous >= key) {
            return Err(DecodeError::KeyOrder {
                previous: previous.into(),
                key: key.into(),
            });
        }
        previous = Some(key);
        let tag = reader.read_u8()?;
        let len = reader.read_u32()? as usize;
        let payload = reader.take(len)?;
        containers.push((key, decode_container(key, tag, payload)?));
    }
    reader.finish()?;
    trace!(containers = containers.len(), "decoded bitmap");
    Ok(Bitmap::from_containers(containers))
}

fn decode_container(key: u16, tag: u8, payload: &[u8]) -> Result<Container, DecodeError> {
    let key = u32::from(key);
    if payload.is_empty() && tag <= RUN_TAG {
        return Err(DecodeError::EmptyContainer { key });
    }
    let invalid_length = |kind| DecodeError::InvalidPayloadLength {
        key,
        kind,
        len: payload.len(),
    };
    match tag {
        ARRAY_TAG => {
            if payload.len() % 2 != 0 || payload.len() > ARRAY_MAX_CARDINALITY * 2 {
                return Err(invalid_length("array"));
            }
            let mut values = vec![0; payload.len() / 2];
            LittleEndian::read_u16_into(payload, &mut values);
            if values.windows(2).any(|w| w[0] >= w[1]) {
                return Err(DecodeError::UnsortedValues { key });
            }
            Ok(Container::Array(ArrayStore::from_sorted(values)))
        }
        BITMAP_TAG => {
            if payload.len() != BITMAP_BYTES {
                return Err(invalid_length("bitmap"));
            }
            let mut words = Box::new([0; BITMAP_WORDS]);
            LittleEndian::read_u64_into(payload, &mut words[..]);
            let store = BitmapStore::from_words(words);
            if store.len() as usize <= ARRAY_MAX_CARDINALITY {
                return Err(DecodeError::SparseBitmap {
                    key,
                    cardinality: store.len(),
                });
            }
            Ok(Container::Bitmap(store))
        }
        RUN_TAG => {
            if payload.len() % 4 != 0 {
                return Err(invalid_length("run"));
            }
            let mut intervals: Vec<Interval> = Vec::with_capacity(payload.len() / 4);
            for pair in payload.chunks_exact(4) {
                let start = LittleEndian::read_u16(&pair[..2]);
                let length = LittleEndian::read_u16(&pair[2..]);
                let end = u32::from(start) + u32::from(length);
                let touches_previous = intervals
                    .last()
                    .is_some_and(|last| u32::from(last.end) + 1 >= u32::from(start));
                if end > u32::from(u16::MAX) || touches_previous {
                    return Err(DecodeError::InvalidRun { key });
                }
                intervals.push(Interval::new(start, end as u16));
            }
            Ok(Container::Run(RunStore::from_intervals(intervals)))
        }
        tag => Err(DecodeError::UnknownContainerType { key, tag }),
    }
}

const NATIVE_LIST: u8 = 1;
const NATIVE_PORTABLE: u8 = 2;

/// Size of the flat value list body, when it is smaller than the portable body
fn native_list_size(bitmap: &Bitmap) -> Option<usize> {
    let list = 4 + 4 * bitmap.cardinality() as usize;
    (list < Portable::get_serialized_size_in_bytes(bitmap)).then_some(list)
}

impl Serializer for Native {
    fn get_serialized_size_in_bytes(bitmap: &Bitmap) -> usize {
        1 + native_list_size(bitmap)
            .unwrap_or_else(|| Portable::get_serialized_size_in_bytes(bitmap))
    }

    fn write(bitmap: &Bitmap, dst: &mut [u8]) {
        let mut writer = Writer::new(dst);
        match native_list_size(bitmap) {
            Some(_) => {
                writer.write_u8(NATIVE_LIST);
                writer.write_u32(bitmap.cardinality() as u32);
                for value in bitmap.iter() {
                    writer.write_u32(value);
                }
            }
            None => {
                writer.write_u8(NATIVE_PORTABLE);
                let len = Portable::get_serialized_size_in_bytes(bitmap);
                Portable::write(bitmap, writer.claim(len));
            }
        }
    }
}

impl Deserializer for Native {
    fn try_deserialize(buffer: &[u8]) -> Result<Bitmap, DecodeError> {
        decode_native(buffer).map_err(|err| {
            debug!(%err, len = buffer.len(), "rejected serialized bitmap");
            err
        })
    }
}

fn decode_native(buffer: &[u8]) -> Result<Bitmap, DecodeError> {
    let mut reader = Reader::new(buffer);
    match reader.read_u8()? {
        NATIVE_LIST => {
            let cardinality = reader.read_u32()? as usize;
            let len = cardinality.checked_mul(4).ok_or(DecodeError::Truncated {
                needed: usize::MAX,
                available: reader.remaining(),
            })?;
            let bytes = reader.take(len)?;
            reader.finish()?;
            let mut values = vec![0; cardinality];
            LittleEndian::read_u32_into(bytes, &mut values);
            if let Some(w) = values.windows(2).find(|w| w[0] >= w[1]) {
                return Err(DecodeError::UnsortedValues { key: w[1] >> 16 });
            }
            Ok(Bitmap::from_sorted(&values))
        }
        NATIVE_PORTABLE => decode_portable(&buffer[1..]),
        flag => Err(DecodeError::UnknownNativeFlag(flag)),
    }
}

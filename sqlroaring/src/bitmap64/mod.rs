//! A compressed bitmap which can hold 64-bit integers
//!
//! Values are bucketed by their high 32 bits; each bucket holds the low 32
//! bits in a [`Bitmap`](crate::Bitmap). Buckets are kept in key order and an
//! empty bucket is never stored.
//!
//! # Examples
//!
//! ```
//! use sqlroaring::Bitmap64;
//!
//! let mut bitmap = Bitmap64::create();
//! bitmap.add(1);
//! bitmap.add(u64::MAX);
//!
//! assert_eq!(bitmap.cardinality(), 2);
//! assert_eq!(bitmap.maximum(), Some(u64::MAX));
//! ```

use std::collections::BTreeMap;

use crate::Bitmap;

mod imp;
mod iter;
mod ops;
mod serialization;

pub use self::iter::Bitmap64Iterator;
pub use self::serialization::{Deserializer, Serializer};

/// A Bitmap which can hold 64-bit integers
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Bitmap64 {
    map: BTreeMap<u32, Bitmap>,
}

#[inline]
fn split(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, value as u32)
}

#[inline]
fn join(hi: u32, lo: u32) -> u64 {
    (u64::from(hi) << 32) | u64::from(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_join() {
        for value in [0, 1, u64::from(u32::MAX), 1 << 32, u64::MAX] {
            let (hi, lo) = split(value);
            assert_eq!(join(hi, lo), value);
        }
        assert_eq!(split(0x0000_0002_0000_0003), (2, 3));
    }
}

//! Compressed bitmap of 32-bit integers
//!
//! # Example
//!
//! ```rust
//! use sqlroaring::Bitmap;
//!
//! let mut rb1 = Bitmap::new();
//! rb1.add(1);
//! rb1.add(2);
//! rb1.add(3);
//! rb1.add(4);
//! rb1.add(5);
//! rb1.add(100);
//! rb1.add(1000);
//! rb1.run_optimize();
//!
//! let mut rb2 = Bitmap::new();
//! rb2.add(3);
//! rb2.add(4);
//! rb2.add(1000);
//! rb2.run_optimize();
//!
//! let mut rb3 = Bitmap::new();
//!
//! assert_eq!(rb1.cardinality(), 7);
//! assert!(rb1.contains(3));
//!
//! rb1.and_inplace(&rb2);
//! rb3.add(5);
//! rb3.or_inplace(&rb1);
//!
//! let rb4 = Bitmap::fast_or(&[&rb1, &rb2, &rb3]);
//!
//! assert_eq!(rb1.to_vec(), [3, 4, 1000]);
//! assert_eq!(rb3.to_vec(), [3, 4, 5, 1000]);
//! assert_eq!(rb4, rb3);
//! ```

use crate::container::Container;

/// A compressed bitmap
///
/// Members are grouped by their high 16 bits; each group keeps the low 16 bits
/// in a container whose representation adapts to the group's density. Groups
/// are kept in ascending key order and no group is ever empty.
#[derive(Clone, Default)]
pub struct Bitmap {
    containers: Vec<(u16, Container)>,
}

/// Detailed statistics on the composition of a bitmap
///
/// Byte counts are the sizes of the container payloads in the portable format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub n_containers: u32,
    pub n_array_containers: u32,
    pub n_run_containers: u32,
    pub n_bitset_containers: u32,
    pub n_values_array_containers: u64,
    pub n_values_run_containers: u64,
    pub n_values_bitset_containers: u64,
    pub n_bytes_array_containers: u32,
    pub n_bytes_run_containers: u32,
    pub n_bytes_bitset_containers: u32,
    pub max_value: u32,
    pub min_value: u32,
    pub cardinality: u64,
}

#[inline]
fn split(value: u32) -> (u16, u16) {
    ((value >> 16) as u16, value as u16)
}

#[inline]
fn join(key: u16, low: u16) -> u32 {
    (u32::from(key) << 16) | u32::from(low)
}

mod imp;
mod iter;
mod ops;
mod serialization;

pub use self::iter::BitmapIterator;
pub use self::serialization::{Deserializer, Serializer};

pub(crate) use self::serialization::decode_portable;

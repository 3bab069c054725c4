//! Compressed Roaring bitmaps for use inside SQL statements
//!
//! [`Bitmap`] holds 32-bit integers and [`Bitmap64`] holds 64-bit integers.
//! Both serialize to a checked, endian-stable [`Portable`] layout so they can
//! travel between calls as opaque byte strings. The [`functions`] module is the
//! call surface a database adapter binds to, and [`aggregate`] provides the
//! per-group accumulators behind the grouping functions.
//!
//! # Example
//!
//! ```
//! use sqlroaring::{Bitmap, Portable};
//!
//! let bitmap = Bitmap::of(&[5, 1, 5, 1_000_000]);
//! let bytes = bitmap.serialize::<Portable>();
//!
//! let decoded = Bitmap::try_deserialize::<Portable>(&bytes).unwrap();
//! assert_eq!(decoded.cardinality(), 3);
//! assert_eq!(decoded.to_vec(), [1, 5, 1_000_000]);
//! ```

pub mod aggregate;
pub mod bitmap;
pub mod bitmap64;
mod container;
mod error;
pub mod functions;
pub mod serialization;

pub use bitmap::{Bitmap, BitmapIterator, Statistics};
pub use bitmap64::{Bitmap64, Bitmap64Iterator};
pub use container::{ContainerType, ARRAY_MAX_CARDINALITY, BITMAP_WORDS};
pub use error::{DecodeError, Error, Result};
pub use serialization::{Native, Portable};

mod sealed {
    use crate::{Bitmap, Bitmap64, Native, Portable};

    pub trait Sealed {}

    impl Sealed for Portable {}
    impl Sealed for Native {}
    impl Sealed for Bitmap {}
    impl Sealed for Bitmap64 {}
}

//! Error types for decoding and for the SQL call surface

use std::collections::TryReserveError;
use thiserror::Error;

/// Reasons a serialized bitmap was rejected by the decoder
///
/// Keys are reported widened to `u32` so the same type serves the 16-bit keys of
/// [`Bitmap`](crate::Bitmap) and the 32-bit keys of [`Bitmap64`](crate::Bitmap64).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("buffer truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("unknown format cookie {0:#06x}")]
    BadCookie(u16),

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),

    #[error("checksum mismatch: header has {expected:#010x}, body hashes to {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("container count {count} cannot fit in {available} remaining bytes")]
    ImplausibleCount { count: u32, available: usize },

    #[error("container {key}: unknown container type {tag}")]
    UnknownContainerType { key: u32, tag: u8 },

    #[error("container {key}: payload of {len} bytes is invalid for a {kind} container")]
    InvalidPayloadLength {
        key: u32,
        kind: &'static str,
        len: usize,
    },

    #[error("keys out of order: {key} follows {previous}")]
    KeyOrder { previous: u32, key: u32 },

    #[error("container {key}: values are not strictly ascending")]
    UnsortedValues { key: u32 },

    #[error("container {key} is empty")]
    EmptyContainer { key: u32 },

    #[error("container {key}: bitmap container holds only {cardinality} values")]
    SparseBitmap { key: u32, cardinality: u32 },

    #[error("container {key}: run overflows the 16-bit range or touches its predecessor")]
    InvalidRun { key: u32 },

    #[error("{0} trailing bytes after the last container")]
    TrailingBytes(usize),

    #[error("unknown native format flag {0}")]
    UnknownNativeFlag(u8),
}

/// Errors reported by the SQL call surface and the aggregate accumulators
///
/// The messages start with the strings a SQL host reports to its users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The single bitmap operand could not be decoded
    #[error("invalid bitmap: {0}")]
    InvalidBitmap(#[source] DecodeError),

    /// One of several bitmap operands could not be decoded
    #[error("invalid bitmap(s): {0}")]
    InvalidBitmaps(#[source] DecodeError),

    /// An argument that must be an integer element was something else
    #[error("invalid argument: argument {position} is {found}, expected {expected}")]
    InvalidArgument {
        position: usize,
        found: &'static str,
        expected: &'static str,
    },

    /// The output buffer for a serialized bitmap could not be allocated
    #[error("failed to allocate {requested} bytes for a serialized bitmap")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },
}

/// A specialized Result type for the SQL call surface
pub type Result<T> = std::result::Result<T, Error>;

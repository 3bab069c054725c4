//! The SQL call surface
//!
//! One function per SQL-visible operation. Arguments arrive as borrowed
//! [`Value`]s in the shape a database host hands them over; bitmaps travel as
//! [`Portable`] byte strings and every result is owned by the caller.
//! Registering these functions with a particular engine is left to the
//! adapter.
//!
//! Blob arguments are read the way a SQL host coerces values to bytes: text
//! is taken as its UTF-8 bytes, and `NULL` or numbers read as an empty
//! buffer, which never decodes.
//!
//! # Examples
//!
//! ```
//! use sqlroaring::functions::{rb_and_count, rb_array, rb_count, rb_create, Value};
//!
//! let a = rb_create(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)]).unwrap();
//! let b = rb_create(&[Value::Integer(2), Value::Integer(3), Value::Integer(4)]).unwrap();
//!
//! assert_eq!(rb_count(Value::Blob(&a)).unwrap(), 3);
//! assert_eq!(rb_and_count(Value::Blob(&a), Value::Blob(&b)).unwrap(), 2);
//! assert_eq!(rb_array(Value::Blob(&b)).unwrap(), [2, 3, 4]);
//! ```

use tracing::debug;

use crate::{Bitmap, Bitmap64, DecodeError, Error, Portable, Result};

/// A borrowed argument value, as passed by a SQL host
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<'a> {
    Null,
    Integer(i64),
    Real(f64),
    Text(&'a str),
    Blob(&'a [u8]),
}

impl<'a> Value<'a> {
    /// The SQL name of this value's storage class
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }

    fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Value::Blob(bytes) => bytes,
            Value::Text(text) => text.as_bytes(),
            Value::Null | Value::Integer(_) | Value::Real(_) => &[],
        }
    }
}

impl From<i64> for Value<'_> {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::Text(value)
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(value: &'a [u8]) -> Self {
        Value::Blob(value)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// The operations the call surface and the aggregates need from a bitmap
///
/// Implemented by [`Bitmap`] and [`Bitmap64`]; the `rb_*` and `rb64_*`
/// functions are the same code instantiated for each.
pub trait SqlBitmap: crate::sealed::Sealed + Default + Sized {
    /// The integer type held by the bitmap
    type Element: Copy;

    /// Converts the argument at 1-based `position` into an element
    fn element(value: &Value<'_>, position: usize) -> Result<Self::Element>;

    fn add(&mut self, element: Self::Element);

    fn remove(&mut self, element: Self::Element);

    fn cardinality(&self) -> u64;

    fn to_vec(&self) -> Vec<Self::Element>;

    fn and_inplace(&mut self, other: &Self);

    fn or_inplace(&mut self, other: &Self);

    fn xor_inplace(&mut self, other: &Self);

    fn andnot_inplace(&mut self, other: &Self);

    fn and_cardinality(&self, other: &Self) -> u64;

    fn or_cardinality(&self, other: &Self) -> u64;

    fn xor_cardinality(&self, other: &Self) -> u64;

    fn andnot_cardinality(&self, other: &Self) -> u64;

    /// Decodes a [`Portable`] buffer
    fn decode(bytes: &[u8]) -> std::result::Result<Self, DecodeError>;

    /// Encodes to a new [`Portable`] buffer
    fn encode(&self) -> Result<Vec<u8>>;
}

fn not_an_integer(value: &Value<'_>, position: usize) -> Error {
    Error::InvalidArgument {
        position,
        found: value.type_name(),
        expected: "an integer",
    }
}

impl SqlBitmap for Bitmap {
    type Element = u32;

    fn element(value: &Value<'_>, position: usize) -> Result<u32> {
        match *value {
            Value::Integer(i) => u32::try_from(i).map_err(|_| Error::InvalidArgument {
                position,
                found: "an out of range integer",
                expected: "an integer between 0 and 4294967295",
            }),
            _ => Err(not_an_integer(value, position)),
        }
    }

    fn add(&mut self, element: u32) {
        Bitmap::add(self, element)
    }

    fn remove(&mut self, element: u32) {
        Bitmap::remove(self, element)
    }

    fn cardinality(&self) -> u64 {
        Bitmap::cardinality(self)
    }

    fn to_vec(&self) -> Vec<u32> {
        Bitmap::to_vec(self)
    }

    fn and_inplace(&mut self, other: &Self) {
        Bitmap::and_inplace(self, other)
    }

    fn or_inplace(&mut self, other: &Self) {
        Bitmap::or_inplace(self, other)
    }

    fn xor_inplace(&mut self, other: &Self) {
        Bitmap::xor_inplace(self, other)
    }

    fn andnot_inplace(&mut self, other: &Self) {
        Bitmap::andnot_inplace(self, other)
    }

    fn and_cardinality(&self, other: &Self) -> u64 {
        Bitmap::and_cardinality(self, other)
    }

    fn or_cardinality(&self, other: &Self) -> u64 {
        Bitmap::or_cardinality(self, other)
    }

    fn xor_cardinality(&self, other: &Self) -> u64 {
        Bitmap::xor_cardinality(self, other)
    }

    fn andnot_cardinality(&self, other: &Self) -> u64 {
        Bitmap::andnot_cardinality(self, other)
    }

    fn decode(bytes: &[u8]) -> std::result::Result<Self, DecodeError> {
        Bitmap::try_deserialize::<Portable>(bytes)
    }

    fn encode(&self) -> Result<Vec<u8>> {
        self.try_serialize::<Portable>()
            .map_err(|source| Error::Allocation {
                requested: self.get_serialized_size_in_bytes::<Portable>(),
                source,
            })
    }
}

impl SqlBitmap for Bitmap64 {
    type Element = u64;

    /// Host integers are reinterpreted bit for bit, so negative values map to
    /// the upper half of the 64-bit range
    fn element(value: &Value<'_>, position: usize) -> Result<u64> {
        match *value {
            Value::Integer(i) => Ok(i as u64),
            _ => Err(not_an_integer(value, position)),
        }
    }

    fn add(&mut self, element: u64) {
        Bitmap64::add(self, element)
    }

    fn remove(&mut self, element: u64) {
        Bitmap64::remove(self, element)
    }

    fn cardinality(&self) -> u64 {
        Bitmap64::cardinality(self)
    }

    fn to_vec(&self) -> Vec<u64> {
        Bitmap64::to_vec(self)
    }

    fn and_inplace(&mut self, other: &Self) {
        Bitmap64::and_inplace(self, other)
    }

    fn or_inplace(&mut self, other: &Self) {
        Bitmap64::or_inplace(self, other)
    }

    fn xor_inplace(&mut self, other: &Self) {
        Bitmap64::xor_inplace(self, other)
    }

    fn andnot_inplace(&mut self, other: &Self) {
        Bitmap64::andnot_inplace(self, other)
    }

    fn and_cardinality(&self, other: &Self) -> u64 {
        Bitmap64::and_cardinality(self, other)
    }

    fn or_cardinality(&self, other: &Self) -> u64 {
        Bitmap64::or_cardinality(self, other)
    }

    fn xor_cardinality(&self, other: &Self) -> u64 {
        Bitmap64::xor_cardinality(self, other)
    }

    fn andnot_cardinality(&self, other: &Self) -> u64 {
        Bitmap64::andnot_cardinality(self, other)
    }

    fn decode(bytes: &[u8]) -> std::result::Result<Self, DecodeError> {
        Bitmap64::try_deserialize::<Portable>(bytes)
    }

    fn encode(&self) -> Result<Vec<u8>> {
        self.try_serialize::<Portable>()
            .map_err(|source| Error::Allocation {
                requested: self.get_serialized_size_in_bytes::<Portable>(),
                source,
            })
    }
}

/// Decodes the only bitmap operand of a call
pub(crate) fn decode_single<B: SqlBitmap>(value: &Value<'_>) -> Result<B> {
    B::decode(value.as_bytes()).map_err(Error::InvalidBitmap)
}

fn decode_pair<B: SqlBitmap>(lhs: &Value<'_>, rhs: &Value<'_>) -> Result<(B, B)> {
    let lhs = B::decode(lhs.as_bytes()).map_err(Error::InvalidBitmaps)?;
    let rhs = B::decode(rhs.as_bytes()).map_err(Error::InvalidBitmaps)?;
    Ok((lhs, rhs))
}

/// Counts are reported as SQL integers, saturating above `i64::MAX`
fn sql_count(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn logged<T>(function: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        debug!(function, %err, "bitmap function failed");
    }
    result
}

fn create<B: SqlBitmap>(args: &[Value<'_>]) -> Result<Vec<u8>> {
    let mut bitmap = B::default();
    for (index, arg) in args.iter().enumerate() {
        bitmap.add(B::element(arg, index + 1)?);
    }
    bitmap.encode()
}

fn count<B: SqlBitmap>(bitmap: &Value<'_>) -> Result<i64> {
    Ok(sql_count(decode_single::<B>(bitmap)?.cardinality()))
}

fn update<B: SqlBitmap>(
    bitmap: &Value<'_>,
    element: &Value<'_>,
    op: fn(&mut B, B::Element),
) -> Result<Vec<u8>> {
    let mut bitmap = decode_single::<B>(bitmap)?;
    op(&mut bitmap, B::element(element, 2)?);
    bitmap.encode()
}

fn combine<B: SqlBitmap>(lhs: &Value<'_>, rhs: &Value<'_>, op: fn(&mut B, &B)) -> Result<Vec<u8>> {
    let (mut lhs, rhs) = decode_pair::<B>(lhs, rhs)?;
    op(&mut lhs, &rhs);
    lhs.encode()
}

fn combine_count<B: SqlBitmap>(
    lhs: &Value<'_>,
    rhs: &Value<'_>,
    op: fn(&B, &B) -> u64,
) -> Result<i64> {
    let (lhs, rhs) = decode_pair::<B>(lhs, rhs)?;
    Ok(sql_count(op(&lhs, &rhs)))
}

/// Folds every blob argument left to right; other arguments are skipped
fn combine_many<B: SqlBitmap>(args: &[Value<'_>], op: fn(&mut B, &B)) -> Result<Vec<u8>> {
    let mut result: Option<B> = None;
    for arg in args {
        let Value::Blob(bytes) = arg else {
            continue;
        };
        let bitmap = B::decode(bytes).map_err(Error::InvalidBitmaps)?;
        result = Some(match result.take() {
            Some(mut acc) => {
                op(&mut acc, &bitmap);
                acc
            }
            None => bitmap,
        });
    }
    result.unwrap_or_default().encode()
}

fn array<B: SqlBitmap>(bitmap: &Value<'_>) -> Result<Vec<B::Element>> {
    Ok(decode_single::<B>(bitmap)?.to_vec())
}

/// `rb_create(e1, e2, ..)`: a bitmap of all the given integers
pub fn rb_create(args: &[Value<'_>]) -> Result<Vec<u8>> {
    logged("rb_create", create::<Bitmap>(args))
}

/// `rb_count(bitmap)`: the number of members
pub fn rb_count(bitmap: Value<'_>) -> Result<i64> {
    logged("rb_count", count::<Bitmap>(&bitmap))
}

/// `rb_add(bitmap, e)`: the bitmap with `e` added
///
/// # Examples
///
/// ```
/// use sqlroaring::functions::{rb_add, rb_count, rb_create, Value};
/// use sqlroaring::Error;
///
/// let bitmap = rb_create(&[Value::Integer(1), Value::Integer(2)]).unwrap();
/// let added = rb_add(Value::Blob(&bitmap), Value::Integer(2)).unwrap();
/// assert_eq!(rb_count(Value::Blob(&added)).unwrap(), 2);
///
/// assert!(matches!(
///     rb_add(Value::Blob(&bitmap), Value::Text("3")),
///     Err(Error::InvalidArgument { position: 2, .. })
/// ));
/// assert!(matches!(
///     rb_add(Value::Null, Value::Integer(3)),
///     Err(Error::InvalidBitmap(_))
/// ));
/// ```
pub fn rb_add(bitmap: Value<'_>, element: Value<'_>) -> Result<Vec<u8>> {
    logged("rb_add", update::<Bitmap>(&bitmap, &element, Bitmap::add))
}

/// `rb_remove(bitmap, e)`: the bitmap with `e` removed
pub fn rb_remove(bitmap: Value<'_>, element: Value<'_>) -> Result<Vec<u8>> {
    logged("rb_remove", update::<Bitmap>(&bitmap, &element, Bitmap::remove))
}

/// `rb_and(a, b)`: members of both
pub fn rb_and(lhs: Value<'_>, rhs: Value<'_>) -> Result<Vec<u8>> {
    logged("rb_and", combine::<Bitmap>(&lhs, &rhs, Bitmap::and_inplace))
}

/// `rb_or(a, b)`: members of either
pub fn rb_or(lhs: Value<'_>, rhs: Value<'_>) -> Result<Vec<u8>> {
    logged("rb_or", combine::<Bitmap>(&lhs, &rhs, Bitmap::or_inplace))
}

/// `rb_xor(a, b)`: members of exactly one
pub fn rb_xor(lhs: Value<'_>, rhs: Value<'_>) -> Result<Vec<u8>> {
    logged("rb_xor", combine::<Bitmap>(&lhs, &rhs, Bitmap::xor_inplace))
}

/// `rb_not(a, b)`: members of `a` that are not in `b`
pub fn rb_not(lhs: Value<'_>, rhs: Value<'_>) -> Result<Vec<u8>> {
    logged("rb_not", combine::<Bitmap>(&lhs, &rhs, Bitmap::andnot_inplace))
}

/// `rb_and_count(a, b)`
pub fn rb_and_count(lhs: Value<'_>, rhs: Value<'_>) -> Result<i64> {
    logged(
        "rb_and_count",
        combine_count::<Bitmap>(&lhs, &rhs, Bitmap::and_cardinality),
    )
}

/// `rb_or_count(a, b)`
pub fn rb_or_count(lhs: Value<'_>, rhs: Value<'_>) -> Result<i64> {
    logged(
        "rb_or_count",
        combine_count::<Bitmap>(&lhs, &rhs, Bitmap::or_cardinality),
    )
}

/// `rb_xor_count(a, b)`
pub fn rb_xor_count(lhs: Value<'_>, rhs: Value<'_>) -> Result<i64> {
    logged(
        "rb_xor_count",
        combine_count::<Bitmap>(&lhs, &rhs, Bitmap::xor_cardinality),
    )
}

/// `rb_not_count(a, b)`
pub fn rb_not_count(lhs: Value<'_>, rhs: Value<'_>) -> Result<i64> {
    logged(
        "rb_not_count",
        combine_count::<Bitmap>(&lhs, &rhs, Bitmap::andnot_cardinality),
    )
}

/// `rb_and_many(b1, b2, ..)`: the intersection of every blob argument
///
/// Arguments that are not blobs, such as `NULL`, are skipped. With no blob
/// arguments the result is an empty bitmap.
///
/// # Examples
///
/// ```
/// use sqlroaring::functions::{rb_and_many, rb_array, rb_create, Value};
///
/// let ints = |v: &[i64]| rb_create(&v.iter().map(|&i| Value::Integer(i)).collect::<Vec<_>>());
/// let a = ints(&[1, 2, 3, 4]).unwrap();
/// let b = ints(&[2, 3, 7, 8]).unwrap();
/// let c = ints(&[2, 3, 8, 9]).unwrap();
///
/// let all = rb_and_many(&[Value::Blob(&a), Value::Blob(&b), Value::Blob(&c)]).unwrap();
/// assert_eq!(rb_array(Value::Blob(&all)).unwrap(), [2, 3]);
///
/// let skipped = rb_and_many(&[Value::Null, Value::Blob(&b), Value::Blob(&c)]).unwrap();
/// assert_eq!(rb_array(Value::Blob(&skipped)).unwrap(), [2, 3, 8]);
/// ```
pub fn rb_and_many(args: &[Value<'_>]) -> Result<Vec<u8>> {
    logged("rb_and_many", combine_many::<Bitmap>(args, Bitmap::and_inplace))
}

/// `rb_or_many(b1, b2, ..)`: the union of every blob argument
pub fn rb_or_many(args: &[Value<'_>]) -> Result<Vec<u8>> {
    logged("rb_or_many", combine_many::<Bitmap>(args, Bitmap::or_inplace))
}

/// `rb_array(bitmap)`: every member in ascending order
pub fn rb_array(bitmap: Value<'_>) -> Result<Vec<u32>> {
    logged("rb_array", array::<Bitmap>(&bitmap))
}

/// `rb64_create(e1, e2, ..)`: a 64-bit bitmap of all the given integers
///
/// # Examples
///
/// ```
/// use sqlroaring::functions::{rb64_array, rb64_create, Value};
///
/// let bitmap = rb64_create(&[Value::Integer(-1), Value::Integer(1 << 40)]).unwrap();
/// assert_eq!(rb64_array(Value::Blob(&bitmap)).unwrap(), [1 << 40, u64::MAX]);
/// ```
pub fn rb64_create(args: &[Value<'_>]) -> Result<Vec<u8>> {
    logged("rb64_create", create::<Bitmap64>(args))
}

/// `rb64_count(bitmap)`
pub fn rb64_count(bitmap: Value<'_>) -> Result<i64> {
    logged("rb64_count", count::<Bitmap64>(&bitmap))
}

/// `rb64_add(bitmap, e)`
pub fn rb64_add(bitmap: Value<'_>, element: Value<'_>) -> Result<Vec<u8>> {
    logged("rb64_add", update::<Bitmap64>(&bitmap, &element, Bitmap64::add))
}

/// `rb64_remove(bitmap, e)`
pub fn rb64_remove(bitmap: Value<'_>, element: Value<'_>) -> Result<Vec<u8>> {
    logged(
        "rb64_remove",
        update::<Bitmap64>(&bitmap, &element, Bitmap64::remove),
    )
}

/// `rb64_and(a, b)`
pub fn rb64_and(lhs: Value<'_>, rhs: Value<'_>) -> Result<Vec<u8>> {
    logged("rb64_and", combine::<Bitmap64>(&lhs, &rhs, Bitmap64::and_inplace))
}

/// `rb64_or(a, b)`
pub fn rb64_or(lhs: Value<'_>, rhs: Value<'_>) -> Result<Vec<u8>> {
    logged("rb64_or", combine::<Bitmap64>(&lhs, &rhs, Bitmap64::or_inplace))
}

/// `rb64_xor(a, b)`
pub fn rb64_xor(lhs: Value<'_>, rhs: Value<'_>) -> Result<Vec<u8>> {
    logged("rb64_xor", combine::<Bitmap64>(&lhs, &rhs, Bitmap64::xor_inplace))
}

/// `rb64_not(a, b)`
pub fn rb64_not(lhs: Value<'_>, rhs: Value<'_>) -> Result<Vec<u8>> {
    logged(
        "rb64_not",
        combine::<Bitmap64>(&lhs, &rhs, Bitmap64::andnot_inplace),
    )
}

/// `rb64_and_count(a, b)`
pub fn rb64_and_count(lhs: Value<'_>, rhs: Value<'_>) -> Result<i64> {
    logged(
        "rb64_and_count",
        combine_count::<Bitmap64>(&lhs, &rhs, Bitmap64::and_cardinality),
    )
}

/// `rb64_or_count(a, b)`
pub fn rb64_or_count(lhs: Value<'_>, rhs: Value<'_>) -> Result<i64> {
    logged(
        "rb64_or_count",
        combine_count::<Bitmap64>(&lhs, &rhs, Bitmap64::or_cardinality),
    )
}

/// `rb64_xor_count(a, b)`
pub fn rb64_xor_count(lhs: Value<'_>, rhs: Value<'_>) -> Result<i64> {
    logged(
        "rb64_xor_count",
        combine_count::<Bitmap64>(&lhs, &rhs, Bitmap64::xor_cardinality),
    )
}

/// `rb64_not_count(a, b)`
pub fn rb64_not_count(lhs: Value<'_>, rhs: Value<'_>) -> Result<i64> {
    logged(
        "rb64_not_count",
        combine_count::<Bitmap64>(&lhs, &rhs, Bitmap64::andnot_cardinality),
    )
}

/// `rb64_and_many(b1, b2, ..)`
pub fn rb64_and_many(args: &[Value<'_>]) -> Result<Vec<u8>> {
    logged(
        "rb64_and_many",
        combine_many::<Bitmap64>(args, Bitmap64::and_inplace),
    )
}

/// `rb64_or_many(b1, b2, ..)`
pub fn rb64_or_many(args: &[Value<'_>]) -> Result<Vec<u8>> {
    logged(
        "rb64_or_many",
        combine_many::<Bitmap64>(args, Bitmap64::or_inplace),
    )
}

/// `rb64_array(bitmap)`
pub fn rb64_array(bitmap: Value<'_>) -> Result<Vec<u64>> {
    logged("rb64_array", array::<Bitmap64>(&bitmap))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value<'static>> {
        values.iter().map(|&v| Value::Integer(v)).collect()
    }

    #[test]
    fn create_rejects_non_integers() {
        assert_eq!(
            rb_create(&[Value::Integer(1), Value::Real(2.5)]),
            Err(Error::InvalidArgument {
                position: 2,
                found: "real",
                expected: "an integer",
            })
        );
        assert!(matches!(
            rb_create(&ints(&[1, -1])),
            Err(Error::InvalidArgument { position: 2, .. })
        ));
        assert!(matches!(
            rb_create(&ints(&[1 << 32])),
            Err(Error::InvalidArgument { position: 1, .. })
        ));
        assert!(rb64_create(&ints(&[-1, 1 << 32])).is_ok());
    }

    #[test]
    fn empty_create_is_valid() {
        let empty = rb_create(&[]).unwrap();
        assert_eq!(rb_count(Value::Blob(&empty)), Ok(0));
        let empty = rb64_create(&[]).unwrap();
        assert_eq!(rb64_count(Value::Blob(&empty)), Ok(0));
    }

    #[test]
    fn operand_errors_depend_on_arity() {
        let good = rb_create(&ints(&[1])).unwrap();
        assert!(matches!(rb_count(Value::Null), Err(Error::InvalidBitmap(_))));
        assert!(matches!(
            rb_and(Value::Blob(&good), Value::Blob(b"junk")),
            Err(Error::InvalidBitmaps(_))
        ));
        assert!(matches!(
            rb_or_count(Value::Integer(1), Value::Blob(&good)),
            Err(Error::InvalidBitmaps(_))
        ));
        assert!(matches!(
            rb_or_many(&[Value::Blob(&good), Value::Blob(&[1, 2, 3])]),
            Err(Error::InvalidBitmaps(_))
        ));
    }

    #[test]
    fn domains_do_not_mix() {
        let narrow = rb_create(&ints(&[1])).unwrap();
        let wide = rb64_create(&ints(&[1])).unwrap();
        assert!(matches!(
            rb64_count(Value::Blob(&narrow)),
            Err(Error::InvalidBitmap(DecodeError::BadCookie(_)))
        ));
        assert!(matches!(
            rb_count(Value::Blob(&wide)),
            Err(Error::InvalidBitmap(DecodeError::BadCookie(_)))
        ));
    }

    #[test]
    fn many_without_blobs_is_empty() {
        let empty = rb_or_many(&[Value::Null, Value::Integer(3)]).unwrap();
        assert_eq!(rb_count(Value::Blob(&empty)), Ok(0));
        let empty = rb64_and_many(&[]).unwrap();
        assert_eq!(rb64_count(Value::Blob(&empty)), Ok(0));
    }

    #[test]
    fn text_is_read_as_bytes() {
        assert!(matches!(
            rb_count(Value::Text("not a bitmap")),
            Err(Error::InvalidBitmap(_))
        ));
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(4_i64)), Value::Integer(4));
    }
}

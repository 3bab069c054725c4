//! Accumulators behind the grouping functions
//!
//! A host allocates one accumulator per group, feeds it every row with
//! [`Aggregate::step`] and collects the [`Portable`](crate::Portable) result
//! with [`Aggregate::finalize`], which also returns the accumulator to its
//! initial state so it can serve the next group.
//!
//! Once a row fails, the group stays failed: later rows are ignored and
//! report the same error, and finalizing reports it once more before the
//! accumulator resets.
//!
//! # Examples
//!
//! ```
//! use sqlroaring::aggregate::{Aggregate, GroupOr};
//! use sqlroaring::functions::{rb_array, rb_create, Value};
//! use sqlroaring::Bitmap;
//!
//! let rows = [
//!     rb_create(&[Value::Integer(1), Value::Integer(3)]).unwrap(),
//!     rb_create(&[Value::Integer(2), Value::Integer(3)]).unwrap(),
//!     rb_create(&[]).unwrap(),
//! ];
//!
//! let mut group = GroupOr::<Bitmap>::new();
//! for row in &rows {
//!     group.step(Value::Blob(row)).unwrap();
//! }
//! let result = group.finalize().unwrap();
//! assert_eq!(rb_array(Value::Blob(&result)).unwrap(), [1, 2, 3]);
//! ```

use std::mem;

use tracing::trace;

use crate::functions::{decode_single, SqlBitmap, Value};
use crate::Result;

/// Per-group state shared by all accumulators
#[derive(Debug, Default)]
enum State<B> {
    #[default]
    Uninitialized,
    Accumulating(B),
    Failed(crate::Error),
}

impl<B: SqlBitmap> State<B> {
    /// Folds one row into the state; `fold` receives the running bitmap, or
    /// `None` for the first row of the group
    fn step<F>(&mut self, fold: F) -> Result<()>
    where
        F: FnOnce(Option<B>) -> Result<B>,
    {
        let current = match mem::take(self) {
            State::Failed(err) => {
                *self = State::Failed(err.clone());
                return Err(err);
            }
            State::Uninitialized => {
                trace!("group started");
                None
            }
            State::Accumulating(bitmap) => Some(bitmap),
        };
        match fold(current) {
            Ok(bitmap) => {
                *self = State::Accumulating(bitmap);
                Ok(())
            }
            Err(err) => {
                trace!(%err, "group failed");
                *self = State::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        let result = match mem::take(self) {
            State::Uninitialized => B::default().encode(),
            State::Accumulating(bitmap) => bitmap.encode(),
            State::Failed(err) => Err(err),
        };
        trace!(ok = result.is_ok(), "group finalized");
        result
    }
}

/// A grouping function: one call per row, then one final call per group
pub trait Aggregate {
    /// Folds one row into the group
    fn step(&mut self, value: Value<'_>) -> Result<()>;

    /// Encodes the group's result and resets the accumulator
    ///
    /// A group that saw no rows yields an empty bitmap.
    fn finalize(&mut self) -> Result<Vec<u8>>;
}

/// `rb_group_create(col)`: a bitmap of every integer in the group
///
/// # Examples
///
/// ```
/// use sqlroaring::aggregate::{Aggregate, GroupCreate};
/// use sqlroaring::functions::{rb_count, Value};
/// use sqlroaring::{Bitmap, Error};
///
/// let mut group = GroupCreate::<Bitmap>::new();
/// for i in [1, 2, 3, 4, 5, 5] {
///     group.step(Value::Integer(i)).unwrap();
/// }
/// let result = group.finalize().unwrap();
/// assert_eq!(rb_count(Value::Blob(&result)).unwrap(), 5);
///
/// assert!(matches!(
///     group.step(Value::Text("6")),
///     Err(Error::InvalidArgument { .. })
/// ));
/// ```
#[derive(Debug)]
pub struct GroupCreate<B> {
    state: State<B>,
}

/// `rb_group_and(col)`: the intersection of every bitmap in the group
///
/// The first row's bitmap becomes the running result; every later row is
/// intersected into it.
#[derive(Debug)]
pub struct GroupAnd<B> {
    state: State<B>,
}

/// `rb_group_or(col)`: the union of every bitmap in the group
#[derive(Debug)]
pub struct GroupOr<B> {
    state: State<B>,
}

macro_rules! impl_new {
    ($($name:ident),*) => {$(
        impl<B> $name<B> {
            pub fn new() -> Self {
                Self {
                    state: State::Uninitialized,
                }
            }
        }

        impl<B> Default for $name<B> {
            fn default() -> Self {
                Self::new()
            }
        }
    )*};
}

impl_new!(GroupCreate, GroupAnd, GroupOr);

impl<B: SqlBitmap> Aggregate for GroupCreate<B> {
    fn step(&mut self, value: Value<'_>) -> Result<()> {
        self.state.step(|current| {
            let element = B::element(&value, 1)?;
            let mut bitmap = current.unwrap_or_default();
            bitmap.add(element);
            Ok(bitmap)
        })
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        self.state.finalize()
    }
}

impl<B: SqlBitmap> Aggregate for GroupAnd<B> {
    fn step(&mut self, value: Value<'_>) -> Result<()> {
        self.state.step(|current| {
            let row = decode_single::<B>(&value)?;
            Ok(match current {
                Some(mut bitmap) => {
                    bitmap.and_inplace(&row);
                    bitmap
                }
                None => row,
            })
        })
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        self.state.finalize()
    }
}

impl<B: SqlBitmap> Aggregate for GroupOr<B> {
    fn step(&mut self, value: Value<'_>) -> Result<()> {
        self.state.step(|current| {
            let row = decode_single::<B>(&value)?;
            let mut bitmap = current.unwrap_or_default();
            bitmap.or_inplace(&row);
            Ok(bitmap)
        })
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        self.state.finalize()
    }
}

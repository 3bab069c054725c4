use std::collections::btree_map;
use std::iter::{FromIterator, FusedIterator};

use crate::{Bitmap, BitmapIterator};

use super::{join, Bitmap64};

/// Ascending iterator over the members of a [`Bitmap64`]
#[derive(Clone)]
pub struct Bitmap64Iterator<'a> {
    buckets: btree_map::Iter<'a, u32, Bitmap>,
    current: Option<(u32, BitmapIterator<'a>)>,
}

impl<'a> Bitmap64Iterator<'a> {
    fn new(bitmap: &'a Bitmap64) -> Self {
        Self {
            buckets: bitmap.buckets().iter(),
            current: None,
        }
    }

    /// Attempt to read many values from the iterator into `dst`
    ///
    /// Returns the number of items read from the iterator, may be `< dst.len()` iff
    /// the iterator is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[1, 2, 1 << 40]);
    /// let mut iter = bitmap.iter();
    /// let mut buf = [0; 2];
    ///
    /// assert_eq!(iter.next_many(&mut buf), 2);
    /// assert_eq!(buf, [1, 2]);
    /// assert_eq!(iter.next_many(&mut buf), 1);
    /// assert_eq!(buf[0], 1 << 40);
    /// assert_eq!(iter.next_many(&mut buf), 0);
    /// ```
    pub fn next_many(&mut self, dst: &mut [u64]) -> usize {
        let mut count = 0;
        for (slot, value) in dst.iter_mut().zip(self.by_ref()) {
            *slot = value;
            count += 1;
        }
        count
    }
}

impl Iterator for Bitmap64Iterator<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if let Some((hi, values)) = &mut self.current {
                if let Some(lo) = values.next() {
                    return Some(join(*hi, lo));
                }
            }
            let (hi, bitmap) = self.buckets.next()?;
            self.current = Some((*hi, bitmap.iter()));
        }
    }
}

impl FusedIterator for Bitmap64Iterator<'_> {}

impl Bitmap64 {
    /// Returns an iterator over each value stored in the bitmap, in
    /// ascending order
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[u64::MAX, 4, 1 << 32]);
    /// let mut iterator = bitmap.iter();
    ///
    /// assert_eq!(iterator.next(), Some(4));
    /// assert_eq!(iterator.next(), Some(1 << 32));
    /// assert_eq!(iterator.next(), Some(u64::MAX));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Bitmap64Iterator<'_> {
        Bitmap64Iterator::new(self)
    }
}

impl<'a> IntoIterator for &'a Bitmap64 {
    type Item = u64;
    type IntoIter = Bitmap64Iterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<u64> for Bitmap64 {
    /// Convenience method for creating bitmap from iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap: Bitmap64 = (1..3).chain(Some(u64::MAX)).collect();
    ///
    /// assert_eq!(bitmap.cardinality(), 3);
    /// assert!(bitmap.contains(u64::MAX));
    /// ```
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut bitmap = Bitmap64::new();
        bitmap.extend(iter);
        bitmap
    }
}

impl Extend<u64> for Bitmap64 {
    fn extend<T: IntoIterator<Item = u64>>(&mut self, iter: T) {
        let values = Vec::from_iter(iter);
        self.add_many(&values);
    }
}

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, TryReserveError};
use std::ops::{Bound, RangeBounds};

use crate::{Bitmap, DecodeError};

use super::serialization::{Deserializer, Serializer};
use super::{join, split, Bitmap64};

impl Bitmap64 {
    /// Creates an empty `Bitmap64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap = Bitmap64::new();
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty `Bitmap64`.
    ///
    /// Alias of [`Bitmap64::new`].
    #[inline]
    pub fn create() -> Self {
        Self::new()
    }

    /// Creates a new bitmap from a slice of u64 integers
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[1, u64::MAX, 1]);
    ///
    /// assert_eq!(bitmap.to_vec(), [1, u64::MAX]);
    /// ```
    pub fn of(values: &[u64]) -> Self {
        let mut bitmap = Self::new();
        bitmap.add_many(values);
        bitmap
    }

    /// Creates a bitmap holding the 32-bit bitmap's values, all in bucket zero
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::{Bitmap, Bitmap64};
    ///
    /// let bitmap = Bitmap64::from_bitmap(Bitmap::of(&[1, 2]));
    /// assert_eq!(bitmap.to_vec(), [1, 2]);
    /// ```
    pub fn from_bitmap(bitmap: Bitmap) -> Self {
        let mut map = BTreeMap::new();
        if !bitmap.is_empty() {
            map.insert(0, bitmap);
        }
        Self { map }
    }

    pub(crate) fn from_map(map: BTreeMap<u32, Bitmap>) -> Self {
        debug_assert!(map.values().all(|bitmap| !bitmap.is_empty()));
        Self { map }
    }

    pub(crate) fn buckets(&self) -> &BTreeMap<u32, Bitmap> {
        &self.map
    }

    /// Adds a single value to the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// bitmap.add(3);
    /// assert!(bitmap.contains(3));
    /// bitmap.add(u64::MAX);
    /// assert!(bitmap.contains(u64::MAX));
    /// ```
    pub fn add(&mut self, value: u64) {
        let (hi, lo) = split(value);
        self.map.entry(hi).or_default().add(lo);
    }

    /// Adds a value, returning true if it was not already present
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// assert!(bitmap.add_checked(1 << 40));
    /// assert!(!bitmap.add_checked(1 << 40));
    /// ```
    pub fn add_checked(&mut self, value: u64) -> bool {
        let (hi, lo) = split(value);
        self.map.entry(hi).or_default().add_checked(lo)
    }

    /// Adds every value of the slice
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// bitmap.add_many(&[1, 2, 3, 1 << 33]);
    ///
    /// assert_eq!(bitmap.cardinality(), 4);
    /// ```
    pub fn add_many(&mut self, values: &[u64]) {
        // Group consecutive values of one bucket so the inner bitmap sees a batch
        let mut start = 0;
        while start < values.len() {
            let (hi, _) = split(values[start]);
            let end = values[start..]
                .iter()
                .position(|&value| split(value).0 != hi)
                .map_or(values.len(), |offset| start + offset);
            let lows: Vec<u32> = values[start..end].iter().map(|&v| split(v).1).collect();
            self.map.entry(hi).or_default().add_many(&lows);
            start = end;
        }
    }

    /// Adds all values in range
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// bitmap.add_range((1 << 32) - 1..(1 << 32) + 2);
    /// assert_eq!(bitmap.to_vec(), [(1 << 32) - 1, 1 << 32, (1 << 32) + 1]);
    ///
    /// bitmap.add_range(u64::MAX - 1..=u64::MAX);
    /// assert!(bitmap.contains(u64::MAX));
    /// ```
    pub fn add_range<R: RangeBounds<u64>>(&mut self, range: R) {
        let Some((start, end)) = range_to_inclusive(range) else {
            return;
        };
        for (hi, lo_start, lo_end) in bucket_ranges(start, end) {
            self.map.entry(hi).or_default().add_range(lo_start..=lo_end);
        }
    }

    /// Removes all values in range
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::of(&[1, 5, 1 << 32, u64::MAX]);
    /// bitmap.remove_range(2..=(1 << 32));
    ///
    /// assert_eq!(bitmap.to_vec(), [1, u64::MAX]);
    /// ```
    pub fn remove_range<R: RangeBounds<u64>>(&mut self, range: R) {
        let Some((start, end)) = range_to_inclusive(range) else {
            return;
        };
        let (start_hi, _) = split(start);
        let (end_hi, _) = split(end);
        let mut emptied = Vec::new();
        for (&hi, bitmap) in self.map.range_mut(start_hi..=end_hi) {
            let lo_start = if hi == start_hi { split(start).1 } else { 0 };
            let lo_end = if hi == end_hi { split(end).1 } else { u32::MAX };
            bitmap.remove_range(lo_start..=lo_end);
            if bitmap.is_empty() {
                emptied.push(hi);
            }
        }
        for hi in emptied {
            self.map.remove(&hi);
        }
    }

    /// Empties the bitmap
    #[inline]
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Removes a value from the bitmap if present
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::of(&[1 << 35]);
    /// bitmap.remove(1 << 35);
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    pub fn remove(&mut self, value: u64) {
        self.remove_checked(value);
    }

    /// Removes a value, returning true if it was present
    pub fn remove_checked(&mut self, value: u64) -> bool {
        let (hi, lo) = split(value);
        let Entry::Occupied(mut entry) = self.map.entry(hi) else {
            return false;
        };
        let removed = entry.get_mut().remove_checked(lo);
        if entry.get().is_empty() {
            entry.remove();
        }
        removed
    }

    /// Returns true if the value is present in the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[u64::MAX]);
    ///
    /// assert!(bitmap.contains(u64::MAX));
    /// assert!(!bitmap.contains(u64::from(u32::MAX)));
    /// ```
    pub fn contains(&self, value: u64) -> bool {
        let (hi, lo) = split(value);
        self.map.get(&hi).map_or(false, |bitmap| bitmap.contains(lo))
    }

    /// Returns the number of values in the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// assert_eq!(bitmap.cardinality(), 0);
    ///
    /// bitmap.add_range(0..=(1 << 32));
    /// assert_eq!(bitmap.cardinality(), (1 << 32) + 1);
    /// ```
    pub fn cardinality(&self) -> u64 {
        self.map.values().map(Bitmap::cardinality).sum()
    }

    /// Returns true if the bitmap holds no values
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the smallest value in the bitmap, or `None` when empty
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// assert_eq!(Bitmap64::new().minimum(), None);
    /// assert_eq!(Bitmap64::of(&[u64::MAX, 1 << 40]).minimum(), Some(1 << 40));
    /// ```
    pub fn minimum(&self) -> Option<u64> {
        let (&hi, bitmap) = self.map.iter().next()?;
        bitmap.minimum().map(|lo| join(hi, lo))
    }

    /// Returns the largest value in the bitmap, or `None` when empty
    pub fn maximum(&self) -> Option<u64> {
        let (&hi, bitmap) = self.map.iter().next_back()?;
        bitmap.maximum().map(|lo| join(hi, lo))
    }

    /// Returns the number of values smaller or equal to `value`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[1, 10, 1 << 32, u64::MAX]);
    ///
    /// assert_eq!(bitmap.rank(0), 0);
    /// assert_eq!(bitmap.rank(10), 2);
    /// assert_eq!(bitmap.rank(u64::MAX - 1), 3);
    /// ```
    pub fn rank(&self, value: u64) -> u64 {
        let (hi, lo) = split(value);
        let below: u64 = self.map.range(..hi).map(|(_, b)| b.cardinality()).sum();
        below + self.map.get(&hi).map_or(0, |bitmap| bitmap.rank(lo))
    }

    /// Returns a vector of all the values, in ascending order
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[u64::MAX, 3, 1 << 33]);
    /// assert_eq!(bitmap.to_vec(), [3, 1 << 33, u64::MAX]);
    /// ```
    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }

    /// Computes the intersection of two bitmaps into a new one
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[1, 2, u64::MAX]);
    /// let bitmap2 = Bitmap64::of(&[2, 3, u64::MAX]);
    ///
    /// assert_eq!(bitmap1.and(&bitmap2).to_vec(), [2, u64::MAX]);
    /// ```
    pub fn and(&self, other: &Self) -> Self {
        let mut map = BTreeMap::new();
        for (&hi, lhs) in &self.map {
            if let Some(rhs) = other.map.get(&hi) {
                let bitmap = lhs.and(rhs);
                if !bitmap.is_empty() {
                    map.insert(hi, bitmap);
                }
            }
        }
        Self { map }
    }

    /// Intersects with `other`, storing the result in `self`
    pub fn and_inplace(&mut self, other: &Self) {
        self.map.retain(|hi, lhs| match other.map.get(hi) {
            Some(rhs) => {
                lhs.and_inplace(rhs);
                !lhs.is_empty()
            }
            None => false,
        });
    }

    /// Computes the union of two bitmaps into a new one
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[15]);
    /// let bitmap2 = Bitmap64::of(&[1 << 40]);
    ///
    /// assert_eq!(bitmap1.or(&bitmap2).to_vec(), [15, 1 << 40]);
    /// ```
    pub fn or(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.or_inplace(other);
        result
    }

    /// Unions with `other`, storing the result in `self`
    pub fn or_inplace(&mut self, other: &Self) {
        for (&hi, rhs) in &other.map {
            match self.map.entry(hi) {
                Entry::Vacant(entry) => {
                    entry.insert(rhs.clone());
                }
                Entry::Occupied(mut entry) => {
                    entry.get_mut().or_inplace(rhs);
                }
            }
        }
    }

    /// Computes the symmetric difference of two bitmaps into a new one
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[15, 1 << 40]);
    /// let bitmap2 = Bitmap64::of(&[1 << 40, 35]);
    ///
    /// let bitmap3 = bitmap1.xor(&bitmap2);
    ///
    /// assert_eq!(bitmap3.to_vec(), [15, 35]);
    /// ```
    pub fn xor(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.xor_inplace(other);
        result
    }

    /// Computes the symmetric difference with `other`, storing the result in
    /// `self`
    pub fn xor_inplace(&mut self, other: &Self) {
        for (&hi, rhs) in &other.map {
            match self.map.entry(hi) {
                Entry::Vacant(entry) => {
                    entry.insert(rhs.clone());
                }
                Entry::Occupied(mut entry) => {
                    entry.get_mut().xor_inplace(rhs);
                    if entry.get().is_empty() {
                        entry.remove();
                    }
                }
            }
        }
    }

    /// Computes the values of `self` absent from `other` into a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[15, 25, 1 << 40]);
    /// let bitmap2 = Bitmap64::of(&[25, 35]);
    ///
    /// assert_eq!(bitmap1.andnot(&bitmap2).to_vec(), [15, 1 << 40]);
    /// ```
    pub fn andnot(&self, other: &Self) -> Self {
        let mut map = BTreeMap::new();
        for (&hi, lhs) in &self.map {
            let bitmap = match other.map.get(&hi) {
                Some(rhs) => lhs.andnot(rhs),
                None => lhs.clone(),
            };
            if !bitmap.is_empty() {
                map.insert(hi, bitmap);
            }
        }
        Self { map }
    }

    /// Removes the values of `other` from `self`
    pub fn andnot_inplace(&mut self, other: &Self) {
        self.map.retain(|hi, lhs| match other.map.get(hi) {
            Some(rhs) => {
                lhs.andnot_inplace(rhs);
                !lhs.is_empty()
            }
            None => true,
        });
    }

    /// Computes the intersection of many bitmaps, left to right
    ///
    /// An empty slice yields an empty bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[1, 2, 1 << 40]);
    /// let bitmap2 = Bitmap64::of(&[2, 1 << 40]);
    /// let bitmap3 = Bitmap64::of(&[1 << 40, 5]);
    ///
    /// let bitmap4 = Bitmap64::fast_and(&[&bitmap1, &bitmap2, &bitmap3]);
    /// assert_eq!(bitmap4.to_vec(), [1 << 40]);
    /// ```
    pub fn fast_and(bitmaps: &[&Bitmap64]) -> Self {
        let Some((first, rest)) = bitmaps.split_first() else {
            return Self::new();
        };
        let mut result = (*first).clone();
        for bitmap in rest {
            if result.is_empty() {
                break;
            }
            result.and_inplace(bitmap);
        }
        result
    }

    /// Computes the union of many bitmaps
    pub fn fast_or(bitmaps: &[&Bitmap64]) -> Self {
        let mut result = Self::new();
        for bitmap in bitmaps {
            result.or_inplace(bitmap);
        }
        result
    }

    /// Computes the symmetric difference of many bitmaps
    pub fn fast_xor(bitmaps: &[&Bitmap64]) -> Self {
        let mut result = Self::new();
        for bitmap in bitmaps {
            result.xor_inplace(bitmap);
        }
        result
    }

    /// Returns the cardinality of the intersection without building it
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap64::of(&[2, 3, 4]);
    ///
    /// assert_eq!(bitmap1.and_cardinality(&bitmap2), 2);
    /// assert_eq!(bitmap1.or_cardinality(&bitmap2), 4);
    /// assert_eq!(bitmap1.xor_cardinality(&bitmap2), 2);
    /// assert_eq!(bitmap1.andnot_cardinality(&bitmap2), 1);
    /// ```
    pub fn and_cardinality(&self, other: &Self) -> u64 {
        self.map
            .iter()
            .filter_map(|(hi, lhs)| other.map.get(hi).map(|rhs| lhs.and_cardinality(rhs)))
            .sum()
    }

    /// Returns the cardinality of the union without building it
    pub fn or_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() + other.cardinality() - self.and_cardinality(other)
    }

    /// Returns the cardinality of the symmetric difference without building it
    pub fn xor_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() + other.cardinality() - 2 * self.and_cardinality(other)
    }

    /// Returns the cardinality of the difference without building it
    pub fn andnot_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() - self.and_cardinality(other)
    }

    /// Converts every bucket to its most compact container layout; returns
    /// true if any run container resulted
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// bitmap.add_range(1 << 40..(1 << 40) + 10_000);
    /// let unchanged = bitmap.clone();
    ///
    /// bitmap.run_optimize();
    /// assert_eq!(bitmap, unchanged);
    /// ```
    pub fn run_optimize(&mut self) -> bool {
        self.map
            .values_mut()
            .fold(false, |any, bitmap| bitmap.run_optimize() | any)
    }

    /// Removes run-length encoding from every bucket; returns true if any
    /// container changed
    pub fn remove_run_compression(&mut self) -> bool {
        self.map
            .values_mut()
            .fold(false, |any, bitmap| bitmap.remove_run_compression() | any)
    }

    /// Computes the serialized size in bytes of the bitmap in format `S`.
    #[inline]
    pub fn get_serialized_size_in_bytes<S: Serializer>(&self) -> usize {
        S::get_serialized_size_in_bytes(self)
    }

    /// Serializes a bitmap to a new vector of bytes in format `S`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::{Bitmap64, Portable};
    ///
    /// let original_bitmap = Bitmap64::of(&[1, 1 << 40, u64::MAX]);
    ///
    /// let serialized_buffer = original_bitmap.serialize::<Portable>();
    /// let deserialized_bitmap = Bitmap64::try_deserialize::<Portable>(&serialized_buffer);
    ///
    /// assert_eq!(deserialized_bitmap.unwrap(), original_bitmap);
    /// ```
    pub fn serialize<S: Serializer>(&self) -> Vec<u8> {
        let mut dst = vec![0; S::get_serialized_size_in_bytes(self)];
        S::write(self, &mut dst);
        dst
    }

    /// Serializes a bitmap to a new vector, reporting allocation failure
    /// instead of aborting.
    pub fn try_serialize<S: Serializer>(&self) -> Result<Vec<u8>, TryReserveError> {
        let mut dst = Vec::new();
        self.serialize_into::<S>(&mut dst)?;
        Ok(dst)
    }

    /// Serializes a bitmap to the end of `dst` in format `S`, returning the
    /// newly written part of `dst`
    pub fn serialize_into<'a, S: Serializer>(
        &self,
        dst: &'a mut Vec<u8>,
    ) -> Result<&'a [u8], TryReserveError> {
        let len = S::get_serialized_size_in_bytes(self);
        dst.try_reserve_exact(len)?;
        let start = dst.len();
        dst.resize(start + len, 0);
        S::write(self, &mut dst[start..]);
        Ok(&dst[start..])
    }

    /// Given a serialized bitmap as slice of bytes in format `D`, returns a
    /// bitmap instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::{Bitmap64, Portable};
    ///
    /// assert!(Bitmap64::try_deserialize::<Portable>(&[]).is_err());
    /// ```
    #[inline]
    pub fn try_deserialize<D: Deserializer>(buffer: &[u8]) -> Result<Self, DecodeError> {
        D::try_deserialize(buffer)
    }

    /// Given a serialized bitmap as slice of bytes in format `D`, returns a
    /// bitmap instance.
    ///
    /// On invalid input returns empty bitmap.
    #[inline]
    pub fn deserialize<D: Deserializer>(buffer: &[u8]) -> Self {
        Self::try_deserialize::<D>(buffer).unwrap_or_default()
    }
}

/// Resolves a range to inclusive bounds, `None` when it is empty
fn range_to_inclusive<R: RangeBounds<u64>>(range: R) -> Option<(u64, u64)> {
    let start = match range.start_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_add(1)?,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_sub(1)?,
        Bound::Unbounded => u64::MAX,
    };
    (start <= end).then_some((start, end))
}

/// Splits an inclusive 64-bit range into per-bucket inclusive 32-bit ranges
fn bucket_ranges(start: u64, end: u64) -> impl Iterator<Item = (u32, u32, u32)> {
    let (start_hi, start_lo) = split(start);
    let (end_hi, end_lo) = split(end);
    (start_hi..=end_hi).map(move |hi| {
        let lo = if hi == start_hi { start_lo } else { 0 };
        let high = if hi == end_hi { end_lo } else { u32::MAX };
        (hi, lo, high)
    })
}

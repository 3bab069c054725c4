use std::collections::TryReserveError;
use std::mem;
use std::ops::{Bound, RangeBounds};

use crate::container::{self, Container, ContainerType, Interval};
use crate::DecodeError;

use super::serialization::{Deserializer, Serializer};
use super::{join, split, Bitmap, Statistics};

impl Bitmap {
    /// Creates a new bitmap (initially empty)
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap = Bitmap::new();
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            containers: Vec::new(),
        }
    }

    /// Creates a new bitmap (initially empty)
    ///
    /// Same as [`Bitmap::new`].
    #[inline]
    pub fn create() -> Self {
        Self::new()
    }

    /// Creates a new bitmap from a slice of u32 integers
    ///
    /// The slice may be unordered and contain duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let elements = vec![5, 1, 5, 1_000_000];
    ///
    /// let bitmap = Bitmap::of(&elements);
    ///
    /// let mut bitmap2 = Bitmap::create();
    ///
    /// for element in &elements {
    ///     bitmap2.add(*element);
    /// }
    ///
    /// assert_eq!(bitmap.cardinality(), 3);
    /// assert_eq!(bitmap.to_vec(), [1, 5, 1_000_000]);
    /// assert_eq!(bitmap, bitmap2);
    /// ```
    pub fn of(elements: &[u32]) -> Self {
        let mut values = elements.to_vec();
        values.sort_unstable();
        values.dedup();
        Self::from_sorted(&values)
    }

    /// Builds a bitmap from strictly ascending values
    pub(crate) fn from_sorted(values: &[u32]) -> Self {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        let mut containers = Vec::new();
        let mut rest = values;
        while let Some(&first) = rest.first() {
            let (key, _) = split(first);
            let len = rest.partition_point(|&v| split(v).0 == key);
            let low = rest[..len].iter().map(|&v| v as u16).collect();
            containers.push((key, Container::from_sorted_values(low)));
            rest = &rest[len..];
        }
        Self { containers }
    }

    /// Wraps containers that are already keyed in strictly ascending order
    /// and non-empty
    pub(crate) fn from_containers(containers: Vec<(u16, Container)>) -> Self {
        debug_assert!(containers.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(containers.iter().all(|(_, c)| !c.is_empty()));
        Self { containers }
    }

    #[inline]
    pub(crate) fn containers(&self) -> &[(u16, Container)] {
        &self.containers
    }

    #[inline]
    fn find(&self, key: u16) -> Result<usize, usize> {
        self.containers.binary_search_by_key(&key, |&(k, _)| k)
    }

    /// Container for `key`, created empty when missing
    fn container_mut(&mut self, key: u16) -> &mut Container {
        let index = match self.find(key) {
            Ok(index) => index,
            Err(index) => {
                self.containers.insert(index, (key, Container::new()));
                index
            }
        };
        &mut self.containers[index].1
    }

    /// Add the integer element to the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    /// assert!(bitmap.is_empty());
    /// bitmap.add(1);
    /// assert!(!bitmap.is_empty());
    /// ```
    #[inline]
    pub fn add(&mut self, element: u32) {
        self.add_checked(element);
    }

    /// Add the integer element to the bitmap. Returns true if the value was
    /// added, false if the value was already in the bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    /// assert!(bitmap.add_checked(1));
    /// assert!(!bitmap.add_checked(1));
    /// ```
    pub fn add_checked(&mut self, element: u32) -> bool {
        let (key, low) = split(element);
        self.container_mut(key).insert(low)
    }

    /// Add all the integer elements to the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    /// bitmap.add_many(&[1, 2, 3]);
    ///
    /// assert!(!bitmap.is_empty());
    /// assert!(bitmap.contains(1));
    /// assert!(bitmap.contains(2));
    /// assert!(bitmap.contains(3));
    /// ```
    pub fn add_many(&mut self, elements: &[u32]) {
        let mut cached: Option<(u16, usize)> = None;
        for &element in elements {
            let (key, low) = split(element);
            let index = match cached {
                Some((cached_key, index)) if cached_key == key => index,
                _ => {
                    let index = match self.find(key) {
                        Ok(index) => index,
                        Err(index) => {
                            self.containers.insert(index, (key, Container::new()));
                            index
                        }
                    };
                    cached = Some((key, index));
                    index
                }
            };
            self.containers[index].1.insert(low);
        }
    }

    /// Add all values in range
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::create();
    /// bitmap1.add_range((1..3));
    ///
    /// assert!(!bitmap1.is_empty());
    /// assert!(bitmap1.contains(1));
    /// assert!(bitmap1.contains(2));
    /// assert!(!bitmap1.contains(3));
    ///
    /// let mut bitmap2 = Bitmap::create();
    /// bitmap2.add_range((3..1));
    /// assert!(bitmap2.is_empty());
    ///
    /// let mut bitmap3 = Bitmap::create();
    /// bitmap3.add_range((3..3));
    /// assert!(bitmap3.is_empty());
    ///
    /// let mut bitmap4 = Bitmap::create();
    /// bitmap4.add_range(..=2);
    /// bitmap4.add_range(u32::MAX..=u32::MAX);
    /// assert!(bitmap4.contains(0));
    /// assert!(bitmap4.contains(1));
    /// assert!(bitmap4.contains(2));
    /// assert!(bitmap4.contains(u32::MAX));
    /// assert_eq!(bitmap4.cardinality(), 4);
    /// ```
    pub fn add_range<R: RangeBounds<u32>>(&mut self, range: R) {
        let Some((start, end)) = range_to_inclusive(range) else {
            return;
        };
        for (key, interval) in chunk_intervals(start, end) {
            self.container_mut(key).insert_range(interval);
        }
    }

    /// Remove all values in range
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    /// bitmap.add_range((1..4));
    /// assert!(!bitmap.is_empty());
    ///
    /// bitmap.remove_range((1..3));
    ///
    /// assert!(!bitmap.contains(1));
    /// assert!(!bitmap.contains(2));
    /// assert!(bitmap.contains(3));
    ///
    /// bitmap.remove_range(..);
    /// assert!(bitmap.is_empty());
    /// ```
    pub fn remove_range<R: RangeBounds<u32>>(&mut self, range: R) {
        let Some((start, end)) = range_to_inclusive(range) else {
            return;
        };
        for (key, interval) in chunk_intervals(start, end) {
            if let Ok(index) = self.find(key) {
                self.containers[index].1.remove_range(interval);
            }
        }
        self.containers.retain(|(_, container)| !container.is_empty());
    }

    /// Empties the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    /// bitmap.add(1);
    /// bitmap.add(2);
    /// bitmap.clear();
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.containers.clear();
    }

    /// Remove the integer element from the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    /// bitmap.add(1);
    /// bitmap.remove(1);
    /// bitmap.remove(7);
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn remove(&mut self, element: u32) {
        self.remove_checked(element);
    }

    /// Remove the integer element from the bitmap. Returns true if a the value
    /// was removed, false if the value was present in the bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    /// bitmap.add(1);
    /// assert!(bitmap.remove_checked(1));
    /// assert!(!bitmap.remove_checked(1));
    /// ```
    pub fn remove_checked(&mut self, element: u32) -> bool {
        let (key, low) = split(element);
        let Ok(index) = self.find(key) else {
            return false;
        };
        let container = &mut self.containers[index].1;
        let removed = container.remove(low);
        if container.is_empty() {
            self.containers.remove(index);
        }
        removed
    }

    /// Contains returns true if the integer element is contained in the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    /// bitmap.add(1);
    ///
    /// assert!(bitmap.contains(1));
    /// assert!(!bitmap.contains(2));
    /// ```
    #[inline]
    pub fn contains(&self, element: u32) -> bool {
        let (key, low) = split(element);
        match self.find(key) {
            Ok(index) => self.containers[index].1.contains(low),
            Err(_) => false,
        }
    }

    /// Returns number of elements in the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    /// bitmap.add(1);
    ///
    /// assert_eq!(bitmap.cardinality(), 1);
    ///
    /// bitmap.add(2);
    ///
    /// assert_eq!(bitmap.cardinality(), 2);
    /// ```
    pub fn cardinality(&self) -> u64 {
        self.containers
            .iter()
            .map(|(_, container)| u64::from(container.len()))
            .sum()
    }

    /// Returns true if the Bitmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    ///
    /// assert!(bitmap.is_empty());
    ///
    /// bitmap.add(1);
    ///
    /// assert!(!bitmap.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// And computes the intersection between two bitmaps and returns the result
    /// as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::create();
    /// bitmap1.add(1);
    ///
    /// let mut bitmap2 = Bitmap::create();
    /// bitmap2.add(1);
    /// bitmap2.add(2);
    ///
    /// let bitmap3 = bitmap1.and(&bitmap2);
    ///
    /// assert!(bitmap3.contains(1));
    /// assert!(!bitmap3.contains(2));
    /// ```
    pub fn and(&self, other: &Self) -> Self {
        let mut containers = Vec::with_capacity(self.containers.len().min(other.containers.len()));
        let mut rhs = other.containers.iter().peekable();
        for (key, lhs) in &self.containers {
            while rhs.next_if(|&&(k, _)| k < *key).is_some() {}
            if let Some((_, other)) = rhs.next_if(|&&(k, _)| k == *key) {
                let result = container::and(lhs, other);
                if !result.is_empty() {
                    containers.push((*key, result));
                }
            }
        }
        Self { containers }
    }

    /// Computes the intersection between two bitmaps and stores the result
    /// in the current bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    /// let mut bitmap3 = Bitmap::of(&[15]);
    /// let bitmap4 = Bitmap::of(&[15, 25]);
    ///
    /// bitmap1.and_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 0);
    ///
    /// bitmap3.and_inplace(&bitmap4);
    ///
    /// assert_eq!(bitmap3.cardinality(), 1);
    /// ```
    pub fn and_inplace(&mut self, other: &Self) {
        let mut rhs = other.containers.iter().peekable();
        self.containers.retain_mut(|(key, lhs)| {
            while rhs.next_if(|&&(k, _)| k < *key).is_some() {}
            match rhs.next_if(|&&(k, _)| k == *key) {
                Some((_, other)) => {
                    lhs.and_inplace(other);
                    !lhs.is_empty()
                }
                None => false,
            }
        });
    }

    /// Or computes the union between two bitmaps and returns the result
    /// as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    ///
    /// let bitmap3 = bitmap1.or(&bitmap2);
    ///
    /// assert_eq!(bitmap3.cardinality(), 2);
    /// assert!(bitmap3.contains(15));
    /// assert!(bitmap3.contains(25));
    /// ```
    pub fn or(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.or_inplace(other);
        result
    }

    /// Computes the union between two bitmaps and stores the result in
    /// the current bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    /// bitmap1.or_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 2);
    /// assert!(bitmap1.contains(15));
    /// assert!(bitmap1.contains(25));
    /// ```
    pub fn or_inplace(&mut self, other: &Self) {
        self.merge_inplace(other, Container::or_inplace);
    }

    /// Computes the symmetric difference (xor) between two bitmaps
    /// and returns a new bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
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

    /// Inplace version of xor, stores result in the current bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    /// bitmap1.xor_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 2);
    /// assert!(bitmap1.contains(15));
    /// assert!(bitmap1.contains(35));
    /// ```
    pub fn xor_inplace(&mut self, other: &Self) {
        self.merge_inplace(other, Container::xor_inplace);
    }

    /// Merge-walks both key sequences, keeping containers present on either
    /// side and combining the ones present on both with `combine`
    fn merge_inplace(&mut self, other: &Self, combine: fn(&mut Container, &Container)) {
        let lhs = mem::take(&mut self.containers);
        let mut merged = Vec::with_capacity(lhs.len().max(other.containers.len()));
        let mut lhs = lhs.into_iter().peekable();
        let mut rhs = other.containers.iter().peekable();
        loop {
            let next_lhs = lhs.peek().map(|&(key, _)| key);
            let next_rhs = rhs.peek().map(|&&(key, _)| key);
            match (next_lhs, next_rhs) {
                (None, None) => break,
                (Some(_), None) => {
                    merged.extend(lhs);
                    break;
                }
                (None, Some(_)) => {
                    merged.extend(rhs.cloned());
                    break;
                }
                (Some(l), Some(r)) if l < r => merged.extend(lhs.next()),
                (Some(l), Some(r)) if l > r => merged.extend(rhs.next().cloned()),
                (Some(_), Some(_)) => {
                    if let (Some((key, mut container)), Some((_, other))) = (lhs.next(), rhs.next())
                    {
                        combine(&mut container, other);
                        if !container.is_empty() {
                            merged.push((key, container));
                        }
                    }
                }
            }
        }
        self.containers = merged;
    }

    /// Computes the difference between two bitmaps and returns the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = bitmap1.andnot(&bitmap2);
    ///
    /// assert_eq!(bitmap3.cardinality(), 1);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// assert!(!bitmap3.contains(35));
    /// ```
    pub fn andnot(&self, other: &Self) -> Self {
        let mut containers = Vec::with_capacity(self.containers.len());
        let mut rhs = other.containers.iter().peekable();
        for (key, lhs) in &self.containers {
            while rhs.next_if(|&&(k, _)| k < *key).is_some() {}
            match rhs.next_if(|&&(k, _)| k == *key) {
                Some((_, other)) => {
                    let result = container::andnot(lhs, other);
                    if !result.is_empty() {
                        containers.push((*key, result));
                    }
                }
                None => containers.push((*key, lhs.clone())),
            }
        }
        Self { containers }
    }

    /// Computes the difference between two bitmaps and stores the result
    /// in the current bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    /// bitmap1.andnot_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 1);
    /// assert!(bitmap1.contains(15));
    /// assert!(!bitmap1.contains(25));
    /// assert!(!bitmap1.contains(35));
    /// ```
    pub fn andnot_inplace(&mut self, other: &Self) {
        let mut rhs = other.containers.iter().peekable();
        self.containers.retain_mut(|(key, lhs)| {
            while rhs.next_if(|&&(k, _)| k < *key).is_some() {}
            match rhs.next_if(|&&(k, _)| k == *key) {
                Some((_, other)) => {
                    lhs.andnot_inplace(other);
                    !lhs.is_empty()
                }
                None => true,
            }
        });
    }

    /// Computes the intersection of many bitmaps, left to right
    ///
    /// An empty slice yields an empty bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap::of(&[2, 3, 4]);
    /// let bitmap3 = Bitmap::of(&[3, 4, 5]);
    ///
    /// let bitmap4 = Bitmap::fast_and(&[&bitmap1, &bitmap2, &bitmap3]);
    ///
    /// assert_eq!(bitmap4.to_vec(), [3]);
    /// assert!(Bitmap::fast_and(&[]).is_empty());
    /// ```
    pub fn fast_and(bitmaps: &[&Bitmap]) -> Self {
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
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    /// let bitmap3 = Bitmap::of(&[35]);
    ///
    /// let bitmap4 = Bitmap::fast_or(&[&bitmap1, &bitmap2, &bitmap3]);
    ///
    /// assert_eq!(bitmap4.cardinality(), 3);
    /// assert!(bitmap4.contains(15));
    /// assert!(bitmap4.contains(25));
    /// assert!(bitmap4.contains(25));
    /// ```
    pub fn fast_or(bitmaps: &[&Bitmap]) -> Self {
        let mut result = Self::new();
        for bitmap in bitmaps {
            result.or_inplace(bitmap);
        }
        result
    }

    /// Computes the symmetric difference (xor) between multiple bitmaps
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = Bitmap::fast_xor(&[&bitmap1, &bitmap2]);
    ///
    /// assert_eq!(bitmap3.cardinality(), 2);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// assert!(bitmap3.contains(35));
    /// ```
    pub fn fast_xor(bitmaps: &[&Bitmap]) -> Self {
        let mut result = Self::new();
        for bitmap in bitmaps {
            result.xor_inplace(bitmap);
        }
        result
    }

    /// Computes the intersection between two bitmaps and returns the result's
    /// cardinality, without building the intersection
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap::of(&[2, 3, 4]);
    ///
    /// assert_eq!(bitmap1.and_cardinality(&bitmap2), 2);
    /// ```
    pub fn and_cardinality(&self, other: &Self) -> u64 {
        let mut count = 0;
        let mut rhs = other.containers.iter().peekable();
        for (key, lhs) in &self.containers {
            while rhs.next_if(|&&(k, _)| k < *key).is_some() {}
            if let Some((_, other)) = rhs.next_if(|&&(k, _)| k == *key) {
                count += container::and_cardinality(lhs, other);
            }
        }
        count
    }

    /// Computes the union between two bitmaps and returns the cardinality of
    /// the result
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap::of(&[2, 3, 4]);
    ///
    /// assert_eq!(bitmap1.or_cardinality(&bitmap2), 4);
    /// ```
    pub fn or_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() + other.cardinality() - self.and_cardinality(other)
    }

    /// Computes the symmetric difference between two bitmaps and returns the
    /// cardinality of the result
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap::of(&[2, 3, 4]);
    ///
    /// assert_eq!(bitmap1.xor_cardinality(&bitmap2), 2);
    /// ```
    pub fn xor_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() + other.cardinality() - 2 * self.and_cardinality(other)
    }

    /// Computes the difference between two bitmaps and returns the
    /// cardinality of the result
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap::of(&[2, 3, 4]);
    ///
    /// assert_eq!(bitmap1.andnot_cardinality(&bitmap2), 1);
    /// ```
    pub fn andnot_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() - self.and_cardinality(other)
    }

    /// Returns a vector containing all of the integers stored in the Bitmap
    /// in sorted order.
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap = Bitmap::of(&[25, 15]);
    ///
    /// assert_eq!(bitmap.to_vec(), [15, 25]);
    /// ```
    pub fn to_vec(&self) -> Vec<u32> {
        let mut values = Vec::with_capacity(self.cardinality() as usize);
        values.extend(self.iter());
        values
    }

    /// Returns the smallest value in the set.
    ///
    /// Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap: Bitmap = (5..10).collect();
    /// let empty_bitmap: Bitmap = Bitmap::create();
    ///
    /// assert_eq!(bitmap.minimum(), Some(5));
    /// assert_eq!(empty_bitmap.minimum(), None);
    /// ```
    pub fn minimum(&self) -> Option<u32> {
        let (key, container) = self.containers.first()?;
        container.min().map(|low| join(*key, low))
    }

    /// Returns the greatest value in the set.
    ///
    /// Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap: Bitmap = (5..10).collect();
    /// let empty_bitmap: Bitmap = Bitmap::create();
    ///
    /// assert_eq!(bitmap.maximum(), Some(9));
    /// assert_eq!(empty_bitmap.maximum(), None);
    /// ```
    pub fn maximum(&self) -> Option<u32> {
        let (key, container) = self.containers.last()?;
        container.max().map(|low| join(*key, low))
    }

    /// Rank returns the number of values smaller or equal to x.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap: Bitmap = (5..10).collect();
    ///
    /// assert_eq!(bitmap.rank(8), 4);
    /// assert_eq!(bitmap.rank(11), 5);
    /// ```
    pub fn rank(&self, x: u32) -> u64 {
        let (key, low) = split(x);
        let mut rank = 0;
        for (k, container) in &self.containers {
            if *k < key {
                rank += u64::from(container.len());
            } else {
                if *k == key {
                    rank += u64::from(container.rank(low));
                }
                break;
            }
        }
        rank
    }

    /// Converts containers to run containers wherever that is the smallest
    /// representation. Returns true if the result has at least one run
    /// container.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::{Bitmap, Portable};
    ///
    /// let mut bitmap: Bitmap = (100..1000).collect();
    ///
    /// assert_eq!(bitmap.cardinality(), 900);
    /// let old_size = bitmap.get_serialized_size_in_bytes::<Portable>();
    /// assert!(bitmap.run_optimize());
    /// let new_size = bitmap.get_serialized_size_in_bytes::<Portable>();
    /// assert!(new_size < old_size);
    /// ```
    pub fn run_optimize(&mut self) -> bool {
        let mut has_runs = false;
        for (_, container) in &mut self.containers {
            has_runs |= container.run_optimize();
        }
        has_runs
    }

    /// Removes run-length encoding even when it is more space efficient. Returns
    /// true if a change was applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (100..1000).collect();
    ///
    /// assert_eq!(bitmap.cardinality(), 900);
    ///
    /// bitmap.run_optimize();
    ///
    /// assert!(bitmap.remove_run_compression());
    /// assert!(!bitmap.remove_run_compression());
    /// ```
    pub fn remove_run_compression(&mut self) -> bool {
        let mut changed = false;
        for (_, container) in &mut self.containers {
            changed |= container.remove_run_compression();
        }
        changed
    }

    /// Returns statistics about the composition of a roaring bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (1..100).collect();
    /// let statistics = bitmap.statistics();
    ///
    /// assert_eq!(statistics.n_containers, 1);
    /// assert_eq!(statistics.n_array_containers, 1);
    /// assert_eq!(statistics.n_run_containers, 0);
    /// assert_eq!(statistics.n_bitset_containers, 0);
    /// assert_eq!(statistics.n_values_array_containers, 99);
    /// assert_eq!(statistics.n_bytes_array_containers, 198);
    /// assert_eq!(statistics.max_value, 99);
    /// assert_eq!(statistics.min_value, 1);
    /// assert_eq!(statistics.cardinality, 99);
    ///
    /// bitmap.run_optimize();
    /// let statistics = bitmap.statistics();
    ///
    /// assert_eq!(statistics.n_containers, 1);
    /// assert_eq!(statistics.n_array_containers, 0);
    /// assert_eq!(statistics.n_run_containers, 1);
    /// assert_eq!(statistics.n_values_run_containers, 99);
    /// assert_eq!(statistics.n_bytes_run_containers, 4);
    /// assert_eq!(statistics.cardinality, 99);
    /// ```
    pub fn statistics(&self) -> Statistics {
        let mut statistics = Statistics {
            min_value: self.minimum().unwrap_or(0),
            max_value: self.maximum().unwrap_or(0),
            ..Statistics::default()
        };
        for (_, container) in &self.containers {
            let values = u64::from(container.len());
            let bytes = container.serialized_size() as u32;
            statistics.n_containers += 1;
            statistics.cardinality += values;
            match container.container_type() {
                ContainerType::Array => {
                    statistics.n_array_containers += 1;
                    statistics.n_values_array_containers += values;
                    statistics.n_bytes_array_containers += bytes;
                }
                ContainerType::Bitmap => {
                    statistics.n_bitset_containers += 1;
                    statistics.n_values_bitset_containers += values;
                    statistics.n_bytes_bitset_containers += bytes;
                }
                ContainerType::Run => {
                    statistics.n_run_containers += 1;
                    statistics.n_values_run_containers += values;
                    statistics.n_bytes_run_containers += bytes;
                }
            }
        }
        statistics
    }

    /// Computes the serialized size in bytes of the Bitmap in format `S`.
    #[inline]
    pub fn get_serialized_size_in_bytes<S: Serializer>(&self) -> usize {
        S::get_serialized_size_in_bytes(self)
    }

    /// Serializes a bitmap to a new vector of bytes in format `S`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::{Bitmap, Portable};
    ///
    /// let original_bitmap: Bitmap = (1..5).collect();
    ///
    /// let serialized_buffer = original_bitmap.serialize::<Portable>();
    ///
    /// let deserialized_bitmap = Bitmap::deserialize::<Portable>(&serialized_buffer);
    ///
    /// assert_eq!(original_bitmap, deserialized_bitmap);
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

    /// Serializes a bitmap to the end of `dst` in format `S`
    ///
    /// Exactly [`Bitmap::get_serialized_size_in_bytes`] bytes are reserved
    /// up front; the returned slice is the newly written part of `dst`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::{Bitmap, Native, Portable};
    ///
    /// let original_bitmap_1: Bitmap = (1..5).collect();
    /// let original_bitmap_2: Bitmap = (1..10).collect();
    ///
    /// let mut data = Vec::new();
    /// for bitmap in [original_bitmap_1, original_bitmap_2] {
    ///     data.clear();
    ///     let written = bitmap.serialize_into::<Portable>(&mut data).unwrap();
    ///     assert_eq!(written.len(), bitmap.get_serialized_size_in_bytes::<Portable>());
    ///     assert_eq!(Bitmap::try_deserialize::<Portable>(&data).unwrap(), bitmap);
    /// }
    ///
    /// let bitmap = Bitmap::of(&[7, 700_000]);
    /// let native = bitmap.serialize::<Native>();
    /// assert!(native.len() < bitmap.get_serialized_size_in_bytes::<Portable>());
    /// assert_eq!(Bitmap::try_deserialize::<Native>(&native).unwrap(), bitmap);
    /// ```
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
    /// Every length and count in the buffer is validated before it is used;
    /// malformed input of any kind is reported as a [`DecodeError`].
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::{Bitmap, Portable};
    ///
    /// let original_bitmap: Bitmap = (1..5).collect();
    /// let serialized_buffer = original_bitmap.serialize::<Portable>();
    ///
    /// let deserialized_bitmap = Bitmap::try_deserialize::<Portable>(&serialized_buffer);
    /// assert_eq!(original_bitmap, deserialized_bitmap.unwrap());
    ///
    /// let invalid_buffer: Vec<u8> = vec![3];
    /// let deserialized_bitmap = Bitmap::try_deserialize::<Portable>(&invalid_buffer);
    /// assert!(deserialized_bitmap.is_err());
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
fn range_to_inclusive<R: RangeBounds<u32>>(range: R) -> Option<(u32, u32)> {
    let start = match range.start_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_add(1)?,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_sub(1)?,
        Bound::Unbounded => u32::MAX,
    };
    (start <= end).then_some((start, end))
}

/// Splits an inclusive 32-bit range into per-chunk 16-bit intervals
fn chunk_intervals(start: u32, end: u32) -> impl Iterator<Item = (u16, Interval)> {
    let (start_key, start_low) = split(start);
    let (end_key, end_low) = split(end);
    (start_key..=end_key).map(move |key| {
        let low = if key == start_key { start_low } else { 0 };
        let high = if key == end_key { end_low } else { u16::MAX };
        (key, Interval::new(low, high))
    })
}

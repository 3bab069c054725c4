//! Per-chunk storage for the low 16 bits of bitmap members
//!
//! A chunk is held in whichever of three representations is smallest: a sorted
//! array for sparse chunks, a 65536-bit vector for dense ones, and a list of
//! intervals when the members are mostly contiguous.

mod array;
mod bitmap;
mod ops;
mod run;

pub(crate) use self::array::ArrayStore;
pub(crate) use self::bitmap::BitmapStore;
pub(crate) use self::ops::{and, and_cardinality, andnot, or};
pub(crate) use self::run::{Interval, RunStore};

use self::bitmap::BitmapStoreIter;
use self::run::RunIter;

/// Largest number of values an array container holds before it becomes a bitmap
pub const ARRAY_MAX_CARDINALITY: usize = 4096;

/// Number of 64-bit words in a bitmap container
pub const BITMAP_WORDS: usize = 1024;

/// Serialized size of a bitmap container payload
pub(crate) const BITMAP_BYTES: usize = BITMAP_WORDS * 8;

/// The representation a container currently uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerType {
    Array,
    Bitmap,
    Run,
}

#[derive(Clone)]
pub(crate) enum Container {
    Array(ArrayStore),
    Bitmap(BitmapStore),
    Run(RunStore),
}

impl Default for Container {
    fn default() -> Self {
        Container::Array(ArrayStore::new())
    }
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Container for the sorted values, as an array or a bitmap by density
    pub fn from_sorted_values(values: Vec<u16>) -> Self {
        let array = ArrayStore::from_sorted(values);
        if array.len() as usize > ARRAY_MAX_CARDINALITY {
            Container::Bitmap(BitmapStore::from_array(&array))
        } else {
            Container::Array(array)
        }
    }

    /// Container for the bitmap, demoted to an array when sparse enough
    pub fn from_bitmap_store(store: BitmapStore) -> Self {
        if store.len() as usize <= ARRAY_MAX_CARDINALITY {
            Container::Array(store.to_array())
        } else {
            Container::Bitmap(store)
        }
    }

    pub fn container_type(&self) -> ContainerType {
        match self {
            Container::Array(_) => ContainerType::Array,
            Container::Bitmap(_) => ContainerType::Bitmap,
            Container::Run(_) => ContainerType::Run,
        }
    }

    pub fn len(&self) -> u32 {
        match self {
            Container::Array(store) => store.len(),
            Container::Bitmap(store) => store.len(),
            Container::Run(store) => store.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Container::Array(store) => store.is_empty(),
            Container::Bitmap(store) => store.is_empty(),
            Container::Run(store) => store.is_empty(),
        }
    }

    pub fn contains(&self, value: u16) -> bool {
        match self {
            Container::Array(store) => store.contains(value),
            Container::Bitmap(store) => store.contains(value),
            Container::Run(store) => store.contains(value),
        }
    }

    /// Adds `value`, returning whether it was absent
    pub fn insert(&mut self, value: u16) -> bool {
        match self {
            Container::Array(store) if store.is_full() && !store.contains(value) => {
                let mut bitmap = BitmapStore::from_array(store);
                bitmap.insert(value);
                *self = Container::Bitmap(bitmap);
                true
            }
            Container::Array(store) => store.insert(value),
            Container::Bitmap(store) => store.insert(value),
            Container::Run(store) => {
                let inserted = store.insert(value);
                if inserted {
                    self.shrink_runs();
                }
                inserted
            }
        }
    }

    /// Removes `value`, returning whether it was present
    pub fn remove(&mut self, value: u16) -> bool {
        match self {
            Container::Array(store) => store.remove(value),
            Container::Bitmap(store) => {
                let removed = store.remove(value);
                if removed && store.len() as usize <= ARRAY_MAX_CARDINALITY {
                    *self = Container::Array(store.to_array());
                }
                removed
            }
            Container::Run(store) => {
                let removed = store.remove(value);
                if removed {
                    self.shrink_runs();
                }
                removed
            }
        }
    }

    /// Adds every value of the inclusive range, returning how many were absent
    pub fn insert_range(&mut self, interval: Interval) -> u32 {
        let before = self.len();
        let range = Container::Run(RunStore::from_intervals(vec![interval]));
        *self = or(self, &range);
        self.len() - before
    }

    /// Removes every value of the inclusive range, returning how many were present
    pub fn remove_range(&mut self, interval: Interval) -> u32 {
        let before = self.len();
        let range = Container::Run(RunStore::from_intervals(vec![interval]));
        *self = andnot(self, &range);
        before - self.len()
    }

    pub fn min(&self) -> Option<u16> {
        match self {
            Container::Array(store) => store.min(),
            Container::Bitmap(store) => store.min(),
            Container::Run(store) => store.min(),
        }
    }

    pub fn max(&self) -> Option<u16> {
        match self {
            Container::Array(store) => store.max(),
            Container::Bitmap(store) => store.max(),
            Container::Run(store) => store.max(),
        }
    }

    /// Number of members smaller or equal to `value`
    pub fn rank(&self, value: u16) -> u32 {
        match self {
            Container::Array(store) => store.rank(value),
            Container::Bitmap(store) => store.rank(value),
            Container::Run(store) => store.rank(value),
        }
    }

    pub fn num_runs(&self) -> usize {
        match self {
            Container::Array(store) => store.num_runs(),
            Container::Bitmap(store) => store.num_runs(),
            Container::Run(store) => store.num_runs(),
        }
    }

    /// Size in bytes of this container's serialized payload
    pub fn serialized_size(&self) -> usize {
        match self {
            Container::Array(store) => store.serialized_size(),
            Container::Bitmap(_) => BITMAP_BYTES,
            Container::Run(store) => store.serialized_size(),
        }
    }

    /// Payload size of the smaller of the array and bitmap representations
    fn non_run_size(cardinality: u32) -> usize {
        if cardinality as usize <= ARRAY_MAX_CARDINALITY {
            cardinality as usize * 2
        } else {
            BITMAP_BYTES
        }
    }

    /// Converts to whichever representation has the smallest payload
    ///
    /// Runs are only chosen when strictly smaller than the alternative.
    pub fn into_efficient(self) -> Self {
        let run_size = self.num_runs() * 4;
        let cardinality = self.len();
        let keep_runs = run_size < Self::non_run_size(cardinality);
        match self {
            Container::Run(store) if keep_runs => Container::Run(store),
            Container::Run(store) if cardinality as usize <= ARRAY_MAX_CARDINALITY => {
                Container::Array(store.to_array())
            }
            Container::Run(store) => Container::Bitmap(BitmapStore::from_runs(&store)),
            Container::Array(store) if keep_runs => Container::Run(RunStore::from_array(&store)),
            Container::Array(store) if store.len() as usize > ARRAY_MAX_CARDINALITY => {
                Container::Bitmap(BitmapStore::from_array(&store))
            }
            Container::Array(store) => Container::Array(store),
            Container::Bitmap(store) if keep_runs => Container::Run(store.to_runs()),
            Container::Bitmap(store) => Container::from_bitmap_store(store),
        }
    }

    /// Re-evaluates a run container whose interval count just changed
    fn shrink_runs(&mut self) {
        if let Container::Run(store) = self {
            if store.serialized_size() >= Self::non_run_size(store.len()) {
                *self = std::mem::take(self).into_efficient();
            }
        }
    }

    /// Switches to the run representation when it is the smallest; returns
    /// whether the container ends up as runs
    pub fn run_optimize(&mut self) -> bool {
        *self = std::mem::take(self).into_efficient();
        matches!(self, Container::Run(_))
    }

    /// Converts a run container to an array or bitmap; returns whether it changed
    pub fn remove_run_compression(&mut self) -> bool {
        match self {
            Container::Run(store) => {
                *self = if store.len() as usize <= ARRAY_MAX_CARDINALITY {
                    Container::Array(store.to_array())
                } else {
                    Container::Bitmap(BitmapStore::from_runs(store))
                };
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        match self {
            Container::Array(store) => Iter::Array(store.as_slice().iter()),
            Container::Bitmap(store) => Iter::Bitmap(store.iter()),
            Container::Run(store) => Iter::Run(store.iter()),
        }
    }
}

/// Ascending iterator over a container's values
#[derive(Clone)]
pub(crate) enum Iter<'a> {
    Array(std::slice::Iter<'a, u16>),
    Bitmap(BitmapStoreIter<'a>),
    Run(RunIter<'a>),
}

impl Iterator for Iter<'_> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match self {
            Iter::Array(inner) => inner.next().copied(),
            Iter::Bitmap(inner) => inner.next(),
            Iter::Run(inner) => inner.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_promotes_past_threshold() {
        let mut container = Container::new();
        for v in 0..ARRAY_MAX_CARDINALITY as u16 {
            container.insert(v * 2);
        }
        assert_eq!(container.container_type(), ContainerType::Array);
        assert!(container.insert(1));
        assert_eq!(container.container_type(), ContainerType::Bitmap);
        assert_eq!(container.len() as usize, ARRAY_MAX_CARDINALITY + 1);
        assert!(container.remove(1));
        assert_eq!(container.container_type(), ContainerType::Array);
    }

    #[test]
    fn duplicate_insert_does_not_promote() {
        let mut container = Container::from_sorted_values((0..4096).collect());
        assert!(!container.insert(0));
        assert_eq!(container.container_type(), ContainerType::Array);
    }

    #[test]
    fn range_insert_produces_runs() {
        let mut container = Container::new();
        assert_eq!(container.insert_range(Interval::new(100, 999)), 900);
        assert_eq!(container.container_type(), ContainerType::Run);
        assert_eq!(container.insert_range(Interval::new(900, 1000)), 1);
        assert_eq!(container.remove_range(Interval::new(0, 99)), 0);
        assert_eq!(container.remove_range(Interval::new(100, 1000)), 901);
        assert!(container.is_empty());
    }

    #[test]
    fn fragmented_runs_fall_back() {
        let mut container = Container::Run(RunStore::from_intervals(vec![Interval::new(0, 9)]));
        for v in (20..2000).step_by(2) {
            container.insert(v);
        }
        assert_eq!(container.container_type(), ContainerType::Array);
        assert_eq!(container.len(), 10 + 990);
    }

    #[test]
    fn optimize_round_trip() {
        let mut container = Container::from_sorted_values((0..5000).collect());
        assert_eq!(container.container_type(), ContainerType::Bitmap);
        assert!(container.run_optimize());
        assert_eq!(container.container_type(), ContainerType::Run);
        assert!(container.remove_run_compression());
        assert_eq!(container.container_type(), ContainerType::Bitmap);
        assert!(!container.remove_run_compression());
        assert_eq!(container.rank(4999), 5000);
        assert_eq!((container.min(), container.max()), (Some(0), Some(4999)));
    }
}

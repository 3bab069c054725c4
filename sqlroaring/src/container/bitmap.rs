use super::array::ArrayStore;
use super::run::{Interval, RunStore};
use super::BITMAP_WORDS;

/// Dense 65536-bit vector with a cached population count
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct BitmapStore {
    len: u32,
    words: Box<[u64; BITMAP_WORDS]>,
}

#[inline]
fn key(value: u16) -> usize {
    usize::from(value) / 64
}

#[inline]
fn bit(value: u16) -> u64 {
    1 << (value % 64)
}

/// Calls `f(word_index, mask)` for every word touched by the inclusive range
fn for_each_word(start: u16, end: u16, mut f: impl FnMut(usize, u64)) {
    debug_assert!(start <= end);
    let (first, last) = (key(start), key(end));
    let first_mask = !0u64 << (start % 64);
    let last_mask = !0u64 >> (63 - end % 64);
    if first == last {
        f(first, first_mask & last_mask);
        return;
    }
    f(first, first_mask);
    for index in first + 1..last {
        f(index, !0);
    }
    f(last, last_mask);
}

impl BitmapStore {
    pub fn new() -> Self {
        Self {
            len: 0,
            words: Box::new([0; BITMAP_WORDS]),
        }
    }

    /// Builds a store from raw words, computing the population count
    pub fn from_words(words: Box<[u64; BITMAP_WORDS]>) -> Self {
        let len = words.iter().map(|w| w.count_ones()).sum();
        Self { len, words }
    }

    pub fn from_array(array: &ArrayStore) -> Self {
        let mut store = Self::new();
        for &value in array.as_slice() {
            store.words[key(value)] |= bit(value);
        }
        store.len = array.len();
        store
    }

    pub fn from_runs(runs: &RunStore) -> Self {
        let mut store = Self::new();
        store.insert_runs(runs);
        store
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn words(&self) -> &[u64; BITMAP_WORDS] {
        &self.words
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        self.words[key(value)] & bit(value) != 0
    }

    pub fn insert(&mut self, value: u16) -> bool {
        let word = &mut self.words[key(value)];
        let before = *word;
        *word |= bit(value);
        let added = before != *word;
        self.len += u32::from(added);
        added
    }

    pub fn remove(&mut self, value: u16) -> bool {
        let word = &mut self.words[key(value)];
        let before = *word;
        *word &= !bit(value);
        let removed = before != *word;
        self.len -= u32::from(removed);
        removed
    }

    pub fn flip(&mut self, value: u16) {
        let word = &mut self.words[key(value)];
        *word ^= bit(value);
        if *word & bit(value) != 0 {
            self.len += 1;
        } else {
            self.len -= 1;
        }
    }

    pub fn insert_range(&mut self, interval: Interval) {
        let words = &mut self.words;
        let mut added = 0;
        for_each_word(interval.start, interval.end, |index, mask| {
            added += (mask & !words[index]).count_ones();
            words[index] |= mask;
        });
        self.len += added;
    }

    pub fn insert_runs(&mut self, runs: &RunStore) {
        for &interval in runs.intervals() {
            self.insert_range(interval);
        }
    }

    pub fn remove_runs(&mut self, runs: &RunStore) {
        let words = &mut self.words;
        let mut removed = 0;
        for interval in runs.intervals() {
            for_each_word(interval.start, interval.end, |index, mask| {
                removed += (mask & words[index]).count_ones();
                words[index] &= !mask;
            });
        }
        self.len -= removed;
    }

    pub fn flip_runs(&mut self, runs: &RunStore) {
        for interval in runs.intervals() {
            for_each_word(interval.start, interval.end, |index, mask| {
                self.words[index] ^= mask;
            });
        }
        self.recount();
    }

    /// Keeps only the bits covered by `runs`
    pub fn retain_runs(&mut self, runs: &RunStore) {
        let mut kept = Self::new();
        for interval in runs.intervals() {
            for_each_word(interval.start, interval.end, |index, mask| {
                kept.words[index] |= self.words[index] & mask;
            });
        }
        kept.recount();
        *self = kept;
    }

    /// Number of set bits inside the inclusive range
    pub fn range_len(&self, interval: Interval) -> u64 {
        let mut count = 0;
        for_each_word(interval.start, interval.end, |index, mask| {
            count += u64::from((self.words[index] & mask).count_ones());
        });
        count
    }

    pub fn min(&self) -> Option<u16> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, &w)| w != 0)
            .map(|(index, w)| (index * 64 + w.trailing_zeros() as usize) as u16)
    }

    pub fn max(&self) -> Option<u16> {
        self.words
            .iter()
            .enumerate()
            .rev()
            .find(|(_, &w)| w != 0)
            .map(|(index, w)| (index * 64 + 63 - w.leading_zeros() as usize) as u16)
    }

    /// Number of values smaller or equal to `value`
    pub fn rank(&self, value: u16) -> u32 {
        let index = key(value);
        let below: u32 = self.words[..index].iter().map(|w| w.count_ones()).sum();
        let mask = !0u64 >> (63 - value % 64);
        below + (self.words[index] & mask).count_ones()
    }

    /// Number of maximal runs of set bits
    pub fn num_runs(&self) -> usize {
        let mut runs = 0;
        for (index, &word) in self.words.iter().enumerate() {
            let carry = match index {
                0 => 0,
                _ => self.words[index - 1] >> 63,
            };
            // bits that start a run: set here, clear in the previous position
            let starts = word & !((word << 1) | carry);
            runs += starts.count_ones() as usize;
        }
        runs
    }

    pub fn to_array(&self) -> ArrayStore {
        let mut values = Vec::with_capacity(self.len as usize);
        values.extend(self.iter());
        ArrayStore::from_sorted(values)
    }

    pub fn to_runs(&self) -> RunStore {
        let mut intervals: Vec<Interval> = Vec::with_capacity(self.num_runs());
        for value in self.iter() {
            match intervals.last_mut() {
                Some(last) if u32::from(last.end) + 1 == u32::from(value) => last.end = value,
                _ => intervals.push(Interval::new(value, value)),
            }
        }
        RunStore::from_intervals(intervals)
    }

    pub fn and_inplace(&mut self, other: &Self) {
        self.zip_words(other, |a, b| a & b);
    }

    pub fn or_inplace(&mut self, other: &Self) {
        self.zip_words(other, |a, b| a | b);
    }

    pub fn xor_inplace(&mut self, other: &Self) {
        self.zip_words(other, |a, b| a ^ b);
    }

    pub fn andnot_inplace(&mut self, other: &Self) {
        self.zip_words(other, |a, b| a & !b);
    }

    pub fn intersection_len(&self, other: &Self) -> u64 {
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| u64::from((a & b).count_ones()))
            .sum()
    }

    fn zip_words(&mut self, other: &Self, op: impl Fn(u64, u64) -> u64) {
        let mut len = 0;
        for (a, &b) in self.words.iter_mut().zip(other.words.iter()) {
            *a = op(*a, b);
            len += a.count_ones();
        }
        self.len = len;
    }

    fn recount(&mut self) {
        self.len = self.words.iter().map(|w| w.count_ones()).sum();
    }

    pub fn iter(&self) -> BitmapStoreIter<'_> {
        BitmapStoreIter {
            words: &self.words[..],
            index: 0,
            current: self.words[0],
        }
    }
}

/// Ascending iterator over the set bits of a [`BitmapStore`]
#[derive(Clone)]
pub(crate) struct BitmapStoreIter<'a> {
    words: &'a [u64],
    index: usize,
    current: u64,
}

impl Iterator for BitmapStoreIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        while self.current == 0 {
            self.index += 1;
            self.current = *self.words.get(self.index)?;
        }
        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some((self.index * 64 + bit) as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_remove_track_len() {
        let mut store = BitmapStore::new();
        assert!(store.insert(0));
        assert!(store.insert(65535));
        assert!(!store.insert(65535));
        assert_eq!(store.len(), 2);
        assert_eq!(store.min(), Some(0));
        assert_eq!(store.max(), Some(65535));
        assert!(store.remove(0));
        assert!(!store.remove(0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ranges_span_word_boundaries() {
        let mut store = BitmapStore::new();
        store.insert_range(Interval::new(60, 200));
        assert_eq!(store.len(), 141);
        assert_eq!(store.range_len(Interval::new(0, 63)), 4);
        assert_eq!(store.num_runs(), 1);
        assert_eq!(store.rank(64), 5);

        store.insert_range(Interval::new(65000, 65535));
        assert_eq!(store.num_runs(), 2);
        assert_eq!(
            store.to_runs().intervals(),
            &[Interval::new(60, 200), Interval::new(65000, 65535)]
        );
    }

    #[test]
    fn iteration_is_ascending() {
        let mut store = BitmapStore::new();
        for v in [65535, 3, 64, 63, 1000] {
            store.insert(v);
        }
        assert_eq!(store.iter().collect::<Vec<_>>(), vec![3, 63, 64, 1000, 65535]);
    }
}

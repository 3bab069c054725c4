use std::cmp::Ordering;

use super::array::ArrayStore;

/// Inclusive range of 16-bit values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Interval {
    pub start: u16,
    pub end: u16,
}

impl Interval {
    #[inline]
    pub fn new(start: u16, end: u16) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        u32::from(self.end) - u32::from(self.start) + 1
    }

    #[inline]
    fn contains(&self, value: u16) -> bool {
        self.start <= value && value <= self.end
    }
}

/// Ascending list of non-overlapping, non-adjacent intervals
#[derive(Clone, Default, PartialEq, Eq)]
pub(crate) struct RunStore {
    intervals: Vec<Interval>,
}

/// Appends `interval` to a sorted interval list, coalescing with the tail when
/// they overlap or touch
fn push_coalesced(intervals: &mut Vec<Interval>, interval: Interval) {
    match intervals.last_mut() {
        Some(last) if u32::from(interval.start) <= u32::from(last.end) + 1 => {
            last.end = last.end.max(interval.end);
        }
        _ => intervals.push(interval),
    }
}

impl RunStore {
    pub fn full() -> Self {
        Self::from_intervals(vec![Interval::new(0, u16::MAX)])
    }

    pub fn from_intervals(intervals: Vec<Interval>) -> Self {
        debug_assert!(intervals
            .windows(2)
            .all(|w| u32::from(w[0].end) + 1 < u32::from(w[1].start)));
        Self { intervals }
    }

    pub fn from_array(array: &ArrayStore) -> Self {
        let mut intervals = Vec::with_capacity(array.num_runs());
        for &value in array.as_slice() {
            push_coalesced(&mut intervals, Interval::new(value, value));
        }
        Self { intervals }
    }

    #[inline]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    #[inline]
    pub fn num_runs(&self) -> usize {
        self.intervals.len()
    }

    pub fn len(&self) -> u32 {
        self.intervals.iter().map(Interval::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.intervals == [Interval::new(0, u16::MAX)]
    }

    /// Index of the interval holding `value`, or where one would be inserted
    fn find(&self, value: u16) -> Result<usize, usize> {
        self.intervals.binary_search_by(|interval| {
            if interval.end < value {
                Ordering::Less
            } else if interval.start > value {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
    }

    pub fn contains(&self, value: u16) -> bool {
        self.find(value).is_ok()
    }

    pub fn insert(&mut self, value: u16) -> bool {
        let pos = match self.find(value) {
            Ok(_) => return false,
            Err(pos) => pos,
        };
        let value32 = u32::from(value);
        let joins_prev = pos > 0 && u32::from(self.intervals[pos - 1].end) + 1 == value32;
        let joins_next =
            pos < self.intervals.len() && u32::from(self.intervals[pos].start) == value32 + 1;
        match (joins_prev, joins_next) {
            (true, true) => {
                self.intervals[pos - 1].end = self.intervals[pos].end;
                self.intervals.remove(pos);
            }
            (true, false) => self.intervals[pos - 1].end = value,
            (false, true) => self.intervals[pos].start = value,
            (false, false) => self.intervals.insert(pos, Interval::new(value, value)),
        }
        true
    }

    pub fn remove(&mut self, value: u16) -> bool {
        let pos = match self.find(value) {
            Ok(pos) => pos,
            Err(_) => return false,
        };
        let Interval { start, end } = self.intervals[pos];
        if start == end {
            self.intervals.remove(pos);
        } else if value == start {
            self.intervals[pos].start = value + 1;
        } else if value == end {
            self.intervals[pos].end = value - 1;
        } else {
            self.intervals[pos].end = value - 1;
            self.intervals
                .insert(pos + 1, Interval::new(value + 1, end));
        }
        true
    }

    pub fn min(&self) -> Option<u16> {
        self.intervals.first().map(|i| i.start)
    }

    pub fn max(&self) -> Option<u16> {
        self.intervals.last().map(|i| i.end)
    }

    /// Number of values smaller or equal to `value`
    pub fn rank(&self, value: u16) -> u32 {
        let mut rank = 0;
        for interval in &self.intervals {
            if interval.end <= value {
                rank += interval.len();
            } else {
                if interval.start <= value {
                    rank += u32::from(value - interval.start) + 1;
                }
                break;
            }
        }
        rank
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut intervals = Vec::with_capacity(self.intervals.len() + other.intervals.len());
        let (a, b) = (&self.intervals, &other.intervals);
        let (mut i, mut j) = (0, 0);
        while i < a.len() || j < b.len() {
            let next = if j == b.len() || (i < a.len() && a[i].start <= b[j].start) {
                i += 1;
                a[i - 1]
            } else {
                j += 1;
                b[j - 1]
            };
            push_coalesced(&mut intervals, next);
        }
        Self { intervals }
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut intervals = Vec::new();
        self.for_each_overlap(other, |overlap| intervals.push(overlap));
        Self { intervals }
    }

    pub fn intersection_len(&self, other: &Self) -> u64 {
        let mut count = 0;
        self.for_each_overlap(other, |overlap| count += u64::from(overlap.len()));
        count
    }

    fn for_each_overlap(&self, other: &Self, mut f: impl FnMut(Interval)) {
        let (a, b) = (&self.intervals, &other.intervals);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let start = a[i].start.max(b[j].start);
            let end = a[i].end.min(b[j].end);
            if start <= end {
                f(Interval::new(start, end));
            }
            if a[i].end < b[j].end {
                i += 1;
            } else {
                j += 1;
            }
        }
    }

    pub fn difference(&self, other: &Self) -> Self {
        let mut intervals = Vec::with_capacity(self.intervals.len());
        let b = &other.intervals;
        let mut j = 0;
        for &interval in &self.intervals {
            // `start` is the first value of `interval` not yet emitted or removed
            let mut start = u32::from(interval.start);
            let end = u32::from(interval.end);
            while j < b.len() && u32::from(b[j].end) < start {
                j += 1;
            }
            let mut k = j;
            while start <= end && k < b.len() && u32::from(b[k].start) <= end {
                let (cut_start, cut_end) = (u32::from(b[k].start), u32::from(b[k].end));
                if cut_start > start {
                    intervals.push(Interval::new(start as u16, (cut_start - 1) as u16));
                }
                start = start.max(cut_end + 1);
                k += 1;
            }
            if start <= end {
                intervals.push(Interval::new(start as u16, end as u16));
            }
        }
        Self { intervals }
    }

    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.difference(other).union(&other.difference(self))
    }

    /// Values of `array` that fall inside (`keep_inside`) or outside the runs
    pub fn filter_array(&self, array: &ArrayStore, keep_inside: bool) -> ArrayStore {
        let mut out = Vec::with_capacity(array.len() as usize);
        let mut runs = self.intervals.iter().peekable();
        for &value in array.as_slice() {
            while runs.next_if(|interval| interval.end < value).is_some() {}
            let inside = runs.peek().is_some_and(|interval| interval.contains(value));
            if inside == keep_inside {
                out.push(value);
            }
        }
        ArrayStore::from_sorted(out)
    }

    /// Number of values of `array` covered by the runs
    pub fn array_intersection_len(&self, array: &ArrayStore) -> u64 {
        let mut count = 0;
        let mut runs = self.intervals.iter().peekable();
        for &value in array.as_slice() {
            while runs.next_if(|interval| interval.end < value).is_some() {}
            match runs.peek() {
                Some(interval) if interval.contains(value) => count += 1,
                Some(_) => {}
                None => break,
            }
        }
        count
    }

    /// Size of the serialized payload
    #[inline]
    pub fn serialized_size(&self) -> usize {
        self.intervals.len() * 4
    }

    pub fn to_array(&self) -> ArrayStore {
        let mut values = Vec::with_capacity(self.len() as usize);
        values.extend(self.iter());
        ArrayStore::from_sorted(values)
    }

    pub fn iter(&self) -> RunIter<'_> {
        RunIter {
            intervals: &self.intervals,
            next: self.intervals.first().map_or(0, |i| u32::from(i.start)),
        }
    }
}

/// Ascending iterator over the values covered by a [`RunStore`]
#[derive(Clone)]
pub(crate) struct RunIter<'a> {
    intervals: &'a [Interval],
    next: u32,
}

impl Iterator for RunIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        let (current, rest) = self.intervals.split_first()?;
        let value = self.next as u16;
        if self.next >= u32::from(current.end) {
            self.intervals = rest;
            self.next = rest.first().map_or(0, |i| u32::from(i.start));
        } else {
            self.next += 1;
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.intervals.split_first() {
            None => 0,
            Some((current, rest)) => {
                let head = u32::from(current.end) + 1 - self.next;
                rest.iter().map(Interval::len).sum::<u32>() + head
            }
        } as usize;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(pairs: &[(u16, u16)]) -> RunStore {
        RunStore::from_intervals(pairs.iter().map(|&(s, e)| Interval::new(s, e)).collect())
    }

    #[test]
    fn insert_coalesces_neighbours() {
        let mut store = runs(&[(1, 3), (5, 7)]);
        assert!(store.insert(4));
        assert_eq!(store.intervals(), runs(&[(1, 7)]).intervals());
        assert!(!store.insert(4));
        assert!(store.insert(65535));
        assert!(store.insert(0));
        assert_eq!(store.intervals(), runs(&[(0, 7), (65535, 65535)]).intervals());
        assert_eq!(store.len(), 9);
    }

    #[test]
    fn remove_splits_intervals() {
        let mut store = runs(&[(0, 10)]);
        assert!(store.remove(5));
        assert!(store.remove(0));
        assert!(store.remove(10));
        assert!(!store.remove(5));
        assert_eq!(store.intervals(), runs(&[(1, 4), (6, 9)]).intervals());
    }

    #[test]
    fn interval_algebra() {
        let a = runs(&[(0, 10), (20, 30), (65000, 65535)]);
        let b = runs(&[(5, 25), (65535, 65535)]);
        assert_eq!(a.union(&b).intervals(), runs(&[(0, 30), (65000, 65535)]).intervals());
        assert_eq!(
            a.intersection(&b).intervals(),
            runs(&[(5, 10), (20, 25), (65535, 65535)]).intervals()
        );
        assert_eq!(a.intersection_len(&b), 13);
        assert_eq!(
            a.difference(&b).intervals(),
            runs(&[(0, 4), (26, 30), (65000, 65534)]).intervals()
        );
        assert_eq!(
            a.symmetric_difference(&b).intervals(),
            runs(&[(0, 4), (11, 19), (26, 30), (65000, 65534)]).intervals()
        );
    }

    #[test]
    fn rank_and_iteration() {
        let store = runs(&[(2, 4), (65534, 65535)]);
        assert_eq!(store.rank(1), 0);
        assert_eq!(store.rank(3), 2);
        assert_eq!(store.rank(65535), 5);
        assert_eq!(store.iter().collect::<Vec<_>>(), vec![2, 3, 4, 65534, 65535]);
        assert_eq!(store.iter().size_hint(), (5, Some(5)));
    }

    #[test]
    fn array_filtering() {
        let store = runs(&[(10, 20)]);
        let array = ArrayStore::from_sorted(vec![1, 10, 15, 20, 21]);
        assert_eq!(store.filter_array(&array, true).as_slice(), &[10, 15, 20]);
        assert_eq!(store.filter_array(&array, false).as_slice(), &[1, 21]);
        assert_eq!(store.array_intersection_len(&array), 3);
    }
}

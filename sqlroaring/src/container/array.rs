use std::cmp::Ordering;

use super::ARRAY_MAX_CARDINALITY;

/// Sorted, duplicate-free list of the low 16 bits of the members of one chunk
#[derive(Clone, Default, PartialEq, Eq)]
pub(crate) struct ArrayStore {
    values: Vec<u16>,
}

impl ArrayStore {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Wraps an already sorted and deduplicated vector
    pub fn from_sorted(values: Vec<u16>) -> Self {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        Self { values }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.values.len() as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.values
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    pub fn insert(&mut self, value: u16) -> bool {
        match self.values.binary_search(&value) {
            Ok(_) => false,
            Err(pos) => {
                self.values.insert(pos, value);
                true
            }
        }
    }

    pub fn remove(&mut self, value: u16) -> bool {
        match self.values.binary_search(&value) {
            Ok(pos) => {
                self.values.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn min(&self) -> Option<u16> {
        self.values.first().copied()
    }

    pub fn max(&self) -> Option<u16> {
        self.values.last().copied()
    }

    /// Number of values smaller or equal to `value`
    pub fn rank(&self, value: u16) -> u32 {
        match self.values.binary_search(&value) {
            Ok(pos) => pos as u32 + 1,
            Err(pos) => pos as u32,
        }
    }

    /// Number of maximal runs of consecutive values
    pub fn num_runs(&self) -> usize {
        match self.values.first() {
            None => 0,
            Some(_) => {
                1 + self
                    .values
                    .windows(2)
                    .filter(|w| u32::from(w[0]) + 1 != u32::from(w[1]))
                    .count()
            }
        }
    }

    /// Keeps only the values for which `keep` returns true
    pub fn retain(&mut self, keep: impl FnMut(&u16) -> bool) {
        self.values.retain(keep);
    }

    /// Merged values of both arrays; may exceed [`ARRAY_MAX_CARDINALITY`]
    pub fn union(&self, other: &Self) -> Vec<u16> {
        let (a, b) = (self.as_slice(), other.as_slice());
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    out.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    out.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        out
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = Vec::with_capacity(self.values.len().min(other.values.len()));
        for_each_common(self.as_slice(), other.as_slice(), |v| out.push(v));
        Self::from_sorted(out)
    }

    pub fn difference(&self, other: &Self) -> Self {
        let (a, b) = (self.as_slice(), other.as_slice());
        let mut out = Vec::with_capacity(a.len());
        let mut j = 0;
        for &v in a {
            while j < b.len() && b[j] < v {
                j += 1;
            }
            if j == b.len() || b[j] != v {
                out.push(v);
            }
        }
        Self::from_sorted(out)
    }

    /// Values in exactly one of the arrays; may exceed [`ARRAY_MAX_CARDINALITY`]
    pub fn symmetric_difference(&self, other: &Self) -> Vec<u16> {
        let (a, b) = (self.as_slice(), other.as_slice());
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    out.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        out
    }

    pub fn intersection_len(&self, other: &Self) -> u64 {
        let mut count = 0;
        for_each_common(self.as_slice(), other.as_slice(), |_| count += 1);
        count
    }

    /// Size of the serialized payload
    #[inline]
    pub fn serialized_size(&self) -> usize {
        self.values.len() * 2
    }

    /// Whether one more value would overflow the array representation
    #[inline]
    pub fn is_full(&self) -> bool {
        self.values.len() >= ARRAY_MAX_CARDINALITY
    }
}

/// Calls `f` with every value present in both sorted slices, in order
///
/// When one side is much smaller the larger side is galloped through instead of
/// walked linearly.
fn for_each_common(a: &[u16], b: &[u16], mut f: impl FnMut(u16)) {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if small.is_empty() {
        return;
    }

    if large.len() / small.len() >= 64 {
        let mut rest = large;
        for &v in small {
            let pos = gallop(rest, v);
            rest = &rest[pos..];
            match rest.first() {
                None => return,
                Some(&found) if found == v => f(v),
                Some(_) => {}
            }
        }
        return;
    }

    let (mut i, mut j) = (0, 0);
    while i < small.len() && j < large.len() {
        match small[i].cmp(&large[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                f(small[i]);
                i += 1;
                j += 1;
            }
        }
    }
}

/// Index of the first element of `values` that is `>= target`
fn gallop(values: &[u16], target: u16) -> usize {
    let mut hi = 1;
    while hi < values.len() && values[hi - 1] < target {
        hi *= 2;
    }
    let lo = hi / 2;
    let hi = hi.min(values.len());
    lo + values[lo..hi].partition_point(|&v| v < target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(values: &[u16]) -> ArrayStore {
        ArrayStore::from_sorted(values.to_vec())
    }

    #[test]
    fn insert_keeps_order_and_rejects_duplicates() {
        let mut a = ArrayStore::new();
        assert!(a.insert(5));
        assert!(a.insert(1));
        assert!(!a.insert(5));
        assert_eq!(a.as_slice(), &[1, 5]);
        assert!(a.remove(1));
        assert!(!a.remove(1));
        assert_eq!(a.as_slice(), &[5]);
    }

    #[test]
    fn set_algebra() {
        let a = store(&[1, 2, 3, 10]);
        let b = store(&[2, 3, 4]);
        assert_eq!(a.union(&b), vec![1, 2, 3, 4, 10]);
        assert_eq!(a.intersection(&b).as_slice(), &[2, 3]);
        assert_eq!(a.difference(&b).as_slice(), &[1, 10]);
        assert_eq!(a.symmetric_difference(&b), vec![1, 4, 10]);
        assert_eq!(a.intersection_len(&b), 2);
    }

    #[test]
    fn galloping_intersection_matches_linear() {
        let large = store(&(0..4000).map(|v| v * 3).collect::<Vec<_>>());
        let small = store(&[0, 2, 3, 300, 11_997, 11_998]);
        assert_eq!(small.intersection(&large).as_slice(), &[0, 3, 300, 11_997]);
        assert_eq!(large.intersection_len(&small), 4);
    }

    #[test]
    fn runs_and_rank() {
        let a = store(&[1, 2, 3, 7, 9, 10, 65535]);
        assert_eq!(a.num_runs(), 4);
        assert_eq!(a.rank(0), 0);
        assert_eq!(a.rank(3), 3);
        assert_eq!(a.rank(8), 4);
        assert_eq!(a.rank(65535), 7);
    }
}

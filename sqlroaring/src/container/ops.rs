//! Binary operations over every pairing of container representations
//!
//! Results that involve a run operand go through [`Container::into_efficient`];
//! array and bitmap results pick their representation by cardinality.

use super::{BitmapStore, Container, RunStore};

use Container::{Array, Bitmap, Run};

pub(crate) fn and(lhs: &Container, rhs: &Container) -> Container {
    match (lhs, rhs) {
        (Array(a), Array(b)) => Array(a.intersection(b)),
        (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
            let mut out = a.clone();
            out.retain(|&v| b.contains(v));
            Array(out)
        }
        (Array(a), Run(b)) | (Run(b), Array(a)) => Array(b.filter_array(a, true)).into_efficient(),
        (Bitmap(a), Bitmap(b)) => {
            let mut out = a.clone();
            out.and_inplace(b);
            Container::from_bitmap_store(out)
        }
        (Bitmap(a), Run(b)) | (Run(b), Bitmap(a)) => {
            let mut out = a.clone();
            if !b.is_full() {
                out.retain_runs(b);
            }
            Bitmap(out).into_efficient()
        }
        (Run(a), Run(b)) => Run(a.intersection(b)).into_efficient(),
    }
}

pub(crate) fn or(lhs: &Container, rhs: &Container) -> Container {
    match (lhs, rhs) {
        (Array(a), Array(b)) => Container::from_sorted_values(a.union(b)),
        (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
            let mut out = b.clone();
            for &v in a.as_slice() {
                out.insert(v);
            }
            Bitmap(out)
        }
        (Array(a), Run(b)) | (Run(b), Array(a)) => {
            Run(b.union(&RunStore::from_array(a))).into_efficient()
        }
        (Bitmap(a), Bitmap(b)) => {
            let mut out = a.clone();
            out.or_inplace(b);
            Bitmap(out)
        }
        (Bitmap(a), Run(b)) | (Run(b), Bitmap(a)) => {
            if b.is_full() {
                return Run(RunStore::full());
            }
            let mut out = a.clone();
            out.insert_runs(b);
            Bitmap(out).into_efficient()
        }
        (Run(a), Run(b)) => Run(a.union(b)).into_efficient(),
    }
}

pub(crate) fn xor(lhs: &Container, rhs: &Container) -> Container {
    match (lhs, rhs) {
        (Array(a), Array(b)) => Container::from_sorted_values(a.symmetric_difference(b)),
        (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
            let mut out = b.clone();
            for &v in a.as_slice() {
                out.flip(v);
            }
            Container::from_bitmap_store(out)
        }
        (Array(a), Run(b)) | (Run(b), Array(a)) => {
            Run(b.symmetric_difference(&RunStore::from_array(a))).into_efficient()
        }
        (Bitmap(a), Bitmap(b)) => {
            let mut out = a.clone();
            out.xor_inplace(b);
            Container::from_bitmap_store(out)
        }
        (Bitmap(a), Run(b)) | (Run(b), Bitmap(a)) => {
            let mut out = a.clone();
            out.flip_runs(b);
            Bitmap(out).into_efficient()
        }
        (Run(a), Run(b)) => Run(a.symmetric_difference(b)).into_efficient(),
    }
}

pub(crate) fn andnot(lhs: &Container, rhs: &Container) -> Container {
    match (lhs, rhs) {
        (Array(a), Array(b)) => Array(a.difference(b)),
        (Array(a), Bitmap(b)) => {
            let mut out = a.clone();
            out.retain(|&v| !b.contains(v));
            Array(out)
        }
        (Array(a), Run(b)) => Array(b.filter_array(a, false)).into_efficient(),
        (Bitmap(a), Array(b)) => {
            let mut out = a.clone();
            for &v in b.as_slice() {
                out.remove(v);
            }
            Container::from_bitmap_store(out)
        }
        (Bitmap(a), Bitmap(b)) => {
            let mut out = a.clone();
            out.andnot_inplace(b);
            Container::from_bitmap_store(out)
        }
        (Bitmap(a), Run(b)) => {
            let mut out = a.clone();
            out.remove_runs(b);
            Bitmap(out).into_efficient()
        }
        (Run(a), Array(b)) => Run(a.difference(&RunStore::from_array(b))).into_efficient(),
        (Run(a), Bitmap(b)) => {
            let mut out = BitmapStore::from_runs(a);
            out.andnot_inplace(b);
            Bitmap(out).into_efficient()
        }
        (Run(a), Run(b)) => Run(a.difference(b)).into_efficient(),
    }
}

/// Size of the intersection, without building it
pub(crate) fn and_cardinality(lhs: &Container, rhs: &Container) -> u64 {
    match (lhs, rhs) {
        (Array(a), Array(b)) => a.intersection_len(b),
        (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
            a.as_slice().iter().filter(|&&v| b.contains(v)).count() as u64
        }
        (Array(a), Run(b)) | (Run(b), Array(a)) => b.array_intersection_len(a),
        (Bitmap(a), Bitmap(b)) => a.intersection_len(b),
        (Bitmap(a), Run(b)) | (Run(b), Bitmap(a)) => {
            b.intervals().iter().map(|&interval| a.range_len(interval)).sum()
        }
        (Run(a), Run(b)) => a.intersection_len(b),
    }
}

impl Container {
    pub fn and_inplace(&mut self, other: &Container) {
        match (&mut *self, other) {
            (Array(a), Bitmap(b)) => a.retain(|&v| b.contains(v)),
            (Bitmap(a), Bitmap(b)) => {
                a.and_inplace(b);
                if a.len() as usize <= super::ARRAY_MAX_CARDINALITY {
                    *self = Array(a.to_array());
                }
            }
            _ => *self = and(self, other),
        }
    }

    pub fn or_inplace(&mut self, other: &Container) {
        match (&mut *self, other) {
            (Bitmap(a), Array(b)) => {
                for &v in b.as_slice() {
                    a.insert(v);
                }
            }
            (Bitmap(a), Bitmap(b)) => a.or_inplace(b),
            _ => *self = or(self, other),
        }
    }

    pub fn xor_inplace(&mut self, other: &Container) {
        *self = xor(self, other);
    }

    pub fn andnot_inplace(&mut self, other: &Container) {
        match (&mut *self, other) {
            (Array(a), Array(b)) => {
                let mut rest = b.as_slice();
                a.retain(|&v| {
                    let pos = rest.partition_point(|&w| w < v);
                    rest = &rest[pos..];
                    rest.first() != Some(&v)
                });
            }
            (Array(a), Bitmap(b)) => a.retain(|&v| !b.contains(v)),
            (Bitmap(a), Bitmap(b)) => {
                a.andnot_inplace(b);
                if a.len() as usize <= super::ARRAY_MAX_CARDINALITY {
                    *self = Array(a.to_array());
                }
            }
            _ => *self = andnot(self, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ArrayStore, ContainerType, Interval, ARRAY_MAX_CARDINALITY};
    use super::*;
    use std::collections::BTreeSet;

    fn samples() -> Vec<Container> {
        let sparse = Container::from_sorted_values(vec![0, 5, 64, 1000, 4097, 65535]);
        let dense = Container::from_sorted_values((0..10_000).map(|v| v * 3).collect());
        let runs = Container::Run(RunStore::from_intervals(vec![
            Interval::new(0, 100),
            Interval::new(3000, 9000),
            Interval::new(65500, 65535),
        ]));
        let full = Container::Run(RunStore::full());
        let empty = Container::Array(ArrayStore::new());
        vec![sparse, dense, runs, full, empty]
    }

    fn set(container: &Container) -> BTreeSet<u16> {
        container.iter().collect()
    }

    #[test]
    fn every_pairing_matches_set_semantics() {
        let samples = samples();
        for lhs in &samples {
            for rhs in &samples {
                let (a, b) = (set(lhs), set(rhs));

                let expected: BTreeSet<u16> = a.intersection(&b).copied().collect();
                assert_eq!(set(&and(lhs, rhs)), expected);
                assert_eq!(and_cardinality(lhs, rhs), expected.len() as u64);
                let mut inplace = lhs.clone();
                inplace.and_inplace(rhs);
                assert_eq!(set(&inplace), expected);

                let expected: BTreeSet<u16> = a.union(&b).copied().collect();
                assert_eq!(set(&or(lhs, rhs)), expected);
                let mut inplace = lhs.clone();
                inplace.or_inplace(rhs);
                assert_eq!(set(&inplace), expected);

                let expected: BTreeSet<u16> = a.symmetric_difference(&b).copied().collect();
                assert_eq!(set(&xor(lhs, rhs)), expected);

                let expected: BTreeSet<u16> = a.difference(&b).copied().collect();
                assert_eq!(set(&andnot(lhs, rhs)), expected);
                let mut inplace = lhs.clone();
                inplace.andnot_inplace(rhs);
                assert_eq!(set(&inplace), expected);
            }
        }
    }

    #[test]
    fn results_respect_density_policy() {
        for lhs in &samples() {
            for rhs in &samples() {
                for result in [and(lhs, rhs), or(lhs, rhs), xor(lhs, rhs), andnot(lhs, rhs)] {
                    let len = result.len() as usize;
                    match result.container_type() {
                        ContainerType::Array => assert!(len <= ARRAY_MAX_CARDINALITY),
                        ContainerType::Bitmap => assert!(len > ARRAY_MAX_CARDINALITY),
                        ContainerType::Run => {
                            assert!(len > ARRAY_MAX_CARDINALITY || result.num_runs() * 4 < len * 2)
                        }
                    }
                }
            }
        }
    }
}

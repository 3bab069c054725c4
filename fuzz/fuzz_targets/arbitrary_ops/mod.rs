use libfuzzer_sys::arbitrary::{self, Arbitrary, Unstructured};
use sqlroaring::{Bitmap, Native, Portable};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Num(pub u32);

pub const MAX_NUM: u32 = 0x1_0000 * 4;

impl<'a> Arbitrary<'a> for Num {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self(u.int_in_range(0..=(MAX_NUM - 1))?))
    }
}

#[derive(Arbitrary, Debug)]
pub enum MutableBitmapOperation {
    Add(Num),
    AddChecked(Num),
    AddMany(Vec<Num>),
    AddRange(RangeInclusive<Num>),
    RemoveRange(RangeInclusive<Num>),
    Clear,
    Remove(Num),
    RemoveChecked(Num),
    RunOptimize,
    RemoveRunCompression,
    // Probably turn it into a bitmap
    MakeBitmap { key: u8 },
    MakeRange { key: u8 },
}

#[derive(Arbitrary, Debug)]
pub enum ReadBitmapOp {
    Contains(Num),
    Cardinality,
    ToVec,
    IsEmpty,
    Minimum,
    Maximum,
    Rank(Num),
    Statistics,
    RoundTrip,
    NextMany(u16),
}

#[derive(Arbitrary, Debug)]
pub enum BitmapCompOperation {
    Eq,
    And,
    Or,
    Xor,
    AndNot,
}

/// Brings `key` into the fuzzed range of chunks
fn chunk_start(key: u8) -> u32 {
    u32::from(key) % (MAX_NUM / 0x1_0000) * 0x1_0000
}

impl MutableBitmapOperation {
    pub fn on_both(&self, b: &mut Bitmap, model: &mut BTreeSet<u32>) {
        match *self {
            MutableBitmapOperation::Add(i) => {
                b.add(i.0);
                model.insert(i.0);
            }
            MutableBitmapOperation::AddChecked(i) => {
                assert_eq!(b.add_checked(i.0), model.insert(i.0));
            }
            MutableBitmapOperation::AddMany(ref items) => {
                let items: Vec<u32> = items.iter().map(|n| n.0).collect();
                b.add_many(&items);
                model.extend(items);
            }
            MutableBitmapOperation::AddRange(ref r) => {
                b.add_range(r.start().0..=r.end().0);
                model.extend(r.start().0..=r.end().0);
            }
            MutableBitmapOperation::RemoveRange(ref r) => {
                b.remove_range(r.start().0..=r.end().0);
                if r.start() <= r.end() {
                    let doomed: Vec<u32> = model.range(r.start().0..=r.end().0).copied().collect();
                    for i in doomed {
                        model.remove(&i);
                    }
                }
            }
            MutableBitmapOperation::Clear => {
                b.clear();
                model.clear();
            }
            MutableBitmapOperation::Remove(i) => {
                b.remove(i.0);
                model.remove(&i.0);
            }
            MutableBitmapOperation::RemoveChecked(i) => {
                assert_eq!(b.remove_checked(i.0), model.remove(&i.0));
            }
            MutableBitmapOperation::RunOptimize => {
                b.run_optimize();
            }
            MutableBitmapOperation::RemoveRunCompression => {
                b.remove_run_compression();
            }
            MutableBitmapOperation::MakeBitmap { key } => {
                let start = chunk_start(key);
                let end = start + 9 * 1024;
                for i in (start..end).step_by(2) {
                    b.add(i);
                    model.insert(i);
                }
            }
            MutableBitmapOperation::MakeRange { key } => {
                let start = chunk_start(key);
                let end = start + 0x0_FFFF;
                b.add_range(start..=end);
                model.extend(start..=end);
            }
        }
    }
}

impl ReadBitmapOp {
    pub fn check(&self, b: &Bitmap, model: &BTreeSet<u32>) {
        match *self {
            ReadBitmapOp::Contains(i) => {
                assert_eq!(b.contains(i.0), model.contains(&i.0));
            }
            ReadBitmapOp::Cardinality => {
                assert_eq!(b.cardinality(), model.len() as u64);
            }
            ReadBitmapOp::ToVec => {
                assert!(b.to_vec().into_iter().eq(model.iter().copied()));
            }
            ReadBitmapOp::IsEmpty => {
                assert_eq!(b.is_empty(), model.is_empty());
            }
            ReadBitmapOp::Minimum => {
                assert_eq!(b.minimum(), model.first().copied());
            }
            ReadBitmapOp::Maximum => {
                assert_eq!(b.maximum(), model.last().copied());
            }
            ReadBitmapOp::Rank(i) => {
                assert_eq!(b.rank(i.0), model.range(..=i.0).count() as u64);
            }
            ReadBitmapOp::Statistics => {
                let stats = b.statistics();
                assert_eq!(stats.cardinality, model.len() as u64);
            }
            ReadBitmapOp::RoundTrip => {
                let portable = b.serialize::<Portable>();
                assert_eq!(portable.len(), b.get_serialized_size_in_bytes::<Portable>());
                assert_eq!(Bitmap::try_deserialize::<Portable>(&portable).as_ref(), Ok(b));
                let native = b.serialize::<Native>();
                assert_eq!(Bitmap::try_deserialize::<Native>(&native).as_ref(), Ok(b));
            }
            ReadBitmapOp::NextMany(n) => {
                let mut iter = b.iter();
                let mut v = vec![0; n as usize];
                let filled = iter.next_many(&mut v);
                assert!(filled <= n as usize);
                assert!(v[..filled].iter().eq(model.iter().take(filled)));
            }
        }
    }
}

impl BitmapCompOperation {
    pub fn on_both(
        &self,
        lhs: &mut Bitmap,
        rhs: &Bitmap,
        lhs_model: &mut BTreeSet<u32>,
        rhs_model: &BTreeSet<u32>,
    ) {
        match *self {
            BitmapCompOperation::Eq => {
                assert_eq!(lhs == rhs, lhs_model == rhs_model);
                assert_eq!(lhs, lhs);
            }
            BitmapCompOperation::And => {
                assert_eq!(lhs.and_cardinality(rhs), lhs_model.intersection(rhs_model).count() as u64);
                let result = lhs.and(rhs);
                lhs.and_inplace(rhs);
                assert_eq!(*lhs, result);
                lhs_model.retain(|i| rhs_model.contains(i));
            }
            BitmapCompOperation::Or => {
                assert_eq!(lhs.or_cardinality(rhs), lhs_model.union(rhs_model).count() as u64);
                let result = lhs.or(rhs);
                lhs.or_inplace(rhs);
                assert_eq!(*lhs, result);
                lhs_model.extend(rhs_model.iter().copied());
            }
            BitmapCompOperation::Xor => {
                assert_eq!(
                    lhs.xor_cardinality(rhs),
                    lhs_model.symmetric_difference(rhs_model).count() as u64
                );
                let result = lhs.xor(rhs);
                lhs.xor_inplace(rhs);
                assert_eq!(*lhs, result);
                *lhs_model = lhs_model.symmetric_difference(rhs_model).copied().collect();
            }
            BitmapCompOperation::AndNot => {
                assert_eq!(
                    lhs.andnot_cardinality(rhs),
                    lhs_model.difference(rhs_model).count() as u64
                );
                let result = lhs.andnot(rhs);
                lhs.andnot_inplace(rhs);
                assert_eq!(*lhs, result);
                lhs_model.retain(|i| !rhs_model.contains(i));
            }
        }
    }
}

#![no_main]

use crate::arbitrary_ops::*;
use sqlroaring::Bitmap;
use libfuzzer_sys::arbitrary;
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeSet;

mod arbitrary_ops;

fuzz_target!(|input: FuzzInput| {
    let mut lhs = Bitmap::create();
    let mut rhs = Bitmap::create();
    let mut lhs_model = BTreeSet::new();
    let mut rhs_model = BTreeSet::new();

    for op in &input.lhs_ops {
        op.on_both(&mut lhs, &mut lhs_model);
    }
    for op in &input.rhs_ops {
        op.on_both(&mut rhs, &mut rhs_model);
    }

    for op in &input.comp_ops {
        op.on_both(&mut lhs, &rhs, &mut lhs_model, &rhs_model);
    }

    for op in &input.read_ops {
        op.check(&rhs, &rhs_model);
        op.check(&lhs, &lhs_model);
    }
});

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    lhs_ops: Vec<MutableBitmapOperation>,
    rhs_ops: Vec<MutableBitmapOperation>,
    comp_ops: Vec<BitmapCompOperation>,
    read_ops: Vec<ReadBitmapOp>,
}

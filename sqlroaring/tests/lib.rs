use std::collections::BTreeSet;

use proptest::prelude::*;
use roaring::RoaringBitmap;
use sqlroaring::{Bitmap, DecodeError, Native, Portable, ARRAY_MAX_CARDINALITY};

// borrowed and adapted from https://github.com/Nemo157/roaring-rs/blob/5089f180ca7e17db25f5c58023f4460d973e747f/tests/lib.rs#L7-L37
#[test]
fn smoke1() {
    let mut bitmap = Bitmap::create();
    assert_eq!(bitmap.cardinality(), 0);
    assert!(bitmap.is_empty());
    bitmap.remove(0);
    assert_eq!(bitmap.cardinality(), 0);
    assert!(bitmap.is_empty());
    bitmap.add(1);
    assert!(bitmap.contains(1));
    assert_eq!(bitmap.cardinality(), 1);
    assert!(!bitmap.is_empty());
    bitmap.add(u32::MAX - 2);
    assert!(bitmap.contains(u32::MAX - 2));
    assert_eq!(bitmap.cardinality(), 2);
    bitmap.add(u32::MAX);
    assert!(bitmap.contains(u32::MAX));
    assert_eq!(bitmap.cardinality(), 3);
    bitmap.add(2);
    assert!(bitmap.contains(2));
    assert_eq!(bitmap.cardinality(), 4);
    bitmap.remove(2);
    assert!(!bitmap.contains(2));
    assert_eq!(bitmap.cardinality(), 3);
    assert!(!bitmap.contains(0));
    assert!(bitmap.contains(1));
    assert!(!bitmap.contains(100));
    assert!(bitmap.contains(u32::MAX - 2));
    assert!(!bitmap.contains(u32::MAX - 1));
    assert!(bitmap.contains(u32::MAX));
    bitmap.clear();
    assert_eq!(bitmap.cardinality(), 0);
    assert!(bitmap.is_empty());
}

// borrowed and adapted from https://github.com/Bitmap/gocroaring/blob/4a2fc02f79b1c36b904301e7d052f7f0017b6973/gocroaring_test.go#L24-L64
#[test]
fn smoke2() {
    let mut rb1 = Bitmap::create();
    for value in [1, 2, 3, 4, 5, 100, 1000] {
        rb1.add(value);
    }
    rb1.run_optimize();

    let mut rb2 = Bitmap::create();
    for value in [3, 4, 1000] {
        rb2.add(value);
    }
    rb2.run_optimize();

    let mut rb3 = Bitmap::create();

    assert_eq!(rb1.cardinality(), 7);
    assert!(rb1.contains(3));

    rb1.and_inplace(&rb2);
    rb3.add(5);
    rb3.or_inplace(&rb1);

    let rb4 = Bitmap::fast_or(&[&rb1, &rb2, &rb3]);

    assert_eq!(rb1.to_vec(), [3, 4, 1000]);
    assert_eq!(rb3.to_vec(), [3, 4, 5, 1000]);
    assert_eq!(rb4, rb3);
    assert_eq!(format!("{:?}", rb1), "Bitmap<[3, 4, 1000]>");
}

#[test]
fn duplicates_collapse() {
    let bitmap = Bitmap::of(&[5, 1, 5, 1_000_000]);
    assert_eq!(bitmap.cardinality(), 3);
    assert_eq!(bitmap.to_vec(), [1, 5, 1_000_000]);
}

#[test]
fn pairwise_counts() {
    let a = Bitmap::of(&[1, 2, 3]);
    let b = Bitmap::of(&[2, 3, 4]);
    assert_eq!(a.and_cardinality(&b), 2);
    assert_eq!(a.or_cardinality(&b), 4);
    assert_eq!(a.xor_cardinality(&b), 2);
    assert_eq!(a.andnot_cardinality(&b), 1);
    assert_eq!(b.andnot_cardinality(&a), 1);
}

#[test]
fn container_threshold() {
    let mut bitmap: Bitmap = (0..ARRAY_MAX_CARDINALITY as u32 * 2).step_by(2).collect();
    let statistics = bitmap.statistics();
    assert_eq!(statistics.n_array_containers, 1);
    assert_eq!(statistics.n_values_array_containers as usize, ARRAY_MAX_CARDINALITY);

    bitmap.add(1);
    let statistics = bitmap.statistics();
    assert_eq!(statistics.n_bitset_containers, 1);
    assert_eq!(statistics.n_bytes_bitset_containers, 8192);

    bitmap.remove(1);
    assert_eq!(bitmap.statistics().n_array_containers, 1);
}

#[test]
fn statistics_of_full_domain() {
    let full = 1u64 << 32;
    let mut bitmap = Bitmap::new();
    bitmap.add_range(..);

    let statistics = bitmap.statistics();
    assert_eq!(statistics.n_run_containers, 1 << 16);
    assert_eq!(statistics.n_values_run_containers, full);
    assert_eq!(statistics.cardinality, full);

    assert!(bitmap.remove_run_compression());
    let statistics = bitmap.statistics();
    assert_eq!(statistics.n_run_containers, 0);
    assert_eq!(statistics.n_bitset_containers, 1 << 16);
    assert_eq!(statistics.n_values_bitset_containers, full);
    assert_eq!(statistics.n_bytes_bitset_containers, 1 << 29);
    assert_eq!(statistics.cardinality, full);
}

#[test]
fn ranges_become_runs() {
    let mut bitmap = Bitmap::create();
    bitmap.add_range(10..=70_000);
    let statistics = bitmap.statistics();
    assert_eq!(statistics.n_run_containers, 2);
    assert_eq!(statistics.cardinality, 69_991);
    assert_eq!((statistics.min_value, statistics.max_value), (10, 70_000));

    assert!(bitmap.remove_run_compression());
    let statistics = bitmap.statistics();
    assert_eq!(statistics.n_run_containers, 0);
    assert_eq!(statistics.n_bitset_containers, 2);
    assert!(bitmap.run_optimize());
}

#[test]
fn empty_bitmap_round_trips() {
    let empty = Bitmap::create();
    let bytes = empty.serialize::<Portable>();
    assert_eq!(bytes.len(), 12);
    assert!(Bitmap::try_deserialize::<Portable>(&bytes).unwrap().is_empty());
}

#[test]
fn serialize_into_appends() {
    let bitmap = Bitmap::of(&[1, 2, 3]);
    let mut buffer = vec![0xAA; 3];
    let written = bitmap.serialize_into::<Portable>(&mut buffer).unwrap().len();
    assert_eq!(written, bitmap.get_serialized_size_in_bytes::<Portable>());
    assert_eq!(&buffer[..3], [0xAA; 3]);
    assert_eq!(
        Bitmap::try_deserialize::<Portable>(&buffer[3..]).unwrap(),
        bitmap
    );
}

fn mixed_bitmap() -> Bitmap {
    let mut bitmap = Bitmap::create();
    // run container
    bitmap.add_range(0..=0x9000);
    // array container
    bitmap.add(0x2_0000);
    bitmap.add(0x2_0005);
    // bitmap container
    for j in (0..0x1_0000).step_by(2) {
        bitmap.add(0x8_0000 + j);
    }
    bitmap
}

#[test]
fn mixed_bitmap_has_every_container_type() {
    let bitmap = mixed_bitmap();
    let statistics = bitmap.statistics();
    assert_eq!(statistics.n_run_containers, 1);
    assert_eq!(statistics.n_array_containers, 1);
    assert_eq!(statistics.n_bitset_containers, 1);
    assert_eq!(statistics.n_containers, 3);
}

#[test]
fn every_truncation_is_rejected() {
    let bytes = mixed_bitmap().serialize::<Portable>();
    for len in 0..bytes.len() {
        assert!(
            Bitmap::try_deserialize::<Portable>(&bytes[..len]).is_err(),
            "prefix of {} bytes was accepted",
            len
        );
    }
    let mut extended = bytes.clone();
    extended.push(0);
    assert!(Bitmap::try_deserialize::<Portable>(&extended).is_err());
}

#[test]
fn every_byte_corruption_is_rejected() {
    let bytes = mixed_bitmap().serialize::<Portable>();
    let mut corrupt = bytes.clone();
    for i in 0..bytes.len() {
        corrupt[i] ^= 0x5A;
        assert!(
            Bitmap::try_deserialize::<Portable>(&corrupt).is_err(),
            "corruption at byte {} was accepted",
            i
        );
        corrupt[i] = bytes[i];
    }
}

#[test]
fn deserialize_falls_back_to_empty() {
    assert!(Bitmap::deserialize::<Portable>(&[0x3A, 0x3B, 1]).is_empty());
    assert_eq!(
        Bitmap::try_deserialize::<Portable>(&[0x3B, 0x3B, 1, 0]).err(),
        Some(DecodeError::BadCookie(0x3B3B))
    );
}

#[test]
fn native_prefers_smaller_layout() {
    let sparse = Bitmap::of(&[1, 100_000, 200_000, 300_000]);
    let native = sparse.serialize::<Native>();
    assert_eq!(native.len(), 1 + 4 + 4 * 4);
    assert_eq!(native[0], 1);

    let dense: Bitmap = (0..10_000).collect();
    let native = dense.serialize::<Native>();
    assert_eq!(native[0], 2);
    assert_eq!(&native[1..], &dense.serialize::<Portable>()[..]);

    for bitmap in [sparse, dense] {
        let bytes = bitmap.serialize::<Native>();
        assert_eq!(Bitmap::try_deserialize::<Native>(&bytes).unwrap(), bitmap);
    }
}

fn values() -> impl Strategy<Value = Vec<u32>> {
    prop_oneof![
        // sparse
        prop::collection::vec(any::<u32>(), 0..500),
        // dense, a few chunks
        prop::collection::vec(0..200_000u32, 0..20_000),
        // runs
        (0..300_000u32, 1..70_000u32, 0..4usize).prop_map(|(start, len, gaps)| {
            (start..start + len)
                .filter(|v| gaps == 0 || v % (gaps as u32 + 7) != 0)
                .collect::<Vec<u32>>()
        }),
    ]
}

fn reference(values: &[u32]) -> RoaringBitmap {
    values.iter().copied().collect()
}

proptest! {
    #[test]
    fn bitmap_cardinality_roundtrip(indices in values()) {
        let original = Bitmap::of(&indices);
        let mut a = indices;
        a.sort_unstable();
        a.dedup();
        prop_assert_eq!(a.len(), original.cardinality() as usize);
        prop_assert_eq!(a, original.to_vec());
    }

    #[test]
    fn test_bitmap_serialization_roundtrip(indices in values()) {
        let mut original = Bitmap::of(&indices);
        for _ in 0..2 {
            let buffer = original.serialize::<Portable>();
            prop_assert_eq!(buffer.len(), original.get_serialized_size_in_bytes::<Portable>());
            let deserialized = Bitmap::try_deserialize::<Portable>(&buffer).unwrap();
            prop_assert_eq!(&original, &deserialized);
            prop_assert_eq!(deserialized.serialize::<Portable>(), buffer);

            let native = Bitmap::try_deserialize::<Native>(&original.serialize::<Native>()).unwrap();
            prop_assert_eq!(&original, &native);
            original.run_optimize();
        }
    }

    #[test]
    fn matches_reference_implementation(lhs in values(), rhs in values()) {
        let (a, b) = (Bitmap::of(&lhs), Bitmap::of(&rhs));
        let (ra, rb) = (reference(&lhs), reference(&rhs));

        prop_assert_eq!(a.and(&b).to_vec(), (&ra & &rb).iter().collect::<Vec<_>>());
        prop_assert_eq!(a.or(&b).to_vec(), (&ra | &rb).iter().collect::<Vec<_>>());
        prop_assert_eq!(a.xor(&b).to_vec(), (&ra ^ &rb).iter().collect::<Vec<_>>());
        prop_assert_eq!(a.andnot(&b).to_vec(), (&ra - &rb).iter().collect::<Vec<_>>());

        prop_assert_eq!(a.and_cardinality(&b), ra.intersection_len(&rb));
        prop_assert_eq!(a.or_cardinality(&b), ra.union_len(&rb));
        prop_assert_eq!(a.xor_cardinality(&b), ra.symmetric_difference_len(&rb));
        prop_assert_eq!(a.andnot_cardinality(&b), ra.difference_len(&rb));

        prop_assert_eq!(a.minimum(), ra.min());
        prop_assert_eq!(a.maximum(), ra.max());
    }

    #[test]
    fn inplace_matches_allocating(lhs in values(), rhs in values(), optimize in any::<bool>()) {
        let (mut a, b) = (Bitmap::of(&lhs), Bitmap::of(&rhs));
        if optimize {
            a.run_optimize();
        }
        let ops: [(fn(&Bitmap, &Bitmap) -> Bitmap, fn(&mut Bitmap, &Bitmap)); 4] = [
            (Bitmap::and, Bitmap::and_inplace),
            (Bitmap::or, Bitmap::or_inplace),
            (Bitmap::xor, Bitmap::xor_inplace),
            (Bitmap::andnot, Bitmap::andnot_inplace),
        ];
        for (allocating, inplace) in ops {
            let expected = allocating(&a, &b);
            let mut actual = a.clone();
            inplace(&mut actual, &b);
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn set_algebra_laws(a in values(), b in values(), c in values()) {
        let (a, b, c) = (Bitmap::of(&a), Bitmap::of(&b), Bitmap::of(&c));

        prop_assert_eq!(a.and(&b), b.and(&a));
        prop_assert_eq!(a.or(&b), b.or(&a));
        prop_assert_eq!(a.xor(&b), b.xor(&a));

        prop_assert_eq!(a.and(&b).and(&c), a.and(&b.and(&c)));
        prop_assert_eq!(a.or(&b).or(&c), a.or(&b.or(&c)));
        prop_assert_eq!(a.xor(&b).xor(&c), a.xor(&b.xor(&c)));

        prop_assert_eq!(a.and_cardinality(&b) + a.andnot_cardinality(&b), a.cardinality());
        prop_assert_eq!(a.andnot(&b) == b.andnot(&a), a == b);

        prop_assert_eq!(
            Bitmap::fast_or(&[&a, &b, &c]),
            Bitmap::fast_or(&[&c, &a, &b])
        );
        prop_assert_eq!(
            Bitmap::fast_and(&[&a, &b, &c]),
            Bitmap::fast_and(&[&b, &c, &a])
        );
        prop_assert_eq!(
            Bitmap::fast_xor(&[&a, &b, &c]),
            Bitmap::fast_xor(&[&c, &b, &a])
        );
    }

    #[test]
    fn insert_and_remove_are_idempotent(indices in values(), extra in any::<u32>()) {
        let mut bitmap = Bitmap::of(&indices);
        let present = bitmap.contains(extra);
        prop_assert_eq!(bitmap.add_checked(extra), !present);
        let after_first = bitmap.clone();
        prop_assert!(!bitmap.add_checked(extra));
        prop_assert_eq!(&bitmap, &after_first);

        prop_assert!(bitmap.remove_checked(extra));
        let after_remove = bitmap.clone();
        prop_assert!(!bitmap.remove_checked(extra));
        prop_assert_eq!(bitmap, after_remove);
    }

    #[test]
    fn rank_counts_smaller_members(indices in values(), needle in any::<u32>()) {
        let bitmap = Bitmap::of(&indices);
        let set: BTreeSet<u32> = indices.into_iter().collect();
        prop_assert_eq!(bitmap.rank(needle), set.range(..=needle).count() as u64);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn corrupted_buffers_never_decode(indices in prop::collection::vec(any::<u32>(), 0..64), flip in 1..=255u8) {
        let bytes = Bitmap::of(&indices).serialize::<Portable>();
        for len in 0..bytes.len() {
            prop_assert!(Bitmap::try_deserialize::<Portable>(&bytes[..len]).is_err());
        }
        let mut corrupt = bytes.clone();
        for i in 0..bytes.len() {
            corrupt[i] ^= flip;
            prop_assert!(Bitmap::try_deserialize::<Portable>(&corrupt).is_err());
            corrupt[i] = bytes[i];
        }
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = Bitmap::try_deserialize::<Portable>(&bytes);
        let _ = Bitmap::try_deserialize::<Native>(&bytes);
    }
}

#[test]
fn values_move_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Bitmap>();
    assert_send_sync::<sqlroaring::Bitmap64>();
    assert_send_sync::<sqlroaring::aggregate::GroupAnd<Bitmap>>();
    assert_send_sync::<sqlroaring::Error>();

    let bitmap = Bitmap::of(&[1, 2, 3]);
    let handle = std::thread::spawn(move || bitmap.serialize::<Portable>());
    let bytes = handle.join().unwrap();
    assert_eq!(Bitmap::deserialize::<Portable>(&bytes).cardinality(), 3);
}

#![no_main]

use sqlroaring::{Bitmap, Bitmap64, Native, Portable};
use libfuzzer_sys::fuzz_target;
use libfuzzer_sys::arbitrary::{self, Arbitrary};

fn check_bitmap<D: sqlroaring::bitmap::Deserializer>(input: &[u8]) {
    if let Ok(mut bitmap) = Bitmap::try_deserialize::<D>(input) {
        let values = bitmap.to_vec();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(values.len() as u64, bitmap.cardinality());

        let reencoded = bitmap.serialize::<Portable>();
        assert_eq!(
            Bitmap::try_deserialize::<Portable>(&reencoded).as_ref(),
            Ok(&bitmap),
            "Re-encoding doesn't round trip {}",
            std::any::type_name::<D>()
        );

        let start_cardinality = bitmap.cardinality();
        let mut new_cardinality = start_cardinality;
        for i in 100..1000 {
            if !bitmap.contains(i) {
                bitmap.add(i);
                new_cardinality += 1;
            }
        }
        assert_eq!(
            new_cardinality,
            bitmap.cardinality(),
            "Cardinality mismatch in {}",
            std::any::type_name::<D>()
        );
    }
}

fn check_bitmap64(input: &[u8]) {
    if let Ok(mut bitmap) = Bitmap64::try_deserialize::<Portable>(input) {
        let reencoded = bitmap.serialize::<Portable>();
        assert_eq!(
            Bitmap64::try_deserialize::<Portable>(&reencoded).as_ref(),
            Ok(&bitmap)
        );

        let start_cardinality = bitmap.cardinality();
        let mut new_cardinality = start_cardinality;
        for i in 100..1000 {
            if !bitmap.contains(i) {
                bitmap.add(i);
                new_cardinality += 1;
            }
        }
        assert_eq!(new_cardinality, bitmap.cardinality());
    }
}

#[derive(Arbitrary, Debug)]
enum BitmapType {
    Portable32,
    Native32,
    Portable64,
}

fuzz_target!(|input: (BitmapType, &[u8])| {
    let (ty, input) = input;
    match ty {
        BitmapType::Portable32 => check_bitmap::<Portable>(input),
        BitmapType::Native32 => check_bitmap::<Native>(input),
        BitmapType::Portable64 => check_bitmap64(input),
    }
});

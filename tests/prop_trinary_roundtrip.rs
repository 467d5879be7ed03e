// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use proptest::prelude::*;

use tangle_node::core::trinary::{
    bytes_from_trits, decode_int64, encode_int64, len_bytes, len_trits, trits_from_bytes,
    trits_from_trytes, trytes_from_trits, Trit, TritError,
};

fn trit() -> impl Strategy<Value = Trit> {
    prop_oneof![Just(-1i8), Just(0i8), Just(1i8)]
}

proptest! {
    #[test]
    fn trits_survive_bytes(trits in proptest::collection::vec(trit(), 0..600)) {
        let mut bytes = vec![0u8; len_bytes(trits.len())];
        prop_assert_eq!(bytes_from_trits(&mut bytes, &trits).unwrap(), bytes.len());

        let mut back = vec![0; len_trits(bytes.len())];
        trits_from_bytes(&mut back, &bytes).unwrap();
        prop_assert_eq!(&back[..trits.len()], &trits[..]);
        prop_assert!(back[trits.len()..].iter().all(|&t| t == 0));
    }

    #[test]
    fn balanced_bytes_survive_trits(bytes in proptest::collection::vec(-121i8..=121, 0..300)) {
        let bytes: Vec<u8> = bytes.into_iter().map(|b| b as u8).collect();
        let mut trits = vec![0; len_trits(bytes.len())];
        trits_from_bytes(&mut trits, &bytes).unwrap();

        let mut back = vec![0u8; bytes.len()];
        bytes_from_trits(&mut back, &trits).unwrap();
        prop_assert_eq!(back, bytes);
    }

    #[test]
    fn trytes_survive_trits(trits in proptest::collection::vec(trit(), 0..90)) {
        let whole = trits.len() - trits.len() % 3;
        let trits = &trits[..whole];
        let trytes = trytes_from_trits(trits).unwrap();
        prop_assert_eq!(trytes.len(), whole / 3);
        prop_assert_eq!(trits_from_trytes(&trytes).unwrap(), trits.to_vec());
    }

    #[test]
    fn int64_survives_trits(value in -(3i64.pow(39) / 2)..=(3i64.pow(39) / 2)) {
        let mut trits = [0; 40];
        encode_int64(&mut trits, value).unwrap();
        prop_assert_eq!(decode_int64(&trits), value);
    }
}

#[test]
fn known_bytes_vector() {
    let trits: [Trit; 10] = [-1, 0, 1, 0, -1, 1, 1, 1, 1, -1];
    let mut bytes = [0u8; 2];
    bytes_from_trits(&mut bytes, &trits).unwrap();
    assert_eq!(bytes, [0xb7, 0xd7]);

    let mut back = [0; 10];
    trits_from_bytes(&mut back, &bytes).unwrap();
    assert_eq!(back, trits);
}

#[test]
fn tryte_alphabet_order() {
    let mut trits = Vec::new();
    for k in -1..=1 {
        for j in -1..=1 {
            for i in -1..=1 {
                trits.extend_from_slice(&[i, j, k]);
            }
        }
    }
    assert_eq!(
        trytes_from_trits(&trits).unwrap(),
        "NOPQRSTUVWXYZ9ABCDEFGHIJKLM"
    );
}

#[test]
fn codec_rejects_bad_input() {
    let mut small = [0u8; 1];
    assert_eq!(
        bytes_from_trits(&mut small, &[0; 6]),
        Err(TritError::BufferTooSmall)
    );
    assert_eq!(trytes_from_trits(&[0, 2, 0]), Err(TritError::InvalidTrit));
    let mut trits = [0; 4];
    assert_eq!(
        trits_from_bytes(&mut trits, &[1]),
        Err(TritError::BufferTooSmall)
    );
    assert_eq!(trytes_from_trits(&[0, 0]), Err(TritError::InvalidLength));
    assert_eq!(trits_from_trytes("AB1"), Err(TritError::InvalidTryte));
    assert_eq!(trits_from_trytes("ab"), Err(TritError::InvalidTryte));
}
